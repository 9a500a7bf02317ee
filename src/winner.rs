/// Angle of the fixed pointer in the wheel's unrotated frame (12 o'clock)
pub const POINTER_ANGLE_DEG: f64 = 270.0;

/// Maps a cumulative rotation to the sector under the pointer.
///
/// Returns `None` for an inert wheel.
pub fn resolve(cumulative_rotation_deg: f64, sector_count: usize) -> Option<usize> {
    if sector_count == 0 {
        return None;
    }

    let mut winning_angle = (POINTER_ANGLE_DEG - cumulative_rotation_deg.rem_euclid(360.0)) % 360.0;
    if winning_angle < 0.0 {
        winning_angle += 360.0;
    }

    let degrees_per_sector = 360.0 / sector_count as f64;
    let index = (winning_angle / degrees_per_sector).floor();

    Some((index.max(0.0) as usize).min(sector_count - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_full_turns_lands_on_last_of_four() {
        assert_eq!(resolve(1800.0, 4), Some(3));
    }

    #[test]
    fn test_zero_rotation() {
        // 270 / 90 = 3
        assert_eq!(resolve(0.0, 4), Some(3));
        assert_eq!(resolve(0.0, 1), Some(0));
    }

    #[test]
    fn test_inert_wheel() {
        assert_eq!(resolve(1234.5, 0), None);
    }

    #[test]
    fn test_periodic_in_full_turns() {
        for n in 1..=12 {
            for step in 0..72 {
                let r = step as f64 * 5.3;
                let base = resolve(r, n);
                for k in 1..6 {
                    assert_eq!(resolve(r + 360.0 * k as f64, n), base);
                }
            }
        }
    }

    #[test]
    fn test_output_always_in_range() {
        for n in 1..=15 {
            let mut r = 0.0;
            while r < 4000.0 {
                let idx = resolve(r, n).unwrap();
                assert!(idx < n, "index {idx} out of range for {n} sectors");
                r += 0.7;
            }
        }
    }

    #[test]
    fn test_exact_boundaries_clamp() {
        // rotation 270 puts the pointer exactly on angle 0
        assert_eq!(resolve(270.0, 4), Some(0));
        // rotation 180 gives a winning angle of 90, first angle of sector 1
        assert_eq!(resolve(180.0, 4), Some(1));
        // just shy of a full turn from the pointer stays in the last sector
        assert_eq!(resolve(270.0 + 1e-9, 4), Some(3));
    }

    #[test]
    fn test_rotation_moves_winner_backwards() {
        // each additional sector's worth of rotation moves one sector back
        assert_eq!(resolve(1800.0 + 90.0, 4), Some(2));
        assert_eq!(resolve(1800.0 + 180.0, 4), Some(1));
    }
}
