use std::time::Duration;

use prizewheel::wheel::{SpinMotion, SPIN_DURATION};

/// Decelerating curve for the spin, 0..=1 in and out
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Rotation to draw at `now`. Reaches the motion's target exactly when the
/// spin duration has elapsed, which is when the winner is resolved.
pub fn displayed_rotation(motion: Option<SpinMotion>, now: Duration) -> f64 {
    match motion {
        None => 0.0,
        Some(m) => {
            let elapsed = now.saturating_sub(m.started_at);
            let t = elapsed.as_secs_f64() / SPIN_DURATION.as_secs_f64();
            m.from_deg + (m.to_deg - m.from_deg) * ease_out_cubic(t)
        }
    }
}

/// Pulse on/off, flipping twice a second
pub fn pulse_on(now: Duration) -> bool {
    (now.as_millis() / 500) % 2 == 0
}
