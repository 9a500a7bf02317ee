use ratatui::{
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::canvas::{Canvas, Context, Points},
};
use unicode_width::UnicodeWidthStr;

use prizewheel::sector::{Rgb, SectorModel, WedgeInstruction};

/// Canvas units per sample; braille cells are small enough at this density
const SAMPLE_STEP: f64 = 0.025;
const BOUNDS: [f64; 2] = [-1.12, 1.12];
const POINTER_COLOR: Color = Color::Rgb(0xE3, 0x06, 0x13);

pub fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Canvas position for a wheel-frame angle (clockwise from 3 o'clock, as on
/// screen) turned clockwise by `rotation` radians. The canvas y axis points up.
pub fn screen_point(angle: f64, radius: f64, rotation: f64) -> (f64, f64) {
    let a = angle + rotation;
    (radius * a.cos(), -radius * a.sin())
}

pub fn wedge_points(start: f64, end: f64, radius: f64, rotation: f64) -> Vec<(f64, f64)> {
    let mut points = Vec::new();
    let mut r = SAMPLE_STEP;
    while r <= radius {
        let samples = (((end - start) * r) / SAMPLE_STEP).ceil().max(1.0) as usize;
        for i in 0..=samples {
            let angle = start + (end - start) * i as f64 / samples as f64;
            points.push(screen_point(angle, r, rotation));
        }
        r += SAMPLE_STEP;
    }
    points
}

pub fn disc_points(center: (f64, f64), radius: f64) -> Vec<(f64, f64)> {
    let mut points = vec![center];
    let mut r = SAMPLE_STEP / 2.0;
    while r <= radius {
        let samples = ((std::f64::consts::TAU * r) / (SAMPLE_STEP / 2.0)).ceil() as usize;
        for i in 0..samples {
            let a = std::f64::consts::TAU * i as f64 / samples as f64;
            points.push((center.0 + r * a.cos(), center.1 + r * a.sin()));
        }
        r += SAMPLE_STEP / 2.0;
    }
    points
}

/// Short tag standing in for the sector image inside its inset
pub fn inset_tag(label: &str) -> String {
    if !label.is_empty() && label.width() <= 3 {
        return label.to_string();
    }
    label
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}

fn paint(ctx: &mut Context, plan: &[WedgeInstruction], tags: &[String], rotation: f64) {
    for wedge in plan {
        let coords = wedge_points(wedge.start_angle, wedge.end_angle, 1.0, rotation);
        ctx.draw(&Points {
            coords: &coords,
            color: to_color(wedge.color),
        });
    }

    ctx.layer();
    for wedge in plan {
        let center = screen_point(wedge.inset.angle, wedge.inset.radial_offset, rotation);
        let backdrop = disc_points(center, wedge.inset.backdrop_radius);
        ctx.draw(&Points {
            coords: &backdrop,
            color: to_color(wedge.inset.backdrop),
        });
    }

    ctx.layer();
    for (wedge, tag) in plan.iter().zip(tags) {
        let (x, y) = screen_point(wedge.inset.angle, wedge.inset.radial_offset, rotation);
        ctx.print(
            x - 0.02 * tag.width() as f64,
            y,
            Span::styled(
                tag.clone(),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        );
    }

    ctx.print(
        -0.02,
        1.06,
        Span::styled("▼", Style::default().fg(POINTER_COLOR).add_modifier(Modifier::BOLD)),
    );
}

/// Wheel drawn at `rotation_deg`, pointer fixed at the top
pub fn wheel_canvas(
    sectors: &SectorModel,
    rotation_deg: f64,
) -> Canvas<'static, impl Fn(&mut Context)> {
    let plan = sectors.draw_plan(1.0);
    let tags: Vec<String> = sectors.iter().map(|s| inset_tag(&s.label)).collect();
    let rotation = rotation_deg.rem_euclid(360.0).to_radians();

    Canvas::default()
        .marker(Marker::Braille)
        .x_bounds(BOUNDS)
        .y_bounds(BOUNDS)
        .paint(move |ctx| paint(ctx, &plan, &tags, rotation))
}
