use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use prizewheel::wheel::Phase;

use crate::{
    ui::{animation, wheel_canvas},
    App,
};

/// A stage boundary: what fills the area between header and legend
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Nothing resolved at load; spins stay disabled
pub struct EmptyWheelScreen;

impl Screen for EmptyWheelScreen {
    fn render(&self, _app: &App, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(45),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(area);

        Paragraph::new(vec![
            Line::from(Span::styled(
                "No prizes loaded",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "the wheel is disabled until the next start",
                Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
            )),
        ])
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
    }
}

/// The wheel itself, while idle, spinning, or just stopped
pub struct WheelScreen;

/// Largest centred rect that looks square in a terminal (cells are ~2:1)
pub fn square_area(area: Rect) -> Rect {
    let side = area.height.min(area.width / 2);
    let width = side * 2;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - side) / 2,
        width,
        height: side,
    }
}

impl Screen for WheelScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let state = app.wheel.state();
        let wheel = state.wheel();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);

        let rotation = animation::displayed_rotation(wheel.motion(), state.now());
        wheel_canvas::wheel_canvas(wheel.sectors(), rotation).render(square_area(chunks[0]), buf);

        if state.phase() == Phase::RevealTransit {
            if let Some(winner) = wheel.winner() {
                Paragraph::new(Span::styled(
                    winner_label(&winner.label),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Center)
                .render(chunks[1], buf);
            }
        }
    }
}

/// Winner card with the result countdown
pub struct RevealScreen;

impl Screen for RevealScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let state = app.wheel.state();
        let Some(winner) = state.wheel().winner() else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(20),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        Paragraph::new(Span::styled(
            winner_label(&winner.label),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);

        Paragraph::new(Span::styled(
            format!("[{}]", winner.image.reference),
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

        if state.phase() == Phase::ResultShown {
            let countdown = state.countdown();
            let style = if countdown.is_pulsing() {
                let base = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
                if animation::pulse_on(state.now()) {
                    base.add_modifier(Modifier::REVERSED)
                } else {
                    base
                }
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };

            Paragraph::new(Span::styled(countdown.display(), style))
                .alignment(Alignment::Center)
                .render(chunks[4], buf);
        }
    }
}

pub fn winner_label(label: &str) -> String {
    if label.trim().is_empty() {
        "WINNER".to_string()
    } else {
        label.to_string()
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(app: &App) -> Box<dyn Screen> {
    let wheel = app.wheel.state().wheel();
    if wheel.sectors().is_empty() {
        Box::new(EmptyWheelScreen)
    } else if wheel.is_wheel_visible() {
        Box::new(WheelScreen)
    } else {
        Box::new(RevealScreen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_area_is_centered() {
        let sq = square_area(Rect::new(0, 0, 100, 20));
        assert_eq!(sq, Rect::new(30, 0, 40, 20));

        let sq = square_area(Rect::new(0, 0, 20, 30));
        assert_eq!(sq, Rect::new(0, 10, 20, 10));
    }

    #[test]
    fn test_winner_label_fallback() {
        assert_eq!(winner_label(""), "WINNER");
        assert_eq!(winner_label("  "), "WINNER");
        assert_eq!(winner_label("Signed Shirt"), "Signed Shirt");
    }
}
