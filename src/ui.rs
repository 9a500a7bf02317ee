pub mod animation;
pub mod screen;
pub mod wheel_canvas;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::{App, LinkStatus};

const HORIZONTAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = self.wheel.state();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        // header: match clock left, scores right
        let clock = &state.config().match_clock;
        let clock_line = Line::from(vec![
            Span::styled(clock.display(), bold_style),
            Span::raw(" "),
            if clock.is_running() {
                Span::styled("▶", Style::default().fg(Color::Green))
            } else {
                Span::styled("⏸", dim_style)
            },
        ]);
        Paragraph::new(clock_line)
            .alignment(Alignment::Left)
            .render(chunks[0], buf);

        let scores = state.config().scores;
        Paragraph::new(Span::styled(
            format!("{}  :  {}", scores.left, scores.right),
            bold_style,
        ))
        .alignment(Alignment::Right)
        .render(chunks[0], buf);

        screen::current_screen(self).render(self, chunks[1], buf);

        // legend
        let link = match self.link {
            LinkStatus::Connecting => Span::styled("connecting", dim_style),
            LinkStatus::Online => Span::styled("online", Style::default().fg(Color::Green)),
            LinkStatus::Offline => Span::styled("offline", Style::default().fg(Color::Red)),
        };
        let mut legend = vec![
            Span::styled("(space) spin / (r)eset / (q)uit", italic_style),
            Span::styled(format!("   {}   ", state.phase()), dim_style),
            link,
        ];
        if let Some(notice) = &self.notice {
            legend.push(Span::styled(format!("   {}", notice), italic_style));
        }
        Paragraph::new(Line::from(legend))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }
}
