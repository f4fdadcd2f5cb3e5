// Modal overlays: quit confirmation and blocking alerts.
//
// Rendered on top of the main layout. Alerts take precedence over the quit
// prompt.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

const QUIT_WIDTH: u16 = 28;
const QUIT_HEIGHT: u16 = 5;
const ALERT_WIDTH: u16 = 60;
const ALERT_HEIGHT: u16 = 7;

pub fn render_quit_confirm(frame: &mut Frame, area: Rect) {
    let dialog_area = centered_rect(QUIT_WIDTH, QUIT_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            " Quit? ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));

    let text = Line::from(vec![
        Span::raw("  Really quit? ("),
        Span::styled("y", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw("/"),
        Span::styled("n", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(")"),
    ]);

    let paragraph = Paragraph::new(text)
        .block(block)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog_area);
}

pub fn render_alert(frame: &mut Frame, area: Rect, message: &str) {
    let dialog_area = centered_rect(ALERT_WIDTH, ALERT_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(Span::styled(
            " Alert ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(" Enter to dismiss ").right_aligned());

    let paragraph = Paragraph::new(message.to_string())
        .block(block)
        .wrap(Wrap { trim: true })
        .style(Style::default().bg(Color::Black).fg(Color::White));
    frame.render_widget(paragraph, dialog_area);
}

/// Compute a centered rectangle of the given size within `area`, clamped to
/// the available space.
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .split(area);

    let horizontal = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .split(vertical[0]);

    horizontal[0]
}
