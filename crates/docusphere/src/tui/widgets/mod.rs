// TUI widget modules for each screen and panel.

pub mod dialog;
pub mod documents;
pub mod help_bar;
pub mod login;
pub mod notifications;
pub mod qna;
pub mod status_bar;
pub mod upload;
pub mod viewer;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Render a single-line form field, underlining the focused one.
pub(crate) fn form_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!("{label:>12}: "), label_style),
        Span::raw(value),
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
    ])
}
