// Help bar widget: key hints for the active screen, or a flash message.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::{Screen, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let line = match &state.flash {
        Some(message) if state.screen == Screen::Dashboard => Line::from(Span::styled(
            format!(" {message}  (Esc to dismiss)"),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        _ => Line::from(Span::styled(
            hints(state),
            Style::default().fg(Color::White).add_modifier(Modifier::DIM),
        )),
    };
    let paragraph = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

/// Key hints for the active screen and mode.
pub fn hints(state: &ViewState) -> &'static str {
    match state.screen {
        Screen::Login if state.config_error.is_some() => " F2:Continue as guest | Esc:Quit",
        Screen::Login => " Tab:Next field | Enter:Log in | F2:Continue as guest | Esc:Quit",
        Screen::Dashboard if state.search_mode => " Type to search | Enter:Keep | Esc:Clear",
        Screen::Dashboard => {
            " j/k:Select | Enter:View | a:Ask | /:Search | d/t:Sort | u:Upload | r:Refresh | L:Logout | q:Quit"
        }
        Screen::Viewer => " Tab/Left/Right:Switch tab | a:Ask | Esc:Back | q:Quit",
        Screen::Qna => " Enter:Ask | F1-F3:Suggested questions | Esc:Close",
        Screen::Upload => " Tab:Next field | Left/Right:Department | Enter:Upload | Esc:Cancel",
    }
}
