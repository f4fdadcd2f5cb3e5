// Login screen: user id, name and password form, or a full-screen
// configuration error when login is unavailable.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::dialog::centered_rect;
use super::form_line;
use crate::tui::{LoginField, ViewState};

const FORM_WIDTH: u16 = 56;
const FORM_HEIGHT: u16 = 10;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    if let Some(error) = &state.config_error {
        render_config_error(frame, area, error);
        return;
    }

    let form_area = centered_rect(FORM_WIDTH, FORM_HEIGHT, area);
    let [fields_area, message_area] =
        Layout::vertical([Constraint::Length(7), Constraint::Min(1)]).areas(form_area);

    let form = &state.login;
    let masked = "*".repeat(form.password.chars().count());
    let lines = vec![
        Line::raw(""),
        form_line("User ID", form.user_id.clone(), form.focus == LoginField::UserId),
        form_line("Name", form.name.clone(), form.focus == LoginField::Name),
        form_line("Password", masked, form.focus == LoginField::Password),
        Line::raw(""),
        Line::from(Span::styled(
            "  Department is derived from the user id prefix.",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Sign in to DocuSphere ",
            Style::default().add_modifier(Modifier::BOLD),
        ));
    frame.render_widget(Paragraph::new(lines).block(block), fields_area);

    if let Some(message) = &state.inline_error {
        let paragraph = Paragraph::new(message.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, message_area);
    }
}

fn render_config_error(frame: &mut Frame, area: Rect, error: &str) {
    let lines = vec![
        Line::raw(""),
        Line::from(Span::styled(
            "  Login is unavailable",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::raw(format!("  {error}")),
        Line::raw(""),
        Line::from(Span::styled(
            "  Add the key to config/credentials.toml and restart, or press F2 to continue as a guest.",
            Style::default().fg(Color::Gray),
        )),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Configuration error ");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
