// Status bar widget: acting user, department, notification count.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::models::Notification;
use crate::session::UserSession;
use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [app name] [user (department)] [role] [unread notifications] [loading]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![Span::styled(
        " DocuSphere ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    if let Some(session) = &state.session {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            user_label(session),
            Style::default().fg(Color::White),
        ));
        if let Some(role) = role_badge(session) {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(role, Style::default().fg(Color::Yellow)));
        }

        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        let unread = unread_count(&state.notifications);
        let color = if unread > 0 { Color::LightRed } else { Color::Gray };
        spans.push(Span::styled(
            format!("{unread} unread notifications"),
            Style::default().fg(color),
        ));

        if state.listing.loading {
            spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
            spans.push(Span::styled(
                "Loading...",
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// "Name (Department)".
pub fn user_label(session: &UserSession) -> String {
    format!("{} ({})", session.name, session.department)
}

pub fn role_badge(session: &UserSession) -> Option<&'static str> {
    if session.is_guest() {
        Some("[guest]")
    } else if session.is_admin {
        Some("[admin]")
    } else {
        None
    }
}

pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.is_read).count()
}
