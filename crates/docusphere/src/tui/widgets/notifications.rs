// Notification feed for the acting department, unread first.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::models::{parse_timestamp, Notification};
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default().borders(Borders::ALL).title(" Notifications ");

    if state.notifications.is_empty() {
        let paragraph = Paragraph::new("  No notifications.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = ordered(&state.notifications)
        .into_iter()
        .map(format_notification)
        .collect();
    frame.render_widget(List::new(items).block(block), area);
}

/// Unread notifications before read ones, otherwise in feed order.
pub fn ordered(notifications: &[Notification]) -> Vec<&Notification> {
    let mut list: Vec<&Notification> = notifications.iter().collect();
    list.sort_by_key(|n| n.is_read);
    list
}

fn format_notification(notification: &Notification) -> ListItem<'_> {
    let style = if notification.is_read {
        Style::default().fg(Color::Gray)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };
    let marker = if notification.is_read { "  " } else { "● " };
    let mut lines = vec![Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::LightRed)),
        Span::styled(notification.message.as_str(), style),
    ])];
    if let Some(when) = notification
        .created_at
        .as_deref()
        .and_then(parse_timestamp)
    {
        lines.push(Line::from(Span::styled(
            format!("  {}", when.format("%Y-%m-%d %H:%M")),
            Style::default().fg(Color::DarkGray),
        )));
    }
    ListItem::new(lines)
}
