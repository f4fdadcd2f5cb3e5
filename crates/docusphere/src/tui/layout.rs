// Screen layout: panel arrangement and sizing.
//
// The dashboard splits the terminal into fixed zones:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Stats (3 rows)                                    |
// +-------------------------+------------------------+
// | Documents (70%)          | Notifications (30%)    |
// +-------------------------+------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+
//
// Every other screen renders into `body`, the union of the stats row and
// the middle section.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: user, department, notification count.
    pub status_bar: Rect,
    /// Dashboard stat counters.
    pub stats: Rect,
    /// Dashboard document table.
    pub documents: Rect,
    /// Dashboard notification feed.
    pub sidebar: Rect,
    /// Full content area for non-dashboard screens.
    pub body: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    // Vertical: status(1) | body(fill) | help(1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(8),    // body
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let status_bar = vertical[0];
    let body = vertical[1];
    let help_bar = vertical[2];

    // Body: stats(3) | middle(fill)
    let dashboard = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(body);

    let stats = dashboard[0];

    // Middle: documents (70%) | notifications (30%)
    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(dashboard[1]);

    AppLayout {
        status_bar,
        stats,
        documents: middle[0],
        sidebar: middle[1],
        body,
        help_bar,
    }
}
