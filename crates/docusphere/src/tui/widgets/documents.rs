// Dashboard document table and stat counters.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::listing::{DocumentQuery, SortDirection, SortKey};
use crate::models::{Document, DocumentStatus};
use crate::tui::ViewState;

/// Render the four stat counters side by side.
pub fn render_stats(frame: &mut Frame, area: Rect, state: &ViewState) {
    let stats = state.listing.stats;
    let counters = [
        ("Read", stats.read, Color::Green),
        ("Deadline", stats.deadline, Color::LightRed),
        ("Pending Approval", stats.approval_pending, Color::Yellow),
        ("Unread", stats.unread, Color::Cyan),
    ];
    let areas = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(area);
    for ((label, count, color), area) in counters.into_iter().zip(areas.iter()) {
        let line = Line::from(vec![
            Span::styled(
                format!(" {count} "),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(label),
        ]);
        let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, *area);
    }
}

/// Render the sorted, filtered document table with the selection highlighted.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let listing = &state.listing;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(build_title(state));

    if listing.documents.is_empty() {
        let message = if listing.loading {
            "  Loading documents..."
        } else if listing.query.search.is_empty() {
            "  No documents found."
        } else {
            "  No documents match the search."
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let query = &listing.query;
    let header = Row::new(vec![
        Cell::from(column_header("Title", SortKey::Title, query)),
        Cell::from("Department"),
        Cell::from(column_header("Uploaded", SortKey::Date, query)),
        Cell::from("Status"),
    ])
    .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = listing
        .documents
        .iter()
        .map(|doc| {
            Row::new(vec![
                Cell::from(doc.title.clone()),
                Cell::from(doc.department.clone()),
                Cell::from(format_upload_date(doc)),
                Cell::from(doc.status.label()).style(Style::default().fg(status_color(doc.status))),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(17),
        Constraint::Length(17),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol(">> ");

    let mut table_state = TableState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn build_title(state: &ViewState) -> String {
    let listing = &state.listing;
    let query = &listing.query;
    let mut title = format!(
        " Documents ({}/{}) | sort: {} {} ",
        listing.documents.len(),
        listing.total,
        query.sort_key.label(),
        direction_arrow(query.direction),
    );
    if state.search_mode || !query.search.is_empty() {
        let shown = if state.search_mode {
            &state.search_text
        } else {
            &query.search
        };
        let cursor = if state.search_mode { "_" } else { "" };
        title.push_str(&format!("| search: {shown}{cursor} "));
    }
    title
}

pub fn direction_arrow(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "▲",
        SortDirection::Desc => "▼",
    }
}

/// Column label with the sort arrow when the column is the active key.
pub fn column_header(label: &str, key: SortKey, query: &DocumentQuery) -> String {
    if query.sort_key == key {
        format!("{label} {}", direction_arrow(query.direction))
    } else {
        label.to_string()
    }
}

/// `YYYY-MM-DD HH:MM`, or the raw value when it does not parse.
pub fn format_upload_date(doc: &Document) -> String {
    doc.uploaded_at()
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| doc.upload_date.clone())
}

fn status_color(status: DocumentStatus) -> Color {
    match status {
        DocumentStatus::Read | DocumentStatus::Completed => Color::Green,
        DocumentStatus::Deadline => Color::LightRed,
        DocumentStatus::ApprovalPending | DocumentStatus::Processing => Color::Yellow,
        DocumentStatus::Unread => Color::Cyan,
        DocumentStatus::Unknown => Color::Gray,
    }
}
