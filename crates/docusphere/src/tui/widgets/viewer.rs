// Document viewer: Summary & Details, Original, and (when present)
// Highlighted tabs.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use super::documents::format_upload_date;
use crate::models::Document;
use crate::tui::input::viewer_tabs;
use crate::tui::{ViewState, ViewerTab};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(doc) = &state.viewer_document else {
        let paragraph = Paragraph::new("  No document selected.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, area);
        return;
    };

    let [tabs_area, content_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(3)]).areas(area);

    let tabs = viewer_tabs(state);
    let selected = tabs.iter().position(|t| *t == state.viewer_tab).unwrap_or(0);
    let tab_bar = Tabs::new(tabs.iter().map(|t| t.label()))
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", doc.title)),
        );
    frame.render_widget(tab_bar, tabs_area);

    let lines = match tabs.get(selected).copied().unwrap_or_default() {
        ViewerTab::Summary => summary_lines(doc),
        ViewerTab::Original => location_lines("Original file", &doc.file_path),
        ViewerTab::Highlighted => location_lines(
            "Highlighted rendition",
            doc.highlighted_file_path.as_deref().unwrap_or_default(),
        ),
    };
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, content_area);
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

/// Summary, metadata, deadlines and financial terms.
pub fn summary_lines(doc: &Document) -> Vec<Line<'static>> {
    let summary = doc
        .summary
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("No summary available.");

    let mut lines = vec![
        Line::raw(format!(
            "Department: {}    Uploaded: {}    Status: {}",
            doc.department,
            format_upload_date(doc),
            doc.status.label()
        )),
        Line::raw(""),
        heading("Summary"),
        Line::raw(summary.to_string()),
        Line::raw(""),
        heading("Deadlines"),
    ];
    lines.extend(bullets(doc.deadlines(), "No deadlines found."));
    lines.push(Line::raw(""));
    lines.push(heading("Financial terms"));
    lines.extend(bullets(doc.financial_terms(), "No financial terms found."));
    lines
}

fn bullets(items: &[String], empty: &str) -> Vec<Line<'static>> {
    if items.is_empty() {
        return vec![Line::from(Span::styled(
            empty.to_string(),
            Style::default().fg(Color::DarkGray),
        ))];
    }
    items.iter().map(|item| Line::raw(format!("  - {item}"))).collect()
}

fn location_lines(label: &str, location: &str) -> Vec<Line<'static>> {
    let location = if location.trim().is_empty() {
        "(not available)"
    } else {
        location
    };
    vec![
        heading(label),
        Line::raw(location.to_string()),
        Line::raw(""),
        Line::from(Span::styled(
            "Open the location above in a browser or PDF viewer.",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}
