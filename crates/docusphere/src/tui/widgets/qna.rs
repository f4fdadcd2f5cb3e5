// Q&A view: conversation history, suggested questions, and the input line.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::protocol::{ConversationSnapshot, PollingStatus};
use crate::qna::conversation::{ConversationEntry, EntryState};
use crate::qna::SUGGESTED_QUESTIONS;
use crate::tui::ViewState;

const THINKING: &str = "Thinking...";

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let [history_area, suggestions_area, input_area] = Layout::vertical([
        Constraint::Min(5),
        Constraint::Length(SUGGESTED_QUESTIONS.len() as u16 + 2),
        Constraint::Length(3),
    ])
    .areas(area);

    render_history(frame, history_area, state.conversation.as_ref());
    render_suggestions(frame, suggestions_area);
    render_input(frame, input_area, state);
}

fn render_history(frame: &mut Frame, area: Rect, conversation: Option<&ConversationSnapshot>) {
    let title = match conversation {
        Some(c) if !c.title.is_empty() => format!(" Ask about: {} ", c.title),
        _ => " Ask about this document ".to_string(),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let lines = match conversation {
        None => vec![Line::from(Span::styled(
            "  Loading conversation...",
            Style::default().fg(Color::DarkGray),
        ))],
        Some(c) if c.entries.is_empty() => vec![Line::from(Span::styled(
            "  No questions yet. Ask one below.",
            Style::default().fg(Color::DarkGray),
        ))],
        Some(c) => history_lines(c),
    };

    // Keep the newest exchange in view.
    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(inner_height) as u16;
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

/// One question line and one answer line per entry. Unanswered questions
/// show a thinking indicator while the view is polling.
pub fn history_lines(conversation: &ConversationSnapshot) -> Vec<Line<'static>> {
    let polling = conversation.polling == PollingStatus::AwaitingAnswer;
    let mut lines = Vec::new();
    for entry in &conversation.entries {
        lines.push(question_line(entry));
        lines.push(answer_line(entry, polling));
        lines.push(Line::raw(""));
    }
    lines
}

fn question_line(entry: &ConversationEntry) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            "Q: ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(entry.pair.question_text.clone()),
    ];
    if entry.state == EntryState::Pending {
        spans.push(Span::styled(
            " (sending)",
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn answer_line(entry: &ConversationEntry, polling: bool) -> Line<'static> {
    let label = Span::styled(
        "A: ",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    );
    let body = match &entry.pair.answer_text {
        Some(answer) => Span::raw(answer.clone()),
        None if polling || entry.state == EntryState::Pending => Span::styled(
            THINKING,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ),
        None => Span::styled(
            "No answer yet.",
            Style::default().fg(Color::DarkGray),
        ),
    };
    Line::from(vec![label, body])
}

fn render_suggestions(frame: &mut Frame, area: Rect) {
    let lines: Vec<Line> = SUGGESTED_QUESTIONS
        .iter()
        .enumerate()
        .map(|(i, question)| {
            Line::from(vec![
                Span::styled(
                    format!(" F{} ", i + 1),
                    Style::default().fg(Color::Black).bg(Color::Gray),
                ),
                Span::raw(format!(" {question}")),
            ])
        })
        .collect();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Suggested questions ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_input(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (title, border) = match &state.inline_error {
        Some(message) => (format!(" {message} "), Color::Red),
        None => (" Your question ".to_string(), Color::Cyan),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title);
    let line = Line::from(vec![
        Span::raw(state.question_input.as_str()),
        Span::styled("_", Style::default().fg(Color::Cyan)),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);
}
