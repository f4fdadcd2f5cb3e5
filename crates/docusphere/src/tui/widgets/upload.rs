// Upload form: title, department (admins only), and a local file path.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::form_line;
use crate::session::upload_departments;
use crate::tui::{UploadField, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let [form_area, message_area] =
        Layout::vertical([Constraint::Length(9), Constraint::Min(1)]).areas(area);

    let draft = &state.upload;
    let session = state.session.as_ref();
    let department = match session {
        Some(s) if s.is_admin => {
            let label = upload_departments()
                .get(draft.department_idx)
                .copied()
                .unwrap_or_default();
            format!("< {label} >")
        }
        Some(s) => s.department.clone(),
        None => String::new(),
    };

    let lines = vec![
        Line::raw(""),
        form_line("Title", draft.title.clone(), draft.focus == UploadField::Title),
        form_line(
            "Department",
            department,
            draft.focus == UploadField::Department,
        ),
        form_line("File", draft.file_path.clone(), draft.focus == UploadField::File),
        Line::raw(""),
        Line::from(Span::styled(
            "  Local path to the document, e.g. /home/me/invoice.pdf",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let title = if draft.busy {
        " Upload document (uploading...) "
    } else {
        " Upload document "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)));
    frame.render_widget(Paragraph::new(lines).block(block), form_area);

    if let Some(message) = &state.inline_error {
        let paragraph = Paragraph::new(format!("  {message}"))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, message_area);
    }
}
