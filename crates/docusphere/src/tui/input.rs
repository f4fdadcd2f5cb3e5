// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the app
// orchestrator, or into local ViewState mutations (form editing, field
// focus, selection, tab switching).

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{LoginField, Screen, UploadField, ViewState, ViewerTab};
use crate::listing::SortKey;
use crate::protocol::{PollingStatus, UserCommand};
use crate::qna::SUGGESTED_QUESTIONS;
use crate::session::upload_departments;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app orchestrator. Returns `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events (Windows also reports releases).
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    // An alert captures all input until dismissed.
    if view_state.alert.is_some() {
        if matches!(key_event.code, KeyCode::Enter | KeyCode::Esc) {
            view_state.alert = None;
        }
        return None;
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    match view_state.screen {
        Screen::Login => handle_login(key_event, view_state),
        Screen::Dashboard if view_state.search_mode => handle_search_mode(key_event, view_state),
        Screen::Dashboard => handle_dashboard(key_event, view_state),
        Screen::Viewer => handle_viewer(key_event, view_state),
        Screen::Qna => handle_qna(key_event, view_state),
        Screen::Upload => handle_upload(key_event, view_state),
    }
}

/// `y`/`q` confirm, `n`/Esc cancel, everything else is blocked.
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

fn handle_login(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.confirm_quit = true;
            None
        }
        KeyCode::F(2) => Some(UserCommand::ContinueAsGuest),
        // The form is replaced by the configuration error.
        _ if view_state.config_error.is_some() => None,
        KeyCode::Tab | KeyCode::Down => {
            view_state.login.focus = match view_state.login.focus {
                LoginField::UserId => LoginField::Name,
                LoginField::Name => LoginField::Password,
                LoginField::Password => LoginField::UserId,
            };
            None
        }
        KeyCode::BackTab | KeyCode::Up => {
            view_state.login.focus = match view_state.login.focus {
                LoginField::UserId => LoginField::Password,
                LoginField::Name => LoginField::UserId,
                LoginField::Password => LoginField::Name,
            };
            None
        }
        KeyCode::Backspace => {
            focused_login_field(view_state).pop();
            None
        }
        KeyCode::Char(c) => {
            focused_login_field(view_state).push(c);
            None
        }
        KeyCode::Enter => {
            view_state.inline_error = None;
            let form = &view_state.login;
            Some(UserCommand::Login {
                user_id: form.user_id.clone(),
                name: form.name.clone(),
                password: form.password.clone(),
            })
        }
        _ => None,
    }
}

fn focused_login_field(view_state: &mut ViewState) -> &mut String {
    let form = &mut view_state.login;
    match form.focus {
        LoginField::UserId => &mut form.user_id,
        LoginField::Name => &mut form.name,
        LoginField::Password => &mut form.password,
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

fn handle_dashboard(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.selected = view_state.selected.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if view_state.selected + 1 < view_state.listing.documents.len() {
                view_state.selected += 1;
            }
            None
        }
        KeyCode::Char('/') => {
            view_state.search_mode = true;
            None
        }
        KeyCode::Char('d') => Some(UserCommand::RequestSort(SortKey::Date)),
        KeyCode::Char('t') => Some(UserCommand::RequestSort(SortKey::Title)),
        KeyCode::Char('r') => Some(UserCommand::RefreshDocuments),
        KeyCode::Enter => {
            let document = view_state.selected_document().cloned()?;
            view_state.viewer_document = Some(document);
            view_state.viewer_tab = ViewerTab::Summary;
            view_state.screen = Screen::Viewer;
            None
        }
        KeyCode::Char('a') => open_qna(view_state, Screen::Dashboard),
        KeyCode::Char('u') => {
            view_state.inline_error = None;
            view_state.screen = Screen::Upload;
            None
        }
        KeyCode::Char('L') => Some(UserCommand::Logout),
        KeyCode::Esc => {
            view_state.flash = None;
            None
        }
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }
        _ => None,
    }
}

/// Every edit re-sends the search text so the listing filters as you type.
fn handle_search_mode(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.search_mode = false;
            view_state.search_text.clear();
            Some(UserCommand::SetSearch(String::new()))
        }
        KeyCode::Enter => {
            view_state.search_mode = false;
            None
        }
        KeyCode::Backspace => {
            view_state.search_text.pop()?;
            Some(UserCommand::SetSearch(view_state.search_text.clone()))
        }
        KeyCode::Char(c) => {
            view_state.search_text.push(c);
            Some(UserCommand::SetSearch(view_state.search_text.clone()))
        }
        _ => None,
    }
}

fn open_qna(view_state: &mut ViewState, from: Screen) -> Option<UserCommand> {
    let document_id = match from {
        Screen::Viewer => view_state.viewer_document.as_ref()?.id.clone(),
        _ => view_state.selected_document()?.id.clone(),
    };
    view_state.question_input.clear();
    view_state.inline_error = None;
    view_state.qna_return = from;
    view_state.screen = Screen::Qna;
    Some(UserCommand::OpenQna { document_id })
}

// ---------------------------------------------------------------------------
// Viewer
// ---------------------------------------------------------------------------

fn handle_viewer(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Tab | KeyCode::Right => {
            view_state.viewer_tab = next_tab(view_state, true);
            None
        }
        KeyCode::BackTab | KeyCode::Left => {
            view_state.viewer_tab = next_tab(view_state, false);
            None
        }
        KeyCode::Char('a') => open_qna(view_state, Screen::Viewer),
        KeyCode::Esc | KeyCode::Backspace => {
            view_state.screen = Screen::Dashboard;
            view_state.viewer_document = None;
            None
        }
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }
        _ => None,
    }
}

/// Tabs available for the open document. Highlighted only appears when the
/// document has a highlighted rendition.
pub(crate) fn viewer_tabs(view_state: &ViewState) -> Vec<ViewerTab> {
    let mut tabs = vec![ViewerTab::Summary, ViewerTab::Original];
    if view_state
        .viewer_document
        .as_ref()
        .is_some_and(|d| d.has_highlighted_rendition())
    {
        tabs.push(ViewerTab::Highlighted);
    }
    tabs
}

fn next_tab(view_state: &ViewState, forward: bool) -> ViewerTab {
    let tabs = viewer_tabs(view_state);
    let current = tabs
        .iter()
        .position(|t| *t == view_state.viewer_tab)
        .unwrap_or(0);
    let next = if forward {
        (current + 1) % tabs.len()
    } else {
        (current + tabs.len() - 1) % tabs.len()
    };
    tabs[next]
}

// ---------------------------------------------------------------------------
// Q&A
// ---------------------------------------------------------------------------

fn handle_qna(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.inline_error = None;
            Some(UserCommand::CloseQna)
        }
        KeyCode::F(n @ 1..=3) => {
            view_state.question_input = SUGGESTED_QUESTIONS[usize::from(n - 1)].to_string();
            None
        }
        KeyCode::Backspace => {
            view_state.question_input.pop();
            None
        }
        KeyCode::Char(c) => {
            view_state.question_input.push(c);
            None
        }
        KeyCode::Enter => {
            if view_state.question_input.trim().is_empty() {
                return None;
            }
            let awaiting = view_state
                .conversation
                .as_ref()
                .is_some_and(|c| c.polling == PollingStatus::AwaitingAnswer);
            if awaiting {
                view_state.inline_error = Some("Still waiting for the previous answer.".into());
                return None;
            }
            view_state.inline_error = None;
            Some(UserCommand::AskQuestion(std::mem::take(
                &mut view_state.question_input,
            )))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

fn is_admin(view_state: &ViewState) -> bool {
    view_state.session.as_ref().is_some_and(|s| s.is_admin)
}

fn handle_upload(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    if view_state.upload.busy {
        return None;
    }
    let admin = is_admin(view_state);
    let draft = &mut view_state.upload;
    match key_event.code {
        KeyCode::Esc => {
            view_state.inline_error = None;
            view_state.screen = Screen::Dashboard;
            None
        }
        KeyCode::Tab | KeyCode::Down => {
            draft.focus = match draft.focus {
                UploadField::Title if admin => UploadField::Department,
                UploadField::Title | UploadField::Department => UploadField::File,
                UploadField::File => UploadField::Title,
            };
            None
        }
        KeyCode::BackTab | KeyCode::Up => {
            draft.focus = match draft.focus {
                UploadField::Title => UploadField::File,
                UploadField::File if admin => UploadField::Department,
                UploadField::File | UploadField::Department => UploadField::Title,
            };
            None
        }
        KeyCode::Left | KeyCode::Right if draft.focus == UploadField::Department => {
            let count = upload_departments().len();
            draft.department_idx = if key_event.code == KeyCode::Right {
                (draft.department_idx + 1) % count
            } else {
                (draft.department_idx + count - 1) % count
            };
            None
        }
        KeyCode::Backspace => {
            match draft.focus {
                UploadField::Title => draft.title.pop(),
                UploadField::File => draft.file_path.pop(),
                UploadField::Department => None,
            };
            None
        }
        KeyCode::Char(c) => {
            match draft.focus {
                UploadField::Title => draft.title.push(c),
                UploadField::File => draft.file_path.push(c),
                UploadField::Department => {}
            }
            None
        }
        KeyCode::Enter => {
            let department = admin
                .then(|| upload_departments().get(draft.department_idx).copied())
                .flatten()
                .map(str::to_string);
            draft.busy = true;
            let command = UserCommand::Upload {
                title: draft.title.clone(),
                department,
                file_path: PathBuf::from(draft.file_path.trim()),
            };
            view_state.inline_error = None;
            Some(command)
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;
    use crate::protocol::{ConversationSnapshot, ListingSnapshot};
    use crate::session::UserSession;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl_key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn type_text(state: &mut ViewState, text: &str) -> Vec<UserCommand> {
        text.chars()
            .filter_map(|c| handle_key(key(KeyCode::Char(c)), state))
            .collect()
    }

    fn document(id: &str, highlighted: Option<&str>) -> Document {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Doc {id}"),
            "department": "Finance",
            "upload_date": "2025-09-22T10:00:00",
            "highlighted_file_path": highlighted
        }))
        .unwrap()
    }

    fn session(admin: bool) -> UserSession {
        let (user_id, department, slug) = if admin {
            ("ADMIN1", "Admin", "admin")
        } else {
            ("FIN007", "Finance", "finance")
        };
        serde_json::from_value(serde_json::json!({
            "name": "Tester",
            "userId": user_id,
            "department": department,
            "deptSlug": slug,
            "isAdmin": admin
        }))
        .unwrap()
    }

    fn dashboard(n: usize) -> ViewState {
        ViewState {
            screen: Screen::Dashboard,
            session: Some(session(false)),
            listing: ListingSnapshot {
                documents: (0..n).map(|i| document(&i.to_string(), None)).collect(),
                total: n,
                ..ListingSnapshot::default()
            },
            ..ViewState::default()
        }
    }

    // -- Global keys --

    #[test]
    fn release_events_are_ignored() {
        let mut state = dashboard(1);
        let mut event = key(KeyCode::Char('q'));
        event.kind = KeyEventKind::Release;
        assert!(handle_key(event, &mut state).is_none());
        assert!(!state.confirm_quit);
    }

    #[test]
    fn ctrl_c_quits_from_any_screen() {
        for screen in [Screen::Login, Screen::Qna, Screen::Upload] {
            let mut state = ViewState {
                screen,
                ..ViewState::default()
            };
            assert_eq!(
                handle_key(ctrl_key(KeyCode::Char('c')), &mut state),
                Some(UserCommand::Quit)
            );
        }
    }

    #[test]
    fn alert_blocks_input_until_dismissed() {
        let mut state = dashboard(2);
        state.alert = Some("Error: boom".into());
        assert!(handle_key(key(KeyCode::Char('r')), &mut state).is_none());
        assert!(state.alert.is_some());
        assert!(handle_key(key(KeyCode::Enter), &mut state).is_none());
        assert!(state.alert.is_none());
        assert_eq!(
            handle_key(key(KeyCode::Char('r')), &mut state),
            Some(UserCommand::RefreshDocuments)
        );
    }

    #[test]
    fn quit_requires_confirmation() {
        let mut state = dashboard(0);
        assert!(handle_key(key(KeyCode::Char('q')), &mut state).is_none());
        assert!(state.confirm_quit);
        assert!(handle_key(key(KeyCode::Char('r')), &mut state).is_none());
        assert!(handle_key(key(KeyCode::Char('n')), &mut state).is_none());
        assert!(!state.confirm_quit);
        handle_key(key(KeyCode::Char('q')), &mut state);
        assert_eq!(
            handle_key(key(KeyCode::Char('y')), &mut state),
            Some(UserCommand::Quit)
        );
    }

    // -- Login --

    #[test]
    fn login_form_collects_fields_and_submits() {
        let mut state = ViewState::default();
        type_text(&mut state, "FIN007");
        handle_key(key(KeyCode::Tab), &mut state);
        type_text(&mut state, "Ravi");
        handle_key(key(KeyCode::Tab), &mut state);
        type_text(&mut state, "pw");
        handle_key(key(KeyCode::Backspace), &mut state);

        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::Login {
                user_id: "FIN007".into(),
                name: "Ravi".into(),
                password: "p".into(),
            })
        );
    }

    #[test]
    fn login_typing_q_does_not_quit() {
        let mut state = ViewState::default();
        type_text(&mut state, "q");
        assert!(!state.confirm_quit);
        assert_eq!(state.login.user_id, "q");
    }

    #[test]
    fn login_focus_wraps_backwards() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::BackTab), &mut state);
        assert_eq!(state.login.focus, LoginField::Password);
    }

    #[test]
    fn config_error_blocks_login_but_allows_guest() {
        let mut state = ViewState {
            config_error: Some("reCAPTCHA site key is not configured".into()),
            ..ViewState::default()
        };
        type_text(&mut state, "abc");
        assert!(state.login.user_id.is_empty());
        assert!(handle_key(key(KeyCode::Enter), &mut state).is_none());
        assert_eq!(
            handle_key(key(KeyCode::F(2)), &mut state),
            Some(UserCommand::ContinueAsGuest)
        );
    }

    // -- Dashboard --

    #[test]
    fn selection_stays_in_bounds() {
        let mut state = dashboard(2);
        handle_key(key(KeyCode::Up), &mut state);
        assert_eq!(state.selected, 0);
        handle_key(key(KeyCode::Down), &mut state);
        handle_key(key(KeyCode::Char('j')), &mut state);
        assert_eq!(state.selected, 1);
        handle_key(key(KeyCode::Char('k')), &mut state);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn sort_keys_send_commands() {
        let mut state = dashboard(1);
        assert_eq!(
            handle_key(key(KeyCode::Char('t')), &mut state),
            Some(UserCommand::RequestSort(SortKey::Title))
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('d')), &mut state),
            Some(UserCommand::RequestSort(SortKey::Date))
        );
    }

    #[test]
    fn search_mode_sends_text_on_every_edit() {
        let mut state = dashboard(1);
        handle_key(key(KeyCode::Char('/')), &mut state);
        assert!(state.search_mode);

        let commands = type_text(&mut state, "ab");
        assert_eq!(
            commands,
            vec![
                UserCommand::SetSearch("a".into()),
                UserCommand::SetSearch("ab".into()),
            ]
        );
        // 'q' is text while searching.
        type_text(&mut state, "q");
        assert!(!state.confirm_quit);
        assert_eq!(
            handle_key(key(KeyCode::Backspace), &mut state),
            Some(UserCommand::SetSearch("ab".into()))
        );

        assert!(handle_key(key(KeyCode::Enter), &mut state).is_none());
        assert!(!state.search_mode);
        assert_eq!(state.search_text, "ab");
    }

    #[test]
    fn search_escape_clears_filter() {
        let mut state = dashboard(1);
        handle_key(key(KeyCode::Char('/')), &mut state);
        type_text(&mut state, "x");
        assert_eq!(
            handle_key(key(KeyCode::Esc), &mut state),
            Some(UserCommand::SetSearch(String::new()))
        );
        assert!(state.search_text.is_empty());
    }

    #[test]
    fn backspace_on_empty_search_sends_nothing() {
        let mut state = dashboard(1);
        handle_key(key(KeyCode::Char('/')), &mut state);
        assert!(handle_key(key(KeyCode::Backspace), &mut state).is_none());
    }

    #[test]
    fn enter_opens_viewer_on_summary() {
        let mut state = dashboard(2);
        state.viewer_tab = ViewerTab::Original;
        handle_key(key(KeyCode::Down), &mut state);
        assert!(handle_key(key(KeyCode::Enter), &mut state).is_none());
        assert_eq!(state.screen, Screen::Viewer);
        assert_eq!(state.viewer_tab, ViewerTab::Summary);
        assert_eq!(state.viewer_document.as_ref().unwrap().id, "1");
    }

    #[test]
    fn enter_on_empty_listing_does_nothing() {
        let mut state = dashboard(0);
        assert!(handle_key(key(KeyCode::Enter), &mut state).is_none());
        assert_eq!(state.screen, Screen::Dashboard);
    }

    #[test]
    fn ask_key_opens_qna_for_selection() {
        let mut state = dashboard(3);
        state.selected = 2;
        state.question_input = "stale".into();
        assert_eq!(
            handle_key(key(KeyCode::Char('a')), &mut state),
            Some(UserCommand::OpenQna {
                document_id: "2".into()
            })
        );
        assert_eq!(state.screen, Screen::Qna);
        assert_eq!(state.qna_return, Screen::Dashboard);
        assert!(state.question_input.is_empty());
    }

    #[test]
    fn shift_l_logs_out() {
        let mut state = dashboard(0);
        assert_eq!(
            handle_key(key(KeyCode::Char('L')), &mut state),
            Some(UserCommand::Logout)
        );
    }

    // -- Viewer --

    #[test]
    fn viewer_tabs_skip_missing_highlight() {
        let mut state = dashboard(0);
        state.screen = Screen::Viewer;
        state.viewer_document = Some(document("1", None));
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.viewer_tab, ViewerTab::Original);
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.viewer_tab, ViewerTab::Summary);
    }

    #[test]
    fn viewer_tabs_include_highlight_when_present() {
        let mut state = dashboard(0);
        state.screen = Screen::Viewer;
        state.viewer_document = Some(document("1", Some("https://storage.example/h.pdf")));
        handle_key(key(KeyCode::Left), &mut state);
        assert_eq!(state.viewer_tab, ViewerTab::Highlighted);
    }

    #[test]
    fn viewer_escape_returns_to_dashboard() {
        let mut state = dashboard(0);
        state.screen = Screen::Viewer;
        state.viewer_document = Some(document("1", None));
        handle_key(key(KeyCode::Esc), &mut state);
        assert_eq!(state.screen, Screen::Dashboard);
        assert!(state.viewer_document.is_none());
    }

    #[test]
    fn viewer_ask_remembers_return_screen() {
        let mut state = dashboard(0);
        state.screen = Screen::Viewer;
        state.viewer_document = Some(document("9", None));
        assert_eq!(
            handle_key(key(KeyCode::Char('a')), &mut state),
            Some(UserCommand::OpenQna {
                document_id: "9".into()
            })
        );
        assert_eq!(state.qna_return, Screen::Viewer);
    }

    // -- Q&A --

    fn qna_state(polling: PollingStatus) -> ViewState {
        ViewState {
            screen: Screen::Qna,
            conversation: Some(ConversationSnapshot {
                document_id: "1".into(),
                polling,
                ..ConversationSnapshot::default()
            }),
            ..ViewState::default()
        }
    }

    #[test]
    fn question_is_sent_and_input_cleared() {
        let mut state = qna_state(PollingStatus::Idle);
        type_text(&mut state, "Any deadlines?");
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::AskQuestion("Any deadlines?".into()))
        );
        assert!(state.question_input.is_empty());
    }

    #[test]
    fn blank_question_is_not_sent() {
        let mut state = qna_state(PollingStatus::Idle);
        type_text(&mut state, "   ");
        assert!(handle_key(key(KeyCode::Enter), &mut state).is_none());
    }

    #[test]
    fn question_blocked_while_awaiting_answer() {
        let mut state = qna_state(PollingStatus::AwaitingAnswer);
        type_text(&mut state, "second");
        assert!(handle_key(key(KeyCode::Enter), &mut state).is_none());
        assert_eq!(state.question_input, "second");
        assert!(state.inline_error.is_some());
    }

    #[test]
    fn function_keys_fill_suggested_questions() {
        let mut state = qna_state(PollingStatus::Idle);
        handle_key(key(KeyCode::F(2)), &mut state);
        assert_eq!(state.question_input, SUGGESTED_QUESTIONS[1]);
    }

    #[test]
    fn escape_closes_qna() {
        let mut state = qna_state(PollingStatus::AwaitingAnswer);
        assert_eq!(
            handle_key(key(KeyCode::Esc), &mut state),
            Some(UserCommand::CloseQna)
        );
    }

    // -- Upload --

    #[test]
    fn non_admin_upload_skips_department() {
        let mut state = dashboard(0);
        handle_key(key(KeyCode::Char('u')), &mut state);
        assert_eq!(state.screen, Screen::Upload);
        type_text(&mut state, "Budget");
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.upload.focus, UploadField::File);
        type_text(&mut state, " /tmp/budget.pdf ");

        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::Upload {
                title: "Budget".into(),
                department: None,
                file_path: PathBuf::from("/tmp/budget.pdf"),
            })
        );
        assert!(state.upload.busy);
        // Input is ignored while the upload is in flight.
        assert!(handle_key(key(KeyCode::Enter), &mut state).is_none());
    }

    #[test]
    fn admin_upload_picks_department() {
        let mut state = dashboard(0);
        state.session = Some(session(true));
        state.screen = Screen::Upload;
        type_text(&mut state, "Budget");
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.upload.focus, UploadField::Department);
        handle_key(key(KeyCode::Right), &mut state);
        handle_key(key(KeyCode::Tab), &mut state);
        type_text(&mut state, "/tmp/b.pdf");

        let expected = upload_departments()[1].to_string();
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::Upload {
                title: "Budget".into(),
                department: Some(expected),
                file_path: PathBuf::from("/tmp/b.pdf"),
            })
        );
    }

    #[test]
    fn department_cycle_wraps_left() {
        let mut state = dashboard(0);
        state.session = Some(session(true));
        state.screen = Screen::Upload;
        state.upload.focus = UploadField::Department;
        handle_key(key(KeyCode::Left), &mut state);
        assert_eq!(state.upload.department_idx, upload_departments().len() - 1);
    }

    #[test]
    fn upload_escape_returns_to_dashboard() {
        let mut state = dashboard(0);
        state.screen = Screen::Upload;
        handle_key(key(KeyCode::Esc), &mut state);
        assert_eq!(state.screen, Screen::Dashboard);
    }
}
