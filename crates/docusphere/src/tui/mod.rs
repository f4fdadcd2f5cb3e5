// TUI dashboard: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors what the app orchestrator pushes
// over the `UiUpdate` channel, plus purely local state (form text, focus,
// selection). It re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::models::{Document, Notification};
use crate::protocol::{ConversationSnapshot, ListingSnapshot, UiUpdate, UserCommand};
use crate::session::UserSession;

use layout::build_layout;

// ---------------------------------------------------------------------------
// Screens and forms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Login,
    Dashboard,
    Viewer,
    Qna,
    Upload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerTab {
    #[default]
    Summary,
    Original,
    Highlighted,
}

impl ViewerTab {
    pub fn label(&self) -> &'static str {
        match self {
            ViewerTab::Summary => "Summary & Details",
            ViewerTab::Original => "Original",
            ViewerTab::Highlighted => "Highlighted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    UserId,
    Name,
    Password,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    pub user_id: String,
    pub name: String,
    pub password: String,
    pub focus: LoginField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadField {
    #[default]
    Title,
    Department,
    File,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadDraft {
    pub title: String,
    /// Index into `session::upload_departments()`. Only used by admins.
    pub department_idx: usize,
    pub file_path: String,
    pub focus: UploadField,
    /// An upload is in flight.
    pub busy: bool,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub screen: Screen,
    /// Replaces the login form when login is unavailable.
    pub config_error: Option<String>,
    pub session: Option<UserSession>,
    pub login: LoginForm,
    pub listing: ListingSnapshot,
    pub notifications: Vec<Notification>,
    /// Row index into `listing.documents`.
    pub selected: usize,
    pub search_mode: bool,
    pub search_text: String,
    pub viewer_tab: ViewerTab,
    pub viewer_document: Option<Document>,
    pub conversation: Option<ConversationSnapshot>,
    pub question_input: String,
    /// Screen to return to when the Q&A view closes.
    pub qna_return: Screen,
    pub upload: UploadDraft,
    /// Inline message under the active form.
    pub inline_error: Option<String>,
    /// Blocking alert; input is captured until dismissed.
    pub alert: Option<String>,
    /// Transient confirmation shown in the help bar.
    pub flash: Option<String>,
    pub confirm_quit: bool,
}

impl ViewState {
    pub fn selected_document(&self) -> Option<&Document> {
        self.listing.documents.get(self.selected)
    }

    fn clamp_selection(&mut self) {
        let len = self.listing.documents.len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::ShowLogin { config_error } => {
            state.screen = Screen::Login;
            state.config_error = config_error;
            state.login.password.clear();
        }
        UiUpdate::SessionChanged(session) => {
            state.inline_error = None;
            match session {
                Some(session) => {
                    state.session = Some(session);
                    state.screen = Screen::Dashboard;
                    state.login = LoginForm::default();
                    state.selected = 0;
                }
                None => {
                    *state = ViewState {
                        login: std::mem::take(&mut state.login),
                        ..ViewState::default()
                    };
                }
            }
        }
        UiUpdate::ListingUpdated(snapshot) => {
            state.listing = *snapshot;
            state.clamp_selection();
        }
        UiUpdate::NotificationsUpdated(notifications) => {
            state.notifications = notifications;
        }
        UiUpdate::ConversationUpdated(snapshot) => {
            state.conversation = Some(*snapshot);
        }
        UiUpdate::QnaClosed => {
            state.conversation = None;
            if state.screen == Screen::Qna {
                state.screen = state.qna_return;
            }
        }
        UiUpdate::ValidationError(message) => {
            state.inline_error = Some(message);
            state.upload.busy = false;
        }
        UiUpdate::Alert(message) => {
            state.alert = Some(message);
            state.upload.busy = false;
        }
        UiUpdate::UploadCompleted(message) => {
            state.flash = Some(message);
            state.upload = UploadDraft::default();
            state.inline_error = None;
            if state.screen == Screen::Upload {
                state.screen = Screen::Dashboard;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete frame for the active screen.
fn render_frame(frame: &mut Frame, state: &ViewState) {
    let area = frame.area();
    let layout = build_layout(area);

    widgets::status_bar::render(frame, layout.status_bar, state);
    match state.screen {
        Screen::Login => widgets::login::render(frame, layout.body, state),
        Screen::Dashboard => {
            widgets::documents::render_stats(frame, layout.stats, state);
            widgets::documents::render(frame, layout.documents, state);
            widgets::notifications::render(frame, layout.sidebar, state);
        }
        Screen::Viewer => widgets::viewer::render(frame, layout.body, state),
        Screen::Qna => widgets::qna::render(frame, layout.body, state),
        Screen::Upload => widgets::upload::render(frame, layout.body, state),
    }
    widgets::help_bar::render(frame, layout.help_bar, state);

    if let Some(message) = &state.alert {
        widgets::dialog::render_alert(frame, area, message);
    } else if state.confirm_quit {
        widgets::dialog::render_quit_confirm(frame, area);
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook that restores the terminal.
/// 3. Selects over UI updates, keyboard input and render ticks.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    // 1. Initialize terminal
    let mut terminal = ratatui::init();

    // 2. Restore the terminal before the default panic output.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    // 3. Render interval (~30fps)
    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // App is shutting down.
                    None => break Ok(()),
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break Ok(());
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(anyhow::Error::from(e).context("terminal input error")),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(anyhow::Error::from(e).context("failed to draw frame"));
                }
            }
        }
    };

    // 4. Restore terminal
    ratatui::restore();

    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
