// Application state and orchestration logic.
//
// The central event loop: receives user commands from the TUI and results
// from spawned network tasks, owns all client state (session, listing, Q&A
// conversation, poll task) and pushes UI updates to the render loop.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::DocumentApi;
use crate::config::Config;
use crate::listing::{self, DashboardStats, DocumentQuery};
use crate::models::{Document, Notification};
use crate::protocol::{
    ApiEvent, ConversationSnapshot, ListingSnapshot, PollingStatus, UiUpdate, UserCommand,
};
use crate::qna::conversation::{Conversation, ConversationAction, QnaError};
use crate::qna::poller::{self, PollOutcome, PollSettings};
use crate::session::{self, SessionError, SessionSource, UserSession};
use crate::store::Store;
use crate::upload::{self, UploadError, UploadForm};

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete client state. Only the app task touches it; spawned tasks
/// report back through `api_tx`.
pub struct AppState {
    pub config: Config,
    pub store: Arc<Store>,
    pub api: Arc<dyn DocumentApi>,
    /// Sender handed to spawned network tasks.
    pub api_tx: mpsc::Sender<ApiEvent>,
    pub session: Option<UserSession>,
    /// Department from `--dept`. Consumed by the first resolution and never
    /// persisted.
    pub dept_override: Option<String>,
    /// Documents in the session's scope, in backend order.
    pub documents: Vec<Document>,
    pub query: DocumentQuery,
    pub listing_loading: bool,
    pub notifications: Vec<Notification>,
    pub conversation: Option<Conversation>,
    pub conversation_title: String,
    pub polling: PollingStatus,
    pub poll_task: Option<JoinHandle<()>>,
    /// Stamps listing and notification fetches. Bumped on every reload and
    /// on logout so late results for an old session are discarded.
    pub listing_generation: u64,
    /// Stamps everything belonging to one open Q&A view (history load,
    /// question submission, poll task).
    pub qna_generation: u64,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<Store>,
        api: Arc<dyn DocumentApi>,
        api_tx: mpsc::Sender<ApiEvent>,
        dept_override: Option<String>,
    ) -> Self {
        AppState {
            config,
            store,
            api,
            api_tx,
            session: None,
            dept_override,
            documents: Vec::new(),
            query: DocumentQuery::default(),
            listing_loading: false,
            notifications: Vec::new(),
            conversation: None,
            conversation_title: String::new(),
            polling: PollingStatus::Idle,
            poll_task: None,
            listing_generation: 0,
            qna_generation: 0,
        }
    }

    /// Abort the poll task if one is running.
    pub fn cancel_polling(&mut self) {
        if let Some(handle) = self.poll_task.take() {
            handle.abort();
            info!("Cancelled answer polling");
        }
        self.polling = PollingStatus::Idle;
    }

    fn listing_snapshot(&self) -> ListingSnapshot {
        ListingSnapshot {
            documents: listing::visible_documents(&self.documents, &self.query),
            total: self.documents.len(),
            query: self.query.clone(),
            stats: DashboardStats::from_documents(&self.documents),
            loading: self.listing_loading,
        }
    }

    fn conversation_snapshot(&self) -> Option<ConversationSnapshot> {
        self.conversation.as_ref().map(|conv| ConversationSnapshot {
            document_id: conv.document_id().to_string(),
            title: self.conversation_title.clone(),
            entries: conv.visible_entries(),
            polling: self.polling,
        })
    }

    /// Resolve the acting session at startup. Without a stored session or a
    /// launch override the login screen is shown.
    async fn start(&mut self, ui_tx: &mpsc::Sender<UiUpdate>) {
        let stored = match session::load_session(&self.store) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to read stored session: {:#}", e);
                None
            }
        };
        let dept_override = self.dept_override.take();

        if stored.is_none() && dept_override.is_none() {
            info!("No stored session, showing login");
            show_login(self, ui_tx).await;
            return;
        }

        let resolved = session::resolve(
            stored,
            dept_override.as_deref(),
            &self.config.session.default_department,
        );
        info!(
            "Resolved session for {} ({:?}, admin: {})",
            resolved.session.department, resolved.source, resolved.session.is_admin
        );
        if resolved.source == SessionSource::Stored && dept_override.is_some() {
            info!("Ignoring --dept override in favour of the stored session");
        }
        enter_dashboard(self, resolved.session, ui_tx).await;
    }

    fn spawn_listing_load(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        self.listing_generation += 1;
        self.listing_loading = true;
        let generation = self.listing_generation;

        let api = Arc::clone(&self.api);
        let tx = self.api_tx.clone();
        let listing_session = session.clone();
        tokio::spawn(async move {
            let event = match listing::load_documents(api.as_ref(), &listing_session).await {
                Ok(documents) => ApiEvent::DocumentsLoaded {
                    generation,
                    documents,
                },
                Err(e) => ApiEvent::ListingFailed {
                    generation,
                    message: e.to_string(),
                },
            };
            let _ = tx.send(event).await;
        });

        let api = Arc::clone(&self.api);
        let tx = self.api_tx.clone();
        tokio::spawn(async move {
            let notifications = match api.list_notifications(&session.department).await {
                Ok(n) => n,
                Err(e) => {
                    warn!("Failed to load notifications for {}: {}", session.department, e);
                    Vec::new()
                }
            };
            let _ = tx
                .send(ApiEvent::NotificationsLoaded {
                    generation,
                    notifications,
                })
                .await;
        });
    }

    fn spawn_conversation_load(&self, document_id: String) {
        let generation = self.qna_generation;
        let api = Arc::clone(&self.api);
        let tx = self.api_tx.clone();
        tokio::spawn(async move {
            match api.list_questions(&document_id).await {
                Ok(pairs) => {
                    let _ = tx
                        .send(ApiEvent::ConversationRefreshed {
                            generation,
                            document_id,
                            pairs,
                        })
                        .await;
                }
                Err(e) => warn!("Failed to load conversation for {}: {}", document_id, e),
            }
        });
    }

    fn start_polling(&mut self, document_id: String) {
        self.cancel_polling();
        self.polling = PollingStatus::AwaitingAnswer;
        self.poll_task = Some(poller::spawn_poller(
            Arc::clone(&self.api),
            document_id,
            PollSettings::from(&self.config.polling),
            self.qna_generation,
            self.api_tx.clone(),
        ));
    }

    /// Documents from the recent-uploads cache the session can see.
    fn recent_uploads_in_scope(&self, session: &UserSession) -> Vec<Document> {
        match upload::load_recent_uploads(&self.store) {
            Ok(docs) => listing::scoped_documents(docs, session),
            Err(e) => {
                warn!("Failed to read upload cache: {:#}", e);
                Vec::new()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the orchestrator until `Quit` arrives or the TUI goes away.
///
/// Listens on two channels using `tokio::select!`:
/// - `api_rx`: results from spawned network tasks and the poller
/// - `cmd_rx`: commands from the TUI
pub async fn run(
    mut api_rx: mpsc::Receiver<ApiEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");
    state.start(&ui_tx).await;

    loop {
        tokio::select! {
            event = api_rx.recv() => {
                match event {
                    Some(event) => handle_api_event(&mut state, event, &ui_tx).await,
                    None => {
                        info!("API event channel closed, shutting down");
                        break;
                    }
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => handle_user_command(&mut state, cmd, &ui_tx).await,
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    state.cancel_polling();
    info!("Application event loop exiting");
    Ok(())
}

async fn show_login(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let _ = ui_tx
        .send(UiUpdate::ShowLogin {
            config_error: state.config.login_blocker(),
        })
        .await;
}

async fn enter_dashboard(
    state: &mut AppState,
    session: UserSession,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    state.session = Some(session.clone());
    state.documents.clear();
    state.notifications.clear();
    let _ = ui_tx.send(UiUpdate::SessionChanged(Some(session))).await;
    state.spawn_listing_load();
    push_listing(state, ui_tx).await;
}

async fn push_listing(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let _ = ui_tx
        .send(UiUpdate::ListingUpdated(Box::new(state.listing_snapshot())))
        .await;
}

async fn push_conversation(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    if let Some(snapshot) = state.conversation_snapshot() {
        let _ = ui_tx
            .send(UiUpdate::ConversationUpdated(Box::new(snapshot)))
            .await;
    }
}

/// Handle a user command from the TUI.
async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::Login {
            user_id,
            name,
            password,
        } => {
            if let Some(blocker) = state.config.login_blocker() {
                warn!("Login attempted while blocked: {}", blocker);
                show_login(state, ui_tx).await;
                return;
            }
            if let Err(e) = session::begin_login(&user_id, &name, &password) {
                report_login_error(&e, ui_tx).await;
                return;
            }
            info!("Logging in as {}", user_id.trim());
            let api = Arc::clone(&state.api);
            let store = Arc::clone(&state.store);
            let tx = state.api_tx.clone();
            tokio::spawn(async move {
                let result =
                    session::login(api.as_ref(), &store, &user_id, &name, &password).await;
                let _ = tx.send(ApiEvent::LoginCompleted { result }).await;
            });
        }
        UserCommand::ContinueAsGuest => {
            let resolved = session::resolve(None, None, &state.config.session.default_department);
            info!("Continuing without login as {}", resolved.session.department);
            enter_dashboard(state, resolved.session, ui_tx).await;
        }
        UserCommand::Logout => {
            match session::clear_session(&state.store) {
                Ok(removed) => info!("Logged out (stored session removed: {})", removed),
                Err(e) => warn!("Failed to clear stored session: {:#}", e),
            }
            state.cancel_polling();
            state.qna_generation += 1;
            state.listing_generation += 1;
            state.conversation = None;
            state.session = None;
            state.documents.clear();
            state.notifications.clear();
            state.listing_loading = false;
            state.query = DocumentQuery::default();
            let _ = ui_tx.send(UiUpdate::SessionChanged(None)).await;
            show_login(state, ui_tx).await;
        }
        UserCommand::RefreshDocuments => {
            if state.session.is_some() {
                state.spawn_listing_load();
                push_listing(state, ui_tx).await;
            }
        }
        UserCommand::SetSearch(term) => {
            state.query.search = term;
            push_listing(state, ui_tx).await;
        }
        UserCommand::RequestSort(key) => {
            state.query.request_sort(key);
            debug!("Sort now {:?} {:?}", state.query.sort_key, state.query.direction);
            push_listing(state, ui_tx).await;
        }
        UserCommand::OpenQna { document_id } => {
            state.cancel_polling();
            state.qna_generation += 1;
            state.conversation_title = state
                .documents
                .iter()
                .find(|d| d.id == document_id)
                .map(|d| d.title.clone())
                .unwrap_or_default();
            state.conversation = Some(Conversation::new(document_id.clone()));
            info!(
                "Opened Q&A for {} (generation {})",
                document_id, state.qna_generation
            );
            state.spawn_conversation_load(document_id);
            push_conversation(state, ui_tx).await;
        }
        UserCommand::CloseQna => {
            state.cancel_polling();
            state.qna_generation += 1;
            state.conversation = None;
            let _ = ui_tx.send(UiUpdate::QnaClosed).await;
        }
        UserCommand::AskQuestion(text) => {
            ask_question(state, &text, ui_tx).await;
        }
        UserCommand::Upload {
            title,
            department,
            file_path,
        } => {
            let form = UploadForm {
                title,
                department,
                file_path,
            };
            let prepared = match upload::prepare_upload(&form, state.session.as_ref()) {
                Ok(p) => p,
                Err(e @ UploadError::Validation) => {
                    let _ = ui_tx.send(UiUpdate::ValidationError(e.to_string())).await;
                    return;
                }
                Err(e) => {
                    let _ = ui_tx.send(UiUpdate::Alert(e.to_string())).await;
                    return;
                }
            };
            info!("Uploading {:?} to {}", prepared.title, prepared.department);
            let api = Arc::clone(&state.api);
            let tx = state.api_tx.clone();
            tokio::spawn(async move {
                let event = match upload::read_upload(prepared).await {
                    Ok(request) => match api.upload_document(request).await {
                        Ok(response) => ApiEvent::UploadCompleted {
                            document: response.document_info,
                            message: response.message,
                        },
                        Err(e) => ApiEvent::UploadFailed {
                            message: e.user_message(),
                        },
                    },
                    Err(e) => ApiEvent::UploadFailed {
                        message: e.to_string(),
                    },
                };
                let _ = tx.send(event).await;
            });
        }
        UserCommand::Quit => {
            // Handled in the run loop.
        }
    }
}

async fn ask_question(state: &mut AppState, text: &str, ui_tx: &mpsc::Sender<UiUpdate>) {
    if state.polling == PollingStatus::AwaitingAnswer {
        let _ = ui_tx
            .send(UiUpdate::ValidationError(
                "Still waiting for the previous answer.".to_string(),
            ))
            .await;
        return;
    }
    let Some(conv) = state.conversation.as_mut() else {
        warn!("Question asked with no Q&A view open");
        return;
    };

    let pair = match conv.begin_question(text, Utc::now()) {
        Ok(pair) => pair,
        Err(QnaError::EmptyQuestion) => {
            debug!("Ignoring empty question");
            return;
        }
        Err(e @ QnaError::AnswerPending) => {
            let _ = ui_tx.send(UiUpdate::ValidationError(e.to_string())).await;
            return;
        }
    };

    let document_id = conv.document_id().to_string();
    let local_id = pair.id.clone();
    let question_text = pair.question_text.clone();
    conv.apply(ConversationAction::Submitted(pair));
    push_conversation(state, ui_tx).await;

    let generation = state.qna_generation;
    let api = Arc::clone(&state.api);
    let tx = state.api_tx.clone();
    tokio::spawn(async move {
        let event = match api.create_question(&document_id, &question_text).await {
            Ok(()) => ApiEvent::QuestionSubmitted {
                generation,
                local_id,
            },
            Err(e) => ApiEvent::QuestionFailed {
                generation,
                local_id,
                message: e.user_message(),
            },
        };
        let _ = tx.send(event).await;
    });
}

/// Form problems stay inline on the login screen; backend and storage
/// failures become alerts.
async fn report_login_error(e: &SessionError, ui_tx: &mpsc::Sender<UiUpdate>) {
    let update = if e.is_validation() {
        UiUpdate::ValidationError(e.to_string())
    } else {
        UiUpdate::Alert(format!("Login failed: {e}"))
    };
    let _ = ui_tx.send(update).await;
}

/// Handle a result from a spawned network task.
async fn handle_api_event(state: &mut AppState, event: ApiEvent, ui_tx: &mpsc::Sender<UiUpdate>) {
    match event {
        ApiEvent::LoginCompleted { result } => match result {
            Ok(session) => {
                info!("Logged in as {} ({})", session.user_id, session.department);
                enter_dashboard(state, session, ui_tx).await;
            }
            Err(e) => {
                warn!("Login failed: {}", e);
                report_login_error(&e, ui_tx).await;
            }
        },
        ApiEvent::DocumentsLoaded {
            generation,
            documents,
        } => {
            if generation != state.listing_generation {
                debug!(
                    "Discarding stale listing (event gen: {}, current gen: {})",
                    generation, state.listing_generation
                );
                return;
            }
            let Some(session) = state.session.clone() else {
                return;
            };
            let recent = state.recent_uploads_in_scope(&session);
            state.documents = listing::merge_listings(documents, recent);
            state.listing_loading = false;
            info!("Listing loaded: {} documents", state.documents.len());
            push_listing(state, ui_tx).await;
        }
        ApiEvent::ListingFailed {
            generation,
            message,
        } => {
            if generation != state.listing_generation {
                return;
            }
            warn!("Failed to load documents: {}", message);
            state.listing_loading = false;
            push_listing(state, ui_tx).await;
        }
        ApiEvent::NotificationsLoaded {
            generation,
            notifications,
        } => {
            if generation != state.listing_generation {
                return;
            }
            state.notifications = notifications;
            let _ = ui_tx
                .send(UiUpdate::NotificationsUpdated(state.notifications.clone()))
                .await;
        }
        ApiEvent::ConversationRefreshed {
            generation,
            document_id,
            pairs,
        } => {
            if generation != state.qna_generation {
                debug!(
                    "Discarding stale conversation (event gen: {}, current gen: {})",
                    generation, state.qna_generation
                );
                return;
            }
            let Some(conv) = state.conversation.as_mut() else {
                return;
            };
            if conv.document_id() != document_id {
                return;
            }
            conv.apply(ConversationAction::Refreshed(pairs));
            push_conversation(state, ui_tx).await;
        }
        ApiEvent::QuestionSubmitted {
            generation,
            local_id,
        } => {
            if generation != state.qna_generation {
                return;
            }
            let Some(conv) = state.conversation.as_mut() else {
                return;
            };
            conv.apply(ConversationAction::Confirmed { local_id });
            let document_id = conv.document_id().to_string();
            state.start_polling(document_id);
            push_conversation(state, ui_tx).await;
        }
        ApiEvent::QuestionFailed {
            generation,
            local_id,
            message,
        } => {
            if generation != state.qna_generation {
                return;
            }
            warn!("Question submission failed: {}", message);
            if let Some(conv) = state.conversation.as_mut() {
                conv.apply(ConversationAction::Failed { local_id });
            }
            push_conversation(state, ui_tx).await;
            let _ = ui_tx.send(UiUpdate::Alert(format!("Error: {message}"))).await;
        }
        ApiEvent::PollingStopped {
            generation,
            outcome,
        } => {
            if generation != state.qna_generation {
                return;
            }
            if outcome == PollOutcome::CeilingReached {
                info!("No answer within {}s, polling stopped", state.config.polling.ceiling_secs);
            }
            state.poll_task = None;
            state.polling = PollingStatus::Idle;
            push_conversation(state, ui_tx).await;
        }
        ApiEvent::UploadCompleted { document, message } => {
            info!("Upload completed: {} ({})", document.title, document.id);
            if let Err(e) = upload::record_upload(&state.store, &document) {
                warn!("Failed to cache upload: {:#}", e);
            }
            if state
                .session
                .as_ref()
                .is_some_and(|s| listing::in_scope(&document, s))
            {
                state.documents.retain(|d| d.id != document.id);
                state.documents.insert(0, document);
                push_listing(state, ui_tx).await;
            }
            let message = if message.is_empty() {
                "Document uploaded.".to_string()
            } else {
                message
            };
            let _ = ui_tx.send(UiUpdate::UploadCompleted(message)).await;
        }
        ApiEvent::UploadFailed { message } => {
            warn!("Upload failed: {}", message);
            let _ = ui_tx.send(UiUpdate::Alert(format!("Error: {message}"))).await;
        }
    }
}
