// Message types exchanged between the TUI, the app orchestrator and spawned
// network tasks.

use std::path::PathBuf;

use crate::listing::{DashboardStats, DocumentQuery, SortKey};
use crate::models::{Document, Notification, QnaPair};
use crate::qna::conversation::ConversationEntry;
use crate::qna::poller::PollOutcome;
use crate::session::{SessionError, UserSession};

// ---------------------------------------------------------------------------
// TUI -> app
// ---------------------------------------------------------------------------

/// Commands the TUI sends to the app orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    Login {
        user_id: String,
        name: String,
        password: String,
    },
    /// Browse as the configured default department without logging in.
    ContinueAsGuest,
    Logout,
    RefreshDocuments,
    SetSearch(String),
    RequestSort(SortKey),
    OpenQna {
        document_id: String,
    },
    CloseQna,
    AskQuestion(String),
    Upload {
        title: String,
        department: Option<String>,
        file_path: PathBuf,
    },
    Quit,
}

// ---------------------------------------------------------------------------
// network tasks -> app
// ---------------------------------------------------------------------------

/// Results of spawned network work. Events tagged with a generation are
/// discarded when the generation no longer matches the app's counter.
#[derive(Debug)]
pub enum ApiEvent {
    LoginCompleted {
        result: Result<UserSession, SessionError>,
    },
    DocumentsLoaded {
        generation: u64,
        documents: Vec<Document>,
    },
    ListingFailed {
        generation: u64,
        message: String,
    },
    NotificationsLoaded {
        generation: u64,
        notifications: Vec<Notification>,
    },
    ConversationRefreshed {
        generation: u64,
        document_id: String,
        pairs: Vec<QnaPair>,
    },
    QuestionSubmitted {
        generation: u64,
        local_id: String,
    },
    QuestionFailed {
        generation: u64,
        local_id: String,
        message: String,
    },
    PollingStopped {
        generation: u64,
        outcome: PollOutcome,
    },
    UploadCompleted {
        document: Document,
        message: String,
    },
    UploadFailed {
        message: String,
    },
}

// ---------------------------------------------------------------------------
// app -> TUI
// ---------------------------------------------------------------------------

/// Whether the Q&A view is waiting on a backend answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollingStatus {
    #[default]
    Idle,
    AwaitingAnswer,
}

/// Everything the dashboard listing needs to render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingSnapshot {
    /// Sorted and filtered documents, in display order.
    pub documents: Vec<Document>,
    /// Documents in scope before the title filter.
    pub total: usize,
    pub query: DocumentQuery,
    pub stats: DashboardStats,
    pub loading: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationSnapshot {
    pub document_id: String,
    pub title: String,
    pub entries: Vec<ConversationEntry>,
    pub polling: PollingStatus,
}

/// Updates the app pushes to the TUI render loop.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    /// Show the login screen, optionally replaced by a configuration error.
    ShowLogin { config_error: Option<String> },
    SessionChanged(Option<UserSession>),
    ListingUpdated(Box<ListingSnapshot>),
    NotificationsUpdated(Vec<Notification>),
    ConversationUpdated(Box<ConversationSnapshot>),
    QnaClosed,
    /// Inline form error; nothing was sent.
    ValidationError(String),
    /// Blocking alert the user must dismiss.
    Alert(String),
    UploadCompleted(String),
}
