// Conversation reducer for one document's Q&A thread.
//
// New questions are shown immediately as `Pending` entries with a local id.
// The POST outcome moves them to `Confirmed` or `Failed`; failed entries are
// hidden. A refresh replaces the confirmed history with the backend's list.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::QnaPair;

/// Prefix of client-generated ids for questions the backend has not stored.
pub const LOCAL_ID_PREFIX: &str = "temp-";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QnaError {
    #[error("question is empty")]
    EmptyQuestion,

    #[error("the previous question is still being submitted")]
    AnswerPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Shown optimistically; the POST has not completed.
    Pending,
    /// Stored by the backend (or loaded from it).
    Confirmed,
    /// The POST failed. Hidden from view.
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEntry {
    pub pair: QnaPair,
    pub state: EntryState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversationAction {
    Submitted(QnaPair),
    Confirmed { local_id: String },
    Failed { local_id: String },
    Refreshed(Vec<QnaPair>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    document_id: String,
    entries: Vec<ConversationEntry>,
}

impl Conversation {
    pub fn new(document_id: impl Into<String>) -> Self {
        Conversation {
            document_id: document_id.into(),
            entries: Vec::new(),
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Validate `text` and build the optimistic pair for it. Does not modify
    /// the conversation; apply `ConversationAction::Submitted` for that.
    pub fn begin_question(&self, text: &str, now: DateTime<Utc>) -> Result<QnaPair, QnaError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(QnaError::EmptyQuestion);
        }
        if self.has_pending() {
            return Err(QnaError::AnswerPending);
        }
        Ok(QnaPair {
            id: format!("{LOCAL_ID_PREFIX}{}", now.timestamp_millis()),
            question_text: text.to_string(),
            answer_text: None,
            asked_at: now.to_rfc3339(),
        })
    }

    pub fn apply(&mut self, action: ConversationAction) {
        match action {
            ConversationAction::Submitted(pair) => {
                self.entries.push(ConversationEntry {
                    pair,
                    state: EntryState::Pending,
                });
            }
            ConversationAction::Confirmed { local_id } => {
                self.set_state(&local_id, EntryState::Confirmed);
            }
            ConversationAction::Failed { local_id } => {
                self.set_state(&local_id, EntryState::Failed);
            }
            ConversationAction::Refreshed(pairs) => {
                // Questions still in flight stay visible after the backend's
                // history until their POST resolves.
                let in_flight: Vec<ConversationEntry> = self
                    .entries
                    .drain(..)
                    .filter(|e| e.state == EntryState::Pending)
                    .collect();
                self.entries = pairs
                    .into_iter()
                    .map(|pair| ConversationEntry {
                        pair,
                        state: EntryState::Confirmed,
                    })
                    .chain(in_flight)
                    .collect();
            }
        }
    }

    fn set_state(&mut self, local_id: &str, state: EntryState) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.pair.id == local_id && e.state == EntryState::Pending)
        {
            entry.state = state;
        }
    }

    /// Entries in display order, without failed submissions.
    pub fn visible(&self) -> impl Iterator<Item = &ConversationEntry> {
        self.entries.iter().filter(|e| e.state != EntryState::Failed)
    }

    pub fn visible_entries(&self) -> Vec<ConversationEntry> {
        self.visible().cloned().collect()
    }

    pub fn has_pending(&self) -> bool {
        self.entries.iter().any(|e| e.state == EntryState::Pending)
    }

    /// The most recent visible entry has no answer yet.
    pub fn awaiting_answer(&self) -> bool {
        self.visible().last().is_some_and(|e| !e.pair.is_answered())
    }

    pub fn is_empty(&self) -> bool {
        self.visible().next().is_none()
    }
}
