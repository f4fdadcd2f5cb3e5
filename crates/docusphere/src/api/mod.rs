// Backend API surface.
//
// `DocumentApi` is the seam between orchestration code and the network; the
// production implementation lives in `client`, tests substitute fakes.

pub mod client;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Document, Notification, QnaPair, UploadResponse};

pub use client::HttpDocumentApi;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response. `detail` is the backend's `detail` field when the
    /// body carried one, otherwise the status reason.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("invalid API base URL {url:?}: {message}")]
    InvalidBaseUrl { url: String, message: String },
}

impl ApiError {
    /// Message suitable for an alert.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

/// Multipart payload for `POST /documents/upload`.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub title: String,
    pub department: String,
    pub user_id: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// `GET /documents/`
    async fn list_all_documents(&self) -> Result<Vec<Document>, ApiError>;

    /// `GET /documents/{department}`
    async fn list_department_documents(&self, department: &str)
        -> Result<Vec<Document>, ApiError>;

    /// `POST /documents/upload`
    async fn upload_document(&self, request: UploadRequest) -> Result<UploadResponse, ApiError>;

    /// `GET /documents/{id}/questions`, oldest first.
    async fn list_questions(&self, document_id: &str) -> Result<Vec<QnaPair>, ApiError>;

    /// `POST /documents/{id}/questions`. The response body is not used; the
    /// conversation is re-fetched to observe the stored question.
    async fn create_question(&self, document_id: &str, question_text: &str)
        -> Result<(), ApiError>;

    /// `GET /notifications/{department}`
    async fn list_notifications(&self, department: &str) -> Result<Vec<Notification>, ApiError>;
}
