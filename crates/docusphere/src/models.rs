// Wire types for the document backend: documents, Q&A pairs, notifications.
//
// The backend owns all of these; the client only deserializes them and keeps
// a read-only copy for the current load.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Processing/read status reported by the backend.
///
/// The upload pipeline reports `processing` and `completed`; the dashboard
/// feed additionally uses the read-state values. Anything else maps to
/// `Unknown` rather than failing the whole listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Processing,
    Completed,
    Read,
    Unread,
    Deadline,
    ApprovalPending,
    #[default]
    #[serde(other)]
    Unknown,
}

impl DocumentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentStatus::Processing => "Processing",
            DocumentStatus::Completed => "Completed",
            DocumentStatus::Read => "Read",
            DocumentStatus::Unread => "Unread",
            DocumentStatus::Deadline => "Deadline",
            DocumentStatus::ApprovalPending => "Pending Approval",
            DocumentStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub department: String,
    pub upload_date: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub deadlines: Option<Vec<String>>,
    #[serde(default)]
    pub financial_terms: Option<Vec<String>>,
    #[serde(default)]
    pub highlighted_file_path: Option<String>,
    #[serde(default)]
    pub uploader_id: Option<String>,
}

impl Document {
    /// Parse `upload_date` into a timestamp for ordering.
    ///
    /// Accepts RFC 3339, naive ISO-8601 datetimes (the backend serializes
    /// naive UTC datetimes without an offset) and bare dates.
    pub fn uploaded_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.upload_date)
    }

    /// Deadlines, or an empty slice when the analysis has not produced any.
    pub fn deadlines(&self) -> &[String] {
        self.deadlines.as_deref().unwrap_or(&[])
    }

    pub fn financial_terms(&self) -> &[String] {
        self.financial_terms.as_deref().unwrap_or(&[])
    }

    pub fn has_highlighted_rendition(&self) -> bool {
        self.highlighted_file_path
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    }
}

/// Parse the timestamp formats the backend is known to emit.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// ---------------------------------------------------------------------------
// Q&A
// ---------------------------------------------------------------------------

/// One question/answer exchange. `answer_text == None` means the backend has
/// not produced an answer yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QnaPair {
    pub id: String,
    pub question_text: String,
    #[serde(default)]
    pub answer_text: Option<String>,
    pub asked_at: String,
}

impl QnaPair {
    pub fn is_answered(&self) -> bool {
        self.answer_text.is_some()
    }
}

/// Body of `POST /documents/{id}/questions`.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionCreate<'a> {
    pub question_text: &'a str,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(default)]
    pub document_id: Option<String>,
    pub department: String,
    pub message: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_read: bool,
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// Response of `POST /documents/upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: String,
    pub document_info: Document,
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_deserializes_full_backend_shape() {
        let json = r#"{
            "id": "8f7d1c2e-0000-4000-8000-000000000001",
            "title": "Q3 Vendor Invoice Batch",
            "department": "Finance",
            "upload_date": "2025-09-22T10:15:30.123456",
            "file_path": "https://storage.example/invoice.pdf",
            "uploader_id": "FIN001",
            "status": "completed",
            "summary": "Invoices for Q3.",
            "deadlines": ["Pay by October 15, 2025"],
            "financial_terms": ["INR 4,50,000"],
            "highlighted_file_path": "https://storage.example/invoice-hl.pdf"
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.status, DocumentStatus::Completed);
        assert_eq!(doc.deadlines(), ["Pay by October 15, 2025"]);
        assert_eq!(doc.financial_terms().len(), 1);
        assert!(doc.has_highlighted_rendition());
        assert_eq!(doc.uploader_id.as_deref(), Some("FIN001"));
    }

    #[test]
    fn document_deserializes_minimal_shape() {
        let json = r#"{
            "id": "1",
            "title": "Weekly Incident Report",
            "department": "all",
            "upload_date": "2025-09-22"
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.status, DocumentStatus::Unknown);
        assert!(doc.summary.is_none());
        assert!(doc.deadlines().is_empty());
        assert!(!doc.has_highlighted_rendition());
    }

    #[test]
    fn unrecognised_status_maps_to_unknown() {
        let json = r#"{
            "id": "1", "title": "t", "department": "HR",
            "upload_date": "2025-09-22", "status": "archived"
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.status, DocumentStatus::Unknown);
    }

    #[test]
    fn approval_pending_status_is_snake_case() {
        let status: DocumentStatus = serde_json::from_str("\"approval_pending\"").unwrap();
        assert_eq!(status, DocumentStatus::ApprovalPending);
        assert_eq!(status.label(), "Pending Approval");
    }

    #[test]
    fn parse_timestamp_formats() {
        let date_only = parse_timestamp("2025-09-22").unwrap();
        assert_eq!(date_only.to_string(), "2025-09-22 00:00:00");

        let naive = parse_timestamp("2025-09-22T10:15:30.5").unwrap();
        assert_eq!(naive.to_string(), "2025-09-22 10:15:30.500");

        let rfc = parse_timestamp("2025-09-22T10:15:30+02:00").unwrap();
        assert_eq!(rfc.to_string(), "2025-09-22 08:15:30");

        assert!(parse_timestamp("next tuesday").is_none());
    }

    #[test]
    fn blank_highlighted_path_is_not_a_rendition() {
        let json = r#"{
            "id": "1", "title": "t", "department": "HR",
            "upload_date": "2025-09-22", "highlighted_file_path": "  "
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert!(!doc.has_highlighted_rendition());
    }

    #[test]
    fn qna_pair_null_answer_is_pending() {
        let json = r#"{
            "id": "q1",
            "question_text": "Any deadlines?",
            "answer_text": null,
            "asked_at": "2025-09-22T10:00:00"
        }"#;
        let pair: QnaPair = serde_json::from_str(json).unwrap();
        assert!(!pair.is_answered());
    }

    #[test]
    fn question_create_body_shape() {
        let body = serde_json::to_value(QuestionCreate {
            question_text: "What is the summary?",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "question_text": "What is the summary?" }));
    }
}
