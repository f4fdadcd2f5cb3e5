// Document listing: department scope, sorting, title search, dashboard stats.
//
// Everything except `load_documents` is pure and synchronous; the app
// recomputes the visible list whenever the source documents, sort or search
// text change.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::{debug, warn};

use crate::api::{ApiError, DocumentApi};
use crate::models::{Document, DocumentStatus};
use crate::session::UserSession;

/// Department tag for documents shared with every department.
pub const ALL_DEPARTMENTS: &str = "all";

// ---------------------------------------------------------------------------
// Sort configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    Title,
}

impl SortKey {
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Date => "Date",
            SortKey::Title => "Title",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentQuery {
    pub sort_key: SortKey,
    pub direction: SortDirection,
    pub search: String,
}

impl Default for DocumentQuery {
    /// Newest first, no search.
    fn default() -> Self {
        DocumentQuery {
            sort_key: SortKey::Date,
            direction: SortDirection::Desc,
            search: String::new(),
        }
    }
}

impl DocumentQuery {
    /// Selecting the key that is already sorted ascending flips to
    /// descending; anything else sorts ascending by `key`.
    pub fn request_sort(&mut self, key: SortKey) {
        self.direction = if self.sort_key == key && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.sort_key = key;
    }
}

// ---------------------------------------------------------------------------
// Sorting and filtering
// ---------------------------------------------------------------------------

/// Ascending comparison for `key`. Titles compare case-insensitively with the
/// raw title as tie-break; dates compare parsed timestamps (unparseable ones
/// first) with the raw string as tie-break.
fn compare(a: &Document, b: &Document, key: SortKey) -> Ordering {
    match key {
        SortKey::Title => a
            .title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.title.cmp(&b.title)),
        SortKey::Date => a
            .uploaded_at()
            .cmp(&b.uploaded_at())
            .then_with(|| a.upload_date.cmp(&b.upload_date)),
    }
}

/// Stable sort; documents with equal keys keep their input order.
pub fn sort_documents(docs: &[Document], key: SortKey, direction: SortDirection) -> Vec<Document> {
    let mut sorted = docs.to_vec();
    match direction {
        SortDirection::Asc => sorted.sort_by(|a, b| compare(a, b, key)),
        SortDirection::Desc => sorted.sort_by(|a, b| compare(b, a, key)),
    }
    sorted
}

/// Keep documents whose title contains `term`, ignoring case. A blank term
/// keeps everything.
pub fn filter_by_title(docs: Vec<Document>, term: &str) -> Vec<Document> {
    let term = term.trim();
    if term.is_empty() {
        return docs;
    }
    let needle = term.to_lowercase();
    docs.into_iter()
        .filter(|d| d.title.to_lowercase().contains(&needle))
        .collect()
}

pub fn visible_documents(docs: &[Document], query: &DocumentQuery) -> Vec<Document> {
    filter_by_title(
        sort_documents(docs, query.sort_key, query.direction),
        &query.search,
    )
}

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

pub fn in_scope(doc: &Document, session: &UserSession) -> bool {
    session.can_see(&doc.department)
}

pub fn scoped_documents(docs: Vec<Document>, session: &UserSession) -> Vec<Document> {
    docs.into_iter().filter(|d| in_scope(d, session)).collect()
}

/// Append `extra` to `primary`, skipping ids already present.
pub fn merge_listings(primary: Vec<Document>, extra: Vec<Document>) -> Vec<Document> {
    let mut seen: HashSet<String> = primary.iter().map(|d| d.id.clone()).collect();
    let mut merged = primary;
    for doc in extra {
        if seen.insert(doc.id.clone()) {
            merged.push(doc);
        }
    }
    merged
}

/// Fetch the documents `session` may see.
///
/// Admins get the global listing. Everyone else gets their department's
/// listing plus the shared `all` listing; a failure of the shared listing
/// is logged and the department listing is used alone.
pub async fn load_documents(
    api: &dyn DocumentApi,
    session: &UserSession,
) -> Result<Vec<Document>, ApiError> {
    if session.is_admin {
        return api.list_all_documents().await;
    }

    let own = api.list_department_documents(&session.department).await?;
    if session.department.eq_ignore_ascii_case(ALL_DEPARTMENTS) {
        return Ok(scoped_documents(own, session));
    }

    let shared = match api.list_department_documents(ALL_DEPARTMENTS).await {
        Ok(docs) => docs,
        Err(e) => {
            warn!("Failed to load shared documents: {}", e);
            Vec::new()
        }
    };
    debug!(
        "Loaded {} department and {} shared documents",
        own.len(),
        shared.len()
    );
    Ok(scoped_documents(merge_listings(own, shared), session))
}

// ---------------------------------------------------------------------------
// Dashboard stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub read: usize,
    pub deadline: usize,
    pub approval_pending: usize,
    pub unread: usize,
}

impl DashboardStats {
    pub fn from_documents(docs: &[Document]) -> Self {
        let mut stats = DashboardStats::default();
        for doc in docs {
            match doc.status {
                DocumentStatus::Read => stats.read += 1,
                DocumentStatus::Deadline => stats.deadline += 1,
                DocumentStatus::ApprovalPending => stats.approval_pending += 1,
                DocumentStatus::Unread => stats.unread += 1,
                _ => {}
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::resolve;

    fn doc(id: &str, title: &str, date: &str, department: &str) -> Document {
        Document {
            id: id.into(),
            title: title.into(),
            department: department.into(),
            upload_date: date.into(),
            file_path: String::new(),
            status: DocumentStatus::Unknown,
            summary: None,
            deadlines: None,
            financial_terms: None,
            highlighted_file_path: None,
            uploader_id: None,
        }
    }

    fn ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    fn sample() -> Vec<Document> {
        vec![
            doc("1", "Q3 Vendor Invoice Batch", "2025-09-22", "Finance"),
            doc("2", "New Safety Circular (SC-113)", "2025-09-21", "Operations"),
            doc("3", "Corridor Expansion Study", "2025-09-20", "Engineering"),
            doc("8", "Architectural Drawings - New Depot", "2025-08-30", "Engineering"),
        ]
    }

    #[test]
    fn default_query_is_date_descending() {
        let q = DocumentQuery::default();
        assert_eq!(q.sort_key, SortKey::Date);
        assert_eq!(q.direction, SortDirection::Desc);
        assert_eq!(ids(&visible_documents(&sample(), &q)), ["1", "2", "3", "8"]);
    }

    #[test]
    fn request_sort_transitions() {
        let mut q = DocumentQuery::default();
        // Date/Desc -> Date/Asc (same key, but not ascending).
        q.request_sort(SortKey::Date);
        assert_eq!(q.direction, SortDirection::Asc);
        q.request_sort(SortKey::Date);
        assert_eq!(q.direction, SortDirection::Desc);
        q.request_sort(SortKey::Title);
        assert_eq!((q.sort_key, q.direction), (SortKey::Title, SortDirection::Asc));
    }

    #[test]
    fn title_sort_ignores_case() {
        let docs = vec![
            doc("a", "beta", "2025-01-01", "HR"),
            doc("b", "Alpha", "2025-01-01", "HR"),
            doc("c", "Gamma", "2025-01-01", "HR"),
        ];
        let sorted = sort_documents(&docs, SortKey::Title, SortDirection::Asc);
        assert_eq!(ids(&sorted), ["b", "a", "c"]);
    }

    #[test]
    fn date_sort_uses_parsed_timestamps() {
        let docs = vec![
            doc("late", "x", "2025-09-22T09:00:00", "HR"),
            doc("early", "y", "2025-09-22", "HR"),
            doc("bad", "z", "unknown", "HR"),
        ];
        let sorted = sort_documents(&docs, SortKey::Date, SortDirection::Asc);
        assert_eq!(ids(&sorted), ["bad", "early", "late"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let docs = vec![
            doc("first", "Same", "2025-09-22", "HR"),
            doc("second", "Same", "2025-09-22", "HR"),
        ];
        for dir in [SortDirection::Asc, SortDirection::Desc] {
            assert_eq!(
                ids(&sort_documents(&docs, SortKey::Date, dir)),
                ["first", "second"]
            );
        }
    }

    #[test]
    fn filter_matches_substring_ignoring_case() {
        let filtered = filter_by_title(sample(), "new");
        assert_eq!(ids(&filtered), ["2", "8"]);
        assert!(filter_by_title(sample(), "zzz").is_empty());
    }

    #[test]
    fn blank_filter_is_identity() {
        assert_eq!(filter_by_title(sample(), ""), sample());
        assert_eq!(filter_by_title(sample(), "   "), sample());
    }

    #[test]
    fn visible_documents_sorts_then_filters() {
        let q = DocumentQuery {
            sort_key: SortKey::Title,
            direction: SortDirection::Asc,
            search: "NEW".into(),
        };
        assert_eq!(ids(&visible_documents(&sample(), &q)), ["8", "2"]);
    }

    #[test]
    fn merge_listings_dedupes_by_id() {
        let merged = merge_listings(
            vec![doc("1", "a", "2025-01-01", "HR")],
            vec![
                doc("1", "a", "2025-01-01", "HR"),
                doc("7", "Weekly Incident Report", "2025-09-22", "all"),
            ],
        );
        assert_eq!(ids(&merged), ["1", "7"]);
    }

    #[test]
    fn admin_scope_sees_everything() {
        let admin = resolve(None, Some("admin"), "operations").session;
        assert_eq!(scoped_documents(sample(), &admin).len(), 4);
    }

    #[test]
    fn stats_count_read_states() {
        let mut docs = sample();
        docs[0].status = DocumentStatus::ApprovalPending;
        docs[1].status = DocumentStatus::Unread;
        docs[2].status = DocumentStatus::Read;
        docs[3].status = DocumentStatus::Read;
        let stats = DashboardStats::from_documents(&docs);
        assert_eq!(
            stats,
            DashboardStats {
                read: 2,
                deadline: 0,
                approval_pending: 1,
                unread: 1
            }
        );
    }
}
