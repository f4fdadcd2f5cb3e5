// Upload form validation and the recent-uploads cache.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::api::UploadRequest;
use crate::models::Document;
use crate::session::UserSession;
use crate::store::{Store, UPLOADS_KEY};

/// Maximum number of documents kept in the recent-uploads cache.
pub const UPLOAD_CACHE_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Title and file are required.")]
    Validation,

    #[error("Could not find user info. Please log in again.")]
    NotLoggedIn,

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadForm {
    pub title: String,
    /// Chosen department. Only honoured for admins.
    pub department: Option<String>,
    pub file_path: PathBuf,
}

/// A validated upload, ready to be read from disk and sent.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedUpload {
    pub title: String,
    pub department: String,
    pub user_id: String,
    pub file_path: PathBuf,
    pub file_name: String,
}

/// Validate the form against the acting session. No network I/O.
pub fn prepare_upload(
    form: &UploadForm,
    session: Option<&UserSession>,
) -> Result<PreparedUpload, UploadError> {
    let title = form.title.trim();
    let file_name = match file_name_of(&form.file_path) {
        Some(name) if !title.is_empty() && form.file_path.is_file() => name,
        _ => return Err(UploadError::Validation),
    };

    let session = match session {
        Some(s) if !s.is_guest() => s,
        _ => return Err(UploadError::NotLoggedIn),
    };

    let department = if session.is_admin {
        form.department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(&session.department)
            .to_string()
    } else {
        session.department.clone()
    };

    Ok(PreparedUpload {
        title: title.to_string(),
        department,
        user_id: session.user_id.clone(),
        file_path: form.file_path.clone(),
        file_name,
    })
}

fn file_name_of(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

/// Read the file contents into a request.
pub async fn read_upload(prepared: PreparedUpload) -> Result<UploadRequest, UploadError> {
    let bytes = tokio::fs::read(&prepared.file_path)
        .await
        .map_err(|source| UploadError::Io {
            path: prepared.file_path.clone(),
            source,
        })?;
    Ok(UploadRequest {
        title: prepared.title,
        department: prepared.department,
        user_id: prepared.user_id,
        file_name: prepared.file_name,
        bytes,
    })
}

// ---------------------------------------------------------------------------
// Recent uploads cache
// ---------------------------------------------------------------------------

/// Load the cached uploads, newest first. An unreadable cache is reset.
pub fn load_recent_uploads(store: &Store) -> anyhow::Result<Vec<Document>> {
    let Some(raw) = store.get(UPLOADS_KEY)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str(&raw) {
        Ok(docs) => Ok(docs),
        Err(e) => {
            warn!("Upload cache is malformed, resetting: {}", e);
            store.remove(UPLOADS_KEY)?;
            Ok(Vec::new())
        }
    }
}

/// Put `document` at the front of the cache, replacing an entry with the
/// same id and dropping the oldest beyond `UPLOAD_CACHE_LIMIT`.
pub fn record_upload(store: &Store, document: &Document) -> anyhow::Result<()> {
    let mut docs = load_recent_uploads(store)?;
    docs.retain(|d| d.id != document.id);
    docs.insert(0, document.clone());
    docs.truncate(UPLOAD_CACHE_LIMIT);
    store.set(UPLOADS_KEY, &serde_json::to_string(&docs)?)
}
