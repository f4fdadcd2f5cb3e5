// Session and role resolution.
//
// Login is mocked: the user id prefix decides the department and a single
// department listing fetch stands in for credential verification. The
// resulting session is persisted in the local store under `kmrl_user`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiError, DocumentApi};
use crate::store::{Store, SESSION_KEY};

// ---------------------------------------------------------------------------
// Departments
// ---------------------------------------------------------------------------

/// A department as addressed by the client: `slug` for matching and launch
/// overrides, `label` for display and backend paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Department {
    pub slug: &'static str,
    pub label: &'static str,
}

pub const ADMIN: Department = Department {
    slug: "admin",
    label: "Admin",
};
pub const OPERATIONS: Department = Department {
    slug: "operations",
    label: "Operations",
};

/// User id prefix -> department. Checked in order, case-insensitively.
const PREFIXES: &[(&str, Department)] = &[
    ("ADMIN", ADMIN),
    ("OPS", OPERATIONS),
    (
        "ENG",
        Department {
            slug: "engineering",
            label: "Engineering",
        },
    ),
    (
        "MNT",
        Department {
            slug: "maintenance",
            label: "Maintenance",
        },
    ),
    (
        "FIN",
        Department {
            slug: "finance",
            label: "Finance",
        },
    ),
    (
        "HR",
        Department {
            slug: "hr",
            label: "HR",
        },
    ),
];

/// Departments an admin can pick when uploading.
pub fn upload_departments() -> Vec<&'static str> {
    PREFIXES
        .iter()
        .filter(|(_, d)| *d != ADMIN)
        .map(|(_, d)| d.label)
        .chain(std::iter::once("all"))
        .collect()
}

/// Resolve a user id to its department by prefix. Unknown prefixes fall back
/// to Operations.
pub fn department_for_user_id(user_id: &str) -> Department {
    let upper = user_id.trim().to_ascii_uppercase();
    PREFIXES
        .iter()
        .find(|(prefix, _)| upper.starts_with(prefix))
        .map(|(_, dept)| *dept)
        .unwrap_or(OPERATIONS)
}

/// Display label for a department slug: known slugs map to their label,
/// anything else is capitalized.
pub fn label_for_slug(slug: &str) -> String {
    let slug = slug.trim();
    if let Some((_, dept)) = PREFIXES
        .iter()
        .find(|(_, d)| d.slug.eq_ignore_ascii_case(slug))
    {
        return dept.label.to_string();
    }
    let mut chars = slug.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// UserSession
// ---------------------------------------------------------------------------

/// The acting user. Stored as camelCase JSON for compatibility with existing
/// `kmrl_user` values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    #[serde(default)]
    pub name: String,
    pub user_id: String,
    pub department: String,
    pub dept_slug: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl UserSession {
    fn for_department(user_id: &str, name: &str, dept: Department) -> Self {
        let name = name.trim();
        UserSession {
            name: if name.is_empty() {
                user_id.to_string()
            } else {
                name.to_string()
            },
            user_id: user_id.to_string(),
            department: dept.label.to_string(),
            dept_slug: dept.slug.to_string(),
            is_admin: dept.slug == ADMIN.slug,
        }
    }

    /// A session with no user behind it, built from a launch override or the
    /// configured default. Uploads require a real user id.
    fn guest(slug: &str) -> Self {
        let slug = slug.trim().to_ascii_lowercase();
        UserSession {
            name: "Employee".to_string(),
            user_id: String::new(),
            department: label_for_slug(&slug),
            is_admin: slug == ADMIN.slug,
            dept_slug: slug,
        }
    }

    pub fn is_guest(&self) -> bool {
        self.user_id.is_empty()
    }

    /// Whether a document tagged with `department` is visible to this user.
    pub fn can_see(&self, department: &str) -> bool {
        if self.is_admin {
            return true;
        }
        let department = department.trim();
        department.eq_ignore_ascii_case("all")
            || department.eq_ignore_ascii_case(&self.department)
            || department.eq_ignore_ascii_case(&self.dept_slug)
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("User ID is required.")]
    MissingUserId,

    #[error("Password is required.")]
    MissingPassword,

    #[error("could not reach the document service: {0}")]
    Unreachable(#[source] ApiError),

    #[error("failed to persist session: {0}")]
    Store(String),
}

impl SessionError {
    /// Validation failures are shown inline; the rest are alerts.
    pub fn is_validation(&self) -> bool {
        matches!(self, SessionError::MissingUserId | SessionError::MissingPassword)
    }
}

/// A validated login form, not yet verified against the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingLogin {
    pub user_id: String,
    pub name: String,
    pub department: Department,
}

/// Validate the login form and resolve the department. No network I/O.
pub fn begin_login(user_id: &str, name: &str, password: &str) -> Result<PendingLogin, SessionError> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(SessionError::MissingUserId);
    }
    if password.is_empty() {
        return Err(SessionError::MissingPassword);
    }
    Ok(PendingLogin {
        user_id: user_id.to_string(),
        name: name.to_string(),
        department: department_for_user_id(user_id),
    })
}

/// Confirm the backend answers for the user's department and build the
/// session. The password is never sent.
pub async fn verify_login(
    api: &dyn DocumentApi,
    pending: PendingLogin,
) -> Result<UserSession, SessionError> {
    let documents = api
        .list_department_documents(pending.department.label)
        .await
        .map_err(SessionError::Unreachable)?;
    info!(
        "Login verified for {} ({}), {} documents visible",
        pending.user_id,
        pending.department.label,
        documents.len()
    );
    Ok(UserSession::for_department(
        &pending.user_id,
        &pending.name,
        pending.department,
    ))
}

/// Full login: validate, verify, persist. Nothing is persisted on failure.
pub async fn login(
    api: &dyn DocumentApi,
    store: &Store,
    user_id: &str,
    name: &str,
    password: &str,
) -> Result<UserSession, SessionError> {
    let pending = begin_login(user_id, name, password)?;
    let session = verify_login(api, pending).await?;
    save_session(store, &session).map_err(|e| SessionError::Store(format!("{e:#}")))?;
    Ok(session)
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Where the acting session came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSource {
    Stored,
    LaunchOverride,
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSession {
    pub session: UserSession,
    pub source: SessionSource,
}

/// Pick the acting session: a stored session wins outright, then the launch
/// override, then the configured default department.
pub fn resolve(
    stored: Option<UserSession>,
    dept_override: Option<&str>,
    default_slug: &str,
) -> ResolvedSession {
    if let Some(session) = stored {
        return ResolvedSession {
            session,
            source: SessionSource::Stored,
        };
    }
    match dept_override.map(str::trim).filter(|d| !d.is_empty()) {
        Some(slug) => ResolvedSession {
            session: UserSession::guest(slug),
            source: SessionSource::LaunchOverride,
        },
        None => ResolvedSession {
            session: UserSession::guest(default_slug),
            source: SessionSource::Default,
        },
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Load the stored session. A value that no longer parses is deleted and
/// treated as absent.
pub fn load_session(store: &Store) -> anyhow::Result<Option<UserSession>> {
    let Some(raw) = store.get(SESSION_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str::<UserSession>(&raw) {
        Ok(session) if !session.user_id.trim().is_empty() => Ok(Some(session)),
        Ok(_) => {
            warn!("Stored session has no user id, discarding");
            store.remove(SESSION_KEY)?;
            Ok(None)
        }
        Err(e) => {
            warn!("Stored session is malformed, discarding: {}", e);
            store.remove(SESSION_KEY)?;
            Ok(None)
        }
    }
}

pub fn save_session(store: &Store, session: &UserSession) -> anyhow::Result<()> {
    let json = serde_json::to_string(session)?;
    store.set(SESSION_KEY, &json)
}

/// Returns `true` if a session was stored.
pub fn clear_session(store: &Store) -> anyhow::Result<bool> {
    store.remove(SESSION_KEY)
}
