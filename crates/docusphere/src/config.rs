// Configuration loading and parsing (client.toml, credentials.toml).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub session: SessionConfig,
    pub credentials: CredentialsConfig,
    /// Resolved path of the local store database.
    pub store_path: String,
}

// ---------------------------------------------------------------------------
// client.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire client.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ClientFile {
    api: ApiConfig,
    polling: PollingConfig,
    session: SessionConfig,
    store: StoreSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// `limit` query parameter sent with department listings.
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

fn default_page_limit() -> u32 {
    100
}

impl ApiConfig {
    /// Base URL without trailing slashes.
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    pub interval_secs: u64,
    pub ceiling_secs: u64,
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn ceiling(&self) -> Duration {
        Duration::from_secs(self.ceiling_secs)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        PollingConfig {
            interval_secs: 3,
            ceiling_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Department slug used when neither a stored session nor a launch
    /// override names one.
    pub default_department: String,
}

#[derive(Debug, Clone, Deserialize)]
struct StoreSection {
    /// Empty means "use the platform data directory".
    #[serde(default)]
    path: String,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    /// Site key of the human-verification challenge shown on login. Login is
    /// unavailable without it.
    pub recaptcha_site_key: Option<String>,
}

impl CredentialsConfig {
    pub fn site_key(&self) -> Option<&str> {
        self.recaptcha_site_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }
}

impl Config {
    /// Replace the API base URL (e.g. from `--api-base-url` or the
    /// environment) and re-validate.
    pub fn with_api_base_url(mut self, base_url: Option<String>) -> Result<Self, ConfigError> {
        if let Some(url) = base_url {
            self.api.base_url = url;
            validate(&self)?;
        }
        Ok(self)
    }

    /// The configuration error that blocks the login screen, if any.
    pub fn login_blocker(&self) -> Option<String> {
        match self.credentials.site_key() {
            Some(_) => None,
            None => Some(
                "reCAPTCHA site key is not configured (config/credentials.toml)".to_string(),
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/client.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` handles that.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- client.toml (required) ---
    let client_path = config_dir.join("client.toml");
    let client_text = read_file(&client_path)?;
    let client_file: ClientFile =
        toml::from_str(&client_text).map_err(|e| ConfigError::ParseError {
            path: client_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let store_path = resolve_store_path(&client_file.store.path);

    let config = Config {
        api: client_file.api,
        polling: client_file.polling,
        session: client_file.session,
        credentials,
        store_path,
    };

    validate(&config)?;

    Ok(config)
}

/// Files seeded from `defaults/` into `config/` when missing.
/// `credentials.toml` is never seeded; users copy the `.example` by hand.
const SEEDED_FILES: &[&str] = &["client.toml"];

/// Copy any missing seed files from `defaults/` into `config/` and return
/// the paths that were created. Existing files are left untouched.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");
    let fail = |message: String| ConfigError::DefaultsCopyError { message };

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(Vec::new());
        }
        return Err(fail(format!(
            "neither defaults/ nor config/ directory found in {}; \
             run from the project root or pass --base-dir",
            base_dir.display()
        )));
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| fail(format!("failed to create {}: {e}", config_dir.display())))?;

    let mut copied = Vec::new();
    for name in SEEDED_FILES {
        let source = defaults_dir.join(name);
        let target = config_dir.join(name);
        if !source.is_file() || target.exists() {
            continue;
        }
        std::fs::copy(&source, &target).map_err(|e| {
            fail(format!(
                "failed to copy {} to {}: {e}",
                source.display(),
                target.display()
            ))
        })?;
        copied.push(target);
    }

    Ok(copied)
}

/// Load config relative to `base_dir` (or the current working directory),
/// copying default config files first.
pub fn load_config(base_dir: Option<&Path>) -> Result<Config, ConfigError> {
    let base = match base_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
            path: PathBuf::from("."),
        })?,
    };
    ensure_config_files(&base)?;
    load_config_from(&base)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// An explicit path wins; otherwise the store lives in the platform data
/// directory, falling back to the working directory.
fn resolve_store_path(configured: &str) -> String {
    if !configured.trim().is_empty() {
        return configured.to_string();
    }
    directories::ProjectDirs::from("", "", "docusphere")
        .map(|dirs| dirs.data_dir().join("docusphere.db"))
        .and_then(|p| p.to_str().map(str::to_string))
        .unwrap_or_else(|| "docusphere.db".to_string())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.api.trimmed_base_url();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError {
            field: "api.base_url".into(),
            message: format!("must be an http(s) URL, got {:?}", config.api.base_url),
        });
    }
    if reqwest::Url::parse(base_url).is_err() {
        return Err(ConfigError::ValidationError {
            field: "api.base_url".into(),
            message: format!("not a valid URL: {:?}", config.api.base_url),
        });
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "api.timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.api.page_limit == 0 {
        return Err(ConfigError::ValidationError {
            field: "api.page_limit".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.polling.interval_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "polling.interval_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.polling.ceiling_secs < config.polling.interval_secs {
        return Err(ConfigError::ValidationError {
            field: "polling.ceiling_secs".into(),
            message: format!(
                "must be at least polling.interval_secs ({}), got {}",
                config.polling.interval_secs, config.polling.ceiling_secs
            ),
        });
    }

    if config.session.default_department.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "session.default_department".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
