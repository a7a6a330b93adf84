//! Where the client talks to and where it keeps its session.

use std::path::{Path, PathBuf};

use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5115/api";
pub const ENV_API_BASE_URL: &str = "CRM_API_BASE_URL";
pub const ENV_SESSION_FILE: &str = "CRM_SESSION_FILE";

const SESSION_DIR_NAME: &str = "crm-client";
const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("api base url must not be empty")]
    EmptyBaseUrl,
    #[error("api base url must use http:// or https:// and include a host")]
    InvalidBaseUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseUrlSource {
    Environment,
    Default,
}

impl BaseUrlSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Environment => ENV_API_BASE_URL,
            Self::Default => "default",
        }
    }
}

/// Checks that `raw` is an absolute http(s) URL with a host. Returns it
/// trimmed and without a trailing slash, otherwise as written.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let candidate = raw.trim().trim_end_matches('/');
    if candidate.is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    let parsed = Url::parse(candidate).map_err(|_| ConfigError::InvalidBaseUrl)?;
    let has_host = parsed.host_str().is_some_and(|host| !host.is_empty());
    if !matches!(parsed.scheme(), "http" | "https") || !has_host {
        return Err(ConfigError::InvalidBaseUrl);
    }
    Ok(candidate.to_string())
}

/// Base URL from `CRM_API_BASE_URL`, else the local development server.
pub fn resolve_api_base_url() -> Result<(String, BaseUrlSource), ConfigError> {
    api_base_url_from(env_lookup)
}

/// Session file from `CRM_SESSION_FILE`, else under the platform data dir,
/// else under the home dir, else the working directory.
#[must_use]
pub fn resolve_session_path() -> PathBuf {
    session_path_from(env_lookup, dirs::data_local_dir(), dirs::home_dir())
}

fn api_base_url_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(String, BaseUrlSource), ConfigError> {
    match lookup(ENV_API_BASE_URL) {
        Some(configured) => Ok((normalize_base_url(&configured)?, BaseUrlSource::Environment)),
        None => Ok((normalize_base_url(DEFAULT_API_BASE_URL)?, BaseUrlSource::Default)),
    }
}

fn session_path_from(
    lookup: impl Fn(&str) -> Option<String>,
    data_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(configured) = lookup(ENV_SESSION_FILE) {
        return PathBuf::from(configured);
    }
    let hidden_dir = format!(".{SESSION_DIR_NAME}");
    data_dir
        .map(|dir| dir.join(SESSION_DIR_NAME))
        .or_else(|| home_dir.map(|dir| dir.join(&hidden_dir)))
        .map_or_else(
            || Path::new(SESSION_FILE_NAME).to_path_buf(),
            |dir| dir.join(SESSION_FILE_NAME),
        )
}

/// Blank values count as unset.
fn env_lookup(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
