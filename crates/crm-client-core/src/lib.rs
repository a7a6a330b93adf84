//! Client core for the CRM front-end.
//!
//! Holds the pieces every surface needs before it can talk to the API: the
//! persisted session (token + username), role extraction from the access
//! token, and base URL / storage path resolution.

#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod role;
pub mod session;

pub use config::{
    BaseUrlSource, ConfigError, DEFAULT_API_BASE_URL, ENV_API_BASE_URL, ENV_SESSION_FILE,
    normalize_base_url, resolve_api_base_url, resolve_session_path,
};
pub use role::{AccessLevel, ADMIN_ROLE, TokenDecodeError, decode_claims, role_from_token};
pub use session::{
    FileSessionStore, MemorySessionStore, SESSION_TOKEN_KEY, SESSION_USERNAME_KEY, Session,
    SessionContext, SessionStore, SessionStoreError,
};
