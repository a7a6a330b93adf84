//! Persisted login session and the provider that shares it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::role::{AccessLevel, role_from_token};

pub const SESSION_TOKEN_KEY: &str = "token";
pub const SESSION_USERNAME_KEY: &str = "username";

/// Token and username of the signed-in user. Both are set or both are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    username: Option<String>,
}

impl Session {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn signed_in(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            username: Some(username.into()),
        }
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Role claim of the current token, decoded on every call.
    #[must_use]
    pub fn role(&self) -> Option<String> {
        role_from_token(self.token())
    }

    #[must_use]
    pub fn access_level(&self) -> AccessLevel {
        AccessLevel::from_role(self.role().as_deref())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session storage read failed: {0}")]
    Read(#[source] std::io::Error),
    #[error("session storage write failed: {0}")]
    Write(#[source] std::io::Error),
    #[error("session storage encode failed: {0}")]
    Encode(#[source] serde_json::Error),
}

pub trait SessionStore {
    fn load_session(&self) -> Result<Session, SessionStoreError>;
    fn persist_session(&self, session: &Session) -> Result<(), SessionStoreError>;
    fn clear_session(&self) -> Result<(), SessionStoreError>;
}

/// Session stored as a small JSON object keyed by [`SESSION_TOKEN_KEY`] and
/// [`SESSION_USERNAME_KEY`].
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load_session(&self) -> Result<Session, SessionStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Session::anonymous());
            }
            Err(error) => return Err(SessionStoreError::Read(error)),
        };
        let Ok(Value::Object(entries)) = serde_json::from_str::<Value>(&raw) else {
            tracing::warn!(path = %self.path.display(), "ignoring unreadable session file");
            return Ok(Session::anonymous());
        };
        Ok(session_from_entries(&entries))
    }

    fn persist_session(&self, session: &Session) -> Result<(), SessionStoreError> {
        let (Some(token), Some(username)) = (session.token(), session.username()) else {
            return self.clear_session();
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(SessionStoreError::Write)?;
        }
        let mut entries = Map::new();
        entries.insert(SESSION_TOKEN_KEY.to_string(), Value::from(token));
        entries.insert(SESSION_USERNAME_KEY.to_string(), Value::from(username));
        let encoded = serde_json::to_string_pretty(&Value::Object(entries))
            .map_err(SessionStoreError::Encode)?;
        fs::write(&self.path, encoded).map_err(SessionStoreError::Write)
    }

    fn clear_session(&self) -> Result<(), SessionStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(SessionStoreError::Write(error)),
        }
    }
}

fn session_from_entries(entries: &Map<String, Value>) -> Session {
    let token = entries
        .get(SESSION_TOKEN_KEY)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty());
    let username = entries
        .get(SESSION_USERNAME_KEY)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty());
    match (token, username) {
        (Some(token), Some(username)) => Session::signed_in(token, username),
        _ => Session::anonymous(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    inner: Arc<Mutex<Session>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    #[must_use]
    pub fn stored(&self) -> Session {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn load_session(&self) -> Result<Session, SessionStoreError> {
        Ok(self.stored())
    }

    fn persist_session(&self, session: &Session) -> Result<(), SessionStoreError> {
        *self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = session.clone();
        Ok(())
    }

    fn clear_session(&self) -> Result<(), SessionStoreError> {
        self.persist_session(&Session::anonymous())
    }
}

/// Owns the live session, writes it through to a [`SessionStore`], and
/// notifies subscribers on every login and logout.
#[derive(Debug)]
pub struct SessionContext<S> {
    store: S,
    sender: watch::Sender<Session>,
}

impl<S: SessionStore> SessionContext<S> {
    /// Opens the context with whatever session the store already holds.
    pub fn open(store: S) -> Result<Self, SessionStoreError> {
        let session = store.load_session()?;
        let (sender, _) = watch::channel(session);
        Ok(Self { store, sender })
    }

    pub fn login(
        &mut self,
        token: impl Into<String>,
        username: impl Into<String>,
    ) -> Result<(), SessionStoreError> {
        let session = Session::signed_in(token, username);
        self.store.persist_session(&session)?;
        tracing::info!(username = session.username().unwrap_or_default(), "session started");
        self.sender.send_replace(session);
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), SessionStoreError> {
        let previous = self.sender.send_replace(Session::anonymous());
        if let Some(username) = previous.username() {
            tracing::info!(username, "session ended");
        }
        self.store.clear_session().inspect_err(|error| {
            tracing::warn!(%error, "failed to remove persisted session");
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.sender.borrow().clone()
    }

    #[must_use]
    pub fn current_token(&self) -> Option<String> {
        self.sender.borrow().token().map(str::to_string)
    }

    #[must_use]
    pub fn current_username(&self) -> Option<String> {
        self.sender.borrow().username().map(str::to_string)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}
