// Dashboard session - Demo credential check and login state
//
// This is a demo stub, not an authentication boundary: a single shared flag
// with hard-coded credentials taken from configuration.
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::RwLock;
use thiserror::Error;

/// Key the session is stored under in the persisted session file.
pub const STORAGE_KEY: &str = "ai4bmi_auth";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub is_authenticated: bool,
    pub user: Option<SessionUser>,
}

impl SessionState {
    fn signed_in(user: SessionUser) -> Self {
        Self {
            is_authenticated: true,
            user: Some(user),
        }
    }

    fn is_valid(&self) -> bool {
        self.is_authenticated && self.user.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemoCredentials {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid email or password")]
    InvalidCredentials,
}

/// JSON key/value file standing in for browser local storage.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_entries(&self) -> anyhow::Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(entries)) => Ok(entries),
            _ => Ok(Map::new()),
        }
    }

    fn write_entries(&self, entries: Map<String, Value>) -> anyhow::Result<()> {
        let raw = serde_json::to_string_pretty(&Value::Object(entries))?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    pub fn load(&self) -> anyhow::Result<Option<SessionState>> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(STORAGE_KEY)
            .and_then(|v| serde_json::from_value::<SessionState>(v.clone()).ok())
            .filter(SessionState::is_valid))
    }

    pub fn save(&self, state: &SessionState) -> anyhow::Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(STORAGE_KEY.to_string(), serde_json::to_value(state)?);
        self.write_entries(entries)
    }

    pub fn remove(&self) -> anyhow::Result<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(STORAGE_KEY).is_some() {
            self.write_entries(entries)?;
        }
        Ok(())
    }
}

/// Session state shared with handlers through the application state.
pub struct SessionStore {
    credentials: DemoCredentials,
    state: RwLock<SessionState>,
    file: Option<SessionFile>,
}

impl SessionStore {
    pub fn new(credentials: DemoCredentials, file: Option<SessionFile>) -> Self {
        let restored = file.as_ref().and_then(|f| match f.load() {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("Ignoring unreadable session file: {:#}", e);
                None
            }
        });
        if let Some(user) = restored.as_ref().and_then(|s| s.user.as_ref()) {
            tracing::info!(email = %user.email, "Restored dashboard session");
        }

        Self {
            credentials,
            state: RwLock::new(restored.unwrap_or_default()),
            file,
        }
    }

    pub fn current(&self) -> SessionState {
        self.state.read().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn login(&self, email: &str, password: &str) -> Result<SessionUser, SessionError> {
        if email != self.credentials.email || password != self.credentials.password {
            tracing::info!(email, "Rejected dashboard login");
            return Err(SessionError::InvalidCredentials);
        }

        let user = SessionUser {
            email: self.credentials.email.clone(),
            name: self.credentials.name.clone(),
        };
        let state = SessionState::signed_in(user.clone());
        self.persist(|f| f.save(&state));
        self.replace(state);
        tracing::info!(email, "Dashboard login");
        Ok(user)
    }

    pub fn logout(&self) {
        self.replace(SessionState::default());
        self.persist(SessionFile::remove);
        tracing::info!("Dashboard logout");
    }

    fn replace(&self, next: SessionState) {
        match self.state.write() {
            Ok(mut state) => *state = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    fn persist<F>(&self, op: F)
    where
        F: FnOnce(&SessionFile) -> anyhow::Result<()>,
    {
        if let Some(file) = &self.file {
            if let Err(e) = op(file) {
                tracing::warn!("Failed to persist session: {:#}", e);
            }
        }
    }
}
