// Per-session state: the saved profile and the activity history.
// In-memory only; a session lives until it is reset or the process exits.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session {0} not found")]
    NotFound(Uuid),
}

/// Details the user enters once and reuses across tools. Missing fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub linkedin: String,
    pub github: String,
    pub education: String,
    pub skills: String,
    pub experience: String,
    pub projects: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub action: String,
    pub detail: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub profile: Profile,
    /// Newest first.
    pub history: Vec<HistoryEntry>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            profile: Profile::default(),
            history: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Session {
        let session = Session::new();
        self.inner.write().await.insert(session.id, session.clone());
        tracing::info!(session_id = %session.id, "Session created");
        session
    }

    /// Snapshot of the session.
    pub async fn get(&self, id: Uuid) -> Result<Session, SessionError> {
        self.inner
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(SessionError::NotFound(id))
    }

    pub async fn update_profile(&self, id: Uuid, profile: Profile) -> Result<Profile, SessionError> {
        let mut sessions = self.inner.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        session.profile = profile;
        Ok(session.profile.clone())
    }

    /// Prepends a history entry.
    pub async fn record(
        &self,
        id: Uuid,
        action: impl Into<String>,
        detail: impl Into<String>,
    ) -> Result<HistoryEntry, SessionError> {
        let entry = HistoryEntry {
            action: action.into(),
            detail: detail.into(),
            at: Utc::now(),
        };
        let mut sessions = self.inner.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        session.history.insert(0, entry.clone());
        Ok(entry)
    }

    /// Drops the session and everything in it.
    pub async fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        self.inner
            .write()
            .await
            .remove(&id)
            .map(|_| tracing::info!(session_id = %id, "Session reset"))
            .ok_or(SessionError::NotFound(id))
    }
}
