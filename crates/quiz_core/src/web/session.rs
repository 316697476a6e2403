//! Visitor sessions.
//!
//! # Invariants
//! - Session keys are random v4 UUIDs.
//! - An unknown key starts a fresh, empty session under a new key.

use crate::repo::error::RepoResult;
use crate::repo::session_repo::SessionRepository;
use crate::repo::Store;
use crate::wizard::WizardState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Payload stored for one visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Email captured from an anonymous visitor.
    #[serde(default)]
    pub email: Option<String>,
    /// Wizard progress keyed by quiz slug.
    #[serde(default)]
    pub wizards: BTreeMap<String, WizardState>,
}

/// Loaded session with its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub key: String,
    pub data: SessionData,
}

impl Session {
    /// Loads the session for `key`, or starts a new one.
    pub fn load_or_create(store: &Store<'_>, key: Option<&str>) -> RepoResult<Self> {
        if let Some(key) = key {
            if let Some(data) = store.sessions().load_session::<SessionData>(key)? {
                return Ok(Self {
                    key: key.to_string(),
                    data,
                });
            }
        }
        Ok(Self {
            key: Uuid::new_v4().to_string(),
            data: SessionData::default(),
        })
    }

    pub fn save(&self, store: &Store<'_>) -> RepoResult<()> {
        store.sessions().save_session(&self.key, &self.data)
    }

    /// Drops the stored payload and continues under a fresh key.
    pub fn flush(&mut self, store: &Store<'_>) -> RepoResult<()> {
        store.sessions().delete_session(&self.key)?;
        self.key = Uuid::new_v4().to_string();
        self.data = SessionData::default();
        Ok(())
    }
}
