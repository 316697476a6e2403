//! Post-save hooks for user accounts.
//!
//! # Responsibility
//! - Keep an in-process registry of listeners notified after a user save.
//! - Provide the listener that hands anonymous results to a new account.
//!
//! # Invariants
//! - Listener ids are unique; listeners run in id order.
//! - The reconciler only acts on newly created users with a non-empty email,
//!   and only touches results that have no user yet.

use crate::model::user::User;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::result_repo::ResultRepository;
use crate::repo::Store;
use log::info;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Id of [`QuizResultReconciler`] in a registry.
pub const UPDATE_QUIZ_RESULTS: &str = "quiz.update_quiz_results";

/// Receiver of user post-save notifications.
pub trait UserSavedListener: Send + Sync {
    fn listener_id(&self) -> &str;
    fn on_user_saved(&self, store: &Store<'_>, user: &User, created: bool) -> RepoResult<()>;
}

/// Registry and dispatch errors.
#[derive(Debug)]
pub enum SignalError {
    InvalidListenerId(String),
    DuplicateListener(String),
    /// A listener failed while handling a notification.
    Listener { id: String, source: RepoError },
}

impl Display for SignalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidListenerId(id) => write!(f, "listener id is invalid: `{id}`"),
            Self::DuplicateListener(id) => write!(f, "listener already connected: {id}"),
            Self::Listener { id, source } => write!(f, "listener {id} failed: {source}"),
        }
    }
}

impl Error for SignalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Listener { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Listeners notified after a user record is saved.
#[derive(Default)]
pub struct UserSignals {
    listeners: BTreeMap<String, Arc<dyn UserSavedListener>>,
}

impl UserSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, listener: Arc<dyn UserSavedListener>) -> Result<(), SignalError> {
        let id = listener.listener_id().trim().to_string();
        if id.is_empty() {
            return Err(SignalError::InvalidListenerId(id));
        }
        if self.listeners.contains_key(&id) {
            return Err(SignalError::DuplicateListener(id));
        }
        self.listeners.insert(id, listener);
        Ok(())
    }

    /// Returns whether a listener was removed.
    pub fn disconnect(&mut self, listener_id: &str) -> bool {
        self.listeners.remove(listener_id.trim()).is_some()
    }

    pub fn is_connected(&self, listener_id: &str) -> bool {
        self.listeners.contains_key(listener_id.trim())
    }

    pub fn listener_ids(&self) -> Vec<String> {
        self.listeners.keys().cloned().collect()
    }

    /// Notifies every listener; stops at the first failure.
    pub fn send_post_save(
        &self,
        store: &Store<'_>,
        user: &User,
        created: bool,
    ) -> Result<(), SignalError> {
        for (id, listener) in &self.listeners {
            listener
                .on_user_saved(store, user, created)
                .map_err(|source| SignalError::Listener {
                    id: id.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}

/// Points earlier anonymous results at a newly registered account with the
/// same email.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuizResultReconciler;

impl UserSavedListener for QuizResultReconciler {
    fn listener_id(&self) -> &str {
        UPDATE_QUIZ_RESULTS
    }

    fn on_user_saved(&self, store: &Store<'_>, user: &User, created: bool) -> RepoResult<()> {
        if !created || user.email.trim().is_empty() {
            return Ok(());
        }
        let updated = store.results().assign_anonymous_results(&user.email, user.id)?;
        if updated > 0 {
            info!(
                "event=results_reconciled module=signals status=ok user_id={} results={}",
                user.id, updated
            );
        }
        Ok(())
    }
}

/// Connects the result reconciler; a no-op when already connected.
pub fn start_listening(signals: &mut UserSignals) {
    signals
        .listeners
        .entry(UPDATE_QUIZ_RESULTS.to_string())
        .or_insert_with(|| Arc::new(QuizResultReconciler) as Arc<dyn UserSavedListener>);
}

/// Disconnects the result reconciler.
pub fn stop_listening(signals: &mut UserSignals) {
    signals.disconnect(UPDATE_QUIZ_RESULTS);
}
