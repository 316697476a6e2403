//! Account registration.
//!
//! # Invariants
//! - Post-save listeners are notified only after the user row is stored.
//! - A listener failure is reported but does not remove the new account.

use crate::model::user::{NewUser, User};
use crate::repo::error::RepoError;
use crate::repo::user_repo::UserRepository;
use crate::repo::Store;
use crate::signals::{SignalError, UserSignals};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for account use-cases.
#[derive(Debug)]
pub enum AccountServiceError {
    Repo(RepoError),
    /// The account was stored but a listener failed.
    Signal { user: Box<User>, source: SignalError },
}

impl Display for AccountServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Signal { user, source } => {
                write!(f, "user `{}` saved but {source}", user.username)
            }
        }
    }
}

impl Error for AccountServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Signal { source, .. } => Some(source),
        }
    }
}

impl From<RepoError> for AccountServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Registers accounts and fires user post-save hooks.
pub struct AccountService<'a, 'conn> {
    store: Store<'conn>,
    signals: &'a UserSignals,
}

impl<'a, 'conn> AccountService<'a, 'conn> {
    pub fn new(store: Store<'conn>, signals: &'a UserSignals) -> Self {
        Self { store, signals }
    }

    /// Stores a new account and notifies listeners with `created = true`.
    pub fn register_user(&self, user: &NewUser) -> Result<User, AccountServiceError> {
        let created = self.store.users().create_user(user)?;
        info!(
            "event=user_register module=service status=ok user_id={}",
            created.id
        );

        if let Err(source) = self.signals.send_post_save(&self.store, &created, true) {
            warn!(
                "event=user_post_save module=service status=error user_id={} error={}",
                created.id, source
            );
            return Err(AccountServiceError::Signal {
                user: Box::new(created),
                source,
            });
        }
        Ok(created)
    }
}
