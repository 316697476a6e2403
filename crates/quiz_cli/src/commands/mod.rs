//! Subcommand implementations and shared helpers.

pub mod admin;
pub mod init;
pub mod list;
pub mod load;
pub mod register;
pub mod result;
pub mod take;

use crate::config::Settings;
use anyhow::{Context, Result};
use quiz_core::repo::user_repo::UserRepository;
use quiz_core::{init_logging, open_db, Connection, LoggingConfig, LoggingError, Store, User};

/// Starts file logging for this run.
pub fn start_logging(settings: &Settings) -> Result<(), LoggingError> {
    init_logging(
        &LoggingConfig::new(&settings.log_dir)
            .with_level(settings.log_level.as_str())
            .with_stderr(settings.log_stderr),
    )
}

/// Opens (and migrates) the configured database.
pub fn open_connection(settings: &Settings) -> Result<Connection> {
    open_db(&settings.database)
        .with_context(|| format!("failed to open database: {}", settings.database.display()))
}

pub fn store(conn: &Connection) -> Result<Store<'_>> {
    Store::try_new(conn).context("database schema is not ready")
}

/// Looks up a registered user by username.
pub fn find_user(store: &Store<'_>, username: &str) -> Result<User> {
    store
        .users()
        .get_user_by_username(username)?
        .with_context(|| format!("no user named `{username}`"))
}
