//! Server-side session storage.
//!
//! Session payloads are stored as JSON text keyed by an opaque session key.

use crate::repo::error::RepoResult;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Repository interface for session payloads.
pub trait SessionRepository {
    fn load_session<T: DeserializeOwned>(&self, key: &str) -> RepoResult<Option<T>>;
    /// Inserts or replaces the payload for `key`.
    fn save_session<T: Serialize>(&self, key: &str, data: &T) -> RepoResult<()>;
    fn delete_session(&self, key: &str) -> RepoResult<()>;
}

/// SQLite-backed session repository.
pub struct SqliteSessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SessionRepository for SqliteSessionRepository<'_> {
    fn load_session<T: DeserializeOwned>(&self, key: &str) -> RepoResult<Option<T>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM sessions WHERE session_key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save_session<T: Serialize>(&self, key: &str, data: &T) -> RepoResult<()> {
        let json = serde_json::to_string(data)?;
        self.conn.execute(
            "INSERT INTO sessions (session_key, data)
             VALUES (?1, ?2)
             ON CONFLICT(session_key) DO UPDATE SET
                data = excluded.data,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, json],
        )?;
        Ok(())
    }

    fn delete_session(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM sessions WHERE session_key = ?1;", [key])?;
        Ok(())
    }
}
