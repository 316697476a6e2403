//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//! - Own the aggregate queries behind scoring (sum of scores, best answer
//!   per question).
//!
//! # Invariants
//! - Write paths validate input models before SQL mutations.
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`) in
//!   addition to DB transport errors.

pub mod answer_repo;
pub mod error;
pub mod question_repo;
pub mod quiz_repo;
pub mod result_repo;
pub mod session_repo;
pub mod user_repo;

use crate::db::table_exists;
use crate::model::audit::Audit;
use answer_repo::SqliteAnswerRepository;
use error::{RepoError, RepoResult};
use question_repo::SqliteQuestionRepository;
use quiz_repo::SqliteQuizRepository;
use result_repo::SqliteResultRepository;
use rusqlite::{Connection, Row};
use session_repo::SqliteSessionRepository;
use user_repo::SqliteUserRepository;

const REQUIRED_TABLES: &[&str] = &[
    "users",
    "questions",
    "answers",
    "quizzes",
    "quiz_questions",
    "quiz_results",
    "quiz_result_answers",
    "sessions",
];

/// Hands out SQLite repositories sharing one migrated connection.
#[derive(Clone, Copy)]
pub struct Store<'conn> {
    conn: &'conn Connection,
}

impl<'conn> Store<'conn> {
    /// Wraps a connection after checking that the quiz schema is present.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        for &table in REQUIRED_TABLES {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    pub fn users(&self) -> SqliteUserRepository<'conn> {
        SqliteUserRepository::new(self.conn)
    }

    pub fn questions(&self) -> SqliteQuestionRepository<'conn> {
        SqliteQuestionRepository::new(self.conn)
    }

    pub fn answers(&self) -> SqliteAnswerRepository<'conn> {
        SqliteAnswerRepository::new(self.conn)
    }

    pub fn quizzes(&self) -> SqliteQuizRepository<'conn> {
        SqliteQuizRepository::new(self.conn)
    }

    pub fn results(&self) -> SqliteResultRepository<'conn> {
        SqliteResultRepository::new(self.conn)
    }

    pub fn sessions(&self) -> SqliteSessionRepository<'conn> {
        SqliteSessionRepository::new(self.conn)
    }
}

/// Runs `work` in a new transaction, or inside the caller's open one.
pub(crate) fn in_transaction<T, E: From<rusqlite::Error>>(
    conn: &Connection,
    work: impl FnOnce(&Connection) -> Result<T, E>,
) -> Result<T, E> {
    if !conn.is_autocommit() {
        return work(conn);
    }
    let tx = conn.unchecked_transaction()?;
    let value = work(&tx)?;
    tx.commit()?;
    Ok(value)
}

/// Reads the shared audit columns from a row.
pub(crate) fn parse_audit(row: &Row<'_>) -> rusqlite::Result<Audit> {
    Ok(Audit {
        created_at: row.get("created_at")?,
        modified_at: row.get("modified_at")?,
        creator: row.get("creator_id")?,
        editor: row.get("editor_id")?,
    })
}

pub(crate) fn parse_flag(table: &str, column: &str, value: i64) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {table}.{column}"
        ))),
    }
}

pub(crate) fn parse_count(table: &str, column: &str, value: i64) -> RepoResult<u32> {
    u32::try_from(value).map_err(|_| {
        RepoError::InvalidData(format!("invalid count value `{value}` in {table}.{column}"))
    })
}
