//! Quiz result repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist result snapshots together with the chosen answers.
//! - Reassign anonymous results to a newly registered account.
//!
//! # Invariants
//! - A result and its answer links are written in one transaction.
//! - Reassignment only touches rows with `user_id IS NULL`.

use crate::model::answer::AnswerId;
use crate::model::quiz::QuizId;
use crate::model::result::{NewQuizResult, QuizResult, QuizResultDetail, QuizResultId};
use crate::model::user::UserId;
use crate::repo::error::{map_write_error, RepoError, RepoResult};
use crate::repo::quiz_repo::{QuizRepository, SqliteQuizRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::{in_transaction, parse_audit, parse_count};
use log::info;
use rusqlite::{params, Connection, Row};

const RESULT_SELECT_SQL: &str = "SELECT
    id,
    quiz_id,
    user_id,
    email,
    score,
    maximum_score,
    created_at,
    modified_at,
    creator_id,
    editor_id
FROM quiz_results";

/// Repository interface for quiz results.
pub trait ResultRepository {
    fn create_result(&self, result: &NewQuizResult) -> RepoResult<QuizResult>;
    fn get_result(&self, id: QuizResultId) -> RepoResult<Option<QuizResult>>;
    /// Result with quiz and taker, only when it belongs to the quiz with `slug`.
    fn get_result_detail(&self, slug: &str, id: QuizResultId)
        -> RepoResult<Option<QuizResultDetail>>;
    /// Results ordered by id, optionally restricted to one quiz.
    fn list_results(&self, quiz_id: Option<QuizId>) -> RepoResult<Vec<QuizResult>>;
    /// Number of results `user_id` has for `quiz_id`.
    fn count_taken(&self, user_id: UserId, quiz_id: QuizId) -> RepoResult<u32>;
    /// Points anonymous results recorded under `email` at `user_id`.
    ///
    /// Returns the number of reassigned results.
    fn assign_anonymous_results(&self, email: &str, user_id: UserId) -> RepoResult<usize>;
}

/// SQLite-backed result repository.
pub struct SqliteResultRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteResultRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load_answer_ids(&self, result_id: QuizResultId) -> RepoResult<Vec<AnswerId>> {
        let mut stmt = self.conn.prepare(
            "SELECT answer_id
             FROM quiz_result_answers
             WHERE result_id = ?1
             ORDER BY answer_id ASC;",
        )?;
        let mut rows = stmt.query([result_id])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }

    fn parse_with_answers(&self, row: &Row<'_>) -> RepoResult<QuizResult> {
        let mut result = parse_result_row(row)?;
        result.answer_ids = self.load_answer_ids(result.id)?;
        Ok(result)
    }
}

impl ResultRepository for SqliteResultRepository<'_> {
    fn create_result(&self, result: &NewQuizResult) -> RepoResult<QuizResult> {
        let id = in_transaction(self.conn, |conn| -> RepoResult<i64> {
            conn.execute(
                "INSERT INTO quiz_results (quiz_id, user_id, email, score, maximum_score)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    result.quiz_id,
                    result.user_id,
                    result.email.as_str(),
                    result.score,
                    result.maximum_score,
                ],
            )
            .map_err(|err| {
                map_write_error(err, || {
                    format!("quiz {} or its taker does not exist", result.quiz_id)
                })
            })?;
            let id = conn.last_insert_rowid();

            for answer_id in &result.answer_ids {
                conn.execute(
                    "INSERT OR IGNORE INTO quiz_result_answers (result_id, answer_id) VALUES (?1, ?2);",
                    params![id, answer_id],
                )
                .map_err(|err| {
                    map_write_error(err, || format!("answer {answer_id} does not exist"))
                })?;
            }
            Ok(id)
        })?;

        info!(
            "event=result_create module=repo status=ok result_id={} quiz_id={} anonymous={} answers={}",
            id,
            result.quiz_id,
            result.user_id.is_none(),
            result.answer_ids.len()
        );

        self.get_result(id)?
            .ok_or(RepoError::NotFound { entity: "quiz result", id })
    }

    fn get_result(&self, id: QuizResultId) -> RepoResult<Option<QuizResult>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RESULT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.parse_with_answers(row)?));
        }
        Ok(None)
    }

    fn get_result_detail(
        &self,
        slug: &str,
        id: QuizResultId,
    ) -> RepoResult<Option<QuizResultDetail>> {
        let Some(quiz) = SqliteQuizRepository::new(self.conn).get_quiz_by_slug(slug)? else {
            return Ok(None);
        };
        let Some(result) = self.get_result(id)? else {
            return Ok(None);
        };
        if result.quiz_id != quiz.id {
            return Ok(None);
        }

        let user = match result.user_id {
            Some(user_id) => SqliteUserRepository::new(self.conn).get_user(user_id)?,
            None => None,
        };
        Ok(Some(QuizResultDetail { result, quiz, user }))
    }

    fn list_results(&self, quiz_id: Option<QuizId>) -> RepoResult<Vec<QuizResult>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RESULT_SELECT_SQL}
             WHERE (?1 IS NULL OR quiz_id = ?1)
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([quiz_id])?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            results.push(self.parse_with_answers(row)?);
        }
        Ok(results)
    }

    fn count_taken(&self, user_id: UserId, quiz_id: QuizId) -> RepoResult<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM quiz_results WHERE user_id = ?1 AND quiz_id = ?2;",
            params![user_id, quiz_id],
            |row| row.get(0),
        )?;
        parse_count("quiz_results", "count", count)
    }

    fn assign_anonymous_results(&self, email: &str, user_id: UserId) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE quiz_results
             SET
                user_id = ?1,
                modified_at = (strftime('%s', 'now') * 1000)
             WHERE email = ?2
               AND user_id IS NULL;",
            params![user_id, email],
        )?;
        Ok(changed)
    }
}

fn parse_result_row(row: &Row<'_>) -> RepoResult<QuizResult> {
    Ok(QuizResult {
        id: row.get("id")?,
        quiz_id: row.get("quiz_id")?,
        user_id: row.get("user_id")?,
        email: row.get("email")?,
        answer_ids: Vec::new(),
        score: parse_count("quiz_results", "score", row.get("score")?)?,
        maximum_score: parse_count(
            "quiz_results",
            "maximum_score",
            row.get("maximum_score")?,
        )?,
        audit: parse_audit(row)?,
    })
}
