//! Quiz repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `quizzes` and the `quiz_questions` link table.
//! - Provide the live question list behind each wizard page.
//!
//! # Invariants
//! - `set_questions` replaces the whole question set in one transaction.
//! - `get_takeable_by_slug` never returns a `Closed` quiz.

use crate::model::question::{Difficulty, Question, QuestionId};
use crate::model::quiz::{NewQuiz, Quiz, QuizId, QuizStatus};
use crate::model::user::UserId;
use crate::repo::error::{map_write_error, RepoError, RepoResult};
use crate::repo::{in_transaction, parse_audit};
use crate::repo::question_repo::parse_question_row;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};

const QUIZ_SELECT_SQL: &str = "SELECT
    id,
    name,
    slug,
    description,
    status,
    created_at,
    modified_at,
    creator_id,
    editor_id
FROM quizzes";

/// Repository interface for quiz operations.
pub trait QuizRepository {
    fn create_quiz(&self, quiz: &NewQuiz, actor: Option<UserId>) -> RepoResult<Quiz>;
    fn update_quiz(&self, id: QuizId, quiz: &NewQuiz, actor: Option<UserId>) -> RepoResult<Quiz>;
    fn set_status(&self, id: QuizId, status: QuizStatus, actor: Option<UserId>) -> RepoResult<()>;
    fn get_quiz(&self, id: QuizId) -> RepoResult<Option<Quiz>>;
    fn get_quiz_by_slug(&self, slug: &str) -> RepoResult<Option<Quiz>>;
    /// Quiz by slug unless it is closed.
    fn get_takeable_by_slug(&self, slug: &str) -> RepoResult<Option<Quiz>>;
    /// Quizzes ordered by id, optionally restricted to one status.
    fn list_quizzes(&self, status: Option<QuizStatus>) -> RepoResult<Vec<Quiz>>;
    fn delete_quiz(&self, id: QuizId) -> RepoResult<()>;
    /// Replaces the full question set of a quiz.
    fn set_questions(&self, quiz_id: QuizId, question_ids: &[QuestionId]) -> RepoResult<()>;
    fn question_ids(&self, quiz_id: QuizId) -> RepoResult<Vec<QuestionId>>;
    /// Active questions of a quiz, optionally of one difficulty, ordered by id.
    fn live_questions(
        &self,
        quiz_id: QuizId,
        difficulty: Option<Difficulty>,
    ) -> RepoResult<Vec<Question>>;
}

/// SQLite-backed quiz repository.
pub struct SqliteQuizRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteQuizRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_one(&self, where_sql: &str, value: Value) -> RepoResult<Option<Quiz>> {
        let row = self
            .conn
            .query_row(
                &format!("{QUIZ_SELECT_SQL} WHERE {where_sql};"),
                [value],
                |row| Ok(parse_quiz_row(row)),
            )
            .optional()?;
        row.transpose()
    }
}

impl QuizRepository for SqliteQuizRepository<'_> {
    fn create_quiz(&self, quiz: &NewQuiz, actor: Option<UserId>) -> RepoResult<Quiz> {
        quiz.validate()?;

        self.conn
            .execute(
                "INSERT INTO quizzes (name, slug, description, status, creator_id, editor_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
                params![
                    quiz.name.trim(),
                    quiz.slug.as_str(),
                    quiz.description.as_str(),
                    quiz.status.value(),
                    actor,
                ],
            )
            .map_err(|err| {
                map_write_error(err, || format!("quiz slug `{}` is already in use", quiz.slug))
            })?;

        let id = self.conn.last_insert_rowid();
        self.get_quiz(id)?
            .ok_or(RepoError::NotFound { entity: "quiz", id })
    }

    fn update_quiz(&self, id: QuizId, quiz: &NewQuiz, actor: Option<UserId>) -> RepoResult<Quiz> {
        quiz.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE quizzes
                 SET
                    name = ?1,
                    slug = ?2,
                    description = ?3,
                    status = ?4,
                    editor_id = ?5,
                    modified_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?6;",
                params![
                    quiz.name.trim(),
                    quiz.slug.as_str(),
                    quiz.description.as_str(),
                    quiz.status.value(),
                    actor,
                    id,
                ],
            )
            .map_err(|err| {
                map_write_error(err, || format!("quiz slug `{}` is already in use", quiz.slug))
            })?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "quiz", id });
        }

        self.get_quiz(id)?
            .ok_or(RepoError::NotFound { entity: "quiz", id })
    }

    fn set_status(&self, id: QuizId, status: QuizStatus, actor: Option<UserId>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE quizzes
             SET
                status = ?1,
                editor_id = ?2,
                modified_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?3;",
            params![status.value(), actor, id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "quiz", id });
        }
        Ok(())
    }

    fn get_quiz(&self, id: QuizId) -> RepoResult<Option<Quiz>> {
        self.query_one("id = ?1", Value::Integer(id))
    }

    fn get_quiz_by_slug(&self, slug: &str) -> RepoResult<Option<Quiz>> {
        self.query_one("slug = ?1", Value::Text(slug.to_string()))
    }

    fn get_takeable_by_slug(&self, slug: &str) -> RepoResult<Option<Quiz>> {
        let quiz = self.get_quiz_by_slug(slug)?;
        Ok(quiz.filter(|quiz| quiz.status != QuizStatus::Closed))
    }

    fn list_quizzes(&self, status: Option<QuizStatus>) -> RepoResult<Vec<Quiz>> {
        let mut stmt = self.conn.prepare(&format!(
            "{QUIZ_SELECT_SQL}
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([status.map(QuizStatus::value)])?;
        let mut quizzes = Vec::new();
        while let Some(row) = rows.next()? {
            quizzes.push(parse_quiz_row(row)?);
        }
        Ok(quizzes)
    }

    fn delete_quiz(&self, id: QuizId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM quizzes WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "quiz", id });
        }
        Ok(())
    }

    fn set_questions(&self, quiz_id: QuizId, question_ids: &[QuestionId]) -> RepoResult<()> {
        in_transaction(self.conn, |conn| {
            let exists: i64 = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM quizzes WHERE id = ?1);",
                [quiz_id],
                |row| row.get(0),
            )?;
            if exists == 0 {
                return Err(RepoError::NotFound { entity: "quiz", id: quiz_id });
            }

            conn.execute("DELETE FROM quiz_questions WHERE quiz_id = ?1;", [quiz_id])?;
            for question_id in question_ids {
                conn.execute(
                    "INSERT OR IGNORE INTO quiz_questions (quiz_id, question_id) VALUES (?1, ?2);",
                    params![quiz_id, question_id],
                )
                .map_err(|err| {
                    map_write_error(err, || format!("question {question_id} does not exist"))
                })?;
            }
            conn.execute(
                "UPDATE quizzes SET modified_at = (strftime('%s', 'now') * 1000) WHERE id = ?1;",
                [quiz_id],
            )?;
            Ok(())
        })
    }

    fn question_ids(&self, quiz_id: QuizId) -> RepoResult<Vec<QuestionId>> {
        let mut stmt = self.conn.prepare(
            "SELECT question_id FROM quiz_questions WHERE quiz_id = ?1 ORDER BY question_id ASC;",
        )?;
        let mut rows = stmt.query([quiz_id])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }

    fn live_questions(
        &self,
        quiz_id: QuizId,
        difficulty: Option<Difficulty>,
    ) -> RepoResult<Vec<Question>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                q.id,
                q.question,
                q.difficulty,
                q.is_active,
                q.created_at,
                q.modified_at,
                q.creator_id,
                q.editor_id
             FROM questions q
             INNER JOIN quiz_questions qq ON qq.question_id = q.id
             WHERE qq.quiz_id = ?1
               AND q.is_active = 1
               AND (?2 IS NULL OR q.difficulty = ?2)
             ORDER BY q.id ASC;",
        )?;
        let mut rows = stmt.query(params![quiz_id, difficulty.map(Difficulty::value)])?;
        let mut questions = Vec::new();
        while let Some(row) = rows.next()? {
            questions.push(parse_question_row(row)?);
        }
        Ok(questions)
    }
}

pub(crate) fn parse_quiz_row(row: &Row<'_>) -> RepoResult<Quiz> {
    let raw_status: i64 = row.get("status")?;
    let status = QuizStatus::from_value(raw_status).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{raw_status}` in quizzes.status"))
    })?;

    Ok(Quiz {
        id: row.get("id")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
        description: row.get("description")?,
        status,
        audit: parse_audit(row)?,
    })
}
