//! Question repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `questions`.
//! - Question-set helpers: the answers of a set and their count.
//!
//! # Invariants
//! - "Live" means `is_active = 1`.
//! - Lists are ordered by `id ASC` so wizard pages are stable.

use crate::db::{bool_to_int, in_placeholders};
use crate::model::answer::Answer;
use crate::model::question::{Difficulty, NewQuestion, Question, QuestionId};
use crate::model::user::UserId;
use crate::repo::answer_repo::{parse_answer_row, ANSWER_SELECT_SQL};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::{parse_audit, parse_flag};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const QUESTION_SELECT_SQL: &str = "SELECT
    id,
    question,
    difficulty,
    is_active,
    created_at,
    modified_at,
    creator_id,
    editor_id
FROM questions";

/// Query options for listing questions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionListQuery {
    /// Only active questions.
    pub live_only: bool,
    pub difficulty: Option<Difficulty>,
    /// Restrict to these ids when set.
    pub ids: Option<Vec<QuestionId>>,
}

/// Repository interface for question operations.
pub trait QuestionRepository {
    fn create_question(&self, question: &NewQuestion, actor: Option<UserId>)
        -> RepoResult<Question>;
    fn update_question(
        &self,
        id: QuestionId,
        question: &NewQuestion,
        actor: Option<UserId>,
    ) -> RepoResult<Question>;
    fn get_question(&self, id: QuestionId) -> RepoResult<Option<Question>>;
    fn list_questions(&self, query: &QuestionListQuery) -> RepoResult<Vec<Question>>;
    fn delete_question(&self, id: QuestionId) -> RepoResult<()>;
    /// All answers belonging to the given questions, ordered by question then id.
    fn answers_for_questions(&self, question_ids: &[QuestionId]) -> RepoResult<Vec<Answer>>;
    /// Count of answers across the given questions.
    fn total_answers(&self, question_ids: &[QuestionId]) -> RepoResult<u64>;
}

/// SQLite-backed question repository.
pub struct SqliteQuestionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteQuestionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl QuestionRepository for SqliteQuestionRepository<'_> {
    fn create_question(
        &self,
        question: &NewQuestion,
        actor: Option<UserId>,
    ) -> RepoResult<Question> {
        question.validate()?;

        self.conn.execute(
            "INSERT INTO questions (question, difficulty, is_active, creator_id, editor_id)
             VALUES (?1, ?2, ?3, ?4, ?4);",
            params![
                question.question.as_str(),
                question.difficulty.value(),
                bool_to_int(question.is_active),
                actor,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_question(id)?
            .ok_or(RepoError::NotFound { entity: "question", id })
    }

    fn update_question(
        &self,
        id: QuestionId,
        question: &NewQuestion,
        actor: Option<UserId>,
    ) -> RepoResult<Question> {
        question.validate()?;

        let changed = self.conn.execute(
            "UPDATE questions
             SET
                question = ?1,
                difficulty = ?2,
                is_active = ?3,
                editor_id = ?4,
                modified_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?5;",
            params![
                question.question.as_str(),
                question.difficulty.value(),
                bool_to_int(question.is_active),
                actor,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "question", id });
        }

        self.get_question(id)?
            .ok_or(RepoError::NotFound { entity: "question", id })
    }

    fn get_question(&self, id: QuestionId) -> RepoResult<Option<Question>> {
        let row = self
            .conn
            .query_row(
                &format!("{QUESTION_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_question_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn list_questions(&self, query: &QuestionListQuery) -> RepoResult<Vec<Question>> {
        let mut sql = format!("{QUESTION_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if query.live_only {
            sql.push_str(" AND is_active = 1");
        }
        if let Some(difficulty) = query.difficulty {
            sql.push_str(" AND difficulty = ?");
            bind_values.push(Value::Integer(difficulty.value()));
        }
        if let Some(ids) = query.ids.as_ref() {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            sql.push_str(&format!(" AND id IN ({})", in_placeholders(ids.len())));
            bind_values.extend(ids.iter().map(|id| Value::Integer(*id)));
        }
        sql.push_str(" ORDER BY id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut questions = Vec::new();
        while let Some(row) = rows.next()? {
            questions.push(parse_question_row(row)?);
        }
        Ok(questions)
    }

    fn delete_question(&self, id: QuestionId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM questions WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "question", id });
        }
        Ok(())
    }

    fn answers_for_questions(&self, question_ids: &[QuestionId]) -> RepoResult<Vec<Answer>> {
        if question_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "{ANSWER_SELECT_SQL} WHERE question_id IN ({}) ORDER BY question_id ASC, id ASC;",
            in_placeholders(question_ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(question_ids.iter()))?;
        let mut answers = Vec::new();
        while let Some(row) = rows.next()? {
            answers.push(parse_answer_row(row)?);
        }
        Ok(answers)
    }

    fn total_answers(&self, question_ids: &[QuestionId]) -> RepoResult<u64> {
        if question_ids.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "SELECT COUNT(*) FROM answers WHERE question_id IN ({});",
            in_placeholders(question_ids.len())
        );
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(question_ids.iter()), |row| {
                row.get(0)
            })?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative answer count `{count}`")))
    }
}

pub(crate) fn parse_question_row(row: &Row<'_>) -> RepoResult<Question> {
    let raw_difficulty: i64 = row.get("difficulty")?;
    let difficulty = Difficulty::from_value(raw_difficulty).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid difficulty `{raw_difficulty}` in questions.difficulty"
        ))
    })?;

    Ok(Question {
        id: row.get("id")?,
        question: row.get("question")?,
        difficulty,
        is_active: parse_flag("questions", "is_active", row.get("is_active")?)?,
        audit: parse_audit(row)?,
    })
}
