//! Answer repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `answers`.
//! - Aggregate queries over an [`AnswerSet`]: total score, maximum
//!   achievable score, correct/incorrect filtering.
//!
//! # Invariants
//! - The score of an empty set is `0`.
//! - Maximum score counts each question once, using its best answer.

use crate::db::{bool_to_int, in_placeholders};
use crate::model::answer::{Answer, AnswerId, AnswerScore, NewAnswer};
use crate::model::question::QuestionId;
use crate::model::user::UserId;
use crate::repo::error::{map_write_error, RepoError, RepoResult};
use crate::repo::{parse_audit, parse_count, parse_flag};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

pub(crate) const ANSWER_SELECT_SQL: &str = "SELECT
    id,
    question_id,
    answer,
    score,
    is_active,
    created_at,
    modified_at,
    creator_id,
    editor_id
FROM answers";

/// Selection of answers used by aggregate queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerSet {
    /// Exactly these answers.
    Ids(Vec<AnswerId>),
    /// Every answer of these questions.
    ForQuestions(Vec<QuestionId>),
}

impl AnswerSet {
    fn is_empty(&self) -> bool {
        match self {
            Self::Ids(ids) => ids.is_empty(),
            Self::ForQuestions(ids) => ids.is_empty(),
        }
    }

    fn where_clause(&self) -> (String, Vec<Value>) {
        let (column, ids) = match self {
            Self::Ids(ids) => ("id", ids),
            Self::ForQuestions(ids) => ("question_id", ids),
        };
        (
            format!("{column} IN ({})", in_placeholders(ids.len())),
            ids.iter().map(|id| Value::Integer(*id)).collect(),
        )
    }
}

/// Repository interface for answer operations.
pub trait AnswerRepository {
    fn create_answer(&self, answer: &NewAnswer, actor: Option<UserId>) -> RepoResult<Answer>;
    fn update_answer(
        &self,
        id: AnswerId,
        answer: &NewAnswer,
        actor: Option<UserId>,
    ) -> RepoResult<Answer>;
    fn get_answer(&self, id: AnswerId) -> RepoResult<Option<Answer>>;
    fn delete_answer(&self, id: AnswerId) -> RepoResult<()>;
    /// Answers of one question ordered by id.
    fn answers_for_question(
        &self,
        question_id: QuestionId,
        live_only: bool,
    ) -> RepoResult<Vec<Answer>>;
    /// Members of `set`, optionally restricted to one score, ordered by id.
    fn list_answers(&self, set: &AnswerSet, score: Option<AnswerScore>)
        -> RepoResult<Vec<Answer>>;
    /// Total score of the answers in `set`.
    fn score(&self, set: &AnswerSet) -> RepoResult<u32>;
    /// Best achievable score: sum of the top answer score per question.
    fn maximum_score(&self, set: &AnswerSet) -> RepoResult<u32>;
}

/// SQLite-backed answer repository.
pub struct SqliteAnswerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAnswerRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Correct members of `set`.
    pub fn correct(&self, set: &AnswerSet) -> RepoResult<Vec<Answer>> {
        self.list_answers(set, Some(AnswerScore::Correct))
    }

    /// Incorrect members of `set`.
    pub fn incorrect(&self, set: &AnswerSet) -> RepoResult<Vec<Answer>> {
        self.list_answers(set, Some(AnswerScore::Incorrect))
    }
}

impl AnswerRepository for SqliteAnswerRepository<'_> {
    fn create_answer(&self, answer: &NewAnswer, actor: Option<UserId>) -> RepoResult<Answer> {
        answer.validate()?;

        self.conn
            .execute(
                "INSERT INTO answers (question_id, answer, score, is_active, creator_id, editor_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
                params![
                    answer.question_id,
                    answer.answer.as_str(),
                    answer.score.value(),
                    bool_to_int(answer.is_active),
                    actor,
                ],
            )
            .map_err(|err| {
                map_write_error(err, || {
                    format!(
                        "question {} already has answer `{}` or does not exist",
                        answer.question_id, answer.answer
                    )
                })
            })?;

        let id = self.conn.last_insert_rowid();
        self.get_answer(id)?
            .ok_or(RepoError::NotFound { entity: "answer", id })
    }

    fn update_answer(
        &self,
        id: AnswerId,
        answer: &NewAnswer,
        actor: Option<UserId>,
    ) -> RepoResult<Answer> {
        answer.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE answers
                 SET
                    question_id = ?1,
                    answer = ?2,
                    score = ?3,
                    is_active = ?4,
                    editor_id = ?5,
                    modified_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?6;",
                params![
                    answer.question_id,
                    answer.answer.as_str(),
                    answer.score.value(),
                    bool_to_int(answer.is_active),
                    actor,
                    id,
                ],
            )
            .map_err(|err| {
                map_write_error(err, || {
                    format!(
                        "question {} already has answer `{}`",
                        answer.question_id, answer.answer
                    )
                })
            })?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "answer", id });
        }

        self.get_answer(id)?
            .ok_or(RepoError::NotFound { entity: "answer", id })
    }

    fn get_answer(&self, id: AnswerId) -> RepoResult<Option<Answer>> {
        let row = self
            .conn
            .query_row(
                &format!("{ANSWER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_answer_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn delete_answer(&self, id: AnswerId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM answers WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "answer", id });
        }
        Ok(())
    }

    fn answers_for_question(
        &self,
        question_id: QuestionId,
        live_only: bool,
    ) -> RepoResult<Vec<Answer>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ANSWER_SELECT_SQL}
             WHERE question_id = ?1
               AND (?2 = 0 OR is_active = 1)
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query(params![question_id, bool_to_int(live_only)])?;
        let mut answers = Vec::new();
        while let Some(row) = rows.next()? {
            answers.push(parse_answer_row(row)?);
        }
        Ok(answers)
    }

    fn list_answers(
        &self,
        set: &AnswerSet,
        score: Option<AnswerScore>,
    ) -> RepoResult<Vec<Answer>> {
        if set.is_empty() {
            return Ok(Vec::new());
        }

        let (clause, mut bind_values) = set.where_clause();
        let mut sql = format!("{ANSWER_SELECT_SQL} WHERE {clause}");
        if let Some(score) = score {
            sql.push_str(" AND score = ?");
            bind_values.push(Value::Integer(score.value()));
        }
        sql.push_str(" ORDER BY id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut answers = Vec::new();
        while let Some(row) = rows.next()? {
            answers.push(parse_answer_row(row)?);
        }
        Ok(answers)
    }

    fn score(&self, set: &AnswerSet) -> RepoResult<u32> {
        if set.is_empty() {
            return Ok(0);
        }

        let (clause, bind_values) = set.where_clause();
        let total: i64 = self.conn.query_row(
            &format!("SELECT COALESCE(SUM(score), 0) FROM answers WHERE {clause};"),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        parse_count("answers", "score", total)
    }

    fn maximum_score(&self, set: &AnswerSet) -> RepoResult<u32> {
        if set.is_empty() {
            return Ok(0);
        }

        let (clause, bind_values) = set.where_clause();
        let total: i64 = self.conn.query_row(
            &format!(
                "SELECT COALESCE(SUM(top_answer), 0)
                 FROM (
                    SELECT MAX(score) AS top_answer
                    FROM answers
                    WHERE {clause}
                    GROUP BY question_id
                 );"
            ),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        parse_count("answers", "score", total)
    }
}

pub(crate) fn parse_answer_row(row: &Row<'_>) -> RepoResult<Answer> {
    let raw_score: i64 = row.get("score")?;
    let score = AnswerScore::from_value(raw_score).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid score `{raw_score}` in answers.score"))
    })?;

    Ok(Answer {
        id: row.get("id")?,
        question_id: row.get("question_id")?,
        answer: row.get("answer")?,
        score,
        is_active: parse_flag("answers", "is_active", row.get("is_active")?)?,
        audit: parse_audit(row)?,
    })
}
