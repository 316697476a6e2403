//! Change-form saves and changelist edits.
//!
//! # Invariants
//! - Every save stamps `editor` (and `creator` on insert) with the acting
//!   user's id when that user is staff.
//! - Inline answer changes are applied in one transaction with their question,
//!   joining the caller's transaction when one is open.

use crate::admin::{
    audit_actor, find_admin, parse_bool, parse_difficulty, parse_status, AdminError, AdminResult,
    ANSWER_INLINE,
};
use crate::model::answer::{Answer, AnswerId, AnswerScore, NewAnswer};
use crate::model::question::{NewQuestion, Question, QuestionId};
use crate::model::quiz::{NewQuiz, Quiz, QuizId, QuizStatus};
use crate::model::user::User;
use crate::model::validation::slugify;
use crate::repo::answer_repo::AnswerRepository;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::question_repo::QuestionRepository;
use crate::repo::quiz_repo::QuizRepository;
use crate::repo::{in_transaction, Store};
use log::info;

/// One answer row of the question change form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAnswer {
    /// Existing answer to change; `None` adds a new one.
    pub id: Option<AnswerId>,
    pub answer: String,
    pub score: AnswerScore,
    pub is_active: bool,
    /// Removes the existing answer.
    pub delete: bool,
}

impl InlineAnswer {
    pub fn new(answer: impl Into<String>, score: AnswerScore) -> Self {
        Self {
            id: None,
            answer: answer.into(),
            score,
            is_active: true,
            delete: false,
        }
    }
}

/// Question change form with its answer inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionChange {
    pub question: NewQuestion,
    pub answers: Vec<InlineAnswer>,
}

/// Quiz change form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizChange {
    pub name: String,
    /// Filled from `name` when blank.
    pub slug: String,
    pub description: String,
    pub status: QuizStatus,
    pub question_ids: Vec<QuestionId>,
}

impl QuizChange {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: String::new(),
            description: String::new(),
            status: QuizStatus::default(),
            question_ids: Vec::new(),
        }
    }

    fn to_new_quiz(&self) -> NewQuiz {
        let slug = if self.slug.trim().is_empty() {
            slugify(&self.name)
        } else {
            self.slug.trim().to_string()
        };
        NewQuiz {
            name: self.name.clone(),
            slug,
            description: self.description.clone(),
            status: self.status,
        }
    }
}

/// Saves a question and its inline answers.
///
/// `id` selects an existing question; `None` creates one.
pub fn save_question(
    store: &Store<'_>,
    id: Option<QuestionId>,
    change: &QuestionChange,
    user: &User,
) -> AdminResult<Question> {
    let actor = audit_actor(user);
    let (question, count) = in_transaction(store.connection(), |_| -> AdminResult<_> {
        let questions = store.questions();
        let answers = store.answers();
        let question = match id {
            Some(id) => questions.update_question(id, &change.question, actor)?,
            None => questions.create_question(&change.question, actor)?,
        };

        for row in &change.answers {
            match row.id {
                Some(answer_id) => {
                    let existing = owned_answer(&answers, question.id, answer_id)?;
                    if row.delete {
                        answers.delete_answer(existing.id)?;
                    } else {
                        answers.update_answer(
                            existing.id,
                            &inline_to_new(question.id, row),
                            actor,
                        )?;
                    }
                }
                None if row.delete || row.answer.trim().is_empty() => {}
                None => {
                    answers.create_answer(&inline_to_new(question.id, row), actor)?;
                }
            }
        }

        let count = answers.answers_for_question(question.id, false)?.len();
        if count > ANSWER_INLINE.max_num {
            return Err(AdminError::TooManyInlines {
                model: ANSWER_INLINE.model,
                max_num: ANSWER_INLINE.max_num,
                submitted: count,
            });
        }
        Ok((question, count))
    })?;

    info!(
        "event=admin_save module=admin status=ok model=question id={} answers={}",
        question.id, count
    );
    Ok(question)
}

/// Saves a standalone answer.
pub fn save_answer(
    store: &Store<'_>,
    id: Option<AnswerId>,
    answer: &NewAnswer,
    user: &User,
) -> AdminResult<Answer> {
    let actor = audit_actor(user);
    let repo = store.answers();
    let saved = match id {
        Some(id) => repo.update_answer(id, answer, actor)?,
        None => repo.create_answer(answer, actor)?,
    };
    info!(
        "event=admin_save module=admin status=ok model=answer id={}",
        saved.id
    );
    Ok(saved)
}

/// Saves a quiz and replaces its question set.
pub fn save_quiz(
    store: &Store<'_>,
    id: Option<QuizId>,
    change: &QuizChange,
    user: &User,
) -> AdminResult<Quiz> {
    let actor = audit_actor(user);
    let repo = store.quizzes();
    let new_quiz = change.to_new_quiz();
    let quiz = in_transaction(store.connection(), |_| -> RepoResult<Quiz> {
        let quiz = match id {
            Some(id) => repo.update_quiz(id, &new_quiz, actor)?,
            None => repo.create_quiz(&new_quiz, actor)?,
        };
        repo.set_questions(quiz.id, &change.question_ids)?;
        Ok(quiz)
    })?;
    info!(
        "event=admin_save module=admin status=ok model=quiz id={} questions={}",
        quiz.id,
        change.question_ids.len()
    );
    Ok(quiz)
}

/// Changes one `list_editable` field of a changelist row.
pub fn list_edit(
    store: &Store<'_>,
    model: &str,
    id: i64,
    field: &str,
    value: &str,
    user: &User,
) -> AdminResult<()> {
    let admin = find_admin(model).ok_or_else(|| AdminError::UnknownModel(model.to_string()))?;
    if !admin.is_editable(field) {
        return Err(AdminError::NotEditable {
            model: admin.model,
            field: field.to_string(),
        });
    }
    let actor = audit_actor(user);

    match admin.model {
        "question" => {
            let repo = store.questions();
            let current = repo
                .get_question(id)?
                .ok_or(RepoError::NotFound { entity: "question", id })?;
            let mut change = NewQuestion {
                question: current.question,
                difficulty: current.difficulty,
                is_active: current.is_active,
            };
            if field == "is_active" {
                change.is_active = parse_bool(field, value)?;
            } else {
                change.difficulty = parse_difficulty(value)?;
            }
            repo.update_question(id, &change, actor)?;
        }
        "answer" => {
            let repo = store.answers();
            let current = repo
                .get_answer(id)?
                .ok_or(RepoError::NotFound { entity: "answer", id })?;
            let change = NewAnswer {
                question_id: current.question_id,
                answer: current.answer,
                score: current.score,
                is_active: parse_bool(field, value)?,
            };
            repo.update_answer(id, &change, actor)?;
        }
        "quiz" => {
            store.quizzes().set_status(id, parse_status(value)?, actor)?;
        }
        _ => {
            return Err(AdminError::NotEditable {
                model: admin.model,
                field: field.to_string(),
            })
        }
    }

    info!(
        "event=admin_list_edit module=admin status=ok model={} id={} field={}",
        admin.model, id, field
    );
    Ok(())
}

fn owned_answer<R: AnswerRepository>(
    answers: &R,
    question_id: QuestionId,
    answer_id: AnswerId,
) -> AdminResult<Answer> {
    match answers.get_answer(answer_id)? {
        Some(answer) if answer.question_id == question_id => Ok(answer),
        _ => Err(RepoError::NotFound {
            entity: "answer",
            id: answer_id,
        }
        .into()),
    }
}

fn inline_to_new(question_id: QuestionId, row: &InlineAnswer) -> NewAnswer {
    NewAnswer {
        question_id,
        answer: row.answer.clone(),
        score: row.score,
        is_active: row.is_active,
    }
}
