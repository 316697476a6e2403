//! Bulk import of quizzes, questions and answers from fixture documents.
//!
//! # Responsibility
//! - Deserialize catalog fixtures (any serde format) into storage writes.
//! - Import each quiz with its questions and answers atomically.
//!
//! # Invariants
//! - A quiz whose slug already exists is skipped, never overwritten.
//! - Questions and answers of a fixture quiz are always created fresh.

use crate::model::answer::{AnswerScore, NewAnswer};
use crate::model::question::{Difficulty, NewQuestion, QuestionId};
use crate::model::quiz::{NewQuiz, QuizStatus};
use crate::model::user::UserId;
use crate::model::validation::slugify;
use crate::repo::answer_repo::AnswerRepository;
use crate::repo::error::RepoResult;
use crate::repo::in_transaction;
use crate::repo::question_repo::QuestionRepository;
use crate::repo::quiz_repo::QuizRepository;
use crate::repo::Store;
use log::info;
use serde::{Deserialize, Serialize};

/// Root fixture document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFixture {
    #[serde(default)]
    pub quizzes: Vec<QuizFixture>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizFixture {
    pub name: String,
    /// Derived from `name` when omitted.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: QuizStatus,
    #[serde(default)]
    pub questions: Vec<QuestionFixture>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionFixture {
    pub question: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub answers: Vec<AnswerFixture>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerFixture {
    pub answer: String,
    #[serde(default)]
    pub correct: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Counts of what an import wrote or skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub quizzes: usize,
    pub questions: usize,
    pub answers: usize,
    pub skipped_quizzes: usize,
}

/// Imports every quiz of `fixture`.
///
/// `actor` is stamped as creator on every written row.
pub fn import_catalog(
    store: &Store<'_>,
    fixture: &CatalogFixture,
    actor: Option<UserId>,
) -> RepoResult<ImportSummary> {
    let mut summary = ImportSummary::default();
    for quiz in &fixture.quizzes {
        let slug = quiz
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
            .map_or_else(|| slugify(&quiz.name), str::to_string);

        if store.quizzes().get_quiz_by_slug(&slug)?.is_some() {
            info!(
                "event=catalog_import module=service status=skipped slug={}",
                slug
            );
            summary.skipped_quizzes += 1;
            continue;
        }

        let (questions, answers) = in_transaction(store.connection(), |_| {
            import_quiz(store, quiz, slug.clone(), actor)
        })?;
        summary.quizzes += 1;
        summary.questions += questions;
        summary.answers += answers;
        info!(
            "event=catalog_import module=service status=ok slug={} questions={} answers={}",
            slug, questions, answers
        );
    }
    Ok(summary)
}

fn import_quiz(
    store: &Store<'_>,
    fixture: &QuizFixture,
    slug: String,
    actor: Option<UserId>,
) -> RepoResult<(usize, usize)> {
    let questions_repo = store.questions();
    let answers_repo = store.answers();

    let mut question_ids: Vec<QuestionId> = Vec::with_capacity(fixture.questions.len());
    let mut answer_count = 0;
    for question in &fixture.questions {
        let created = questions_repo.create_question(
            &NewQuestion {
                question: question.question.clone(),
                difficulty: question.difficulty,
                is_active: question.is_active,
            },
            actor,
        )?;
        for answer in &question.answers {
            let score = if answer.correct {
                AnswerScore::Correct
            } else {
                AnswerScore::Incorrect
            };
            let mut new_answer = NewAnswer::new(created.id, answer.answer.clone(), score);
            new_answer.is_active = answer.is_active;
            answers_repo.create_answer(&new_answer, actor)?;
            answer_count += 1;
        }
        question_ids.push(created.id);
    }

    let quizzes = store.quizzes();
    let quiz = quizzes.create_quiz(
        &NewQuiz {
            name: fixture.name.clone(),
            slug,
            description: fixture.description.clone(),
            status: fixture.status,
        },
        actor,
    )?;
    quizzes.set_questions(quiz.id, &question_ids)?;
    Ok((question_ids.len(), answer_count))
}
