//! Core domain logic for quizkit: multiple-choice quizzes taken page by page
//! across three difficulty levels.
//! This crate is the single source of truth for scoring and result rules.

pub mod admin;
pub mod db;
pub mod filters;
pub mod forms;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod signals;
pub mod web;
pub mod wizard;

pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::answer::{Answer, AnswerId, AnswerScore, NewAnswer};
pub use model::question::{Difficulty, NewQuestion, Question, QuestionId};
pub use model::quiz::{NewQuiz, Quiz, QuizId, QuizStatus};
pub use model::result::{NewQuizResult, QuizResult, QuizResultDetail, QuizResultId};
pub use model::user::{NewUser, User, UserId};
pub use model::validation::ValidationError;
pub use repo::error::{RepoError, RepoResult};
pub use repo::Store;
pub use rusqlite::Connection;
pub use signals::{start_listening, stop_listening, UserSignals};
pub use wizard::{QuizWizard, Taker, WizardOutcome, WizardState};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
