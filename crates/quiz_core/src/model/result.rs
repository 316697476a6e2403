//! Quiz result snapshot model.
//!
//! # Responsibility
//! - Store the score of one completed attempt for a user or an anonymous
//!   email address.
//!
//! # Invariants
//! - `score` and `maximum_score` are snapshots; later edits to answers,
//!   questions or the quiz do not change them.
//! - `answer_ids` are the answers chosen by the taker and may no longer
//!   reflect the quiz once it has been edited.

use crate::model::answer::AnswerId;
use crate::model::audit::Audit;
use crate::model::quiz::{Quiz, QuizId};
use crate::model::user::{User, UserId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type QuizResultId = i64;

const DISPLAY_TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Persisted quiz result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: QuizResultId,
    pub quiz_id: QuizId,
    pub user_id: Option<UserId>,
    /// Empty only when the result was recorded for a user with no email.
    pub email: String,
    pub answer_ids: Vec<AnswerId>,
    pub score: u32,
    pub maximum_score: u32,
    pub audit: Audit,
}

impl QuizResult {
    /// Ratio of score to maximum as a percentage, when a maximum exists.
    pub fn percentage(&self) -> Option<f64> {
        if self.maximum_score == 0 {
            return None;
        }
        Some(f64::from(self.score) / f64::from(self.maximum_score) * 100.0)
    }
}

/// Input for recording a finished attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuizResult {
    pub quiz_id: QuizId,
    pub user_id: Option<UserId>,
    pub email: String,
    pub answer_ids: Vec<AnswerId>,
    pub score: u32,
    pub maximum_score: u32,
}

/// Result joined with its quiz and optional taker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizResultDetail {
    pub result: QuizResult,
    pub quiz: Quiz,
    pub user: Option<User>,
}

impl QuizResultDetail {
    /// Username when the result belongs to an account, email otherwise.
    pub fn taker_name(&self) -> &str {
        match self.user.as_ref() {
            Some(user) if !user.username.is_empty() => user.username.as_str(),
            _ => self.result.email.as_str(),
        }
    }

    /// Path of the completion page for this result.
    pub fn absolute_url(&self) -> String {
        crate::web::urls::quiz_completed(&self.quiz.slug, self.result.id)
    }
}

impl Display for QuizResultDetail {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {}: ({})",
            self.taker_name(),
            self.quiz,
            self.result
                .audit
                .created_datetime()
                .format(DISPLAY_TIMESTAMP_FORMAT)
        )
    }
}
