//! Multiple choice answer model.
//!
//! # Invariants
//! - Every answer belongs to exactly one question.
//! - `(question_id, answer)` is unique in storage.

use crate::model::audit::Audit;
use crate::model::question::QuestionId;
use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type AnswerId = i64;

/// Points awarded for picking an answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerScore {
    #[default]
    Incorrect,
    Correct,
}

impl AnswerScore {
    pub fn value(self) -> i64 {
        match self {
            Self::Incorrect => 0,
            Self::Correct => 1,
        }
    }

    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Incorrect),
            1 => Some(Self::Correct),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Incorrect => "Incorrect",
            Self::Correct => "Correct",
        }
    }
}

/// Persisted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub question_id: QuestionId,
    pub answer: String,
    pub score: AnswerScore,
    pub is_active: bool,
    pub audit: Audit,
}

impl Answer {
    pub fn is_correct(&self) -> bool {
        self.score.value() >= 1
    }
}

impl Display for Answer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.answer)
    }
}

/// Input for creating or replacing an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnswer {
    pub question_id: QuestionId,
    pub answer: String,
    pub score: AnswerScore,
    pub is_active: bool,
}

impl NewAnswer {
    pub fn new(question_id: QuestionId, answer: impl Into<String>, score: AnswerScore) -> Self {
        Self {
            question_id,
            answer: answer.into(),
            score,
            is_active: true,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("answer", &self.answer)
    }
}
