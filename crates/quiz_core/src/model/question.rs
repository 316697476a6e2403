//! Multiple choice question model.
//!
//! # Invariants
//! - Question text is never blank.
//! - Difficulty is persisted as its raw integer (`1`, `10`, `20`).

use crate::model::audit::Audit;
use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Storage-assigned question identifier.
pub type QuestionId = i64;

/// Difficulty bucket; each bucket is one wizard page.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Page order used by the quiz wizard.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn value(self) -> i64 {
        match self {
            Self::Easy => 1,
            Self::Medium => 10,
            Self::Hard => 20,
        }
    }

    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Easy),
            10 => Some(Self::Medium),
            20 => Some(Self::Hard),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    /// Form prefix for this difficulty's wizard page.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Returns the display name for a raw difficulty value, if known.
pub fn get_display_name(difficulty: i64) -> Option<&'static str> {
    Difficulty::from_value(difficulty).map(Difficulty::display_name)
}

/// Persisted question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub question: String,
    pub difficulty: Difficulty,
    pub is_active: bool,
    pub audit: Audit,
}

impl Display for Question {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.question)
    }
}

/// Input for creating or replacing a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question: String,
    pub difficulty: Difficulty,
    pub is_active: bool,
}

impl NewQuestion {
    pub fn new(question: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            question: question.into(),
            difficulty,
            is_active: true,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("question", &self.question)
    }
}

#[cfg(test)]
mod tests {
    use super::{get_display_name, Difficulty, NewQuestion};

    #[test]
    fn difficulty_values_match_storage_contract() {
        for difficulty in Difficulty::ALL {
            assert_eq!(Difficulty::from_value(difficulty.value()), Some(difficulty));
        }
        assert_eq!(Difficulty::Medium.value(), 10);
        assert_eq!(Difficulty::default(), Difficulty::Easy);
    }

    #[test]
    fn display_name_lookup_handles_unknown_values() {
        assert_eq!(get_display_name(1), Some("Easy"));
        assert_eq!(get_display_name(20), Some("Hard"));
        assert_eq!(get_display_name(5), None);
    }

    #[test]
    fn blank_question_is_rejected() {
        assert!(NewQuestion::new("  ", Difficulty::Easy).validate().is_err());
        assert!(NewQuestion::new("2 + 2?", Difficulty::Easy).validate().is_ok());
    }
}
