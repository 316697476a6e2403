//! Quiz model.
//!
//! # Invariants
//! - `slug` is unique and matches `[-a-zA-Z0-9_]+`.
//! - Only `Live` quizzes are listed; `Closed` quizzes cannot be taken.

use crate::model::audit::Audit;
use crate::model::validation::{
    require_max_chars, require_text, validate_slug, ValidationError, QUIZ_NAME_MAX_CHARS,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type QuizId = i64;

/// Publication state of a quiz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    Live,
    #[default]
    Draft,
    Closed,
}

impl QuizStatus {
    pub fn value(self) -> i64 {
        match self {
            Self::Live => 1,
            Self::Draft => 2,
            Self::Closed => 3,
        }
    }

    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Live),
            2 => Some(Self::Draft),
            3 => Some(Self::Closed),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Live => "Live",
            Self::Draft => "Draft",
            Self::Closed => "Closed",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "live" => Some(Self::Live),
            "draft" => Some(Self::Draft),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Persisted quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: QuizId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub status: QuizStatus,
    pub audit: Audit,
}

impl Quiz {
    /// Path of the quiz detail (wizard) page.
    pub fn absolute_url(&self) -> String {
        crate::web::urls::quiz_detail(&self.slug)
    }

    pub fn is_live(&self) -> bool {
        self.status == QuizStatus::Live
    }
}

impl Display for Quiz {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Input for creating or replacing a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuiz {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub status: QuizStatus,
}

impl NewQuiz {
    /// Builds a draft quiz whose slug is derived from `name`.
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = crate::model::validation::slugify(&name);
        Self {
            name,
            slug,
            description: String::new(),
            status: QuizStatus::Draft,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_max_chars("name", &self.name, QUIZ_NAME_MAX_CHARS)?;
        validate_slug(&self.slug)
    }
}
