//! Back-office registrations for the quiz models.
//!
//! # Responsibility
//! - Describe how each model is listed, searched, filtered and edited.
//! - Provide changelist queries and save operations for staff.
//!
//! # Invariants
//! - Only fields named in `list_editable` can be changed from a changelist.
//! - Audit `creator`/`editor` stamps are only ever staff user ids.
//! - A question carries at most `ANSWER_INLINE.max_num` answers.

pub mod changelist;
pub mod edit;

use crate::model::question::Difficulty;
use crate::model::quiz::QuizStatus;
use crate::model::user::{User, UserId};
use crate::repo::error::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Audit fields shown read-only on every change form.
pub const AUDIT_READONLY_FIELDS: &[&str] = &["creator", "editor", "created_at", "modified_at"];

/// Child rows edited together with their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineAdmin {
    pub model: &'static str,
    /// Blank rows offered on a new parent.
    pub extra: usize,
    pub max_num: usize,
}

/// Declarative admin registration of one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelAdmin {
    pub model: &'static str,
    pub list_display: &'static [&'static str],
    pub list_editable: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub list_filter: &'static [&'static str],
    pub date_hierarchy: &'static str,
    pub readonly_fields: &'static [&'static str],
    /// `(target, source)` pairs filled from another field when left blank.
    pub prepopulated_fields: &'static [(&'static str, &'static str)],
    pub inline: Option<InlineAdmin>,
}

impl ModelAdmin {
    pub fn is_editable(&self, field: &str) -> bool {
        self.list_editable.contains(&field)
    }

    pub fn has_filter(&self, field: &str) -> bool {
        self.list_filter.contains(&field)
    }
}

pub const ANSWER_INLINE: InlineAdmin = InlineAdmin {
    model: "answer",
    extra: 3,
    max_num: 3,
};

pub const QUESTION_ADMIN: ModelAdmin = ModelAdmin {
    model: "question",
    list_display: &["question", "difficulty", "creator", "created_at", "is_active"],
    list_editable: &["is_active", "difficulty"],
    search_fields: &["question"],
    list_filter: &["is_active", "creator"],
    date_hierarchy: "created_at",
    readonly_fields: AUDIT_READONLY_FIELDS,
    prepopulated_fields: &[],
    inline: Some(ANSWER_INLINE),
};

pub const ANSWER_ADMIN: ModelAdmin = ModelAdmin {
    model: "answer",
    list_display: &["answer", "creator", "created_at", "is_active"],
    list_editable: &["is_active"],
    search_fields: &["answer"],
    list_filter: &["is_active", "creator"],
    date_hierarchy: "created_at",
    readonly_fields: AUDIT_READONLY_FIELDS,
    prepopulated_fields: &[],
    inline: None,
};

pub const QUIZ_ADMIN: ModelAdmin = ModelAdmin {
    model: "quiz",
    list_display: &["name", "creator", "created_at", "status"],
    list_editable: &["status"],
    search_fields: &["name"],
    list_filter: &["status", "creator"],
    date_hierarchy: "created_at",
    readonly_fields: AUDIT_READONLY_FIELDS,
    prepopulated_fields: &[("slug", "name")],
    inline: None,
};

pub const QUIZ_RESULT_ADMIN: ModelAdmin = ModelAdmin {
    model: "quizresult",
    list_display: &["quiz", "user", "email", "created_at", "score", "maximum_score"],
    list_editable: &[],
    search_fields: &["user__first_name", "user__last_name", "user__email", "email"],
    list_filter: &["created_at"],
    date_hierarchy: "created_at",
    readonly_fields: AUDIT_READONLY_FIELDS,
    prepopulated_fields: &[],
    inline: None,
};

/// Every registered model admin.
pub fn registry() -> [&'static ModelAdmin; 4] {
    [&QUESTION_ADMIN, &ANSWER_ADMIN, &QUIZ_ADMIN, &QUIZ_RESULT_ADMIN]
}

pub fn find_admin(model: &str) -> Option<&'static ModelAdmin> {
    registry()
        .into_iter()
        .find(|admin| admin.model.eq_ignore_ascii_case(model))
}

/// Id recorded as creator/editor for a save by `user`.
pub fn audit_actor(user: &User) -> Option<UserId> {
    user.is_staff.then_some(user.id)
}

/// Admin operation error.
#[derive(Debug)]
pub enum AdminError {
    UnknownModel(String),
    /// Field is not in the model's `list_editable`.
    NotEditable {
        model: &'static str,
        field: String,
    },
    /// Filter is not in the model's `list_filter`.
    UnknownFilter {
        model: &'static str,
        filter: String,
    },
    InvalidValue {
        field: String,
        value: String,
    },
    TooManyInlines {
        model: &'static str,
        max_num: usize,
        submitted: usize,
    },
    Repo(RepoError),
}

impl Display for AdminError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownModel(model) => write!(f, "no admin registered for `{model}`"),
            Self::NotEditable { model, field } => {
                write!(f, "`{field}` is not list-editable on {model}")
            }
            Self::UnknownFilter { model, filter } => {
                write!(f, "`{filter}` is not a list filter of {model}")
            }
            Self::InvalidValue { field, value } => {
                write!(f, "invalid value for `{field}`: `{value}`")
            }
            Self::TooManyInlines {
                model,
                max_num,
                submitted,
            } => write!(
                f,
                "at most {max_num} {model} rows allowed, got {submitted}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AdminError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AdminError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for AdminError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

pub type AdminResult<T> = Result<T, AdminError>;

pub(crate) fn parse_bool(field: &str, value: &str) -> AdminResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid_value(field, value)),
    }
}

/// Accepts the stored value (`1`) or the display name (`Live`).
pub(crate) fn parse_status(value: &str) -> AdminResult<QuizStatus> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(QuizStatus::from_value)
        .or_else(|| QuizStatus::from_name(value))
        .ok_or_else(|| invalid_value("status", value))
}

/// Accepts the stored value (`10`) or the display name (`Medium`).
pub(crate) fn parse_difficulty(value: &str) -> AdminResult<Difficulty> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(Difficulty::from_value)
        .or_else(|| Difficulty::from_name(value))
        .ok_or_else(|| invalid_value("difficulty", value))
}

pub(crate) fn invalid_value(field: &str, value: &str) -> AdminError {
    AdminError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}
