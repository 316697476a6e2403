//! Field validation shared by quiz models.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const QUIZ_NAME_MAX_CHARS: usize = 255;

static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid slug regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("valid email regex")
});
static NON_SLUG_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slugify regex"));

/// Validation failures raised before any record reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is blank after trim.
    BlankField(&'static str),
    /// Text field exceeds its maximum length.
    TooLong { field: &'static str, max_chars: usize },
    InvalidSlug(String),
    InvalidEmail(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::TooLong { field, max_chars } => {
                write!(f, "{field} must be at most {max_chars} characters")
            }
            Self::InvalidSlug(value) => write!(
                f,
                "invalid slug `{value}`; use letters, numbers, underscores or hyphens"
            ),
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}

pub(crate) fn require_max_chars(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if value.chars().count() > max_chars {
        return Err(ValidationError::TooLong { field, max_chars });
    }
    Ok(())
}

/// Validates a URL slug.
pub fn validate_slug(value: &str) -> Result<(), ValidationError> {
    if SLUG_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidSlug(value.to_string()))
    }
}

/// Returns whether `value` looks like a deliverable email address.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Validates an email address.
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if is_valid_email(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(value.to_string()))
    }
}

/// Derives a slug from a display name.
///
/// Lowercases, collapses every run of non-alphanumeric characters into one
/// `-` and trims hyphens from both ends. Only ASCII letters and digits
/// survive: accented letters are dropped rather than transliterated, so
/// names such as "Café" need an explicit slug to keep their spelling.
pub fn slugify(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    NON_SLUG_CHARS_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
