//! Account record referenced by quiz results and audit metadata.

use crate::model::validation::{require_text, validate_email, ValidationError};
use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// Registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Input for registering an account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
}

impl NewUser {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    /// Email may be empty; a non-empty email must be well formed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("username", &self.username)?;
        if !self.email.is_empty() {
            validate_email(&self.email)?;
        }
        Ok(())
    }
}
