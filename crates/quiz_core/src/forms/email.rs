//! Email capture form for anonymous quiz takers.

use crate::forms::{FormData, REQUIRED_MESSAGE};
use crate::model::validation::is_valid_email;
use crate::repo::error::RepoResult;
use crate::repo::user_repo::UserRepository;
use serde::Serialize;

pub const EMAIL_FIELD: &str = "email";
pub const INVALID_EMAIL_MESSAGE: &str = "Enter a valid email address.";
pub const EXISTING_EMAIL_ADDRESS: &str = "This email address already belongs to a user on our site.";

/// Captures the email address an anonymous visitor takes quizzes under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmailForm {
    bound: bool,
    /// Raw submitted value, kept for re-rendering.
    pub value: String,
    pub errors: Vec<String>,
    cleaned_email: Option<String>,
}

impl EmailForm {
    pub fn unbound() -> Self {
        Self::default()
    }

    pub fn bind(data: &FormData) -> Self {
        Self {
            bound: true,
            value: data.get(EMAIL_FIELD).cloned().unwrap_or_default(),
            errors: Vec::new(),
            cleaned_email: None,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Validates the bound value, rejecting addresses owned by an account.
    ///
    /// Returns whether the form is valid; errors are collected on the form.
    pub fn full_clean<R: UserRepository>(&mut self, users: &R) -> RepoResult<bool> {
        self.errors.clear();
        self.cleaned_email = None;
        if !self.bound {
            return Ok(false);
        }

        let email = self.value.trim();
        if email.is_empty() {
            self.errors.push(REQUIRED_MESSAGE.to_string());
            return Ok(false);
        }
        if !is_valid_email(email) {
            self.errors.push(INVALID_EMAIL_MESSAGE.to_string());
            return Ok(false);
        }
        if users.email_in_use(email)? {
            self.errors.push(EXISTING_EMAIL_ADDRESS.to_string());
            return Ok(false);
        }

        self.cleaned_email = Some(email.to_string());
        Ok(true)
    }

    /// The validated email, once `full_clean` has succeeded.
    pub fn cleaned_email(&self) -> Option<&str> {
        self.cleaned_email.as_deref()
    }
}
