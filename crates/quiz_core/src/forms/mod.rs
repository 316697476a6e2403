//! Form validation for the quiz pages.
//!
//! # Responsibility
//! - Bind raw submitted key/value data to typed forms.
//! - Produce per-field error messages for re-rendering.
//!
//! # Invariants
//! - Unbound forms are never valid.
//! - Formset field names follow `{prefix}-{index}-{field}`.

pub mod email;
pub mod question;

use std::collections::BTreeMap;

/// Submitted key/value pairs (query string or form body).
pub type FormData = BTreeMap<String, String>;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_CHOICE_MESSAGE: &str = "Select a valid choice. That choice is not one of the available choices.";
