//! Quiz domain model.
//!
//! # Responsibility
//! - Define the records persisted by core: questions, answers, quizzes,
//!   results and the accounts they reference.
//! - Validate inputs before they reach storage.
//!
//! # Invariants
//! - Persisted records are identified by storage-assigned integer ids.
//! - Enumerated fields keep the raw integer values used in storage.

pub mod answer;
pub mod audit;
pub mod question;
pub mod quiz;
pub mod result;
pub mod user;
pub mod validation;
