//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and post-save hooks into use-case APIs.
//! - Keep CLI callers away from storage details.

pub mod account_service;
pub mod catalog_service;
