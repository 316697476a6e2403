//! Audit metadata shared by every quiz record.
//!
//! # Invariants
//! - `created_at` is written once by storage and never changes afterwards.
//! - `creator` is stamped on creation only; `editor` is stamped on every save.

use crate::model::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Creation/modification metadata carried by all audited records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub modified_at: i64,
    pub creator: Option<UserId>,
    pub editor: Option<UserId>,
}

impl Audit {
    /// Returns the creation timestamp as a UTC datetime.
    ///
    /// Falls back to the Unix epoch when the stored value is out of range.
    pub fn created_datetime(&self) -> DateTime<Utc> {
        epoch_ms_to_datetime(self.created_at)
    }
}

/// Converts epoch milliseconds to a UTC datetime.
pub fn epoch_ms_to_datetime(value: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value).unwrap_or(DateTime::UNIX_EPOCH)
}
