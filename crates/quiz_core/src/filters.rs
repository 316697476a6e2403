//! Template filters used when rendering quiz pages.

use crate::model::quiz::Quiz;
use crate::model::user::User;
use crate::repo::error::RepoResult;
use crate::repo::result_repo::ResultRepository;
use crate::repo::Store;
use serde_json::Value;

/// `part / population * 100`.
///
/// Accepts numbers or numeric strings; `None` when either side is not
/// numeric or `population` is zero.
pub fn percentage(part: &Value, population: &Value) -> Option<f64> {
    let part = as_number(part)?;
    let population = as_number(population)?;
    if population == 0.0 {
        return None;
    }
    Some(part / population * 100.0)
}

/// Number of results `user` has recorded for `quiz`; `None` when either
/// is missing.
pub fn quiz_taken(
    store: &Store<'_>,
    user: Option<&User>,
    quiz: Option<&Quiz>,
) -> RepoResult<Option<u32>> {
    let (Some(user), Some(quiz)) = (user, quiz) else {
        return Ok(None);
    };
    store.results().count_taken(user.id, quiz.id).map(Some)
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}
