//! The `quizkit load` command.

use crate::commands::{find_user, open_connection, store};
use crate::config::Settings;
use anyhow::{Context, Result};
use quiz_core::admin::audit_actor;
use quiz_core::service::catalog_service::{import_catalog, CatalogFixture};
use std::path::PathBuf;

pub fn execute(settings: &Settings, fixture: PathBuf, acting_user: Option<String>) -> Result<()> {
    let content = std::fs::read_to_string(&fixture)
        .with_context(|| format!("failed to read fixture: {}", fixture.display()))?;
    let catalog: CatalogFixture = toml::from_str(&content)
        .with_context(|| format!("failed to parse fixture: {}", fixture.display()))?;

    let conn = open_connection(settings)?;
    let store = store(&conn)?;
    let actor = match acting_user {
        Some(username) => audit_actor(&find_user(&store, &username)?),
        None => None,
    };

    let summary = import_catalog(&store, &catalog, actor)?;
    println!(
        "Imported {} quiz(zes), {} question(s), {} answer(s).",
        summary.quizzes, summary.questions, summary.answers
    );
    if summary.skipped_quizzes > 0 {
        println!(
            "Skipped {} quiz(zes) whose slug already exists.",
            summary.skipped_quizzes
        );
    }
    Ok(())
}
