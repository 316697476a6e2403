//! The `quizkit list` command.

use crate::commands::{open_connection, store};
use crate::config::Settings;
use anyhow::{bail, Result};
use quiz_core::web::http::{Page, Response};
use quiz_core::web::views;

pub fn execute(settings: &Settings, json: bool) -> Result<()> {
    let conn = open_connection(settings)?;
    let store = store(&conn)?;

    let Response::Page(Page::QuizList { quizzes }) = views::quiz_list(&store)? else {
        bail!("quiz list did not render");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&quizzes)?);
        return Ok(());
    }
    if quizzes.is_empty() {
        println!("No live quizzes.");
        return Ok(());
    }
    for quiz in &quizzes {
        println!("{:<24} {}", quiz.slug, quiz.name);
        if !quiz.description.is_empty() {
            println!("{:<24} {}", "", quiz.description);
        }
    }
    Ok(())
}
