//! The `quizkit result` command.

use crate::commands::{open_connection, store};
use crate::config::Settings;
use anyhow::{bail, Result};
use quiz_core::filters::percentage;
use quiz_core::web::http::{Page, QuizCompletePage, Response};
use quiz_core::web::views;

pub fn execute(settings: &Settings, slug: &str, id: i64, json: bool) -> Result<()> {
    let conn = open_connection(settings)?;
    let store = store(&conn)?;

    match views::quiz_completed(&store, slug, id)? {
        Response::Page(Page::QuizComplete(page)) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                print_result(&page);
            }
            Ok(())
        }
        _ => bail!("no result {id} for quiz `{slug}`"),
    }
}

pub(crate) fn print_result(page: &QuizCompletePage) {
    println!("{}", page.summary);
    let ratio = percentage(&page.score.into(), &page.maximum_score.into());
    match ratio {
        Some(ratio) => println!(
            "Score: {}/{} ({ratio:.0}%)",
            page.score, page.maximum_score
        ),
        None => println!("Score: {}/{}", page.score, page.maximum_score),
    }
}
