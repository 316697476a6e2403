//! The `quizkit init` command.

use crate::commands::{open_connection, store};
use crate::config::{Settings, CONFIG_FILE_NAME, SAMPLE_CONFIG};
use anyhow::Result;
use std::path::Path;

pub fn execute(settings: &Settings) -> Result<()> {
    if Path::new(CONFIG_FILE_NAME).exists() {
        println!("{CONFIG_FILE_NAME} already exists, skipping.");
    } else {
        std::fs::write(CONFIG_FILE_NAME, SAMPLE_CONFIG)?;
        println!("Created {CONFIG_FILE_NAME}");
    }

    let conn = open_connection(settings)?;
    store(&conn)?;
    println!("Database ready at {}", settings.database.display());

    println!("\nNext steps:");
    println!("  1. Write a quiz fixture (see `quizkit load --help`)");
    println!("  2. Run: quizkit load quizzes.toml");
    println!("  3. Run: quizkit take <slug>");
    Ok(())
}
