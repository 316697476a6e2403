//! The `quizkit register` command.

use crate::commands::{open_connection, store};
use crate::config::Settings;
use anyhow::Result;
use quiz_core::service::account_service::AccountService;
use quiz_core::{start_listening, NewUser, UserSignals};

pub fn execute(settings: &Settings, user: NewUser) -> Result<()> {
    let conn = open_connection(settings)?;
    let store = store(&conn)?;

    let mut signals = UserSignals::new();
    start_listening(&mut signals);

    let created = AccountService::new(store, &signals).register_user(&user)?;
    println!("Registered `{}` (id {}).", created.username, created.id);
    Ok(())
}
