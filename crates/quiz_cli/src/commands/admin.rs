//! The `quizkit admin` commands: changelists and list-editable edits.

use crate::commands::{find_user, open_connection, store};
use crate::config::Settings;
use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use quiz_core::admin::changelist::{self, ChangeList, ChangeListQuery};
use quiz_core::admin::{edit, find_admin, registry};
use serde::Serialize;

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Show the registered model admins
    Models,

    /// Print a changelist
    List {
        /// question, answer, quiz or quizresult
        model: String,

        /// Search terms; every term must match
        #[arg(long)]
        search: Option<String>,

        /// List filter as field=value (repeatable)
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,

        /// Date hierarchy year
        #[arg(long)]
        year: Option<i32>,

        /// Date hierarchy month (needs --year)
        #[arg(long, requires = "year")]
        month: Option<u32>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Change one list-editable field of a row
    Edit {
        model: String,
        id: i64,
        field: String,
        value: String,

        /// Username performing the edit
        #[arg(long = "as")]
        acting_user: String,
    },
}

pub fn execute(settings: &Settings, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::Models => {
            for admin in registry() {
                println!("{}", admin.model);
                println!("  list_display:  {}", admin.list_display.join(", "));
                println!("  list_editable: {}", admin.list_editable.join(", "));
                println!("  list_filter:   {}", admin.list_filter.join(", "));
                println!("  search_fields: {}", admin.search_fields.join(", "));
            }
            Ok(())
        }
        AdminCommand::List {
            model,
            search,
            filters,
            year,
            month,
            json,
        } => {
            let mut query = ChangeListQuery {
                search,
                ..ChangeListQuery::default()
            };
            for (field, value) in filters {
                query = query.filter(field, value);
            }
            if let Some(year) = year {
                query = query.date(year, month);
            }
            list(settings, &model, &query, json)
        }
        AdminCommand::Edit {
            model,
            id,
            field,
            value,
            acting_user,
        } => {
            let conn = open_connection(settings)?;
            let store = store(&conn)?;
            let user = find_user(&store, &acting_user)?;
            edit::list_edit(&store, &model, id, &field, &value, &user)?;
            println!("Updated {model} {id}: {field} = {value}");
            Ok(())
        }
    }
}

fn list(settings: &Settings, model: &str, query: &ChangeListQuery, json: bool) -> Result<()> {
    let admin = find_admin(model).ok_or_else(|| anyhow!("no admin registered for `{model}`"))?;
    let conn = open_connection(settings)?;
    let store = store(&conn)?;

    match admin.model {
        "question" => {
            let list = changelist::questions(&store, query)?;
            print_changelist(&list, json, |row| {
                format!(
                    "{:>5}  {:<8} active={:<5}  {}",
                    row.id,
                    row.difficulty.display_name(),
                    row.is_active,
                    row.question
                )
            })
        }
        "answer" => {
            let list = changelist::answers(&store, query)?;
            print_changelist(&list, json, |row| {
                format!(
                    "{:>5}  q={:<5} {:<9} active={:<5}  {}",
                    row.id,
                    row.question_id,
                    row.score.display_name(),
                    row.is_active,
                    row.answer
                )
            })
        }
        "quiz" => {
            let list = changelist::quizzes(&store, query)?;
            print_changelist(&list, json, |row| {
                format!(
                    "{:>5}  {:<7} {:<24} {}",
                    row.id,
                    row.status.display_name(),
                    row.slug,
                    row.name
                )
            })
        }
        _ => {
            let list = changelist::results(&store, query, chrono::Utc::now())?;
            print_changelist(&list, json, |row| {
                format!(
                    "{:>5}  quiz={:<5} {}/{}  {}  {}",
                    row.id,
                    row.quiz_id,
                    row.score,
                    row.maximum_score,
                    row.audit.created_datetime().format("%Y-%m-%d %H:%M"),
                    row.email
                )
            })
        }
    }
}

#[derive(Serialize)]
struct ChangeListJson<'a, T> {
    rows: &'a [T],
    date_hierarchy: &'a [u32],
}

fn print_changelist<T: Serialize>(
    list: &ChangeList<T>,
    json: bool,
    line: impl Fn(&T) -> String,
) -> Result<()> {
    if json {
        let out = ChangeListJson {
            rows: &list.rows,
            date_hierarchy: &list.date_hierarchy,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for row in &list.rows {
        println!("{}", line(row));
    }
    println!("{} row(s)", list.rows.len());
    if !list.date_hierarchy.is_empty() {
        let levels: Vec<String> = list.date_hierarchy.iter().map(u32::to_string).collect();
        println!("Drill down: {}", levels.join(" "));
    }
    Ok(())
}

fn parse_filter(raw: &str) -> Result<(String, String)> {
    let (field, value) = raw
        .split_once('=')
        .with_context(|| format!("expected field=value, got `{raw}`"))?;
    Ok((field.trim().to_string(), value.trim().to_string()))
}
