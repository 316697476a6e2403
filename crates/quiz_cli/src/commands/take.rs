//! The `quizkit take` command: drives the quiz views from the terminal.

use crate::commands::result::print_result;
use crate::commands::{find_user, open_connection, store};
use crate::config::Settings;
use anyhow::{bail, Context, Result};
use log::info;
use quiz_core::forms::email::EMAIL_FIELD;
use quiz_core::forms::FormData;
use quiz_core::web::http::{Method, Page, Request, Response};
use quiz_core::web::session::Session;
use quiz_core::web::{urls, views};
use quiz_core::wizard::{WizardPage, STEP_FIELD};
use quiz_core::{Store, User};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

pub struct TakeOptions {
    pub slug: String,
    pub user: Option<String>,
    pub email: Option<String>,
    pub session: Option<String>,
    /// 1-based choices consumed before prompting.
    pub choices: Vec<usize>,
}

pub fn execute(settings: &Settings, options: TakeOptions) -> Result<()> {
    let conn = open_connection(settings)?;
    let store = store(&conn)?;
    let user = options
        .user
        .as_deref()
        .map(|username| find_user(&store, username))
        .transpose()?;

    let mut session = Session::load_or_create(&store, options.session.as_deref())?;
    info!(
        "event=take_start module=cli status=ok slug={} authenticated={}",
        options.slug,
        user.is_some()
    );

    let outcome = {
        let mut driver = Driver {
            store,
            start: urls::quiz_detail(&options.slug),
            session: &mut session,
            user,
            email: options.email,
            choices: options.choices.into_iter().collect(),
            input: io::stdin().lock(),
        };
        driver.run()
    };
    session.save(&store)?;
    println!("Session: {}", session.key);
    outcome
}

struct Driver<'s, 'conn, R> {
    store: Store<'conn>,
    /// Quiz page the visitor returns to after email capture.
    start: String,
    session: &'s mut Session,
    user: Option<User>,
    email: Option<String>,
    choices: VecDeque<usize>,
    input: R,
}

impl<R: BufRead> Driver<'_, '_, R> {
    fn run(&mut self) -> Result<()> {
        let start = self.start.clone();
        let mut response = self.send(Method::Get, &start, FormData::new())?;
        loop {
            response = match response {
                Response::Redirect(location) => {
                    self.send(Method::Get, &location, FormData::new())?
                }
                Response::Page(Page::CaptureEmail { form }) => {
                    for error in &form.errors {
                        println!("  ! {error}");
                    }
                    let email = match self.email.take() {
                        Some(email) => email,
                        None => self.prompt("Email address")?,
                    };
                    let next = format!(
                        "{}?{}={}",
                        urls::capture_email(),
                        views::NEXT_PARAM,
                        self.start
                    );
                    let form = FormData::from([(EMAIL_FIELD.to_string(), email)]);
                    self.send(Method::Post, &next, form)?
                }
                Response::Page(Page::Wizard(page)) => {
                    let form = self.answer_page(&page)?;
                    let path = page.quiz.absolute_url();
                    self.send(Method::Post, &path, form)?
                }
                Response::Page(Page::QuizComplete(page)) => {
                    print_result(&page);
                    println!(
                        "Result URL: {}",
                        urls::quiz_completed(&page.quiz.slug, page.results.id)
                    );
                    return Ok(());
                }
                Response::Page(Page::QuizList { .. }) => bail!("quiz is not available"),
                Response::NotFound => bail!("quiz not found"),
            };
        }
    }

    fn send(&mut self, method: Method, location: &str, form: FormData) -> Result<Response> {
        let (path, query) = split_location(location);
        let response = {
            let mut request = Request {
                method,
                path,
                query,
                form,
                user: self.user.clone(),
                session: &mut self.session.data,
            };
            views::dispatch(&self.store, &mut request)?
        };
        self.session.save(&self.store)?;
        Ok(response)
    }

    fn answer_page(&mut self, page: &WizardPage) -> Result<FormData> {
        let mut form = FormData::from([(STEP_FIELD.to_string(), page.step.to_string())]);
        if page.formset.forms.is_empty() {
            return Ok(form);
        }

        println!(
            "\n== {} (page {} of {}) ==",
            page.quiz.name,
            page.step + 1,
            page.step_count
        );
        for question in &page.formset.forms {
            println!("\n{}", question.question.question);
            for error in &question.errors {
                println!("  ! {error}");
            }
            for (index, (_, text)) in question.choices.iter().enumerate() {
                println!("  {}) {text}", index + 1);
            }

            let picked = match self.choices.pop_front() {
                Some(choice) => choice,
                None => self
                    .prompt(question.label())?
                    .trim()
                    .parse::<usize>()
                    .unwrap_or(0),
            };
            // Out-of-range picks are submitted empty and come back with errors.
            let value = picked
                .checked_sub(1)
                .and_then(|index| question.choices.get(index))
                .map(|(id, _)| id.to_string())
                .unwrap_or_default();
            form.insert(question.field_name(), value);
        }
        Ok(form)
    }

    fn prompt(&mut self, label: &str) -> Result<String> {
        print!("{label} ");
        io::stdout().flush()?;
        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("failed to read input")?;
        if read == 0 {
            bail!("input closed before the quiz was finished");
        }
        Ok(line.trim().to_string())
    }
}

/// Splits `/path/?a=b&c=d` into the path and its query pairs.
fn split_location(location: &str) -> (String, FormData) {
    let Some((path, query)) = location.split_once('?') else {
        return (location.to_string(), FormData::new());
    };
    let pairs = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    (path.to_string(), pairs)
}

#[cfg(test)]
mod tests {
    use super::split_location;

    #[test]
    fn split_location_separates_query_pairs() {
        let (path, query) = split_location("/email/?next=/python-zen/");
        assert_eq!(path, "/email/");
        assert_eq!(query.get("next").map(String::as_str), Some("/python-zen/"));

        let (path, query) = split_location("/python-zen/");
        assert_eq!(path, "/python-zen/");
        assert!(query.is_empty());
    }
}
