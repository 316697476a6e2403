//! Transport-neutral request and response types.

use crate::forms::email::EmailForm;
use crate::forms::FormData;
use crate::model::quiz::Quiz;
use crate::model::result::{QuizResult, QuizResultDetail};
use crate::model::user::User;
use crate::web::session::SessionData;
use crate::wizard::WizardPage;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Incoming request as seen by the views.
#[derive(Debug)]
pub struct Request<'s> {
    pub method: Method,
    /// Path without query string.
    pub path: String,
    pub query: FormData,
    /// Posted form body; empty for `GET`.
    pub form: FormData,
    /// Authenticated account, if any.
    pub user: Option<User>,
    pub session: &'s mut SessionData,
}

impl<'s> Request<'s> {
    pub fn get(path: impl Into<String>, session: &'s mut SessionData) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: FormData::new(),
            form: FormData::new(),
            user: None,
            session,
        }
    }

    pub fn post(path: impl Into<String>, form: FormData, session: &'s mut SessionData) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: FormData::new(),
            form,
            user: None,
            session,
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// View output.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Redirect(String),
    Page(Page),
    NotFound,
}

/// Typed template context for each page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "template", rename_all = "snake_case")]
pub enum Page {
    QuizList { quizzes: Vec<Quiz> },
    CaptureEmail { form: EmailForm },
    Wizard(Box<WizardPage>),
    QuizComplete(Box<QuizCompletePage>),
}

impl Page {
    /// Template path the page would be rendered with.
    pub fn template(&self) -> &'static str {
        match self {
            Self::QuizList { .. } => "quiz/quiz_list.html",
            Self::CaptureEmail { .. } => "quiz/capture_email.html",
            Self::Wizard(_) => "quiz/wizard.html",
            Self::QuizComplete(_) => "quiz/quiz_complete.html",
        }
    }
}

/// Context of the completion page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizCompletePage {
    pub results: QuizResult,
    pub quiz: Quiz,
    pub test_taker: Option<User>,
    pub score: u32,
    pub maximum_score: u32,
    pub datetime_taken: DateTime<Utc>,
    /// Display line, e.g. `ferris - Traits: (01/02/2024, 10:00:00)`.
    pub summary: String,
}

impl From<QuizResultDetail> for QuizCompletePage {
    fn from(detail: QuizResultDetail) -> Self {
        let summary = detail.to_string();
        Self {
            score: detail.result.score,
            maximum_score: detail.result.maximum_score,
            datetime_taken: detail.result.audit.created_datetime(),
            results: detail.result,
            quiz: detail.quiz,
            test_taker: detail.user,
            summary,
        }
    }
}
