//! Request handlers for the quiz pages.
//!
//! # Responsibility
//! - Route a request to its view and build the typed page context.
//! - Gate anonymous quiz takers behind email capture.
//!
//! # Invariants
//! - Views only read and mutate the session payload carried by the request;
//!   persisting it is the caller's job.
//! - Closed quizzes and foreign results are reported as not found.

use crate::forms::email::EmailForm;
use crate::model::quiz::QuizStatus;
use crate::repo::error::RepoResult;
use crate::repo::quiz_repo::QuizRepository;
use crate::repo::result_repo::ResultRepository;
use crate::repo::Store;
use crate::web::http::{Method, Page, QuizCompletePage, Request, Response};
use crate::web::urls::{self, Route};
use crate::wizard::{QuizWizard, Taker, WizardOutcome};
use log::{debug, info};

/// Query parameter carrying the post-capture destination.
pub const NEXT_PARAM: &str = "next";

/// Dispatches a request by path.
pub fn dispatch(store: &Store<'_>, request: &mut Request<'_>) -> RepoResult<Response> {
    let Some(route) = urls::resolve(&request.path) else {
        debug!(
            "event=dispatch module=web status=not_found path={}",
            request.path
        );
        return Ok(Response::NotFound);
    };

    match route {
        Route::QuizList => quiz_list(store),
        Route::CaptureEmail => capture_email(store, request),
        Route::QuizDetail { slug } => quiz_detail(store, request, &slug),
        Route::QuizCompleted { slug, pk } => quiz_completed(store, &slug, pk),
    }
}

pub fn redirect_to_quiz_list() -> Response {
    Response::Redirect(urls::quiz_list())
}

/// Lists live quizzes.
pub fn quiz_list(store: &Store<'_>) -> RepoResult<Response> {
    let quizzes = store.quizzes().list_quizzes(Some(QuizStatus::Live))?;
    Ok(Response::Page(Page::QuizList { quizzes }))
}

/// Asks anonymous visitors for the email their results are recorded under.
pub fn capture_email(store: &Store<'_>, request: &mut Request<'_>) -> RepoResult<Response> {
    if request.is_authenticated() {
        return Ok(redirect_to_quiz_list());
    }

    if request.method != Method::Post {
        return Ok(Response::Page(Page::CaptureEmail {
            form: EmailForm::unbound(),
        }));
    }

    let mut form = EmailForm::bind(&request.form);
    if !form.full_clean(&store.users())? {
        return Ok(Response::Page(Page::CaptureEmail { form }));
    }

    request.session.email = form.cleaned_email().map(str::to_string);
    info!("event=email_captured module=web status=ok");
    let next = request
        .query
        .get(NEXT_PARAM)
        .filter(|next| is_local_path(next))
        .cloned()
        .unwrap_or_else(urls::quiz_list);
    Ok(Response::Redirect(next))
}

/// Runs the quiz wizard for `slug`.
pub fn quiz_detail(
    store: &Store<'_>,
    request: &mut Request<'_>,
    slug: &str,
) -> RepoResult<Response> {
    let Some(quiz) = store.quizzes().get_takeable_by_slug(slug)? else {
        return Ok(Response::NotFound);
    };

    let taker = match (&request.user, &request.session.email) {
        (Some(user), _) => Taker::User(user.clone()),
        (None, Some(email)) => Taker::Anonymous {
            email: email.clone(),
        },
        (None, None) => {
            return Ok(Response::Redirect(format!(
                "{}?{NEXT_PARAM}={}",
                urls::capture_email(),
                request.path
            )));
        }
    };

    let mut wizard = QuizWizard::load(*store, quiz)?;
    let state = request.session.wizards.entry(slug.to_string()).or_default();
    let outcome = match request.method {
        Method::Get => wizard.get(state),
        Method::Post => wizard.post(state, &request.form, &taker)?,
    };

    match outcome {
        WizardOutcome::Render(page) => Ok(Response::Page(Page::Wizard(page))),
        WizardOutcome::Done(result) => {
            request.session.wizards.remove(slug);
            Ok(Response::Redirect(urls::quiz_completed(slug, result.id)))
        }
    }
}

/// Shows a recorded result of the quiz with `slug`.
pub fn quiz_completed(store: &Store<'_>, slug: &str, pk: i64) -> RepoResult<Response> {
    match store.results().get_result_detail(slug, pk)? {
        Some(detail) => Ok(Response::Page(Page::QuizComplete(Box::new(
            QuizCompletePage::from(detail),
        )))),
        None => Ok(Response::NotFound),
    }
}

/// Browsers read both `//host` and `/\host` as another origin.
fn is_local_path(value: &str) -> bool {
    value.starts_with('/') && !value.starts_with("//") && !value.starts_with("/\\")
}
