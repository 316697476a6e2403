//! URL layout of the quiz pages.
//!
//! - `/` quiz list
//! - `/email/` email capture
//! - `/{slug}/` quiz wizard
//! - `/{slug}/results/{pk}/` completion page

use crate::model::result::QuizResultId;

const EMAIL_SEGMENT: &str = "email";
const RESULTS_SEGMENT: &str = "results";

/// Resolved view for a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    QuizList,
    CaptureEmail,
    QuizDetail { slug: String },
    QuizCompleted { slug: String, pk: QuizResultId },
}

pub fn quiz_list() -> String {
    "/".to_string()
}

pub fn capture_email() -> String {
    format!("/{EMAIL_SEGMENT}/")
}

pub fn quiz_detail(slug: &str) -> String {
    format!("/{slug}/")
}

pub fn quiz_completed(slug: &str, pk: QuizResultId) -> String {
    format!("/{slug}/{RESULTS_SEGMENT}/{pk}/")
}

/// Maps a request path (without query string) to a route.
pub fn resolve(path: &str) -> Option<Route> {
    let segments: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    match segments.as_slice() {
        [] => Some(Route::QuizList),
        [EMAIL_SEGMENT] => Some(Route::CaptureEmail),
        [slug] => Some(Route::QuizDetail {
            slug: (*slug).to_string(),
        }),
        [slug, RESULTS_SEGMENT, pk] => pk.parse().ok().map(|pk| Route::QuizCompleted {
            slug: (*slug).to_string(),
            pk,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{quiz_completed, resolve, Route};

    #[test]
    fn resolve_maps_every_route() {
        assert_eq!(resolve("/"), Some(Route::QuizList));
        assert_eq!(resolve("/email/"), Some(Route::CaptureEmail));
        assert_eq!(
            resolve("/traits/"),
            Some(Route::QuizDetail {
                slug: "traits".to_string()
            })
        );
        assert_eq!(
            resolve(&quiz_completed("traits", 12)),
            Some(Route::QuizCompleted {
                slug: "traits".to_string(),
                pk: 12
            })
        );
    }

    #[test]
    fn resolve_rejects_unknown_shapes() {
        assert_eq!(resolve("/traits/results/abc/"), None);
        assert_eq!(resolve("/a/b/"), None);
    }
}
