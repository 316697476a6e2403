use quiz_core::repo::answer_repo::{AnswerRepository, AnswerSet};
use quiz_core::repo::quiz_repo::QuizRepository;
use quiz_core::service::catalog_service::{import_catalog, CatalogFixture, ImportSummary};
use quiz_core::web::http::{Page, Request, Response};
use quiz_core::web::session::SessionData;
use quiz_core::web::views::dispatch;
use quiz_core::{open_db_in_memory, Difficulty, QuizStatus, RepoError, Store};

const PYTHON_ZEN: &str = r#"{
  "quizzes": [
    {
      "name": "Python Zen",
      "description": "The Zen of Python, by Tim Peters",
      "status": "live",
      "questions": [
        {
          "question": "Beautiful is better than...",
          "difficulty": "easy",
          "answers": [
            { "answer": "ugly", "correct": true },
            { "answer": "pretty" },
            { "answer": "handsome", "is_active": false }
          ]
        },
        {
          "question": "Errors should never pass...",
          "difficulty": "medium",
          "answers": [
            { "answer": "silently", "correct": true },
            { "answer": "loudly" }
          ]
        },
        {
          "question": "Namespaces are one honking great...",
          "difficulty": "hard",
          "answers": [
            { "answer": "idea", "correct": true },
            { "answer": "mistake" }
          ]
        }
      ]
    },
    {
      "name": "Unfinished",
      "slug": "wip"
    }
  ]
}"#;

fn fixture() -> CatalogFixture {
    serde_json::from_str(PYTHON_ZEN).unwrap()
}

#[test]
fn import_writes_quizzes_questions_and_answers() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();

    let summary = import_catalog(&store, &fixture(), None).unwrap();
    assert_eq!(
        summary,
        ImportSummary {
            quizzes: 2,
            questions: 3,
            answers: 7,
            skipped_quizzes: 0,
        }
    );

    let quizzes = store.quizzes();
    let zen = quizzes.get_quiz_by_slug("python-zen").unwrap().unwrap();
    assert_eq!(zen.status, QuizStatus::Live);
    let wip = quizzes.get_quiz_by_slug("wip").unwrap().unwrap();
    assert_eq!(wip.status, QuizStatus::Draft);

    let question_ids = quizzes.question_ids(zen.id).unwrap();
    assert_eq!(question_ids.len(), 3);
    let hard = quizzes
        .live_questions(zen.id, Some(Difficulty::Hard))
        .unwrap();
    assert_eq!(hard.len(), 1);
    assert_eq!(
        store
            .answers()
            .maximum_score(&AnswerSet::ForQuestions(question_ids))
            .unwrap(),
        3
    );
}

#[test]
fn reimport_skips_existing_slugs() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    import_catalog(&store, &fixture(), None).unwrap();

    let summary = import_catalog(&store, &fixture(), None).unwrap();
    assert_eq!(summary.quizzes, 0);
    assert_eq!(summary.skipped_quizzes, 2);
    assert_eq!(store.quizzes().list_quizzes(None).unwrap().len(), 2);
}

#[test]
fn invalid_quiz_is_rolled_back_as_a_whole() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let broken: CatalogFixture = serde_json::from_str(
        r#"{ "quizzes": [ {
            "name": "Broken",
            "questions": [
                { "question": "Kept?", "answers": [ { "answer": "yes", "correct": true } ] },
                { "question": "   " }
            ]
        } ] }"#,
    )
    .unwrap();

    let err = import_catalog(&store, &broken, None).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)), "{err}");
    assert!(store.quizzes().list_quizzes(None).unwrap().is_empty());
    assert!(store
        .answers()
        .list_answers(&AnswerSet::ForQuestions(vec![1, 2]), None)
        .unwrap()
        .is_empty());
}

#[test]
fn imported_quiz_is_listed_and_takeable() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    import_catalog(&store, &fixture(), None).unwrap();

    let mut session = SessionData {
        email: Some("guest@example.com".to_string()),
        ..SessionData::default()
    };
    let response = dispatch(&store, &mut Request::get("/python-zen/", &mut session)).unwrap();
    let Response::Page(Page::Wizard(page)) = response else {
        panic!("wizard did not render");
    };
    assert_eq!(page.formset.forms.len(), 1);
    // The inactive answer is not offered.
    assert_eq!(page.formset.forms[0].choices.len(), 2);
}
