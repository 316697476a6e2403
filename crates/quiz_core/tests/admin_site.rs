mod common;

use chrono::{Datelike, Utc};
use common::{seed_question, seed_quiz, seed_user};
use quiz_core::admin::changelist::{self, ChangeListQuery};
use quiz_core::admin::edit::{
    list_edit, save_answer, save_question, save_quiz, InlineAnswer, QuestionChange, QuizChange,
};
use quiz_core::admin::AdminError;
use quiz_core::repo::answer_repo::AnswerRepository;
use quiz_core::repo::question_repo::QuestionRepository;
use quiz_core::repo::quiz_repo::QuizRepository;
use quiz_core::repo::result_repo::ResultRepository;
use quiz_core::{
    open_db_in_memory, AnswerScore, Difficulty, NewAnswer, NewQuestion, NewQuizResult,
    QuizStatus, Store,
};

#[test]
fn question_changelist_filters_and_searches() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let staff = seed_user(&store, "admin", "admin@example.com", true);
    let kept = seed_question(&store, "Beautiful is better than ugly?", Difficulty::Easy);
    let retired = seed_question(&store, "Flat is better than nested?", Difficulty::Hard);
    list_edit(&store, "question", retired.id, "is_active", "false", &staff).unwrap();

    let active = changelist::questions(&store, &ChangeListQuery::default().filter("is_active", "1"))
        .unwrap();
    assert_eq!(active.rows.len(), 1);
    assert_eq!(active.rows[0].id, kept.id);

    let searched =
        changelist::questions(&store, &ChangeListQuery::default().search("better NESTED")).unwrap();
    assert_eq!(searched.rows.len(), 1);
    assert_eq!(searched.rows[0].id, retired.id);

    let err = changelist::questions(&store, &ChangeListQuery::default().filter("difficulty", "1"))
        .unwrap_err();
    assert!(matches!(err, AdminError::UnknownFilter { .. }), "{err}");
}

#[test]
fn date_hierarchy_drills_from_years_to_months() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    seed_quiz(&store, "Python Zen", QuizStatus::Live);
    let now = Utc::now();

    let years = changelist::quizzes(&store, &ChangeListQuery::default()).unwrap();
    assert_eq!(years.date_hierarchy, vec![u32::try_from(now.year()).unwrap()]);

    let months =
        changelist::quizzes(&store, &ChangeListQuery::default().date(now.year(), None)).unwrap();
    assert_eq!(months.rows.len(), 1);
    assert_eq!(months.date_hierarchy, vec![now.month()]);

    let empty = changelist::quizzes(&store, &ChangeListQuery::default().date(1999, None)).unwrap();
    assert!(empty.rows.is_empty());
    assert!(empty.date_hierarchy.is_empty());
}

#[test]
fn quiz_changelist_filters_by_status_and_creator() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let staff = seed_user(&store, "admin", "admin@example.com", true);
    seed_quiz(&store, "Python Zen", QuizStatus::Live);
    let created = save_quiz(&store, None, &QuizChange::new("Rust Traits"), &staff).unwrap();

    let drafts =
        changelist::quizzes(&store, &ChangeListQuery::default().filter("status", "draft")).unwrap();
    assert_eq!(drafts.rows.len(), 1);
    assert_eq!(drafts.rows[0].id, created.id);

    let mine = changelist::quizzes(
        &store,
        &ChangeListQuery::default().filter("creator", staff.id.to_string()),
    )
    .unwrap();
    assert_eq!(mine.rows.len(), 1);
}

#[test]
fn result_changelist_searches_user_fields_and_recent_range() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let seeded = seed_quiz(&store, "Python Zen", QuizStatus::Live);
    let user = seed_user(&store, "ada", "ada@example.com", false);
    let results = store.results();
    for (user_id, email) in [(Some(user.id), "ada@example.com"), (None, "guest@example.com")] {
        results
            .create_result(&NewQuizResult {
                quiz_id: seeded.quiz.id,
                user_id,
                email: email.to_string(),
                answer_ids: vec![seeded.easy.correct],
                score: 1,
                maximum_score: 3,
            })
            .unwrap();
    }

    let now = Utc::now();
    let guest = changelist::results(&store, &ChangeListQuery::default().search("guest"), now)
        .unwrap();
    assert_eq!(guest.rows.len(), 1);
    assert_eq!(guest.rows[0].user_id, None);

    let recent = changelist::results(
        &store,
        &ChangeListQuery::default().filter("created_at", "past_7_days"),
        now,
    )
    .unwrap();
    assert_eq!(recent.rows.len(), 2);

    let err = changelist::results(
        &store,
        &ChangeListQuery::default().filter("created_at", "someday"),
        now,
    )
    .unwrap_err();
    assert!(matches!(err, AdminError::InvalidValue { .. }), "{err}");
}

#[test]
fn list_edit_only_touches_list_editable_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let staff = seed_user(&store, "admin", "admin@example.com", true);
    let seeded = seed_quiz(&store, "Python Zen", QuizStatus::Draft);

    list_edit(&store, "question", seeded.easy.id, "difficulty", "hard", &staff).unwrap();
    let question = store.questions().get_question(seeded.easy.id).unwrap().unwrap();
    assert_eq!(question.difficulty, Difficulty::Hard);
    assert_eq!(question.audit.editor, Some(staff.id));

    list_edit(&store, "answer", seeded.easy.incorrect, "is_active", "off", &staff).unwrap();
    assert!(!store.answers().get_answer(seeded.easy.incorrect).unwrap().unwrap().is_active);

    list_edit(&store, "quiz", seeded.quiz.id, "status", "live", &staff).unwrap();
    let quiz = store.quizzes().get_quiz(seeded.quiz.id).unwrap().unwrap();
    assert_eq!(quiz.status, QuizStatus::Live);

    let err = list_edit(&store, "quiz", seeded.quiz.id, "name", "Renamed", &staff).unwrap_err();
    assert!(matches!(err, AdminError::NotEditable { .. }), "{err}");
    let err = list_edit(&store, "quizresult", 1, "score", "3", &staff).unwrap_err();
    assert!(matches!(err, AdminError::NotEditable { .. }), "{err}");
    let err = list_edit(&store, "user", 1, "email", "x", &staff).unwrap_err();
    assert!(matches!(err, AdminError::UnknownModel(_)), "{err}");
}

#[test]
fn question_inline_allows_at_most_three_answers() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let staff = seed_user(&store, "admin", "admin@example.com", true);

    let change = QuestionChange {
        question: NewQuestion::new("Now is better than?", Difficulty::Medium),
        answers: vec![
            InlineAnswer::new("never", AnswerScore::Correct),
            InlineAnswer::new("later", AnswerScore::Incorrect),
            InlineAnswer::new("", AnswerScore::Incorrect),
        ],
    };
    let question = save_question(&store, None, &change, &staff).unwrap();
    let answers = store.answers().answers_for_question(question.id, false).unwrap();
    assert_eq!(answers.len(), 2);
    assert_eq!(question.audit.creator, Some(staff.id));

    let too_many = QuestionChange {
        question: NewQuestion::new("Now is better than?", Difficulty::Medium),
        answers: vec![
            InlineAnswer::new("soon", AnswerScore::Incorrect),
            InlineAnswer::new("tomorrow", AnswerScore::Incorrect),
        ],
    };
    let err = save_question(&store, Some(question.id), &too_many, &staff).unwrap_err();
    assert!(
        matches!(err, AdminError::TooManyInlines { submitted: 4, .. }),
        "{err}"
    );
    // Rejected saves leave nothing behind.
    assert_eq!(
        store.answers().answers_for_question(question.id, false).unwrap().len(),
        2
    );

    let mut swap = InlineAnswer::new("soon", AnswerScore::Incorrect);
    swap.id = Some(answers[1].id);
    swap.delete = true;
    let replace = QuestionChange {
        question: NewQuestion::new("Now is better than?", Difficulty::Medium),
        answers: vec![swap, InlineAnswer::new("soon", AnswerScore::Incorrect)],
    };
    save_question(&store, Some(question.id), &replace, &staff).unwrap();
    let texts: Vec<String> = store
        .answers()
        .answers_for_question(question.id, false)
        .unwrap()
        .into_iter()
        .map(|answer| answer.answer)
        .collect();
    assert_eq!(texts, vec!["never".to_string(), "soon".to_string()]);
}

#[test]
fn question_save_joins_an_open_transaction() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let staff = seed_user(&store, "admin", "admin@example.com", true);
    let change = QuestionChange {
        question: NewQuestion::new("Errors should never pass?", Difficulty::Hard),
        answers: vec![
            InlineAnswer::new("silently", AnswerScore::Correct),
            InlineAnswer::new("loudly", AnswerScore::Incorrect),
        ],
    };

    let outer = conn.unchecked_transaction().unwrap();
    let kept = save_question(&store, None, &change, &staff).unwrap();
    outer.commit().unwrap();
    assert_eq!(
        store.answers().answers_for_question(kept.id, false).unwrap().len(),
        2
    );

    let outer = conn.unchecked_transaction().unwrap();
    let dropped = save_question(&store, None, &change, &staff).unwrap();
    drop(outer);
    assert!(store.questions().get_question(dropped.id).unwrap().is_none());
}

#[test]
fn inline_rows_must_belong_to_the_question() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let staff = seed_user(&store, "admin", "admin@example.com", true);
    let first = seed_question(&store, "One?", Difficulty::Easy);
    let second = seed_question(&store, "Two?", Difficulty::Easy);

    let mut foreign = InlineAnswer::new("hijacked", AnswerScore::Correct);
    foreign.id = Some(second.correct);
    let change = QuestionChange {
        question: NewQuestion::new("One?", Difficulty::Easy),
        answers: vec![foreign],
    };
    assert!(save_question(&store, Some(first.id), &change, &staff).is_err());
    let untouched = store.answers().get_answer(second.correct).unwrap().unwrap();
    assert_eq!(untouched.answer, "right");
}

#[test]
fn quiz_save_prepopulates_slug_and_replaces_questions() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let editor = seed_user(&store, "editor", "editor@example.com", false);
    let first = seed_question(&store, "One?", Difficulty::Easy);
    let second = seed_question(&store, "Two?", Difficulty::Hard);

    let mut change = QuizChange::new("Rust Ownership 101");
    change.question_ids = vec![first.id, second.id];
    let quiz = save_quiz(&store, None, &change, &editor).unwrap();
    assert_eq!(quiz.slug, "rust-ownership-101");
    assert_eq!(quiz.audit.creator, None);
    assert_eq!(
        store.quizzes().question_ids(quiz.id).unwrap(),
        vec![first.id, second.id]
    );

    change.question_ids = vec![second.id];
    change.status = QuizStatus::Live;
    let quiz = save_quiz(&store, Some(quiz.id), &change, &editor).unwrap();
    assert_eq!(quiz.status, QuizStatus::Live);
    assert_eq!(store.quizzes().question_ids(quiz.id).unwrap(), vec![second.id]);
}

#[test]
fn standalone_answer_save_stamps_staff_editor() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let staff = seed_user(&store, "admin", "admin@example.com", true);
    let question = seed_question(&store, "One?", Difficulty::Easy);

    let saved = save_answer(
        &store,
        None,
        &NewAnswer::new(question.id, "maybe", AnswerScore::Incorrect),
        &staff,
    )
    .unwrap();
    assert_eq!(saved.audit.creator, Some(staff.id));
    assert_eq!(saved.audit.editor, Some(staff.id));
}
