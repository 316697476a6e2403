mod common;

use common::{seed_question, seed_quiz, seed_user, SeededQuiz};
use quiz_core::forms::question::QuestionFormSet;
use quiz_core::forms::{FormData, INVALID_CHOICE_MESSAGE, REQUIRED_MESSAGE};
use quiz_core::repo::answer_repo::AnswerRepository;
use quiz_core::repo::question_repo::QuestionRepository;
use quiz_core::repo::quiz_repo::QuizRepository;
use quiz_core::repo::result_repo::ResultRepository;
use quiz_core::wizard::STEP_FIELD;
use quiz_core::{
    open_db_in_memory, AnswerId, AnswerScore, Difficulty, NewAnswer, NewQuestion, NewQuiz,
    QuizStatus, QuizWizard, Store, Taker, WizardOutcome, WizardState,
};

fn page(step: usize, field: &str, answer: AnswerId) -> FormData {
    FormData::from([
        (STEP_FIELD.to_string(), step.to_string()),
        (field.to_string(), answer.to_string()),
    ])
}

fn anonymous() -> Taker {
    Taker::Anonymous {
        email: "guest@example.com".to_string(),
    }
}

fn expect_page(outcome: WizardOutcome) -> usize {
    match outcome {
        WizardOutcome::Render(page) => page.step,
        WizardOutcome::Done(result) => panic!("unexpected result {}", result.id),
    }
}

#[test]
fn formset_prefixes_fields_by_difficulty() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let SeededQuiz { quiz, easy, .. } = seed_quiz(&store, "Python Zen", QuizStatus::Live);

    let formset = QuestionFormSet::load(&store, &quiz, Some(Difficulty::Easy)).unwrap();
    assert_eq!(formset.total_form_count(), 1);
    assert_eq!(formset.forms[0].field_name(), "easy-0-answers");
    assert_eq!(formset.question_ids(), &[easy.id]);
    assert_eq!(formset.maximum_score(), 1);

    let all = QuestionFormSet::load(&store, &quiz, None).unwrap();
    assert_eq!(all.forms[2].field_name(), "form-2-answers");
    assert_eq!(all.maximum_score(), 3);
}

#[test]
fn formset_reports_required_and_invalid_choices() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let seeded = seed_quiz(&store, "Python Zen", QuizStatus::Live);
    let mut formset = QuestionFormSet::load(&store, &seeded.quiz, Some(Difficulty::Easy)).unwrap();

    formset.bind(&FormData::new());
    assert!(!formset.is_valid());
    assert_eq!(formset.forms[0].errors, vec![REQUIRED_MESSAGE.to_string()]);
    assert!(formset.answer_ids().is_none());

    // An answer of another question is not a valid choice here.
    formset.bind(&page(0, "easy-0-answers", seeded.hard.correct));
    assert_eq!(formset.forms[0].errors, vec![INVALID_CHOICE_MESSAGE.to_string()]);

    formset.bind(&page(0, "easy-0-answers", seeded.easy.correct));
    assert!(formset.is_valid());
    assert_eq!(formset.answer_ids(), Some(vec![seeded.easy.correct]));
    assert_eq!(
        formset.calculate_score(&store.answers()).unwrap(),
        Some(1)
    );
    assert_eq!(
        formset
            .calculate_score_percentage(&store.answers(), true)
            .unwrap(),
        Some(100)
    );
}

#[test]
fn percentage_truncates_unless_rounding() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let seeded = seed_quiz(&store, "Python Zen", QuizStatus::Live);
    let mut formset = QuestionFormSet::load(&store, &seeded.quiz, None).unwrap();

    formset.bind(&FormData::from([
        ("form-0-answers".to_string(), seeded.easy.correct.to_string()),
        ("form-1-answers".to_string(), seeded.medium.correct.to_string()),
        ("form-2-answers".to_string(), seeded.hard.incorrect.to_string()),
    ]));
    let answers = store.answers();
    assert_eq!(formset.calculate_score_percentage(&answers, false).unwrap(), Some(66));
    assert_eq!(formset.calculate_score_percentage(&answers, true).unwrap(), Some(67));

    let chosen: Vec<AnswerId> = formset
        .get_answers()
        .unwrap()
        .into_iter()
        .map(|answer| answer.id)
        .collect();
    assert_eq!(
        chosen,
        vec![seeded.easy.correct, seeded.medium.correct, seeded.hard.incorrect]
    );

    formset.bind(&FormData::new());
    assert!(formset.get_answers().is_none());
    assert_eq!(formset.calculate_score_percentage(&answers, false).unwrap(), None);
}

#[test]
fn percentage_is_unavailable_without_a_correct_answer() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let quiz = store
        .quizzes()
        .create_quiz(&NewQuiz::from_name("Trick Questions"), None)
        .unwrap();
    let question = store
        .questions()
        .create_question(&NewQuestion::new("Is there one obvious way?", Difficulty::Easy), None)
        .unwrap();
    let wrong = store
        .answers()
        .create_answer(&NewAnswer::new(question.id, "many", AnswerScore::Incorrect), None)
        .unwrap();
    store.quizzes().set_questions(quiz.id, &[question.id]).unwrap();

    let mut formset = QuestionFormSet::load(&store, &quiz, Some(Difficulty::Easy)).unwrap();
    formset.bind(&page(0, "easy-0-answers", wrong.id));
    assert!(formset.is_valid());
    assert_eq!(formset.maximum_score(), 0);
    assert_eq!(
        formset.calculate_score_percentage(&store.answers(), true).unwrap(),
        None
    );
}

#[test]
fn inactive_answers_are_not_offered() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let seeded = seed_quiz(&store, "Python Zen", QuizStatus::Live);
    let mut hidden = NewAnswer::new(seeded.easy.id, "hidden", AnswerScore::Incorrect);
    hidden.is_active = false;
    let hidden = store.answers().create_answer(&hidden, None).unwrap();

    let mut formset = QuestionFormSet::load(&store, &seeded.quiz, Some(Difficulty::Easy)).unwrap();
    assert_eq!(formset.forms[0].choices.len(), 2);
    formset.bind(&page(0, "easy-0-answers", hidden.id));
    assert!(!formset.is_valid());
}

#[test]
fn wizard_walks_three_pages_and_records_result() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let seeded = seed_quiz(&store, "Python Zen", QuizStatus::Live);
    let mut wizard = QuizWizard::load(store, seeded.quiz.clone()).unwrap();
    let mut state = WizardState::default();
    let taker = anonymous();

    assert_eq!(wizard.step_count(), 3);
    assert_eq!(expect_page(wizard.get(&mut state)), 0);

    let outcome = wizard
        .post(&mut state, &page(0, "easy-0-answers", seeded.easy.correct), &taker)
        .unwrap();
    assert_eq!(expect_page(outcome), 1);
    let outcome = wizard
        .post(&mut state, &page(1, "medium-0-answers", seeded.medium.incorrect), &taker)
        .unwrap();
    assert_eq!(expect_page(outcome), 2);
    assert_eq!(state.submitted.len(), 2);

    let outcome = wizard
        .post(&mut state, &page(2, "hard-0-answers", seeded.hard.correct), &taker)
        .unwrap();
    let WizardOutcome::Done(result) = outcome else {
        panic!("wizard did not finish");
    };
    assert_eq!(result.score, 2);
    assert_eq!(result.maximum_score, 3);
    assert_eq!(result.user_id, None);
    assert_eq!(result.email, "guest@example.com");
    assert_eq!(
        result.answer_ids,
        vec![seeded.easy.correct, seeded.medium.incorrect, seeded.hard.correct]
    );
    assert_eq!(state, WizardState::default());
}

#[test]
fn invalid_page_is_rendered_again_with_errors() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let seeded = seed_quiz(&store, "Python Zen", QuizStatus::Live);
    let mut wizard = QuizWizard::load(store, seeded.quiz).unwrap();
    let mut state = WizardState::default();

    let data = FormData::from([(STEP_FIELD.to_string(), "0".to_string())]);
    let outcome = wizard.post(&mut state, &data, &anonymous()).unwrap();
    let WizardOutcome::Render(page) = outcome else {
        panic!("invalid page finished the wizard");
    };
    assert_eq!(page.step, 0);
    assert_eq!(page.formset.forms[0].errors, vec![REQUIRED_MESSAGE.to_string()]);
    assert_eq!(state.step, 0);
    assert!(state.submitted.is_empty());
}

#[test]
fn submission_for_another_step_re_renders_current_page() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let seeded = seed_quiz(&store, "Python Zen", QuizStatus::Live);
    let mut wizard = QuizWizard::load(store, seeded.quiz).unwrap();
    let mut state = WizardState::default();

    let outcome = wizard
        .post(&mut state, &page(2, "hard-0-answers", seeded.hard.correct), &anonymous())
        .unwrap();
    let WizardOutcome::Render(page) = outcome else {
        panic!("skipped pages finished the wizard");
    };
    assert_eq!(page.step, 0);
    assert!(page.formset.forms[0].errors.is_empty());
    assert!(store.results().list_results(None).unwrap().is_empty());
}

#[test]
fn results_of_signed_in_takers_belong_to_the_user() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let seeded = seed_quiz(&store, "Python Zen", QuizStatus::Live);
    let user = seed_user(&store, "tim", "tim@example.com", false);
    let mut wizard = QuizWizard::load(store, seeded.quiz.clone()).unwrap();
    let mut state = WizardState::default();
    let taker = Taker::User(user.clone());

    wizard
        .post(&mut state, &page(0, "easy-0-answers", seeded.easy.correct), &taker)
        .unwrap();
    wizard
        .post(&mut state, &page(1, "medium-0-answers", seeded.medium.correct), &taker)
        .unwrap();
    let WizardOutcome::Done(result) = wizard
        .post(&mut state, &page(2, "hard-0-answers", seeded.hard.correct), &taker)
        .unwrap()
    else {
        panic!("wizard did not finish");
    };

    assert_eq!(result.user_id, Some(user.id));
    assert_eq!(result.email, "tim@example.com");
    assert_eq!(result.percentage(), Some(100.0));
}

#[test]
fn answer_retired_mid_attempt_sends_taker_back() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let seeded = seed_quiz(&store, "Python Zen", QuizStatus::Live);
    let mut state = WizardState::default();
    let taker = anonymous();

    let mut wizard = QuizWizard::load(store, seeded.quiz.clone()).unwrap();
    wizard
        .post(&mut state, &page(0, "easy-0-answers", seeded.easy.correct), &taker)
        .unwrap();
    wizard
        .post(&mut state, &page(1, "medium-0-answers", seeded.medium.correct), &taker)
        .unwrap();

    let mut retired = NewAnswer::new(seeded.easy.id, "right", AnswerScore::Correct);
    retired.is_active = false;
    store
        .answers()
        .update_answer(seeded.easy.correct, &retired, None)
        .unwrap();

    // Each request loads the wizard afresh.
    let mut wizard = QuizWizard::load(store, seeded.quiz).unwrap();
    let outcome = wizard
        .post(&mut state, &page(2, "hard-0-answers", seeded.hard.correct), &taker)
        .unwrap();
    let WizardOutcome::Render(page) = outcome else {
        panic!("stale answer was recorded");
    };
    assert_eq!(page.step, 0);
    assert_eq!(page.formset.forms[0].errors, vec![INVALID_CHOICE_MESSAGE.to_string()]);
    assert_eq!(state.step, 0);
    assert!(state.submitted.is_empty());
    assert!(store.results().list_results(None).unwrap().is_empty());
}

#[test]
fn page_without_questions_is_passed_through() {
    let conn = open_db_in_memory().unwrap();
    let store = Store::try_new(&conn).unwrap();
    let quiz = store
        .quizzes()
        .create_quiz(&NewQuiz::from_name("No Middle"), None)
        .unwrap();
    let easy = seed_question(&store, "Sparse is better than?", Difficulty::Easy);
    let hard = seed_question(&store, "Readability counts?", Difficulty::Hard);
    store.quizzes().set_questions(quiz.id, &[easy.id, hard.id]).unwrap();

    let mut wizard = QuizWizard::load(store, quiz).unwrap();
    let mut state = WizardState::default();
    let taker = anonymous();

    wizard
        .post(&mut state, &page(0, "easy-0-answers", easy.correct), &taker)
        .unwrap();
    let empty = FormData::from([(STEP_FIELD.to_string(), "1".to_string())]);
    let WizardOutcome::Render(middle) = wizard.post(&mut state, &empty, &taker).unwrap() else {
        panic!("wizard finished early");
    };
    assert_eq!(middle.step, 2);
    let WizardOutcome::Done(result) = wizard
        .post(&mut state, &page(2, "hard-0-answers", hard.incorrect), &taker)
        .unwrap()
    else {
        panic!("wizard did not finish");
    };
    assert_eq!(result.score, 1);
    assert_eq!(result.maximum_score, 2);
    assert_eq!(result.answer_ids, vec![easy.correct, hard.incorrect]);
}
