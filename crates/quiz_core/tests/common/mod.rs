#![allow(dead_code)]

use quiz_core::repo::answer_repo::AnswerRepository;
use quiz_core::repo::question_repo::QuestionRepository;
use quiz_core::repo::quiz_repo::QuizRepository;
use quiz_core::repo::user_repo::UserRepository;
use quiz_core::{
    AnswerId, AnswerScore, Difficulty, NewAnswer, NewQuestion, NewQuiz, NewUser, Quiz, QuizStatus,
    Store, User,
};

/// One seeded question: `(correct answer, incorrect answer)`.
pub struct SeededQuestion {
    pub id: i64,
    pub correct: AnswerId,
    pub incorrect: AnswerId,
}

/// Live quiz with one question per difficulty.
pub struct SeededQuiz {
    pub quiz: Quiz,
    pub easy: SeededQuestion,
    pub medium: SeededQuestion,
    pub hard: SeededQuestion,
}

pub fn seed_question(store: &Store<'_>, text: &str, difficulty: Difficulty) -> SeededQuestion {
    let question = store
        .questions()
        .create_question(&NewQuestion::new(text, difficulty), None)
        .unwrap();
    let answers = store.answers();
    let correct = answers
        .create_answer(
            &NewAnswer::new(question.id, "right", AnswerScore::Correct),
            None,
        )
        .unwrap();
    let incorrect = answers
        .create_answer(
            &NewAnswer::new(question.id, "wrong", AnswerScore::Incorrect),
            None,
        )
        .unwrap();
    SeededQuestion {
        id: question.id,
        correct: correct.id,
        incorrect: incorrect.id,
    }
}

pub fn seed_quiz(store: &Store<'_>, name: &str, status: QuizStatus) -> SeededQuiz {
    let mut new_quiz = NewQuiz::from_name(name);
    new_quiz.status = status;
    let quiz = store.quizzes().create_quiz(&new_quiz, None).unwrap();

    let easy = seed_question(store, "Beautiful is better than?", Difficulty::Easy);
    let medium = seed_question(store, "Explicit is better than?", Difficulty::Medium);
    let hard = seed_question(store, "Simple is better than?", Difficulty::Hard);
    store
        .quizzes()
        .set_questions(quiz.id, &[easy.id, medium.id, hard.id])
        .unwrap();

    SeededQuiz {
        quiz,
        easy,
        medium,
        hard,
    }
}

pub fn seed_user(store: &Store<'_>, username: &str, email: &str, is_staff: bool) -> User {
    store
        .users()
        .create_user(&NewUser {
            is_staff,
            ..NewUser::new(username, email)
        })
        .unwrap()
}
