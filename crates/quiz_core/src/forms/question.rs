//! Question forms and the per-difficulty formset behind each wizard page.
//!
//! # Responsibility
//! - Render one radio choice per active answer of a question.
//! - Score the chosen answers of a page and report the best possible score.
//!
//! # Invariants
//! - A formset holds one form per live question of its quiz and difficulty,
//!   ordered by question id.
//! - Scores are only available once every form of the set is valid.

use crate::forms::{FormData, INVALID_CHOICE_MESSAGE, REQUIRED_MESSAGE};
use crate::model::answer::{Answer, AnswerId};
use crate::model::question::{Difficulty, Question, QuestionId};
use crate::model::quiz::Quiz;
use crate::repo::answer_repo::{AnswerRepository, AnswerSet};
use crate::repo::error::RepoResult;
use crate::repo::quiz_repo::QuizRepository;
use crate::repo::Store;
use serde::Serialize;

pub const ANSWER_FIELD: &str = "answers";
pub const ANSWER_LABEL: &str = "Please select an answer:";

/// Single multiple choice question rendered as radio buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionForm {
    /// Form prefix such as `easy-0`.
    pub prefix: String,
    pub question: Question,
    /// `(answer id, answer text)` pairs offered to the taker.
    pub choices: Vec<(AnswerId, String)>,
    pub errors: Vec<String>,
    /// Raw submitted value, kept for re-rendering.
    pub value: Option<String>,
    #[serde(skip)]
    answers: Vec<Answer>,
    #[serde(skip)]
    bound: bool,
    #[serde(skip)]
    selected: Option<usize>,
}

impl QuestionForm {
    /// Builds an unbound form offering the active members of `answers`.
    pub fn new(prefix: impl Into<String>, question: Question, answers: Vec<Answer>) -> Self {
        let answers: Vec<Answer> = answers.into_iter().filter(|a| a.is_active).collect();
        let choices = answers.iter().map(|a| (a.id, a.answer.clone())).collect();
        Self {
            prefix: prefix.into(),
            question,
            choices,
            errors: Vec::new(),
            value: None,
            answers,
            bound: false,
            selected: None,
        }
    }

    pub fn label(&self) -> &'static str {
        ANSWER_LABEL
    }

    /// Submitted field name, e.g. `easy-0-answers`.
    pub fn field_name(&self) -> String {
        format!("{}-{ANSWER_FIELD}", self.prefix)
    }

    /// Binds submitted data and validates the choice.
    pub fn bind(&mut self, data: &FormData) {
        self.bound = true;
        self.errors.clear();
        self.selected = None;
        self.value = data.get(&self.field_name()).cloned();

        let raw = self.value.as_deref().map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            self.errors.push(REQUIRED_MESSAGE.to_string());
            return;
        }
        let selected = raw
            .parse::<AnswerId>()
            .ok()
            .and_then(|id| self.answers.iter().position(|answer| answer.id == id));
        match selected {
            Some(index) => self.selected = Some(index),
            None => self.errors.push(INVALID_CHOICE_MESSAGE.to_string()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.bound && self.selected.is_some()
    }

    pub fn selected_answer(&self) -> Option<&Answer> {
        self.selected.and_then(|index| self.answers.get(index))
    }

    /// Score of the chosen answer; `None` while the form is invalid.
    pub fn score(&self) -> Option<u32> {
        self.selected_answer()
            .map(|answer| u32::try_from(answer.score.value()).unwrap_or(0))
    }

    pub fn is_correct(&self) -> bool {
        self.score().is_some_and(|score| score >= 1)
    }
}

/// One wizard page: a form per live question of a quiz at one difficulty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionFormSet {
    pub quiz: Quiz,
    pub difficulty: Option<Difficulty>,
    pub prefix: String,
    pub forms: Vec<QuestionForm>,
    maximum_score: u32,
    #[serde(skip)]
    question_ids: Vec<QuestionId>,
    #[serde(skip)]
    result: Option<u32>,
}

impl QuestionFormSet {
    /// Loads the live questions (and their answers) for one page.
    ///
    /// Without a difficulty the set spans every live question of the quiz.
    pub fn load(store: &Store<'_>, quiz: &Quiz, difficulty: Option<Difficulty>) -> RepoResult<Self> {
        let prefix = difficulty.map_or("form", Difficulty::prefix).to_string();
        let questions = store.quizzes().live_questions(quiz.id, difficulty)?;
        let question_ids: Vec<QuestionId> = questions.iter().map(|q| q.id).collect();

        let answers_repo = store.answers();
        let mut forms = Vec::with_capacity(questions.len());
        for (index, question) in questions.into_iter().enumerate() {
            let answers = answers_repo.answers_for_question(question.id, true)?;
            forms.push(QuestionForm::new(
                format!("{prefix}-{index}"),
                question,
                answers,
            ));
        }

        let maximum_score =
            answers_repo.maximum_score(&AnswerSet::ForQuestions(question_ids.clone()))?;

        Ok(Self {
            quiz: quiz.clone(),
            difficulty,
            prefix,
            forms,
            maximum_score,
            question_ids,
            result: None,
        })
    }

    pub fn total_form_count(&self) -> usize {
        self.forms.len()
    }

    pub fn question_ids(&self) -> &[QuestionId] {
        &self.question_ids
    }

    pub fn bind(&mut self, data: &FormData) {
        self.result = None;
        for form in &mut self.forms {
            form.bind(data);
        }
    }

    /// Valid when every form is valid; a page without questions is valid.
    pub fn is_valid(&self) -> bool {
        self.forms.iter().all(QuestionForm::is_valid)
    }

    /// Ids of the chosen answers, when the set is valid.
    pub fn answer_ids(&self) -> Option<Vec<AnswerId>> {
        if !self.is_valid() {
            return None;
        }
        Some(
            self.forms
                .iter()
                .filter_map(|form| form.selected_answer().map(|a| a.id))
                .collect(),
        )
    }

    /// Chosen answers, when the set is valid.
    pub fn get_answers(&self) -> Option<Vec<Answer>> {
        if !self.is_valid() {
            return None;
        }
        Some(
            self.forms
                .iter()
                .filter_map(|form| form.selected_answer().cloned())
                .collect(),
        )
    }

    /// Totals the chosen answers in storage and remembers the result.
    ///
    /// Returns `None` while the set is invalid.
    pub fn calculate_score<R: AnswerRepository>(&mut self, answers: &R) -> RepoResult<Option<u32>> {
        let Some(ids) = self.answer_ids() else {
            return Ok(None);
        };
        let score = answers.score(&AnswerSet::Ids(ids))?;
        self.result = Some(score);
        Ok(Some(score))
    }

    /// Best achievable score over every answer of this page's questions.
    pub fn maximum_score(&self) -> u32 {
        self.maximum_score
    }

    /// Score as a percentage of the maximum.
    ///
    /// Rounds to nearest when `round` is set, truncates otherwise. Returns
    /// `None` when the set is invalid or nothing can be scored.
    pub fn calculate_score_percentage<R: AnswerRepository>(
        &mut self,
        answers: &R,
        round: bool,
    ) -> RepoResult<Option<u32>> {
        let result = match self.result {
            Some(result) => result,
            None => match self.calculate_score(answers)? {
                Some(result) => result,
                None => return Ok(None),
            },
        };
        if self.maximum_score == 0 {
            return Ok(None);
        }

        let ratio = f64::from(result) / f64::from(self.maximum_score) * 100.0;
        let value = if round { ratio.round() } else { ratio.trunc() };
        Ok(Some(value as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::QuestionForm;
    use crate::forms::{FormData, INVALID_CHOICE_MESSAGE, REQUIRED_MESSAGE};
    use crate::model::answer::{Answer, AnswerScore};
    use crate::model::audit::Audit;
    use crate::model::question::{Difficulty, Question};

    fn answer(id: i64, text: &str, score: AnswerScore, is_active: bool) -> Answer {
        Answer {
            id,
            question_id: 1,
            answer: text.to_string(),
            score,
            is_active,
            audit: Audit::default(),
        }
    }

    fn form() -> QuestionForm {
        let question = Question {
            id: 1,
            question: "Which keyword moves ownership into a closure?".to_string(),
            difficulty: Difficulty::Easy,
            is_active: true,
            audit: Audit::default(),
        };
        QuestionForm::new(
            "easy-0",
            question,
            vec![
                answer(10, "move", AnswerScore::Correct, true),
                answer(11, "ref", AnswerScore::Incorrect, true),
                answer(12, "own", AnswerScore::Incorrect, false),
            ],
        )
    }

    fn data(value: &str) -> FormData {
        FormData::from([("easy-0-answers".to_string(), value.to_string())])
    }

    #[test]
    fn choices_exclude_inactive_answers() {
        let form = form();
        assert_eq!(
            form.choices,
            vec![(10, "move".to_string()), (11, "ref".to_string())]
        );
        assert_eq!(form.field_name(), "easy-0-answers");
        assert!(!form.is_valid());
    }

    #[test]
    fn correct_choice_scores_one() {
        let mut form = form();
        form.bind(&data("10"));
        assert!(form.is_valid());
        assert_eq!(form.score(), Some(1));
        assert!(form.is_correct());

        form.bind(&data("11"));
        assert_eq!(form.score(), Some(0));
        assert!(!form.is_correct());
    }

    #[test]
    fn missing_and_unknown_choices_are_rejected() {
        let mut form = form();
        form.bind(&FormData::new());
        assert_eq!(form.errors, vec![REQUIRED_MESSAGE.to_string()]);
        assert_eq!(form.score(), None);

        form.bind(&data("12"));
        assert_eq!(form.errors, vec![INVALID_CHOICE_MESSAGE.to_string()]);

        form.bind(&data("not-a-number"));
        assert!(!form.is_valid());
    }
}
