//! Multi-page quiz wizard.
//!
//! # Responsibility
//! - Walk a taker through the easy, medium and hard pages of a quiz.
//! - Keep submitted pages in session state between requests.
//! - Score the attempt and record a result when the last page is submitted.
//!
//! # Invariants
//! - Pages are always visited in `Difficulty::ALL` order.
//! - Every stored page is re-validated before a result is recorded.
//! - State is reset once a result has been recorded.

use crate::forms::question::QuestionFormSet;
use crate::forms::FormData;
use crate::model::answer::AnswerId;
use crate::model::question::Difficulty;
use crate::model::quiz::Quiz;
use crate::model::result::{NewQuizResult, QuizResult};
use crate::model::user::User;
use crate::repo::error::RepoResult;
use crate::repo::result_repo::ResultRepository;
use crate::repo::Store;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Hidden field identifying which page a submission belongs to.
pub const STEP_FIELD: &str = "wizard_step";

/// Progress of one quiz attempt, persisted in the taker's session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    /// Zero-based index of the page awaiting submission.
    pub step: usize,
    /// Raw submissions of the completed pages, in page order.
    pub submitted: Vec<FormData>,
}

/// Who the result is recorded for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Taker {
    User(User),
    Anonymous { email: String },
}

impl Taker {
    fn result_owner(&self) -> (Option<i64>, String) {
        match self {
            Self::User(user) => (Some(user.id), user.email.clone()),
            Self::Anonymous { email } => (None, email.clone()),
        }
    }
}

/// Page to render for the taker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardPage {
    pub quiz: Quiz,
    /// Zero-based page index.
    pub step: usize,
    pub step_count: usize,
    pub formset: QuestionFormSet,
}

/// Result of handling one wizard request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardOutcome {
    Render(Box<WizardPage>),
    Done(QuizResult),
}

/// Wizard over the three difficulty pages of one quiz.
pub struct QuizWizard<'conn> {
    store: Store<'conn>,
    quiz: Quiz,
    steps: Vec<QuestionFormSet>,
}

impl<'conn> QuizWizard<'conn> {
    pub fn load(store: Store<'conn>, quiz: Quiz) -> RepoResult<Self> {
        let steps = Difficulty::ALL
            .into_iter()
            .map(|difficulty| QuestionFormSet::load(&store, &quiz, Some(difficulty)))
            .collect::<RepoResult<Vec<_>>>()?;
        Ok(Self { store, quiz, steps })
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Renders the current page without submitted data.
    pub fn get(&self, state: &mut WizardState) -> WizardOutcome {
        self.normalize(state);
        self.render(state.step)
    }

    /// Handles one submitted page.
    ///
    /// Submissions for a page other than the current one re-render the
    /// current page unbound.
    pub fn post(
        &mut self,
        state: &mut WizardState,
        data: &FormData,
        taker: &Taker,
    ) -> RepoResult<WizardOutcome> {
        self.normalize(state);

        let posted_step = data
            .get(STEP_FIELD)
            .and_then(|value| value.trim().parse::<usize>().ok());
        if posted_step != Some(state.step) {
            return Ok(self.render(state.step));
        }

        let current = state.step;
        self.steps[current].bind(data);
        if !self.steps[current].is_valid() {
            return Ok(self.render(current));
        }

        state.submitted.push(data.clone());
        state.step += 1;
        if state.step < self.step_count() {
            return Ok(self.render(state.step));
        }

        self.done(state, taker)
    }

    fn done(&mut self, state: &mut WizardState, taker: &Taker) -> RepoResult<WizardOutcome> {
        for (index, data) in state.submitted.clone().iter().enumerate() {
            self.steps[index].bind(data);
            if !self.steps[index].is_valid() {
                state.step = index;
                state.submitted.truncate(index);
                return Ok(self.render(index));
            }
        }

        let answers_repo = self.store.answers();
        let mut score = 0u32;
        let mut maximum_score = 0u32;
        let mut answer_ids: BTreeSet<AnswerId> = BTreeSet::new();
        for formset in &mut self.steps {
            score += formset.calculate_score(&answers_repo)?.unwrap_or(0);
            maximum_score += formset.maximum_score();
            answer_ids.extend(formset.answer_ids().unwrap_or_default());
        }

        let (user_id, email) = taker.result_owner();
        let result = self.store.results().create_result(&NewQuizResult {
            quiz_id: self.quiz.id,
            user_id,
            email,
            answer_ids: answer_ids.into_iter().collect(),
            score,
            maximum_score,
        })?;

        info!(
            "event=quiz_done module=wizard status=ok quiz={} result_id={} score={} maximum_score={}",
            self.quiz.slug, result.id, score, maximum_score
        );
        *state = WizardState::default();
        Ok(WizardOutcome::Done(result))
    }

    fn normalize(&self, state: &mut WizardState) {
        if state.step >= self.step_count() || state.submitted.len() != state.step {
            *state = WizardState::default();
        }
    }

    fn render(&self, step: usize) -> WizardOutcome {
        WizardOutcome::Render(Box::new(WizardPage {
            quiz: self.quiz.clone(),
            step,
            step_count: self.step_count(),
            formset: self.steps[step].clone(),
        }))
    }
}
