//! Changelist queries: search, list filters and date hierarchy.

use crate::admin::{
    invalid_value, parse_bool, parse_status, AdminError, AdminResult, ModelAdmin, ANSWER_ADMIN,
    QUESTION_ADMIN, QUIZ_ADMIN, QUIZ_RESULT_ADMIN,
};
use crate::model::answer::Answer;
use crate::model::audit::{epoch_ms_to_datetime, Audit};
use crate::model::question::Question;
use crate::model::quiz::Quiz;
use crate::model::result::QuizResult;
use crate::model::user::{User, UserId};
use crate::repo::answer_repo::{AnswerRepository, AnswerSet};
use crate::repo::question_repo::{QuestionListQuery, QuestionRepository};
use crate::repo::quiz_repo::QuizRepository;
use crate::repo::result_repo::ResultRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::Store;
use chrono::{DateTime, Datelike, Duration, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Changelist request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeListQuery {
    /// Whitespace-separated terms; every term must match some search field.
    pub search: Option<String>,
    /// `list_filter` field to raw value.
    pub filters: BTreeMap<String, String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl ChangeListQuery {
    pub fn search(mut self, terms: impl Into<String>) -> Self {
        self.search = Some(terms.into());
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    pub fn date(mut self, year: i32, month: Option<u32>) -> Self {
        self.year = Some(year);
        self.month = month;
        self
    }
}

/// Filtered rows plus the date drill-down for the next level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeList<T> {
    pub rows: Vec<T>,
    /// Distinct years, or months within the selected year.
    pub date_hierarchy: Vec<u32>,
}

/// Relative ranges offered by a date list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Today,
    PastSevenDays,
    ThisMonth,
    ThisYear,
}

impl DateRange {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "today" => Some(Self::Today),
            "past_7_days" => Some(Self::PastSevenDays),
            "this_month" => Some(Self::ThisMonth),
            "this_year" => Some(Self::ThisYear),
            _ => None,
        }
    }

    pub fn contains(self, value: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if value > now {
            return false;
        }
        match self {
            Self::Today => value.date_naive() == now.date_naive(),
            Self::PastSevenDays => value >= now - Duration::days(7),
            Self::ThisMonth => value.year() == now.year() && value.month() == now.month(),
            Self::ThisYear => value.year() == now.year(),
        }
    }
}

pub fn questions(store: &Store<'_>, query: &ChangeListQuery) -> AdminResult<ChangeList<Question>> {
    let admin = &QUESTION_ADMIN;
    let filters = AuditFilters::parse(admin, query)?;
    let rows = store
        .questions()
        .list_questions(&QuestionListQuery::default())?
        .into_iter()
        .filter(|row| filters.matches(row.is_active, &row.audit))
        .filter(|row| matches_search(query, &[row.question.as_str()]))
        .collect();
    Ok(date_drilldown(rows, query, |row: &Question| row.audit))
}

pub fn answers(store: &Store<'_>, query: &ChangeListQuery) -> AdminResult<ChangeList<Answer>> {
    let admin = &ANSWER_ADMIN;
    let filters = AuditFilters::parse(admin, query)?;
    let question_ids: Vec<i64> = store
        .questions()
        .list_questions(&QuestionListQuery::default())?
        .iter()
        .map(|question| question.id)
        .collect();
    let rows = store
        .answers()
        .list_answers(&AnswerSet::ForQuestions(question_ids), None)?
        .into_iter()
        .filter(|row| filters.matches(row.is_active, &row.audit))
        .filter(|row| matches_search(query, &[row.answer.as_str()]))
        .collect();
    Ok(date_drilldown(rows, query, |row: &Answer| row.audit))
}

pub fn quizzes(store: &Store<'_>, query: &ChangeListQuery) -> AdminResult<ChangeList<Quiz>> {
    let admin = &QUIZ_ADMIN;
    let mut status = None;
    let mut creator = None;
    for (field, value) in &query.filters {
        match field.as_str() {
            "status" => status = Some(parse_status(value)?),
            "creator" => creator = Some(parse_user_id(field, value)?),
            _ => return Err(unknown_filter(admin, field)),
        }
    }

    let rows = store
        .quizzes()
        .list_quizzes(status)?
        .into_iter()
        .filter(|row| creator.map_or(true, |id| row.audit.creator == Some(id)))
        .filter(|row| matches_search(query, &[row.name.as_str()]))
        .collect();
    Ok(date_drilldown(rows, query, |row: &Quiz| row.audit))
}

/// Result changelist; `now` anchors the relative `created_at` filter.
pub fn results(
    store: &Store<'_>,
    query: &ChangeListQuery,
    now: DateTime<Utc>,
) -> AdminResult<ChangeList<QuizResult>> {
    let admin = &QUIZ_RESULT_ADMIN;
    let mut range = None;
    for (field, value) in &query.filters {
        match field.as_str() {
            "created_at" => {
                range = Some(
                    DateRange::from_param(value).ok_or_else(|| invalid_value(field, value))?,
                )
            }
            _ => return Err(unknown_filter(admin, field)),
        }
    }

    let users: BTreeMap<UserId, User> = store
        .users()
        .list_users()?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    let rows = store
        .results()
        .list_results(None)?
        .into_iter()
        .filter(|row| {
            range.map_or(true, |range| {
                range.contains(row.audit.created_datetime(), now)
            })
        })
        .filter(|row| {
            let user = row.user_id.and_then(|id| users.get(&id));
            let mut fields = vec![row.email.as_str()];
            if let Some(user) = user {
                fields.extend([
                    user.first_name.as_str(),
                    user.last_name.as_str(),
                    user.email.as_str(),
                ]);
            }
            matches_search(query, &fields)
        })
        .collect();
    Ok(date_drilldown(rows, query, |row: &QuizResult| row.audit))
}

/// `is_active` and `creator` filters shared by questions and answers.
struct AuditFilters {
    is_active: Option<bool>,
    creator: Option<UserId>,
}

impl AuditFilters {
    fn parse(admin: &'static ModelAdmin, query: &ChangeListQuery) -> AdminResult<Self> {
        let mut filters = Self {
            is_active: None,
            creator: None,
        };
        for (field, value) in &query.filters {
            match field.as_str() {
                "is_active" => filters.is_active = Some(parse_bool(field, value)?),
                "creator" => filters.creator = Some(parse_user_id(field, value)?),
                _ => return Err(unknown_filter(admin, field)),
            }
        }
        Ok(filters)
    }

    fn matches(&self, is_active: bool, audit: &Audit) -> bool {
        self.is_active.map_or(true, |wanted| wanted == is_active)
            && self.creator.map_or(true, |id| audit.creator == Some(id))
    }
}

fn matches_search(query: &ChangeListQuery, fields: &[&str]) -> bool {
    let Some(search) = query.search.as_deref() else {
        return true;
    };
    let fields: Vec<String> = fields.iter().map(|field| field.to_lowercase()).collect();
    search.split_whitespace().all(|term| {
        let term = term.to_lowercase();
        fields.iter().any(|field| field.contains(&term))
    })
}

fn date_drilldown<T>(
    rows: Vec<T>,
    query: &ChangeListQuery,
    audit: impl Fn(&T) -> Audit,
) -> ChangeList<T> {
    let created = |row: &T| epoch_ms_to_datetime(audit(row).created_at);

    let rows: Vec<T> = rows
        .into_iter()
        .filter(|row| {
            let created = created(row);
            query.year.map_or(true, |year| created.year() == year)
                && query.month.map_or(true, |month| created.month() == month)
        })
        .collect();

    let levels: BTreeSet<u32> = rows
        .iter()
        .map(|row| {
            let created = created(row);
            match query.year {
                Some(_) => created.month(),
                None => u32::try_from(created.year()).unwrap_or(0),
            }
        })
        .collect();

    ChangeList {
        rows,
        date_hierarchy: levels.into_iter().collect(),
    }
}

fn parse_user_id(field: &str, value: &str) -> AdminResult<UserId> {
    value
        .trim()
        .parse::<UserId>()
        .map_err(|_| invalid_value(field, value))
}

fn unknown_filter(admin: &'static ModelAdmin, field: &str) -> AdminError {
    AdminError::UnknownFilter {
        model: admin.model,
        filter: field.to_string(),
    }
}
