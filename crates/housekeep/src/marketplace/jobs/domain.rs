use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::marketplace::applications::{Application, ApplicationStatus};
use crate::marketplace::domain::{ApplicationId, JobPostId, ProviderId, RequesterId, Weekday};

/// Lifecycle status of a job post. `Archived` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPostStatus {
    Active,
    Paused,
    Hired,
    Archived,
}

impl JobPostStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobPostStatus::Active => "active",
            JobPostStatus::Paused => "paused",
            JobPostStatus::Hired => "hired",
            JobPostStatus::Archived => "archived",
        }
    }

    /// Posts in these states still accept edits and hiring decisions.
    pub const fn is_open_for_hiring(self) -> bool {
        matches!(self, JobPostStatus::Active | JobPostStatus::Paused)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    OneTime,
    Recurring,
}

/// When the work happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobSchedule {
    OneTime {
        date: NaiveDate,
        time: NaiveTime,
    },
    Recurring {
        days: BTreeSet<Weekday>,
        frequency: Frequency,
        time: NaiveTime,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        starts_on: Option<NaiveDate>,
    },
}

impl JobSchedule {
    pub fn kind(&self) -> ScheduleKind {
        match self {
            JobSchedule::OneTime { .. } => ScheduleKind::OneTime,
            JobSchedule::Recurring { .. } => ScheduleKind::Recurring,
        }
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        match self {
            JobSchedule::OneTime { date, .. } => Some(*date),
            JobSchedule::Recurring { starts_on, .. } => *starts_on,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateUnit {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    PerJob,
}

/// What the requester is willing to pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Budget {
    Fixed {
        amount: Decimal,
        rate: RateUnit,
    },
    Range {
        min: Decimal,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<Decimal>,
        rate: RateUnit,
    },
}

impl Budget {
    /// Highest amount the post may pay; open-ended ranges have none.
    pub fn ceiling(&self) -> Option<Decimal> {
        match self {
            Budget::Fixed { amount, .. } => Some(*amount),
            Budget::Range { max, .. } => *max,
        }
    }

    pub fn rate(&self) -> RateUnit {
        match self {
            Budget::Fixed { rate, .. } | Budget::Range { rate, .. } => *rate,
        }
    }
}

/// The applicant a post was concluded with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiredPerson {
    pub application_id: ApplicationId,
    pub provider_id: ProviderId,
    pub hired_at: DateTime<Utc>,
}

/// Requester-editable content of a post, used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPostDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub schedule: JobSchedule,
    pub budget: Budget,
}

/// Aggregate root: a post plus its embedded applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPost {
    pub id: JobPostId,
    pub requester_id: RequesterId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub skills: Vec<String>,
    pub schedule: JobSchedule,
    pub budget: Budget,
    pub status: JobPostStatus,
    pub applicants: Vec<Application>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hired: Option<HiredPerson>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped by the repository on every successful replace.
    pub version: u64,
}

impl JobPost {
    pub(crate) fn from_draft(
        id: JobPostId,
        requester_id: RequesterId,
        draft: JobPostDraft,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            requester_id,
            title: draft.title,
            description: draft.description,
            location: draft.location,
            skills: draft.skills,
            schedule: draft.schedule,
            budget: draft.budget,
            status: JobPostStatus::Active,
            applicants: Vec::new(),
            hired: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub(crate) fn apply_draft(&mut self, draft: JobPostDraft, now: DateTime<Utc>) {
        self.title = draft.title;
        self.description = draft.description;
        self.location = draft.location;
        self.skills = draft.skills;
        self.schedule = draft.schedule;
        self.budget = draft.budget;
        self.updated_at = now;
    }

    pub fn is_owned_by(&self, requester: &RequesterId) -> bool {
        &self.requester_id == requester
    }

    pub fn application(&self, id: &ApplicationId) -> Option<&Application> {
        self.applicants.iter().find(|application| &application.id == id)
    }

    pub(crate) fn application_mut(&mut self, id: &ApplicationId) -> Option<&mut Application> {
        self.applicants
            .iter_mut()
            .find(|application| &application.id == id)
    }

    pub fn application_from(&self, provider: &ProviderId) -> Option<&Application> {
        self.applicants
            .iter()
            .find(|application| &application.provider_id == provider)
    }

    /// Applicants still visible to the requester (rejections are hidden, not purged).
    pub fn active_applicants(&self) -> impl Iterator<Item = &Application> {
        self.applicants
            .iter()
            .filter(|application| application.status != ApplicationStatus::Rejected)
    }

    pub fn active_applicant_count(&self) -> usize {
        self.active_applicants().count()
    }
}

/// A post as its owner sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequesterJobPostView {
    #[serde(flatten)]
    pub post: JobPost,
    pub active_applicant_count: usize,
    pub rejected_count: usize,
}

impl From<JobPost> for RequesterJobPostView {
    fn from(mut post: JobPost) -> Self {
        let before = post.applicants.len();
        post.applicants
            .retain(|application| application.status != ApplicationStatus::Rejected);
        let active_applicant_count = post.applicants.len();
        Self {
            post,
            active_applicant_count,
            rejected_count: before - active_applicant_count,
        }
    }
}
