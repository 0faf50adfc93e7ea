use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::marketplace::domain::{ApplicationId, JobPostId, ProviderId, Weekday};
use crate::marketplace::jobs::{JobPost, JobPostStatus};

/// Per-applicant status nested inside a job post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// Provider payload submitted with an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDraft {
    pub cover_message: String,
    pub proposed_rate: Decimal,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub availability: BTreeMap<Weekday, bool>,
    pub requested_start: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_post_id: JobPostId,
    pub provider_id: ProviderId,
    pub cover_message: String,
    pub proposed_rate: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    pub availability: BTreeMap<Weekday, bool>,
    pub requested_start: NaiveDate,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

impl Application {
    pub(crate) fn from_draft(
        id: ApplicationId,
        job_post_id: JobPostId,
        provider_id: ProviderId,
        draft: ApplicationDraft,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            job_post_id,
            provider_id,
            cover_message: draft.cover_message,
            proposed_rate: draft.proposed_rate,
            experience: draft.experience,
            availability: draft.availability,
            requested_start: draft.requested_start,
            status: ApplicationStatus::Pending,
            submitted_at: now,
            decided_at: None,
        }
    }

    pub fn available_days(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.availability
            .iter()
            .filter(|(_, available)| **available)
            .map(|(day, _)| *day)
    }
}

/// Whether hiring one applicant closes out the others still pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HirePolicy {
    #[default]
    LeaveOthersPending,
    RejectOthers,
}

impl HirePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "leave_pending" | "leave_others_pending" => Some(Self::LeaveOthersPending),
            "reject_others" | "cascade_reject" => Some(Self::RejectOthers),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            HirePolicy::LeaveOthersPending => "leave_pending",
            HirePolicy::RejectOthers => "reject_others",
        }
    }
}

/// A provider's own application with enough post context to render "my applications".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderApplicationView {
    pub application: Application,
    pub job_title: String,
    pub job_location: String,
    pub job_status: JobPostStatus,
}

/// Result of a successful hire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HireOutcome {
    pub hired: Application,
    /// The post as stored after the hire.
    pub post: JobPost,
    /// Pending applicants closed out by [`HirePolicy::RejectOthers`].
    pub rejected: Vec<ApplicationId>,
}
