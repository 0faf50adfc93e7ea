use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{filter, JobSearch};
use crate::marketplace::applications::Application;
use crate::marketplace::domain::{JobPostId, ProviderId, RequesterId};
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::jobs::{Budget, JobPost, JobPostRepository, JobPostStatus, JobSchedule};

/// An open post as a provider sees it: other providers' applications are stripped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenJobPostView {
    pub id: JobPostId,
    pub requester_id: RequesterId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub skills: Vec<String>,
    pub schedule: JobSchedule,
    pub budget: Budget,
    pub status: JobPostStatus,
    pub created_at: DateTime<Utc>,
    pub applicant_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_application: Option<Application>,
}

impl OpenJobPostView {
    fn for_provider(post: JobPost, provider: &ProviderId) -> Self {
        let applicant_count = post.active_applicant_count();
        let my_application = post.application_from(provider).cloned();
        Self {
            id: post.id,
            requester_id: post.requester_id,
            title: post.title,
            description: post.description,
            location: post.location,
            skills: post.skills,
            schedule: post.schedule,
            budget: post.budget,
            status: post.status,
            created_at: post.created_at,
            applicant_count,
            my_application,
        }
    }
}

/// Read path for `openJobPosts`: fetch active posts, filter, and redact.
pub struct JobBoard<R> {
    posts: Arc<R>,
}

impl<R> JobBoard<R>
where
    R: JobPostRepository + 'static,
{
    pub fn new(posts: Arc<R>) -> Self {
        Self { posts }
    }

    pub fn open_posts(
        &self,
        provider: &ProviderId,
        search: &JobSearch,
    ) -> Result<Vec<OpenJobPostView>, MarketplaceError> {
        let open = self.posts.list_by_status(JobPostStatus::Active)?;
        let applied_to: HashSet<JobPostId> = open
            .iter()
            .filter(|post| post.application_from(provider).is_some())
            .map(|post| post.id.clone())
            .collect();

        Ok(filter(&open, search, &applied_to)
            .into_iter()
            .map(|post| OpenJobPostView::for_provider(post, provider))
            .collect())
    }
}
