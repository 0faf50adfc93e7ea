use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;

use super::domain::{
    Application, ApplicationDraft, ApplicationStatus, HireOutcome, HirePolicy,
    ProviderApplicationView,
};
use crate::config::MarketplaceConfig;
use crate::marketplace::domain::{
    next_application_id, ApplicationId, Clock, JobPostId, ProviderId, RequesterId,
};
use crate::marketplace::eligibility::{EligibilityGate, ProviderDirectory};
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::jobs::{
    commit, ensure_owner, fetch_post, HiredPerson, JobPost, JobPostRepository, JobPostStatus,
};

/// Owns the per-applicant state machine and the accept-means-hired transition.
///
/// Every mutation goes through a versioned write of the whole post, so concurrent
/// `apply`/`accept`/`reject` calls on one post serialize on the repository.
pub struct ApplicationManager<R, D> {
    posts: Arc<R>,
    eligibility: Arc<EligibilityGate<D>>,
    clock: Arc<dyn Clock>,
    hire_policy: HirePolicy,
    write_attempts: u8,
}

fn normalize_draft(draft: ApplicationDraft) -> Result<ApplicationDraft, MarketplaceError> {
    let cover_message = draft.cover_message.trim().to_string();
    if cover_message.is_empty() {
        return Err(MarketplaceError::validation("cover message is required"));
    }
    if draft.proposed_rate <= Decimal::ZERO {
        return Err(MarketplaceError::validation("proposed rate must be positive"));
    }

    Ok(ApplicationDraft {
        cover_message,
        experience: draft
            .experience
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty()),
        ..draft
    })
}

fn pending_application<'a>(
    post: &'a mut JobPost,
    id: &ApplicationId,
) -> Result<&'a mut Application, MarketplaceError> {
    let application = post
        .application_mut(id)
        .ok_or_else(|| MarketplaceError::not_found(format!("application {id}")))?;
    if application.status != ApplicationStatus::Pending {
        return Err(MarketplaceError::invalid_state(format!(
            "application is already {}",
            application.status.label()
        )));
    }
    Ok(application)
}

fn hire(
    post: &mut JobPost,
    id: &ApplicationId,
    policy: HirePolicy,
    now: DateTime<Utc>,
) -> Result<Vec<ApplicationId>, MarketplaceError> {
    match post.status {
        JobPostStatus::Hired => return Err(MarketplaceError::AlreadyHired),
        status if !status.is_open_for_hiring() => {
            return Err(MarketplaceError::invalid_state(format!(
                "cannot hire on a {} job post",
                status.label()
            )))
        }
        _ => {}
    }

    let application = pending_application(post, id)?;
    application.status = ApplicationStatus::Accepted;
    application.decided_at = Some(now);
    let hired = HiredPerson {
        application_id: application.id.clone(),
        provider_id: application.provider_id.clone(),
        hired_at: now,
    };

    let mut rejected = Vec::new();
    if policy == HirePolicy::RejectOthers {
        for other in post
            .applicants
            .iter_mut()
            .filter(|other| other.status == ApplicationStatus::Pending)
        {
            other.status = ApplicationStatus::Rejected;
            other.decided_at = Some(now);
            rejected.push(other.id.clone());
        }
    }

    post.status = JobPostStatus::Hired;
    post.hired = Some(hired);
    post.updated_at = now;
    Ok(rejected)
}

impl<R, D> ApplicationManager<R, D>
where
    R: JobPostRepository + 'static,
    D: ProviderDirectory + 'static,
{
    pub fn new(
        posts: Arc<R>,
        eligibility: Arc<EligibilityGate<D>>,
        clock: Arc<dyn Clock>,
        config: &MarketplaceConfig,
    ) -> Self {
        Self {
            posts,
            eligibility,
            clock,
            hire_policy: config.hire_policy,
            write_attempts: config.write_attempts,
        }
    }

    pub fn hire_policy(&self) -> HirePolicy {
        self.hire_policy
    }

    /// Submit a `pending` application to an `active` post.
    pub fn apply(
        &self,
        provider: &ProviderId,
        job_post_id: &JobPostId,
        draft: ApplicationDraft,
    ) -> Result<Application, MarketplaceError> {
        self.eligibility.require_eligible(provider)?;
        let draft = normalize_draft(draft)?;
        let now = self.clock.now();
        let application_id = next_application_id();

        let stored = commit(
            self.posts.as_ref(),
            job_post_id,
            self.write_attempts,
            |post| {
                if post.status != JobPostStatus::Active {
                    return Err(MarketplaceError::JobClosed {
                        status: post.status,
                    });
                }
                if post.application_from(provider).is_some() {
                    return Err(MarketplaceError::DuplicateApplication);
                }
                post.applicants.push(Application::from_draft(
                    application_id.clone(),
                    post.id.clone(),
                    provider.clone(),
                    draft.clone(),
                    now,
                ));
                Ok(())
            },
        )?;

        let application = stored
            .application(&application_id)
            .cloned()
            .ok_or_else(|| MarketplaceError::not_found(format!("application {application_id}")))?;
        info!(
            post = %job_post_id,
            application = %application.id,
            provider = %provider,
            "application submitted"
        );
        Ok(application)
    }

    /// Accept a pending applicant and mark the post hired in the same write.
    pub fn accept(
        &self,
        requester: &RequesterId,
        job_post_id: &JobPostId,
        application_id: &ApplicationId,
    ) -> Result<HireOutcome, MarketplaceError> {
        let now = self.clock.now();
        let policy = self.hire_policy;
        let mut rejected = Vec::new();

        let post = commit(
            self.posts.as_ref(),
            job_post_id,
            self.write_attempts,
            |post| {
                ensure_owner(post, requester)?;
                rejected = hire(post, application_id, policy, now)?;
                Ok(())
            },
        )?;

        let hired = post
            .application(application_id)
            .cloned()
            .ok_or_else(|| MarketplaceError::not_found(format!("application {application_id}")))?;
        info!(
            post = %job_post_id,
            application = %application_id,
            provider = %hired.provider_id,
            closed_out = rejected.len(),
            policy = policy.label(),
            "applicant hired"
        );

        Ok(HireOutcome {
            hired,
            post,
            rejected,
        })
    }

    /// Reject a pending applicant; the row stays stored but leaves the requester's view.
    pub fn reject(
        &self,
        requester: &RequesterId,
        job_post_id: &JobPostId,
        application_id: &ApplicationId,
    ) -> Result<Application, MarketplaceError> {
        let now = self.clock.now();

        let post = commit(
            self.posts.as_ref(),
            job_post_id,
            self.write_attempts,
            |post| {
                ensure_owner(post, requester)?;
                let application = pending_application(post, application_id)?;
                application.status = ApplicationStatus::Rejected;
                application.decided_at = Some(now);
                Ok(())
            },
        )?;

        let application = post
            .application(application_id)
            .cloned()
            .ok_or_else(|| MarketplaceError::not_found(format!("application {application_id}")))?;
        info!(post = %job_post_id, application = %application_id, "application rejected");
        Ok(application)
    }

    /// Dispatch for the `setApplicationStatus` boundary operation.
    pub fn set_status(
        &self,
        requester: &RequesterId,
        job_post_id: &JobPostId,
        application_id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, MarketplaceError> {
        match status {
            ApplicationStatus::Accepted => self
                .accept(requester, job_post_id, application_id)
                .map(|outcome| outcome.hired),
            ApplicationStatus::Rejected => self.reject(requester, job_post_id, application_id),
            ApplicationStatus::Pending => Err(MarketplaceError::invalid_state(
                "applications cannot be moved back to pending",
            )),
        }
    }

    /// Active (non-rejected) applicants of a post, for its owner.
    pub fn applicants(
        &self,
        requester: &RequesterId,
        job_post_id: &JobPostId,
    ) -> Result<Vec<Application>, MarketplaceError> {
        let post = fetch_post(self.posts.as_ref(), job_post_id)?;
        ensure_owner(&post, requester)?;
        Ok(post.active_applicants().cloned().collect())
    }

    /// Every application the provider has submitted, newest first.
    pub fn my_applications(
        &self,
        provider: &ProviderId,
    ) -> Result<Vec<ProviderApplicationView>, MarketplaceError> {
        let mut views: Vec<ProviderApplicationView> = self
            .posts
            .list_by_applicant(provider)?
            .into_iter()
            .filter_map(|post| {
                post.application_from(provider)
                    .cloned()
                    .map(|application| ProviderApplicationView {
                        application,
                        job_title: post.title.clone(),
                        job_location: post.location.clone(),
                        job_status: post.status,
                    })
            })
            .collect();

        views.sort_by(|left, right| {
            right
                .application
                .submitted_at
                .cmp(&left.application.submitted_at)
                .then_with(|| left.application.id.cmp(&right.application.id))
        });
        Ok(views)
    }
}
