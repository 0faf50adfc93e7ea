use std::sync::Arc;

use tracing::info;

use super::domain::{JobPost, JobPostDraft, JobPostStatus, RequesterJobPostView};
use super::repository::{commit, fetch_post, JobPostRepository};
use super::validation::normalize_draft;
use crate::marketplace::domain::{next_job_post_id, Clock, JobPostId, RequesterId};
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::matching::{sort_posts, PostOrder};

/// Owns the requester-side transitions of a job post.
pub struct JobPostManager<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    write_attempts: u8,
}

pub(crate) fn ensure_owner(post: &JobPost, requester: &RequesterId) -> Result<(), MarketplaceError> {
    if post.is_owned_by(requester) {
        Ok(())
    } else {
        Err(MarketplaceError::Unauthorized("job post"))
    }
}

impl<R> JobPostManager<R>
where
    R: JobPostRepository + 'static,
{
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>, write_attempts: u8) -> Self {
        Self {
            repository,
            clock,
            write_attempts,
        }
    }

    /// Publish a new post; it starts out `active` with no applicants.
    pub fn create(
        &self,
        requester: &RequesterId,
        draft: JobPostDraft,
    ) -> Result<JobPost, MarketplaceError> {
        let draft = normalize_draft(draft)?;
        let post = JobPost::from_draft(
            next_job_post_id(),
            requester.clone(),
            draft,
            self.clock.now(),
        );

        let stored = self.repository.insert(post)?;
        info!(post = %stored.id, requester = %requester, "job post created");
        Ok(stored)
    }

    pub fn get(
        &self,
        requester: &RequesterId,
        id: &JobPostId,
    ) -> Result<RequesterJobPostView, MarketplaceError> {
        let post = fetch_post(self.repository.as_ref(), id)?;
        ensure_owner(&post, requester)?;
        Ok(post.into())
    }

    /// Replace the editable content; only `active` and `paused` posts accept edits.
    pub fn update(
        &self,
        requester: &RequesterId,
        id: &JobPostId,
        draft: JobPostDraft,
    ) -> Result<JobPost, MarketplaceError> {
        let draft = normalize_draft(draft)?;
        let now = self.clock.now();

        let stored = commit(self.repository.as_ref(), id, self.write_attempts, |post| {
            ensure_owner(post, requester)?;
            if !post.status.is_open_for_hiring() {
                return Err(MarketplaceError::invalid_state(format!(
                    "cannot edit a {} job post",
                    post.status.label()
                )));
            }
            post.apply_draft(draft.clone(), now);
            Ok(())
        })?;

        info!(post = %id, "job post updated");
        Ok(stored)
    }

    /// Requester-driven transitions: `active <-> paused` and `* -> archived`.
    ///
    /// `hired` is only reachable by accepting an application.
    pub fn set_status(
        &self,
        requester: &RequesterId,
        id: &JobPostId,
        target: JobPostStatus,
    ) -> Result<JobPost, MarketplaceError> {
        let now = self.clock.now();
        let mut previous = None;

        let stored = commit(self.repository.as_ref(), id, self.write_attempts, |post| {
            ensure_owner(post, requester)?;
            check_transition(post.status, target)?;
            previous = Some(post.status);
            post.status = target;
            if target != JobPostStatus::Hired {
                // The accepted application still records who was hired.
                post.hired = None;
            }
            post.updated_at = now;
            Ok(())
        })?;

        info!(
            post = %id,
            from = previous.map(JobPostStatus::label).unwrap_or("unknown"),
            to = target.label(),
            "job post status changed"
        );
        Ok(stored)
    }

    /// Delete the post and, with it, every application it holds.
    pub fn delete(&self, requester: &RequesterId, id: &JobPostId) -> Result<JobPost, MarketplaceError> {
        let post = fetch_post(self.repository.as_ref(), id)?;
        ensure_owner(&post, requester)?;

        let removed = self.repository.delete(id)?;
        info!(
            post = %id,
            applications = removed.applicants.len(),
            "job post deleted"
        );
        Ok(removed)
    }

    /// The requester's posts, newest first unless another order is requested.
    pub fn list_my_posts(
        &self,
        requester: &RequesterId,
        status: Option<JobPostStatus>,
        order: PostOrder,
    ) -> Result<Vec<RequesterJobPostView>, MarketplaceError> {
        let mut posts: Vec<JobPost> = self
            .repository
            .list_by_requester(requester)?
            .into_iter()
            .filter(|post| status.map_or(true, |wanted| post.status == wanted))
            .collect();

        sort_posts(&mut posts, order);
        Ok(posts.into_iter().map(RequesterJobPostView::from).collect())
    }
}

pub(crate) fn check_transition(
    from: JobPostStatus,
    to: JobPostStatus,
) -> Result<(), MarketplaceError> {
    use JobPostStatus::*;

    match (from, to) {
        (Active, Paused) | (Paused, Active) => Ok(()),
        (Archived, _) => Err(MarketplaceError::invalid_state(
            "archived job posts cannot change status",
        )),
        (_, Archived) => Ok(()),
        (_, Hired) => Err(MarketplaceError::invalid_state(
            "a job post becomes hired only by accepting an application",
        )),
        (from, to) => Err(MarketplaceError::invalid_state(format!(
            "cannot move a {} job post to {}",
            from.label(),
            to.label()
        ))),
    }
}
