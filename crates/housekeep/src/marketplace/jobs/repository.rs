use tracing::warn;

use super::domain::{JobPost, JobPostStatus};
use crate::marketplace::domain::{JobPostId, ProviderId, RequesterId};
use crate::marketplace::error::{MarketplaceError, RepositoryError};

/// Storage for job posts and their embedded applications.
///
/// `replace` is a compare-and-swap on `version`: it must fail with
/// [`RepositoryError::VersionConflict`] when the stored version differs from
/// `expected_version`, and otherwise persist the post with `version + 1`.
pub trait JobPostRepository: Send + Sync {
    fn insert(&self, post: JobPost) -> Result<JobPost, RepositoryError>;
    fn fetch(&self, id: &JobPostId) -> Result<Option<JobPost>, RepositoryError>;
    fn replace(&self, post: JobPost, expected_version: u64) -> Result<JobPost, RepositoryError>;
    /// Remove the post together with its applications in one step.
    fn delete(&self, id: &JobPostId) -> Result<JobPost, RepositoryError>;
    fn list_by_requester(&self, requester: &RequesterId) -> Result<Vec<JobPost>, RepositoryError>;
    fn list_by_status(&self, status: JobPostStatus) -> Result<Vec<JobPost>, RepositoryError>;
    fn list_by_applicant(&self, provider: &ProviderId) -> Result<Vec<JobPost>, RepositoryError>;
}

pub(crate) fn fetch_post<R>(repository: &R, id: &JobPostId) -> Result<JobPost, MarketplaceError>
where
    R: JobPostRepository + ?Sized,
{
    repository
        .fetch(id)?
        .ok_or_else(|| MarketplaceError::not_found(format!("job post {id}")))
}

/// Fetch, mutate a copy, and compare-and-swap it back.
///
/// Guards run inside `mutate`, so every retry re-validates against the freshly fetched post.
/// A write that fails with `Unavailable` is only reported as committed when a re-fetch shows
/// exactly the candidate at the next version.
pub(crate) fn commit<R, F>(
    repository: &R,
    id: &JobPostId,
    attempts: u8,
    mut mutate: F,
) -> Result<JobPost, MarketplaceError>
where
    R: JobPostRepository + ?Sized,
    F: FnMut(&mut JobPost) -> Result<(), MarketplaceError>,
{
    let attempts = attempts.max(1);
    let mut last_conflict = None;

    for attempt in 1..=attempts {
        let current = fetch_post(repository, id)?;
        let expected = current.version;
        let mut candidate = current;
        mutate(&mut candidate)?;

        match repository.replace(candidate.clone(), expected) {
            Ok(stored) => return Ok(stored),
            Err(RepositoryError::VersionConflict { expected, found }) => {
                warn!(post = %id, attempt, expected, found, "job post changed concurrently");
                last_conflict = Some(RepositoryError::VersionConflict { expected, found });
            }
            Err(RepositoryError::Unavailable(detail)) => {
                return reconcile(repository, candidate, expected, detail);
            }
            Err(other) => return Err(other.into()),
        }
    }

    Err(last_conflict
        .unwrap_or(RepositoryError::Unavailable("no write attempted".to_string()))
        .into())
}

fn reconcile<R>(
    repository: &R,
    mut candidate: JobPost,
    expected: u64,
    detail: String,
) -> Result<JobPost, MarketplaceError>
where
    R: JobPostRepository + ?Sized,
{
    candidate.version = expected + 1;
    match repository.fetch(&candidate.id) {
        Ok(Some(stored)) if stored == candidate => Ok(stored),
        _ => {
            warn!(post = %candidate.id, %detail, "write outcome unknown; reporting failure");
            Err(RepositoryError::Unavailable(detail).into())
        }
    }
}
