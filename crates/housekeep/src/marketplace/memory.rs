//! Mutex-backed stores used by the demo binary and the test suites.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use super::catalog::{Service, ServiceRepository};
use super::domain::{Clock, JobPostId, ProviderId, RequesterId, ServiceId};
use super::eligibility::{ProviderDirectory, ProviderVerification};
use super::error::RepositoryError;
use super::jobs::{JobPost, JobPostRepository, JobPostStatus};

#[derive(Debug, Default, Clone)]
pub struct InMemoryJobPostRepository {
    posts: Arc<Mutex<HashMap<JobPostId, JobPost>>>,
}

impl InMemoryJobPostRepository {
    fn matching<F>(&self, predicate: F) -> Vec<JobPost>
    where
        F: Fn(&JobPost) -> bool,
    {
        let guard = self.posts.lock().expect("job post mutex poisoned");
        guard.values().filter(|post| predicate(post)).cloned().collect()
    }
}

impl JobPostRepository for InMemoryJobPostRepository {
    fn insert(&self, post: JobPost) -> Result<JobPost, RepositoryError> {
        let mut guard = self.posts.lock().expect("job post mutex poisoned");
        if guard.contains_key(&post.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(post.id.clone(), post.clone());
        Ok(post)
    }

    fn fetch(&self, id: &JobPostId) -> Result<Option<JobPost>, RepositoryError> {
        let guard = self.posts.lock().expect("job post mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn replace(&self, mut post: JobPost, expected_version: u64) -> Result<JobPost, RepositoryError> {
        let mut guard = self.posts.lock().expect("job post mutex poisoned");
        let stored = guard.get_mut(&post.id).ok_or(RepositoryError::NotFound)?;
        if stored.version != expected_version {
            return Err(RepositoryError::VersionConflict {
                expected: expected_version,
                found: stored.version,
            });
        }
        post.version = expected_version + 1;
        *stored = post.clone();
        Ok(post)
    }

    fn delete(&self, id: &JobPostId) -> Result<JobPost, RepositoryError> {
        let mut guard = self.posts.lock().expect("job post mutex poisoned");
        guard.remove(id).ok_or(RepositoryError::NotFound)
    }

    fn list_by_requester(&self, requester: &RequesterId) -> Result<Vec<JobPost>, RepositoryError> {
        Ok(self.matching(|post| &post.requester_id == requester))
    }

    fn list_by_status(&self, status: JobPostStatus) -> Result<Vec<JobPost>, RepositoryError> {
        Ok(self.matching(|post| post.status == status))
    }

    fn list_by_applicant(&self, provider: &ProviderId) -> Result<Vec<JobPost>, RepositoryError> {
        Ok(self.matching(|post| post.application_from(provider).is_some()))
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryServiceRepository {
    services: Arc<Mutex<HashMap<ServiceId, Service>>>,
}

impl ServiceRepository for InMemoryServiceRepository {
    fn insert(&self, service: Service) -> Result<Service, RepositoryError> {
        let mut guard = self.services.lock().expect("service mutex poisoned");
        if guard.contains_key(&service.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(service.id.clone(), service.clone());
        Ok(service)
    }

    fn update(&self, service: Service) -> Result<Service, RepositoryError> {
        let mut guard = self.services.lock().expect("service mutex poisoned");
        match guard.get_mut(&service.id) {
            Some(stored) => {
                *stored = service.clone();
                Ok(service)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &ServiceId) -> Result<Option<Service>, RepositoryError> {
        let guard = self.services.lock().expect("service mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn delete(&self, id: &ServiceId) -> Result<Service, RepositoryError> {
        let mut guard = self.services.lock().expect("service mutex poisoned");
        guard.remove(id).ok_or(RepositoryError::NotFound)
    }

    fn list_by_provider(&self, provider: &ProviderId) -> Result<Vec<Service>, RepositoryError> {
        let guard = self.services.lock().expect("service mutex poisoned");
        Ok(guard
            .values()
            .filter(|service| &service.provider_id == provider)
            .cloned()
            .collect())
    }

    fn list_all(&self) -> Result<Vec<Service>, RepositoryError> {
        let guard = self.services.lock().expect("service mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryProviderDirectory {
    records: Arc<Mutex<HashMap<ProviderId, ProviderVerification>>>,
}

impl InMemoryProviderDirectory {
    /// Seed or overwrite a snapshot directly, bypassing the gate.
    pub fn put(&self, verification: ProviderVerification) {
        self.records
            .lock()
            .expect("directory mutex poisoned")
            .insert(verification.provider_id.clone(), verification);
    }
}

impl ProviderDirectory for InMemoryProviderDirectory {
    fn fetch(&self, provider: &ProviderId) -> Result<Option<ProviderVerification>, RepositoryError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        Ok(guard.get(provider).cloned())
    }

    fn store(
        &self,
        mut verification: ProviderVerification,
        expected_version: u64,
    ) -> Result<ProviderVerification, RepositoryError> {
        let mut guard = self.records.lock().expect("directory mutex poisoned");
        let found = guard
            .get(&verification.provider_id)
            .map_or(0, |stored| stored.version);
        if found != expected_version {
            return Err(RepositoryError::VersionConflict {
                expected: expected_version,
                found,
            });
        }
        verification.version = expected_version + 1;
        guard.insert(verification.provider_id.clone(), verification.clone());
        Ok(verification)
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().expect("clock mutex poisoned");
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}
