//! Job-post / application lifecycle and the provider eligibility gate.
//!
//! Every operation takes the acting identity as an argument. Writes go through the
//! repository traits and return the state read back from storage; nothing is assumed
//! to have been written when a call fails.

pub mod applications;
pub mod catalog;
pub mod domain;
pub mod eligibility;
pub mod error;
pub mod jobs;
pub mod matching;
pub mod memory;
pub mod router;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

pub use applications::{
    Application, ApplicationDraft, ApplicationManager, ApplicationStatus, HireOutcome, HirePolicy,
    ProviderApplicationView,
};
pub use catalog::{Service, ServiceCatalog, ServiceDraft, ServiceRepository, WeeklyAvailability};
pub use domain::{
    AdminId, ApplicationId, Clock, JobPostId, ProviderId, RequesterId, ServiceId, SystemClock,
    Weekday,
};
pub use eligibility::{
    DisplayStatus, DocumentKind, DocumentStatus, DocumentUpload, EligibilityEvaluator,
    EligibilityGate, EligibilityVerdict, ProviderDirectory, ProviderVerification, ReviewDecision,
};
pub use error::{MarketplaceError, RepositoryError};
pub use jobs::{
    Budget, Frequency, JobPost, JobPostDraft, JobPostManager, JobPostRepository, JobPostStatus,
    JobSchedule, RateUnit, RequesterJobPostView, ScheduleKind,
};
pub use matching::{AppliedFilter, JobBoard, JobSearch, OpenJobPostView, PostOrder};
pub use router::marketplace_router;

use crate::config::MarketplaceConfig;

/// Every manager wired against one set of stores.
pub struct Marketplace<J, S, D> {
    pub eligibility: Arc<EligibilityGate<D>>,
    pub posts: JobPostManager<J>,
    pub applications: ApplicationManager<J, D>,
    pub board: JobBoard<J>,
    pub catalog: ServiceCatalog<S, D>,
}

impl<J, S, D> Marketplace<J, S, D>
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    pub fn new(
        posts: Arc<J>,
        services: Arc<S>,
        directory: Arc<D>,
        clock: Arc<dyn Clock>,
        config: &MarketplaceConfig,
    ) -> Self {
        let evaluator = EligibilityEvaluator::new(config.disabled_reason.clone());
        let eligibility = Arc::new(EligibilityGate::new(
            directory,
            evaluator,
            clock.clone(),
            config.write_attempts,
        ));

        Self {
            posts: JobPostManager::new(posts.clone(), clock.clone(), config.write_attempts),
            applications: ApplicationManager::new(
                posts.clone(),
                eligibility.clone(),
                clock.clone(),
                config,
            ),
            board: JobBoard::new(posts),
            catalog: ServiceCatalog::new(services, eligibility.clone(), clock),
            eligibility,
        }
    }
}
