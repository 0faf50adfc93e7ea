//! Job posts: content, status machine, and the versioned storage seam.

pub mod domain;
mod lifecycle;
pub mod repository;
mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    Budget, Frequency, HiredPerson, JobPost, JobPostDraft, JobPostStatus, JobSchedule, RateUnit,
    RequesterJobPostView, ScheduleKind,
};
pub(crate) use lifecycle::ensure_owner;
pub use lifecycle::JobPostManager;
pub use repository::JobPostRepository;

pub(crate) use repository::{commit, fetch_post};
pub(crate) use validation::{normalize_tags, required};
