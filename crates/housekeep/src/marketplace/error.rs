use super::eligibility::DisplayStatus;
use super::jobs::JobPostStatus;

/// Failures surfaced verbatim to callers of the lifecycle managers and the catalog gate.
///
/// Every variant is recoverable by the caller; none of them implies a partial write.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    #[error("provider is not eligible ({})", .status.label())]
    NotEligible {
        status: DisplayStatus,
        reason: Option<String>,
    },
    #[error("job post is not accepting applications (status {})", .status.label())]
    JobClosed { status: JobPostStatus },
    #[error("provider already applied to this job post")]
    DuplicateApplication,
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("job post already has a hired applicant")]
    AlreadyHired,
    #[error("{0} not found")]
    NotFound(String),
    #[error("caller does not own this {0}")]
    Unauthorized(&'static str),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl MarketplaceError {
    pub(crate) fn invalid_state(detail: impl Into<String>) -> Self {
        Self::InvalidState(detail.into())
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub(crate) fn validation(detail: impl Into<String>) -> Self {
        Self::Validation(detail.into())
    }
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record changed concurrently (expected version {expected}, found {found})")]
    VersionConflict { expected: u64, found: u64 },
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl MarketplaceError {
    /// Stable machine-readable tag for API payloads.
    pub fn code(&self) -> &'static str {
        match self {
            MarketplaceError::NotEligible { .. } => "not_eligible",
            MarketplaceError::JobClosed { .. } => "job_closed",
            MarketplaceError::DuplicateApplication => "duplicate_application",
            MarketplaceError::InvalidState(_) => "invalid_state",
            MarketplaceError::AlreadyHired => "already_hired",
            MarketplaceError::NotFound(_) => "not_found",
            MarketplaceError::Unauthorized(_) => "unauthorized",
            MarketplaceError::Validation(_) => "validation",
            MarketplaceError::Repository(RepositoryError::VersionConflict { .. }) => "conflict",
            MarketplaceError::Repository(_) => "storage",
        }
    }
}
