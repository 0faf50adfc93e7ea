//! Provider eligibility: one verdict from document review, account state, and the legacy flag.

pub mod domain;


use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use domain::{
    AccountStatus, DocumentKind, DocumentState, DocumentStatus, DocumentVerification,
    ProviderVerification, ReviewDecision, ReviewNote, UploadedFile,
};

use super::domain::{AdminId, Clock, ProviderId};
use super::error::{MarketplaceError, RepositoryError};

/// Status a provider-facing screen renders for the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    Verified,
    Pending,
    Rejected,
    Disabled,
    NotSubmitted,
}

impl DisplayStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DisplayStatus::Verified => "verified",
            DisplayStatus::Pending => "pending",
            DisplayStatus::Rejected => "rejected",
            DisplayStatus::Disabled => "disabled",
            DisplayStatus::NotSubmitted => "not_submitted",
        }
    }

    pub const fn guidance(self) -> &'static str {
        match self {
            DisplayStatus::Verified => "Your account is verified.",
            DisplayStatus::Pending => "Your documents are under review.",
            DisplayStatus::Rejected => "Your documents were rejected. Please upload new copies.",
            DisplayStatus::Disabled => "Your account has been disabled.",
            DisplayStatus::NotSubmitted => "Upload your identification card to get verified.",
        }
    }
}

/// Output of [`EligibilityEvaluator::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub eligible: bool,
    pub status: DisplayStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl EligibilityVerdict {
    fn blocked(status: DisplayStatus, reason: Option<String>) -> Self {
        Self {
            eligible: false,
            status,
            reason,
        }
    }

    pub fn into_error(self) -> MarketplaceError {
        MarketplaceError::NotEligible {
            status: self.status,
            reason: self.reason,
        }
    }
}

/// Stateless precedence rules; the first matching rule decides.
#[derive(Debug, Clone)]
pub struct EligibilityEvaluator {
    disabled_reason: String,
}

impl EligibilityEvaluator {
    pub fn new(disabled_reason: impl Into<String>) -> Self {
        Self {
            disabled_reason: disabled_reason.into(),
        }
    }

    pub fn evaluate(&self, provider: &ProviderVerification) -> EligibilityVerdict {
        if !provider.account.active {
            let reason = provider
                .account
                .reason
                .clone()
                .filter(|reason| !reason.trim().is_empty())
                .unwrap_or_else(|| self.disabled_reason.clone());
            return EligibilityVerdict::blocked(DisplayStatus::Disabled, Some(reason));
        }

        // A stale legacy flag must not bypass an in-progress re-review.
        if provider.documents.status == DocumentStatus::Pending {
            return EligibilityVerdict::blocked(DisplayStatus::Pending, None);
        }

        if provider.documents.status == DocumentStatus::Approved || provider.legacy_verified {
            return EligibilityVerdict {
                eligible: true,
                status: DisplayStatus::Verified,
                reason: None,
            };
        }

        if provider.documents.status == DocumentStatus::Rejected {
            let reason = provider.documents.rejection_note().map(str::to_string);
            return EligibilityVerdict::blocked(DisplayStatus::Rejected, reason);
        }

        EligibilityVerdict::blocked(DisplayStatus::NotSubmitted, None)
    }
}

/// Storage for verification snapshots, keyed by provider.
///
/// `store` is a compare-and-swap on `version`: it must fail with
/// [`RepositoryError::VersionConflict`] when the stored version (0 for a provider with no
/// record) differs from `expected_version`, and otherwise persist with `version + 1`.
pub trait ProviderDirectory: Send + Sync {
    fn fetch(&self, provider: &ProviderId) -> Result<Option<ProviderVerification>, RepositoryError>;
    fn store(
        &self,
        verification: ProviderVerification,
        expected_version: u64,
    ) -> Result<ProviderVerification, RepositoryError>;
}

/// File metadata supplied by a provider when uploading documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub name: String,
    pub storage_key: String,
}

/// Reads fresh verification state before every gated action and owns its mutations.
pub struct EligibilityGate<D> {
    directory: Arc<D>,
    evaluator: EligibilityEvaluator,
    clock: Arc<dyn Clock>,
    write_attempts: u8,
}

impl<D> EligibilityGate<D>
where
    D: ProviderDirectory + 'static,
{
    pub fn new(
        directory: Arc<D>,
        evaluator: EligibilityEvaluator,
        clock: Arc<dyn Clock>,
        write_attempts: u8,
    ) -> Self {
        Self {
            directory,
            evaluator,
            clock,
            write_attempts,
        }
    }

    pub fn verification(
        &self,
        provider: &ProviderId,
    ) -> Result<ProviderVerification, MarketplaceError> {
        let record = self
            .directory
            .fetch(provider)?
            .unwrap_or_else(|| ProviderVerification::unsubmitted(provider.clone()));
        Ok(record)
    }

    /// Current verdict; never cached so admin changes apply to the next action.
    pub fn verdict(&self, provider: &ProviderId) -> Result<EligibilityVerdict, MarketplaceError> {
        let record = self.verification(provider)?;
        Ok(self.evaluator.evaluate(&record))
    }

    pub fn require_eligible(
        &self,
        provider: &ProviderId,
    ) -> Result<EligibilityVerdict, MarketplaceError> {
        let verdict = self.verdict(provider)?;
        if verdict.eligible {
            Ok(verdict)
        } else {
            warn!(
                provider = %provider,
                status = verdict.status.label(),
                "gated action refused"
            );
            Err(verdict.into_error())
        }
    }

    /// Fetch, mutate, and compare-and-swap the provider record.
    ///
    /// A concurrent write to any part of the record forces a re-fetch, so one change never
    /// overwrites another with stale data.
    fn write<F>(
        &self,
        provider: &ProviderId,
        require_record: bool,
        mut mutate: F,
    ) -> Result<ProviderVerification, MarketplaceError>
    where
        F: FnMut(&mut ProviderVerification) -> Result<(), MarketplaceError>,
    {
        let attempts = self.write_attempts.max(1);
        let mut last_conflict = None;

        for attempt in 1..=attempts {
            let mut record = match self.directory.fetch(provider)? {
                Some(record) => record,
                None if require_record => {
                    return Err(MarketplaceError::not_found(format!("provider {provider}")))
                }
                None => ProviderVerification::unsubmitted(provider.clone()),
            };
            let expected = record.version;
            mutate(&mut record)?;

            match self.directory.store(record, expected) {
                Ok(stored) => return Ok(stored),
                Err(RepositoryError::VersionConflict { expected, found }) => {
                    warn!(
                        provider = %provider,
                        attempt,
                        expected,
                        found,
                        "provider record changed concurrently"
                    );
                    last_conflict = Some(RepositoryError::VersionConflict { expected, found });
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(last_conflict
            .unwrap_or(RepositoryError::Unavailable("no write attempted".to_string()))
            .into())
    }

    /// Append uploaded files for one document type and send it back to review.
    ///
    /// Any standing rejection is superseded by the new upload.
    pub fn submit_documents(
        &self,
        provider: &ProviderId,
        kind: DocumentKind,
        uploads: Vec<DocumentUpload>,
    ) -> Result<DocumentVerification, MarketplaceError> {
        if uploads.is_empty() {
            return Err(MarketplaceError::validation("at least one file is required"));
        }
        if uploads
            .iter()
            .any(|upload| upload.name.trim().is_empty() || upload.storage_key.trim().is_empty())
        {
            return Err(MarketplaceError::validation(
                "uploaded files need a name and storage key",
            ));
        }

        let now = self.clock.now();
        let stored = self.write(provider, false, |record| {
            let state = record.documents.state_mut(kind);
            state.files.extend(uploads.iter().map(|upload| UploadedFile {
                name: upload.name.trim().to_string(),
                storage_key: upload.storage_key.clone(),
                uploaded_at: now,
            }));
            state.verified = false;
            record.documents.supersede_latest_review();
            record.documents.refresh_status();
            Ok(())
        })?;

        info!(
            provider = %provider,
            kind = kind.label(),
            status = stored.documents.status.label(),
            "documents submitted"
        );
        Ok(stored.documents)
    }

    /// Record a reviewer decision across every document type that holds files.
    pub fn review_documents(
        &self,
        admin: &AdminId,
        provider: &ProviderId,
        decision: ReviewDecision,
        note: Option<String>,
    ) -> Result<DocumentVerification, MarketplaceError> {
        let note = note
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        let now = self.clock.now();
        let verified = decision == ReviewDecision::Approved;

        let stored = self.write(provider, true, |record| {
            if record.documents.status == DocumentStatus::NotSubmitted {
                return Err(MarketplaceError::invalid_state(
                    "no documents have been submitted for review",
                ));
            }
            for kind in [DocumentKind::IdentificationCard, DocumentKind::Certifications] {
                let state = record.documents.state_mut(kind);
                if !state.is_empty() {
                    state.verified = verified;
                }
            }
            record.documents.notes.push(ReviewNote {
                decision,
                note: note.clone(),
                reviewed_by: admin.clone(),
                reviewed_at: now,
                superseded: false,
            });
            record.documents.refresh_status();
            Ok(())
        })?;

        info!(
            provider = %provider,
            admin = %admin,
            status = stored.documents.status.label(),
            "documents reviewed"
        );
        Ok(stored.documents)
    }

    pub fn set_account_status(
        &self,
        admin: &AdminId,
        provider: &ProviderId,
        active: bool,
        reason: Option<String>,
    ) -> Result<AccountStatus, MarketplaceError> {
        let account = AccountStatus {
            active,
            reason: if active {
                None
            } else {
                reason
                    .map(|text| text.trim().to_string())
                    .filter(|text| !text.is_empty())
            },
        };

        let stored = self.write(provider, false, |record| {
            record.account = account.clone();
            Ok(())
        })?;

        info!(provider = %provider, admin = %admin, active, "account status changed");
        Ok(stored.account)
    }
}
