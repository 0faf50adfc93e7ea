use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::marketplace::domain::{AdminId, ProviderId};

/// Aggregate review state of a provider's identity documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    NotSubmitted,
    Pending,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentStatus::NotSubmitted => "not_submitted",
            DocumentStatus::Pending => "pending",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    IdentificationCard,
    Certifications,
}

impl DocumentKind {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentKind::IdentificationCard => "identification_card",
            DocumentKind::Certifications => "certifications",
        }
    }
}

/// Metadata for an uploaded file; the bytes live in external storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub storage_key: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Files and reviewer sign-off for one document type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentState {
    pub files: Vec<UploadedFile>,
    pub verified: bool,
}

impl DocumentState {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

/// Reviewer decision recorded against a provider's documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewNote {
    pub decision: ReviewDecision,
    pub note: Option<String>,
    pub reviewed_by: AdminId,
    pub reviewed_at: DateTime<Utc>,
    /// Set once the provider uploads again after this decision.
    #[serde(default)]
    pub superseded: bool,
}

/// Per-type document states plus the status derived from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentVerification {
    pub status: DocumentStatus,
    pub identification_card: DocumentState,
    pub certifications: DocumentState,
    pub notes: Vec<ReviewNote>,
}

impl Default for DocumentVerification {
    fn default() -> Self {
        Self::from_documents(DocumentState::default(), DocumentState::default(), Vec::new())
    }
}

impl DocumentVerification {
    pub fn from_documents(
        identification_card: DocumentState,
        certifications: DocumentState,
        notes: Vec<ReviewNote>,
    ) -> Self {
        let status = Self::derive_status(&identification_card, &certifications, &notes);
        Self {
            status,
            identification_card,
            certifications,
            notes,
        }
    }

    /// Collapse the per-type sub-states into one status.
    ///
    /// A rejection stands until a later upload supersedes it; approval needs a verified
    /// identification card and, when certifications were uploaded, verified certifications.
    pub fn derive_status(
        identification_card: &DocumentState,
        certifications: &DocumentState,
        notes: &[ReviewNote],
    ) -> DocumentStatus {
        if identification_card.is_empty() && certifications.is_empty() {
            return DocumentStatus::NotSubmitted;
        }

        if notes
            .last()
            .is_some_and(|review| review.decision == ReviewDecision::Rejected && !review.superseded)
        {
            return DocumentStatus::Rejected;
        }

        let certifications_clear = certifications.is_empty() || certifications.verified;
        if !identification_card.is_empty() && identification_card.verified && certifications_clear
        {
            DocumentStatus::Approved
        } else {
            DocumentStatus::Pending
        }
    }

    /// Mark the latest decision as answered by a new upload.
    pub fn supersede_latest_review(&mut self) {
        if let Some(review) = self.notes.last_mut() {
            review.superseded = true;
        }
    }

    pub fn refresh_status(&mut self) {
        self.status =
            Self::derive_status(&self.identification_card, &self.certifications, &self.notes);
    }

    pub fn state(&self, kind: DocumentKind) -> &DocumentState {
        match kind {
            DocumentKind::IdentificationCard => &self.identification_card,
            DocumentKind::Certifications => &self.certifications,
        }
    }

    pub fn state_mut(&mut self, kind: DocumentKind) -> &mut DocumentState {
        match kind {
            DocumentKind::IdentificationCard => &mut self.identification_card,
            DocumentKind::Certifications => &mut self.certifications,
        }
    }

    /// Note attached to the most recent rejection, if the reviewer left one.
    pub fn rejection_note(&self) -> Option<&str> {
        self.notes
            .iter()
            .rev()
            .find(|review| review.decision == ReviewDecision::Rejected)
            .and_then(|review| review.note.as_deref())
    }
}

/// Administrative on/off switch for a provider account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatus {
    pub active: bool,
    pub reason: Option<String>,
}

impl Default for AccountStatus {
    fn default() -> Self {
        Self {
            active: true,
            reason: None,
        }
    }
}

/// Snapshot of every signal the eligibility verdict is computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderVerification {
    pub provider_id: ProviderId,
    pub documents: DocumentVerification,
    pub account: AccountStatus,
    /// Pre-review boolean kept for accounts verified before document review existed.
    #[serde(default)]
    pub legacy_verified: bool,
    /// Bumped by the directory on every successful store; 0 means never stored.
    #[serde(default)]
    pub version: u64,
}

impl ProviderVerification {
    /// Record for a provider that has never uploaded anything.
    pub fn unsubmitted(provider_id: ProviderId) -> Self {
        Self {
            provider_id,
            documents: DocumentVerification::default(),
            account: AccountStatus::default(),
            legacy_verified: false,
            version: 0,
        }
    }
}
