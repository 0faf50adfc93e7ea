use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;

use super::applications::ApplicationDraft;
use super::catalog::{ServiceDraft, WeeklyAvailability};
use super::domain::{ProviderId, RequesterId, Weekday};
use super::eligibility::{
    AccountStatus, DocumentState, DocumentVerification, ProviderVerification, UploadedFile,
};
use super::jobs::{Budget, Frequency, JobPostDraft, JobSchedule, RateUnit};
use super::memory::{
    InMemoryJobPostRepository, InMemoryProviderDirectory, InMemoryServiceRepository, ManualClock,
};
use super::Marketplace;
use crate::config::MarketplaceConfig;

pub(crate) type MemoryMarketplace =
    Marketplace<InMemoryJobPostRepository, InMemoryServiceRepository, InMemoryProviderDirectory>;

pub(crate) fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(crate) fn time(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).expect("valid time")
}

pub(crate) fn requester(id: &str) -> RequesterId {
    RequesterId::new(id)
}

pub(crate) fn provider(id: &str) -> ProviderId {
    ProviderId::new(id)
}

pub(crate) fn file(name: &str, at: DateTime<Utc>) -> UploadedFile {
    UploadedFile {
        name: name.to_string(),
        storage_key: format!("uploads/{name}"),
        uploaded_at: at,
    }
}

pub(crate) fn snapshot(
    id: &str,
    documents: DocumentVerification,
    active: bool,
    legacy_verified: bool,
) -> ProviderVerification {
    ProviderVerification {
        provider_id: provider(id),
        documents,
        account: AccountStatus {
            active,
            reason: None,
        },
        legacy_verified,
        version: 0,
    }
}

pub(crate) fn approved_documents() -> DocumentVerification {
    DocumentVerification::from_documents(
        DocumentState {
            files: vec![file("id-front.jpg", start_time())],
            verified: true,
        },
        DocumentState::default(),
        Vec::new(),
    )
}

pub(crate) fn pending_documents() -> DocumentVerification {
    DocumentVerification::from_documents(
        DocumentState {
            files: vec![file("id-front.jpg", start_time())],
            verified: false,
        },
        DocumentState::default(),
        Vec::new(),
    )
}

pub(crate) fn one_time_draft(title: &str, location: &str, amount: i64) -> JobPostDraft {
    JobPostDraft {
        title: title.to_string(),
        description: format!("{title} for a two-bedroom condo"),
        location: location.to_string(),
        skills: vec!["Deep cleaning".to_string(), "Laundry".to_string()],
        schedule: JobSchedule::OneTime {
            date: date(2025, 3, 15),
            time: time(9),
        },
        budget: Budget::Fixed {
            amount: Decimal::new(amount, 0),
            rate: RateUnit::PerJob,
        },
    }
}

pub(crate) fn recurring_draft(title: &str, starts_on: Option<NaiveDate>) -> JobPostDraft {
    JobPostDraft {
        title: title.to_string(),
        description: "Weekly upkeep".to_string(),
        location: "Quezon City".to_string(),
        skills: vec!["Cooking".to_string()],
        schedule: JobSchedule::Recurring {
            days: BTreeSet::from([Weekday::Monday, Weekday::Thursday]),
            frequency: Frequency::Weekly,
            time: time(8),
            starts_on,
        },
        budget: Budget::Range {
            min: Decimal::new(500, 0),
            max: Some(Decimal::new(800, 0)),
            rate: RateUnit::Daily,
        },
    }
}

pub(crate) fn application_draft() -> ApplicationDraft {
    ApplicationDraft {
        cover_message: "Five years of condo cleaning experience.".to_string(),
        proposed_rate: Decimal::new(1800, 0),
        experience: Some("5 years".to_string()),
        availability: BTreeMap::from([(Weekday::Saturday, true), (Weekday::Sunday, false)]),
        requested_start: date(2025, 3, 15),
    }
}

pub(crate) fn service_draft(title: &str) -> ServiceDraft {
    ServiceDraft {
        title: title.to_string(),
        category: "Cleaning".to_string(),
        tags: vec!["deep clean".to_string(), " Deep Clean ".to_string()],
        description: "Top-to-bottom cleaning".to_string(),
        location: "Makati City".to_string(),
        availability: WeeklyAvailability {
            days: BTreeSet::from([Weekday::Monday, Weekday::Wednesday]),
            start_time: time(8),
            end_time: time(17),
        },
        price: Decimal::new(1500, 0),
        contact_number: "+63 917-555-0101".to_string(),
        image: None,
    }
}

/// In-memory marketplace with a hand-driven clock.
pub(crate) struct Harness {
    pub(crate) market: Arc<MemoryMarketplace>,
    pub(crate) posts: Arc<InMemoryJobPostRepository>,
    pub(crate) directory: Arc<InMemoryProviderDirectory>,
    pub(crate) clock: ManualClock,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_config(MarketplaceConfig::default())
    }

    pub(crate) fn with_config(config: MarketplaceConfig) -> Self {
        let posts = Arc::new(InMemoryJobPostRepository::default());
        let directory = Arc::new(InMemoryProviderDirectory::default());
        let clock = ManualClock::starting_at(start_time());
        let market = Arc::new(Marketplace::new(
            posts.clone(),
            Arc::new(InMemoryServiceRepository::default()),
            directory.clone(),
            Arc::new(clock.clone()),
            &config,
        ));

        Self {
            market,
            posts,
            directory,
            clock,
        }
    }

    /// Seed an approved, active provider.
    pub(crate) fn verified(&self, id: &str) -> ProviderId {
        self.directory
            .put(snapshot(id, approved_documents(), true, false));
        provider(id)
    }

    pub(crate) fn tick(&self) {
        self.clock.advance(Duration::minutes(1));
    }
}
