use std::collections::BTreeSet;

use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::marketplace::domain::{ProviderId, ServiceId, Weekday};

/// Days and hours a service can be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    pub days: BTreeSet<Weekday>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Provider-editable content of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDraft {
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub description: String,
    pub location: String,
    pub availability: WeeklyAvailability,
    pub price: Decimal,
    pub contact_number: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// A service offering published by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub provider_id: ProviderId,
    pub title: String,
    pub category: String,
    pub tags: Vec<String>,
    pub description: String,
    pub location: String,
    pub availability: WeeklyAvailability,
    pub price: Decimal,
    pub contact_number: String,
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    pub(crate) fn from_draft(
        id: ServiceId,
        provider_id: ProviderId,
        draft: ServiceDraft,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            provider_id,
            title: draft.title,
            category: draft.category,
            tags: draft.tags,
            description: draft.description,
            location: draft.location,
            availability: draft.availability,
            price: draft.price,
            contact_number: draft.contact_number,
            is_available: true,
            image: draft.image,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn apply_draft(&mut self, draft: ServiceDraft, now: DateTime<Utc>) {
        self.title = draft.title;
        self.category = draft.category;
        self.tags = draft.tags;
        self.description = draft.description;
        self.location = draft.location;
        self.availability = draft.availability;
        self.price = draft.price;
        self.contact_number = draft.contact_number;
        self.image = draft.image;
        self.updated_at = now;
    }
}
