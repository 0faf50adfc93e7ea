//! Provider-authored services, with every content mutation behind the eligibility gate.

pub mod domain;


use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

pub use domain::{Service, ServiceDraft, WeeklyAvailability};

use super::domain::{next_service_id, Clock, ProviderId, ServiceId};
use super::eligibility::{EligibilityGate, ProviderDirectory};
use super::error::{MarketplaceError, RepositoryError};
use super::jobs::{normalize_tags, required};

/// Storage for services.
pub trait ServiceRepository: Send + Sync {
    fn insert(&self, service: Service) -> Result<Service, RepositoryError>;
    fn update(&self, service: Service) -> Result<Service, RepositoryError>;
    fn fetch(&self, id: &ServiceId) -> Result<Option<Service>, RepositoryError>;
    fn delete(&self, id: &ServiceId) -> Result<Service, RepositoryError>;
    fn list_by_provider(&self, provider: &ProviderId) -> Result<Vec<Service>, RepositoryError>;
    fn list_all(&self) -> Result<Vec<Service>, RepositoryError>;
}

fn valid_contact_number(raw: &str) -> bool {
    let body = raw.strip_prefix('+').unwrap_or(raw);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
    {
        return false;
    }
    let digits = body.chars().filter(char::is_ascii_digit).count();
    (7..=15).contains(&digits)
}

fn normalize_draft(draft: ServiceDraft) -> Result<ServiceDraft, MarketplaceError> {
    let title = required("title", draft.title)?;
    let category = required("category", draft.category)?;
    let description = required("description", draft.description)?;
    let location = required("location", draft.location)?;

    if draft.price <= Decimal::ZERO {
        return Err(MarketplaceError::validation("price must be positive"));
    }

    let contact_number = draft.contact_number.trim().to_string();
    if !valid_contact_number(&contact_number) {
        return Err(MarketplaceError::validation(
            "contact number must hold 7 to 15 digits",
        ));
    }

    let availability = draft.availability;
    if availability.days.is_empty() {
        return Err(MarketplaceError::validation(
            "availability needs at least one weekday",
        ));
    }
    if availability.start_time >= availability.end_time {
        return Err(MarketplaceError::validation(
            "availability must start before it ends",
        ));
    }

    Ok(ServiceDraft {
        title,
        category,
        tags: normalize_tags(draft.tags),
        description,
        location,
        availability,
        price: draft.price,
        contact_number,
        image: draft
            .image
            .map(|image| image.trim().to_string())
            .filter(|image| !image.is_empty()),
    })
}

fn ensure_owner(service: &Service, provider: &ProviderId) -> Result<(), MarketplaceError> {
    if &service.provider_id == provider {
        Ok(())
    } else {
        Err(MarketplaceError::Unauthorized("service"))
    }
}

/// Create/update/delete re-check eligibility on every call; reads and the
/// availability toggle do not.
pub struct ServiceCatalog<S, D> {
    services: Arc<S>,
    eligibility: Arc<EligibilityGate<D>>,
    clock: Arc<dyn Clock>,
}

impl<S, D> ServiceCatalog<S, D>
where
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    pub fn new(
        services: Arc<S>,
        eligibility: Arc<EligibilityGate<D>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            services,
            eligibility,
            clock,
        }
    }

    fn fetch(&self, id: &ServiceId) -> Result<Service, MarketplaceError> {
        self.services
            .fetch(id)?
            .ok_or_else(|| MarketplaceError::not_found(format!("service {id}")))
    }

    pub fn create(
        &self,
        provider: &ProviderId,
        draft: ServiceDraft,
    ) -> Result<Service, MarketplaceError> {
        self.eligibility.require_eligible(provider)?;
        let draft = normalize_draft(draft)?;
        let service = Service::from_draft(
            next_service_id(),
            provider.clone(),
            draft,
            self.clock.now(),
        );

        let stored = self.services.insert(service)?;
        info!(service = %stored.id, provider = %provider, "service created");
        Ok(stored)
    }

    pub fn update(
        &self,
        provider: &ProviderId,
        id: &ServiceId,
        draft: ServiceDraft,
    ) -> Result<Service, MarketplaceError> {
        self.eligibility.require_eligible(provider)?;
        let draft = normalize_draft(draft)?;
        let mut service = self.fetch(id)?;
        ensure_owner(&service, provider)?;
        service.apply_draft(draft, self.clock.now());

        let stored = self.services.update(service)?;
        info!(service = %id, provider = %provider, "service updated");
        Ok(stored)
    }

    pub fn delete(&self, provider: &ProviderId, id: &ServiceId) -> Result<Service, MarketplaceError> {
        self.eligibility.require_eligible(provider)?;
        let service = self.fetch(id)?;
        ensure_owner(&service, provider)?;

        let removed = self.services.delete(id)?;
        info!(service = %id, provider = %provider, "service deleted");
        Ok(removed)
    }

    pub fn set_availability(
        &self,
        provider: &ProviderId,
        id: &ServiceId,
        is_available: bool,
    ) -> Result<Service, MarketplaceError> {
        let mut service = self.fetch(id)?;
        ensure_owner(&service, provider)?;
        service.is_available = is_available;
        service.updated_at = self.clock.now();

        let stored = self.services.update(service)?;
        info!(service = %id, is_available, "service availability toggled");
        Ok(stored)
    }

    pub fn get(&self, id: &ServiceId) -> Result<Service, MarketplaceError> {
        self.fetch(id)
    }

    pub fn list_for_provider(&self, provider: &ProviderId) -> Result<Vec<Service>, MarketplaceError> {
        let mut services = self.services.list_by_provider(provider)?;
        services.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(services)
    }

    pub fn list_available(&self) -> Result<Vec<Service>, MarketplaceError> {
        let mut services: Vec<Service> = self
            .services
            .list_all()?
            .into_iter()
            .filter(|service| service.is_available)
            .collect();
        services.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(services)
    }
}
