use housekeep::config::MarketplaceConfig;
use housekeep::marketplace::memory::{
    InMemoryJobPostRepository, InMemoryProviderDirectory, InMemoryServiceRepository,
};
use housekeep::marketplace::{Clock, HirePolicy, Marketplace};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type MemoryMarketplace =
    Marketplace<InMemoryJobPostRepository, InMemoryServiceRepository, InMemoryProviderDirectory>;

pub(crate) fn in_memory_marketplace(
    config: &MarketplaceConfig,
    clock: Arc<dyn Clock>,
) -> Arc<MemoryMarketplace> {
    Arc::new(Marketplace::new(
        Arc::new(InMemoryJobPostRepository::default()),
        Arc::new(InMemoryServiceRepository::default()),
        Arc::new(InMemoryProviderDirectory::default()),
        clock,
        config,
    ))
}

pub(crate) fn parse_hire_policy(raw: &str) -> Result<HirePolicy, String> {
    HirePolicy::parse(raw)
        .ok_or_else(|| format!("'{raw}' is not a hire policy (leave_pending, reject_others)"))
}

pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, String> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|err| format!("failed to parse '{raw}' as an amount ({err})"))
        .and_then(|amount| {
            if amount > Decimal::ZERO {
                Ok(amount)
            } else {
                Err(format!("'{raw}' must be a positive amount"))
            }
        })
}
