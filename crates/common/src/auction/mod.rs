//! Bidder adapter framework.
//!
//! This module provides the building blocks shared by bidder adapters: the
//! [`BidderAdapter`] seam, zone filter merging, greedy bid matching and
//! outgoing payload assembly.
//!
//! Note: Individual adapters are located in the `integrations` module
//! (e.g., `crate::integrations::justpremium`).

use crate::settings::Settings;
use std::sync::Arc;

pub mod conditions;
pub mod matcher;
pub mod provider;
pub mod request;
pub mod types;

pub use conditions::{merge_zone_filters, ZoneFilter, ZoneFilters};
pub use matcher::{match_bids, passes_conditions, BidPool};
pub use provider::BidderAdapter;
pub use request::BidRequestPayload;
pub use types::{Bid, NormalizedBidResponse, PageContext, ServerRequest, SlotRequest};

/// Type alias for adapter builder functions.
type AdapterBuilder = fn(&Settings) -> Vec<Arc<dyn BidderAdapter>>;

/// Returns the list of all available adapter builder functions.
///
/// Each builder checks the settings for its adapter configuration and returns
/// any enabled adapters.
fn adapter_builders() -> &'static [AdapterBuilder] {
    &[crate::integrations::justpremium::register_adapters]
}

/// Build every adapter enabled in the current settings.
#[must_use]
pub fn build_adapters(settings: &Settings) -> Vec<Arc<dyn BidderAdapter>> {
    let adapters: Vec<Arc<dyn BidderAdapter>> = adapter_builders()
        .iter()
        .flat_map(|builder| builder(settings))
        .collect();

    log::info!("Built {} bidder adapters", adapters.len());

    adapters
}

/// Find an adapter by its bidder code.
#[must_use]
pub fn find_adapter(settings: &Settings, code: &str) -> Option<Arc<dyn BidderAdapter>> {
    build_adapters(settings)
        .into_iter()
        .find(|adapter| adapter.code() == code)
}
