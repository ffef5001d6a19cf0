//! JustPremium bidder adapter.
//!
//! Posts all slots for the bidder in one request, with a single merged format
//! filter per zone, and matches the returned zone bids back onto slots.

use std::collections::HashMap;
use std::sync::Arc;

use error_stack::{Report, ResultExt};
use http::Method;
use serde_json::Value as Json;

use crate::auction::matcher::{match_bids, BidDefaults, BidPool};
use crate::auction::provider::BidderAdapter;
use crate::auction::request::{assemble_payload, endpoint_url};
use crate::auction::types::{
    Bid, NormalizedBidResponse, PageContext, ServerRequest, SlotRequest, WindowMetrics,
};
use crate::constants::BIDDER_CODE;
use crate::error::AdapterError;
use crate::logging::is_debug_enabled;
use crate::settings::{AdapterSettings, Settings, SyncSettings};
use crate::user_sync::{SyncOptions, SyncPixel, UserSyncRegistry};

/// JustPremium bidder adapter.
pub struct JustPremiumAdapter {
    config: AdapterSettings,
    sync: SyncSettings,
}

impl JustPremiumAdapter {
    /// Create a new adapter from its settings sections.
    #[must_use]
    pub fn new(config: AdapterSettings, sync: SyncSettings) -> Self {
        Self { config, sync }
    }

    fn bid_defaults(&self) -> BidDefaults {
        BidDefaults {
            currency: self.config.default_currency.clone(),
            ttl_ms: self.config.default_ttl_ms,
        }
    }

    /// Build the request with an explicit cache-busting timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::BidRequest`] if the payload cannot be
    /// serialized or the endpoint URL is invalid.
    pub fn build_requests_at(
        &self,
        slots: &[SlotRequest],
        page: &PageContext,
        window: &WindowMetrics,
        timestamp_ms: i64,
    ) -> Result<Option<ServerRequest>, Report<AdapterError>> {
        let valid: Vec<SlotRequest> = slots
            .iter()
            .filter(|slot| self.is_bid_request_valid(slot))
            .cloned()
            .collect();

        if valid.len() < slots.len() {
            log::debug!(
                "justpremium: dropped {} slots without a zone",
                slots.len() - valid.len()
            );
        }

        let Some(payload) = assemble_payload(&valid, page, window.resolve()) else {
            log::debug!("justpremium: no eligible slots, skipping request");
            return Ok(None);
        };

        let data = serde_json::to_string(&payload).change_context(AdapterError::BidRequest {
            message: "Failed to serialize JustPremium bid request".to_string(),
        })?;

        let url = endpoint_url(
            page,
            &self.config.endpoint_host,
            &self.config.endpoint_path,
            timestamp_ms,
        )?;

        log::info!(
            "justpremium: requesting bids for {} slots in zones {}",
            valid.len(),
            payload.zone
        );
        if is_debug_enabled() {
            log::debug!("justpremium: sending bid request: {}", data);
        }

        Ok(Some(ServerRequest {
            method: Method::POST,
            url: url.to_string(),
            data,
            bids: valid,
        }))
    }

    /// Decode the `bid` object of a response into zone pools.
    ///
    /// Entries without an `id` or a numeric `price` are dropped. Other fields
    /// fall back to defaults when missing or malformed.
    fn parse_zone_bids(body: &Json) -> HashMap<String, Vec<Bid>> {
        let Some(zones) = body.get("bid").and_then(Json::as_object) else {
            log::debug!("justpremium: response carries no bid object");
            return HashMap::new();
        };

        zones
            .iter()
            .map(|(zone, entries)| {
                let bids = entries
                    .as_array()
                    .map(|entries| {
                        entries
                            .iter()
                            .filter_map(|entry| {
                                serde_json::from_value::<Bid>(entry.clone())
                                    .map_err(|e| {
                                        log::debug!(
                                            "justpremium: skipping undecodable bid in zone {}: {}",
                                            zone,
                                            e
                                        );
                                    })
                                    .ok()
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                (zone.clone(), bids)
            })
            .collect()
    }
}

impl BidderAdapter for JustPremiumAdapter {
    fn code(&self) -> &'static str {
        BIDDER_CODE
    }

    fn is_bid_request_valid(&self, slot: &SlotRequest) -> bool {
        !slot.zone().is_empty()
    }

    fn build_requests(
        &self,
        slots: &[SlotRequest],
        page: &PageContext,
        window: &WindowMetrics,
    ) -> Result<Option<ServerRequest>, Report<AdapterError>> {
        let now_ms = chrono::Utc::now().timestamp_millis();
        self.build_requests_at(slots, page, window, now_ms)
    }

    fn interpret_response(
        &self,
        body: &Json,
        request: &ServerRequest,
    ) -> Vec<NormalizedBidResponse> {
        let mut pool = BidPool::new(Self::parse_zone_bids(body));
        let responses = match_bids(&request.bids, &mut pool, &self.bid_defaults());

        log::info!(
            "justpremium: matched {} of {} slots, {} bids left unclaimed",
            responses.len(),
            request.bids.len(),
            pool.remaining()
        );

        responses
    }

    fn user_syncs<'a>(
        &self,
        options: &SyncOptions,
        registry: &'a mut UserSyncRegistry,
    ) -> &'a [SyncPixel] {
        if options.iframe_enabled {
            registry.register(SyncPixel::iframe(self.sync.iframe_url.clone()));
        }
        registry.pixels()
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn timeout_ms(&self) -> u32 {
        self.config.timeout_ms
    }
}

// ============================================================================
// Adapter Auto-Registration
// ============================================================================

/// Register the JustPremium adapter if enabled in settings.
#[must_use]
pub fn register_adapters(settings: &Settings) -> Vec<Arc<dyn BidderAdapter>> {
    if !settings.adapter.enabled {
        log::debug!("JustPremium adapter is disabled");
        return Vec::new();
    }

    log::info!(
        "Registering JustPremium adapter (endpoint: {}{})",
        settings.adapter.endpoint_host,
        settings.adapter.endpoint_path
    );
    vec![Arc::new(JustPremiumAdapter::new(
        settings.adapter.clone(),
        settings.sync.clone(),
    ))]
}

// ============================================================================
// Tests
// ============================================================================
