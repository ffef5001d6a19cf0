//! Trait definition for bidder adapters.

use bytes::Bytes;
use error_stack::{Report, ResultExt};
use serde_json::Value as Json;

use crate::error::AdapterError;
use crate::user_sync::{SyncOptions, SyncPixel, UserSyncRegistry};

use super::types::{NormalizedBidResponse, PageContext, ServerRequest, SlotRequest, WindowMetrics};

/// Trait implemented by every bidder adapter.
pub trait BidderAdapter: Send + Sync {
    /// Unique bidder code (e.g., "justpremium").
    fn code(&self) -> &'static str;

    /// Whether the orchestrator may hand this slot to the adapter.
    fn is_bid_request_valid(&self, slot: &SlotRequest) -> bool;

    /// Build the outgoing call for the given slots.
    ///
    /// Invalid slots are left out. Returns `Ok(None)` when no slot is
    /// eligible.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload or endpoint URL cannot be built.
    fn build_requests(
        &self,
        slots: &[SlotRequest],
        page: &PageContext,
        window: &WindowMetrics,
    ) -> Result<Option<ServerRequest>, Report<AdapterError>>;

    /// Translate a decoded response body into per-slot bids.
    fn interpret_response(
        &self,
        body: &Json,
        request: &ServerRequest,
    ) -> Vec<NormalizedBidResponse>;

    /// Register this bidder's sync pixels and return all registered so far.
    fn user_syncs<'a>(
        &self,
        options: &SyncOptions,
        registry: &'a mut UserSyncRegistry,
    ) -> &'a [SyncPixel];

    /// Decode an HTTP response and interpret it.
    ///
    /// A non-success status yields no bids.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::BidResponse`] if a successful response body is
    /// not valid JSON.
    fn interpret_http_response(
        &self,
        response: &http::Response<Bytes>,
        request: &ServerRequest,
    ) -> Result<Vec<NormalizedBidResponse>, Report<AdapterError>> {
        if !response.status().is_success() {
            log::warn!(
                "{} returned non-success status: {}",
                self.code(),
                response.status()
            );
            return Ok(Vec::new());
        }

        let body: Json =
            serde_json::from_slice(response.body()).change_context(AdapterError::BidResponse {
                message: format!("Failed to parse {} response JSON", self.code()),
            })?;

        Ok(self.interpret_response(&body, request))
    }

    /// Check if this adapter is enabled.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Get the configured timeout for this adapter in milliseconds.
    fn timeout_ms(&self) -> u32;
}
