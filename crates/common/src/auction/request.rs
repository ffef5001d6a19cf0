//! Outgoing payload assembly.

use std::collections::BTreeMap;

use error_stack::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use url::Url;

use super::conditions::{merge_zone_filters, ZoneFilters};
use super::types::{PageContext, Size, SlotRequest, Viewport};
use crate::constants::CACHE_BUST_PARAM;
use crate::error::AdapterError;

/// JSON body posted to the auction endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BidRequestPayload {
    /// Unique numeric zone ids, comma-joined in first-seen order
    pub zone: String,
    pub hostname: String,
    /// Page protocol without the trailing colon
    pub protocol: String,
    pub sw: u32,
    pub sh: u32,
    pub ww: u32,
    pub wh: u32,
    /// Merged format filter per zone
    pub c: ZoneFilters,
    /// Zone of the first slot, as given
    pub id: String,
    /// Concatenated slot sizes per zone
    pub sizes: BTreeMap<String, Vec<Size>>,
}

/// Leading integer of a zone id, the way the endpoint reads it.
///
/// `" 42abc"` parses as `42`; input without leading digits yields `None`.
#[must_use]
pub fn parse_zone_id(zone: &str) -> Option<i64> {
    let trimmed = zone.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;

    Some(if negative { -value } else { value })
}

/// Comma-joined unique zone ids in first-seen order.
#[must_use]
pub fn zone_list(slots: &[SlotRequest]) -> String {
    let mut seen: Vec<i64> = Vec::new();
    for slot in slots {
        match parse_zone_id(slot.zone()) {
            Some(id) if !seen.contains(&id) => seen.push(id),
            Some(_) => {}
            None => log::warn!(
                "justpremium: zone '{}' of slot '{}' is not numeric, leaving it out",
                slot.zone(),
                slot.bid_id
            ),
        }
    }

    seen.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Group slot sizes by zone, keeping slot order within a zone.
#[must_use]
pub fn sizes_by_zone(slots: &[SlotRequest]) -> BTreeMap<String, Vec<Size>> {
    let mut sizes: BTreeMap<String, Vec<Size>> = BTreeMap::new();
    for slot in slots {
        sizes
            .entry(slot.zone().to_string())
            .or_default()
            .extend_from_slice(&slot.sizes);
    }
    sizes
}

/// Build the payload for all slots destined for this bidder.
///
/// Returns `None` when there are no slots.
#[must_use]
pub fn assemble_payload(
    slots: &[SlotRequest],
    page: &PageContext,
    viewport: Viewport,
) -> Option<BidRequestPayload> {
    let first = slots.first()?;

    Some(BidRequestPayload {
        zone: zone_list(slots),
        hostname: page.hostname.clone(),
        protocol: page.bare_protocol().to_string(),
        sw: viewport.screen_width,
        sh: viewport.screen_height,
        ww: viewport.inner_width,
        wh: viewport.inner_height,
        c: merge_zone_filters(slots),
        id: first.zone().to_string(),
        sizes: sizes_by_zone(slots),
    })
}

/// Endpoint URL on the page's protocol with a cache-busting timestamp.
///
/// # Errors
///
/// Returns [`AdapterError::BidRequest`] if the protocol, host and path do not
/// form a valid URL.
pub fn endpoint_url(
    page: &PageContext,
    host: &str,
    path: &str,
    timestamp_ms: i64,
) -> Result<Url, Report<AdapterError>> {
    let raw = format!("{}//{}{}", page.protocol, host, path);
    let mut url = Url::parse(&raw).change_context(AdapterError::BidRequest {
        message: format!("Invalid endpoint URL: {raw}"),
    })?;
    url.query_pairs_mut()
        .append_pair(CACHE_BUST_PARAM, &timestamp_ms.to_string());
    Ok(url)
}
