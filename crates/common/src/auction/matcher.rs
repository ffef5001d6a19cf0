//! Greedy bid-to-slot matching.
//!
//! Each slot claims at most one bid from its zone's pool. Pools are scanned
//! from the newest bid backwards and a claimed bid is gone for the rest of the
//! pass.

use std::collections::HashMap;

use super::types::{Bid, NormalizedBidResponse, SlotParams, SlotRequest};

/// Consumable bids for one zone, kept in arrival order.
#[derive(Debug, Clone, Default)]
pub struct ZonePool {
    slots: Vec<Option<Bid>>,
    remaining: usize,
}

impl ZonePool {
    #[must_use]
    pub fn new(bids: Vec<Bid>) -> Self {
        let remaining = bids.len();
        Self {
            slots: bids.into_iter().map(Some).collect(),
            remaining,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Remove and return the last unclaimed bid accepted by `accept`.
    pub fn take_last_matching<F>(&mut self, accept: F) -> Option<Bid>
    where
        F: Fn(&Bid) -> bool,
    {
        let idx = self
            .slots
            .iter()
            .rposition(|entry| entry.as_ref().is_some_and(&accept))?;
        let bid = self.slots[idx].take()?;
        self.remaining -= 1;
        Some(bid)
    }
}

/// Zone-indexed bid pools for one response.
#[derive(Debug, Clone, Default)]
pub struct BidPool {
    zones: HashMap<String, ZonePool>,
}

impl BidPool {
    #[must_use]
    pub fn new(zones: HashMap<String, Vec<Bid>>) -> Self {
        Self {
            zones: zones
                .into_iter()
                .map(|(zone, bids)| (zone, ZonePool::new(bids)))
                .collect(),
        }
    }

    #[must_use]
    pub fn zone(&self, zone: &str) -> Option<&ZonePool> {
        self.zones.get(zone)
    }

    /// Unclaimed bids across all zones.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.zones.values().map(ZonePool::remaining).sum()
    }

    /// Claim the newest bid in the slot's zone that passes its own filter.
    pub fn find_bid(&mut self, params: &SlotParams) -> Option<Bid> {
        let pool = self.zones.get_mut(&params.zone)?;
        if pool.is_exhausted() {
            return None;
        }
        pool.take_last_matching(|bid| passes_conditions(params, bid.format.as_deref()))
    }
}

/// Check a bid format against one slot's allow/exclude lists.
///
/// A non-empty allow list takes precedence over the exclude list. A bid
/// without a format never passes an allow list and always passes an exclude
/// list.
#[must_use]
pub fn passes_conditions(params: &SlotParams, format: Option<&str>) -> bool {
    let listed = |list: &[String]| format.is_some_and(|format| list.iter().any(|f| f == format));

    let allow = params.allow_list();
    if !allow.is_empty() {
        return listed(allow);
    }

    let exclude = params.exclude_list();
    if !exclude.is_empty() {
        return !listed(exclude);
    }

    true
}

/// Fallbacks applied to fields a bid leaves out.
#[derive(Debug, Clone)]
pub struct BidDefaults {
    pub currency: String,
    pub ttl_ms: u32,
}

/// Build the orchestrator-facing bid for a matched pair.
///
/// Dimensions come from the slot's first declared size; zero or missing
/// components fall back to the bid's own dimensions.
#[must_use]
pub fn normalize_bid(
    slot: &SlotRequest,
    bid: Bid,
    defaults: &BidDefaults,
) -> NormalizedBidResponse {
    let [slot_width, slot_height] = slot.primary_size().unwrap_or([0, 0]);
    let width = if slot_width > 0 {
        slot_width
    } else {
        bid.width.unwrap_or(0)
    };
    let height = if slot_height > 0 {
        slot_height
    } else {
        bid.height.unwrap_or(0)
    };

    let currency = bid
        .currency
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| defaults.currency.clone());
    let ttl = bid.ttl.filter(|t| *t > 0).unwrap_or(defaults.ttl_ms);

    NormalizedBidResponse {
        request_id: slot.bid_id.clone(),
        creative_id: bid.id,
        width,
        height,
        ad: bid.adm.unwrap_or_default(),
        cpm: bid.price,
        net_revenue: true,
        currency,
        ttl,
    }
}

/// Assign at most one bid per slot, in slot order, consuming the pool.
#[must_use]
pub fn match_bids(
    slots: &[SlotRequest],
    pool: &mut BidPool,
    defaults: &BidDefaults,
) -> Vec<NormalizedBidResponse> {
    let mut responses = Vec::new();

    for slot in slots {
        match pool.find_bid(&slot.params) {
            Some(bid) => {
                log::debug!(
                    "justpremium: slot '{}' (zone {}) matched creative '{}' ({})",
                    slot.bid_id,
                    slot.zone(),
                    bid.id,
                    bid.format.as_deref().unwrap_or("no format")
                );
                responses.push(normalize_bid(slot, bid, defaults));
            }
            None => {
                log::debug!(
                    "justpremium: no bid for slot '{}' (zone {})",
                    slot.bid_id,
                    slot.zone()
                );
            }
        }
    }

    responses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::tests::{bid, slot_allowing, slot_excluding, slot_in_zone};

    fn defaults() -> BidDefaults {
        BidDefaults {
            currency: "USD".to_string(),
            ttl_ms: 60000,
        }
    }

    fn pool(zone: &str, bids: Vec<Bid>) -> BidPool {
        BidPool::new(HashMap::from([(zone.to_string(), bids)]))
    }

    #[test]
    fn test_passes_conditions() {
        let open = slot_in_zone("a", "1").params;
        assert!(passes_conditions(&open, Some("video")));

        let allow = slot_allowing("a", "1", &["display"]).params;
        assert!(passes_conditions(&allow, Some("display")));
        assert!(!passes_conditions(&allow, Some("video")));

        let exclude = slot_excluding("a", "1", &["video"]).params;
        assert!(passes_conditions(&exclude, Some("display")));
        assert!(!passes_conditions(&exclude, Some("video")));
    }

    #[test]
    fn test_bid_without_format() {
        assert!(passes_conditions(&slot_in_zone("a", "1").params, None));
        assert!(passes_conditions(
            &slot_excluding("a", "1", &["video"]).params,
            None
        ));
        assert!(!passes_conditions(
            &slot_allowing("a", "1", &["video"]).params,
            None
        ));
    }

    #[test]
    fn test_allow_takes_precedence_over_exclude() {
        let mut params = slot_allowing("a", "1", &["video"]).params;
        params.exclude = Some(vec!["video".to_string()]);
        assert!(passes_conditions(&params, Some("video")));
        assert!(!passes_conditions(&params, Some("display")));
    }

    #[test]
    fn test_formats_alias_ignored_when_matching() {
        let mut params = slot_in_zone("a", "1").params;
        params.formats = Some(vec!["display".to_string()]);
        assert!(passes_conditions(&params, Some("video")));
    }

    #[test]
    fn test_exclude_skips_newer_bid() {
        let mut pool = pool(
            "5",
            vec![bid("a", "display", 1.2), bid("b", "video", 2.0)],
        );
        let slots = vec![slot_excluding("s1", "5", &["video"])];

        let responses = match_bids(&slots, &mut pool, &defaults());

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].creative_id, "a");
        assert_eq!(responses[0].cpm, 1.2);
        assert_eq!(pool.remaining(), 1);
    }

    #[test]
    fn test_reverse_scan_prefers_latest_bid() {
        let mut pool = pool(
            "5",
            vec![bid("old", "display", 3.0), bid("new", "display", 1.0)],
        );
        let found = pool.find_bid(&slot_in_zone("s1", "5").params);
        assert_eq!(found.map(|b| b.id), Some("new".to_string()));
    }

    #[test]
    fn test_bid_is_consumed_once() {
        let mut pool = pool("5", vec![bid("only", "display", 1.0)]);
        let slots = vec![slot_in_zone("s1", "5"), slot_in_zone("s2", "5")];

        let responses = match_bids(&slots, &mut pool, &defaults());

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].request_id, "s1");
        assert!(pool.zone("5").is_some_and(ZonePool::is_exhausted));
    }

    #[test]
    fn test_slots_share_pool_in_order() {
        let mut pool = pool(
            "5",
            vec![
                bid("a", "display", 1.0),
                bid("b", "video", 1.5),
                bid("c", "display", 2.0),
            ],
        );
        let slots = vec![
            slot_allowing("s1", "5", &["display"]),
            slot_allowing("s2", "5", &["display"]),
            slot_allowing("s3", "5", &["display"]),
        ];

        let responses = match_bids(&slots, &mut pool, &defaults());
        let ids: Vec<&str> = responses.iter().map(|r| r.creative_id.as_str()).collect();

        assert_eq!(ids, ["c", "a"]);
        assert_eq!(pool.remaining(), 1);
    }

    #[test]
    fn test_unknown_zone_yields_nothing() {
        let mut pool = pool("5", vec![bid("a", "display", 1.0)]);
        let slots = vec![slot_in_zone("s1", "6")];

        assert!(match_bids(&slots, &mut pool, &defaults()).is_empty());
        assert_eq!(pool.remaining(), 1);
    }

    #[test]
    fn test_empty_zone_pool_yields_nothing() {
        let mut pool = pool("5", Vec::new());
        assert!(pool.find_bid(&slot_in_zone("s1", "5").params).is_none());
    }

    #[test]
    fn test_normalize_uses_slot_size_and_defaults() {
        let mut slot = slot_in_zone("s1", "5");
        slot.sizes = vec![[300, 600], [300, 250]];
        let mut matched = bid("a", "display", 0.9);
        matched.width = Some(970);
        matched.height = Some(250);

        let normalized = normalize_bid(&slot, matched, &defaults());

        assert_eq!(normalized.request_id, "s1");
        assert_eq!((normalized.width, normalized.height), (300, 600));
        assert_eq!(normalized.currency, "USD");
        assert_eq!(normalized.ttl, 60000);
        assert!(normalized.net_revenue);
    }

    #[test]
    fn test_normalize_falls_back_to_bid_fields() {
        let slot = slot_in_zone("s1", "5");
        let mut matched = bid("a", "display", 0.9);
        matched.width = Some(970);
        matched.height = Some(250);
        matched.currency = Some("EUR".to_string());
        matched.ttl = Some(300);

        let normalized = normalize_bid(&slot, matched, &defaults());

        assert_eq!((normalized.width, normalized.height), (970, 250));
        assert_eq!(normalized.currency, "EUR");
        assert_eq!(normalized.ttl, 300);
    }

    #[test]
    fn test_normalize_zero_slot_dimension_uses_bid() {
        let mut slot = slot_in_zone("s1", "5");
        slot.sizes = vec![[0, 250]];
        let mut matched = bid("a", "display", 0.9);
        matched.width = Some(728);
        matched.height = Some(90);
        matched.currency = Some(String::new());
        matched.ttl = Some(0);

        let normalized = normalize_bid(&slot, matched, &defaults());

        assert_eq!((normalized.width, normalized.height), (728, 250));
        assert_eq!(normalized.currency, "USD");
        assert_eq!(normalized.ttl, 60000);
    }

    #[test]
    fn test_normalize_bid_without_markup_or_dimensions() {
        let slot = slot_in_zone("s1", "5");
        let normalized = normalize_bid(&slot, bid("a", "display", 0.9), &defaults());

        assert_eq!((normalized.width, normalized.height), (0, 0));
        assert_eq!(normalized.ad, "");
    }
}
