//! Core types shared by the request assembler, condition merger and bid matcher.

use std::fmt;

use error_stack::{Report, ResultExt};
use http::{header, Method};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as Json;

use crate::error::AdapterError;

/// Creative size as `[width, height]`.
pub type Size = [u32; 2];

/// Bidder parameters attached to one ad unit by the publisher.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotParams {
    /// Auction zone. Integer-valued, but carried as a string. A numeric `0`
    /// reads as no zone.
    #[serde(default, deserialize_with = "deserialize_zone")]
    pub zone: String,

    /// Creative formats this slot accepts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<String>>,

    /// Legacy name for `allow`, only honoured when building zone filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<String>>,

    /// Creative formats this slot rejects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
}

impl SlotParams {
    /// Allow list used when matching bids locally.
    #[must_use]
    pub fn allow_list(&self) -> &[String] {
        self.allow.as_deref().unwrap_or_default()
    }

    /// Allow list used when merging zone filters (`allow`, else `formats`).
    #[must_use]
    pub fn merge_allow_list(&self) -> &[String] {
        self.allow
            .as_deref()
            .or(self.formats.as_deref())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn exclude_list(&self) -> &[String] {
        self.exclude.as_deref().unwrap_or_default()
    }
}

/// One ad unit's bid request as handed over by the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SlotRequest {
    /// Orchestrator-side request id, echoed back on the matched bid.
    #[serde(default)]
    pub bid_id: String,
    #[serde(default)]
    pub params: SlotParams,
    #[serde(default)]
    pub sizes: Vec<Size>,
}

impl SlotRequest {
    #[must_use]
    pub fn zone(&self) -> &str {
        &self.params.zone
    }

    /// First declared size, if any.
    #[must_use]
    pub fn primary_size(&self) -> Option<Size> {
        self.sizes.first().copied()
    }
}

/// Candidate bid returned by the remote endpoint for a zone.
///
/// Only `id` and `price` are required. Optional fields that are `null` or of
/// the wrong type read as absent so the bid still reaches the matcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bid {
    /// Creative identifier
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub id: String,
    /// Creative format tag, compared against allow/exclude lists
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub format: Option<String>,
    /// CPM
    pub price: f64,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub currency: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub width: Option<u32>,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub height: Option<u32>,
    /// Creative markup
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub adm: Option<String>,
    /// Time-to-live in milliseconds
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub ttl: Option<u32>,
}

/// Bid handed back to the orchestrator, one per matched slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBidResponse {
    pub request_id: String,
    pub creative_id: String,
    pub width: u32,
    pub height: u32,
    pub ad: String,
    pub cpm: f64,
    pub net_revenue: bool,
    pub currency: String,
    pub ttl: u32,
}

/// Location of the page running the auction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageContext {
    pub hostname: String,
    /// Page protocol including the trailing colon, e.g. `https:`.
    pub protocol: String,
}

impl PageContext {
    /// Protocol without its trailing colon, as the endpoint expects it.
    #[must_use]
    pub fn bare_protocol(&self) -> &str {
        self.protocol.trim_end_matches(':')
    }
}

/// Screen and window dimensions reported to the endpoint.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Viewport {
    pub screen_width: u32,
    pub screen_height: u32,
    pub inner_width: u32,
    pub inner_height: u32,
}

/// Dimensions gathered from the browsing context.
///
/// `top` is `None` when the top window could not be read, e.g. from a
/// cross-origin iframe.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowMetrics {
    #[serde(default)]
    pub top: Option<Viewport>,
    #[serde(default, rename = "self")]
    pub own: Viewport,
}

impl WindowMetrics {
    #[must_use]
    pub fn resolve(&self) -> Viewport {
        self.top.unwrap_or(self.own)
    }
}

/// Outgoing call produced by an adapter.
#[derive(Debug, Clone)]
pub struct ServerRequest {
    pub method: Method,
    pub url: String,
    /// Serialized JSON payload
    pub data: String,
    /// Slots the payload was built from, needed to interpret the response
    pub bids: Vec<SlotRequest>,
}

impl ServerRequest {
    /// Build an `http` request carrying the JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::BidRequest`] if the URL is not a valid URI.
    pub fn to_http_request(&self) -> Result<http::Request<String>, Report<AdapterError>> {
        http::Request::builder()
            .method(self.method.clone())
            .uri(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(self.data.clone())
            .change_context(AdapterError::BidRequest {
                message: format!("Failed to build HTTP request for {}", self.url),
            })
    }
}

/// Accepts both `"123"` and `123`, normalizing to a string.
pub(crate) fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(StringOrNumberVisitor { zero_is_empty: false })
}

/// Like [`deserialize_string_or_number`], but a numeric `0` becomes an empty
/// zone. The string `"0"` is kept.
fn deserialize_zone<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(StringOrNumberVisitor { zero_is_empty: true })
}

struct StringOrNumberVisitor {
    zero_is_empty: bool,
}

impl StringOrNumberVisitor {
    fn number<T: PartialEq<T> + Default + ToString>(&self, value: T) -> String {
        if self.zero_is_empty && value == T::default() {
            String::new()
        } else {
            value.to_string()
        }
    }
}

impl Visitor<'_> for StringOrNumberVisitor {
    type Value = String;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string or integer")
    }

    fn visit_str<E>(self, value: &str) -> Result<String, E>
    where
        E: de::Error,
    {
        Ok(value.to_string())
    }

    fn visit_string<E>(self, value: String) -> Result<String, E>
    where
        E: de::Error,
    {
        Ok(value)
    }

    fn visit_i64<E>(self, value: i64) -> Result<String, E>
    where
        E: de::Error,
    {
        Ok(self.number(value))
    }

    fn visit_u64<E>(self, value: u64) -> Result<String, E>
    where
        E: de::Error,
    {
        Ok(self.number(value))
    }
}

/// Optional string; any other JSON type reads as `None`.
fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Json>::deserialize(deserializer)? {
        Some(Json::String(value)) => Some(value),
        _ => None,
    })
}

/// Optional non-negative integer. Floats are truncated and numeric strings
/// parsed; anything else reads as `None`.
fn deserialize_lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Option::<Json>::deserialize(deserializer)? {
        Some(Json::Number(n)) => n.as_f64(),
        Some(Json::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    Ok(number
        .filter(|n| n.is_finite() && *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n as u32))
}
