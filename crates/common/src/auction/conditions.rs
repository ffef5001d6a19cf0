//! Zone condition merging.
//!
//! The endpoint accepts a single format filter per zone, while several slots
//! on a page may target the same zone with different allow/exclude lists.
//! [`merge_zone_filters`] folds those per-slot lists into the least
//! restrictive filter that is still valid for every slot of the zone.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};

use super::types::SlotRequest;

/// Merged format filter for one zone.
///
/// Serialized in the endpoint's historical shape: `1` for
/// [`ZoneFilter::Unrestricted`], `[[allow...], [exclude...]]` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneFilter {
    Unrestricted,
    /// At most one of the two lists is non-empty.
    Restricted {
        allow: Vec<String>,
        exclude: Vec<String>,
    },
}

impl ZoneFilter {
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }
}

impl Serialize for ZoneFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Unrestricted => serializer.serialize_u8(1),
            Self::Restricted { allow, exclude } => {
                let mut pair = serializer.serialize_tuple(2)?;
                pair.serialize_element(allow)?;
                pair.serialize_element(exclude)?;
                pair.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ZoneFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(u8),
            Pair(Vec<String>, Vec<String>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Flag(1) => Ok(Self::Unrestricted),
            Repr::Flag(other) => Err(de::Error::custom(format!(
                "unexpected zone filter flag {other}"
            ))),
            Repr::Pair(allow, exclude) => Ok(Self::Restricted { allow, exclude }),
        }
    }
}

impl fmt::Display for ZoneFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrestricted => write!(f, "unrestricted"),
            Self::Restricted { allow, exclude } if exclude.is_empty() => {
                write!(f, "allow [{}]", allow.join(", "))
            }
            Self::Restricted { exclude, .. } => write!(f, "exclude [{}]", exclude.join(", ")),
        }
    }
}

/// Merged filters keyed by zone.
pub type ZoneFilters = BTreeMap<String, ZoneFilter>;

/// Running totals for a zone that has not become unrestricted.
#[derive(Debug, Default)]
struct ConditionTally {
    /// Union of allow lists, first-seen order
    allow: Vec<String>,
    /// Per format, the number of slots that excluded it, first-seen order
    exclude: Vec<(String, usize)>,
    /// Slots that supplied a non-empty exclude list
    exclude_contributors: usize,
}

impl ConditionTally {
    fn record(&mut self, allow: &[String], exclude: &[String]) {
        for format in allow {
            if !self.allow.contains(format) {
                self.allow.push(format.clone());
            }
        }

        for (idx, format) in exclude.iter().enumerate() {
            // a slot counts once per format
            if exclude[..idx].contains(format) {
                continue;
            }
            match self.exclude.iter_mut().find(|(seen, _)| seen == format) {
                Some((_, count)) => *count += 1,
                None => self.exclude.push((format.clone(), 1)),
            }
        }

        if !exclude.is_empty() {
            self.exclude_contributors += 1;
        }
    }

    fn resolve(self) -> ZoneFilter {
        let contributors = self.exclude_contributors;
        let mut allow = self.allow;
        let mut exclude: Vec<String> = self
            .exclude
            .into_iter()
            .filter(|(_, count)| *count == contributors)
            .map(|(format, _)| format)
            .collect();

        // An explicit allow beats a merged exclude, and any surviving
        // exclude replaces the allow union entirely.
        if !exclude.is_empty() {
            exclude.retain(|format| !allow.contains(format));
            allow.clear();
        }

        if allow.is_empty() && exclude.is_empty() {
            ZoneFilter::Unrestricted
        } else {
            ZoneFilter::Restricted { allow, exclude }
        }
    }
}

enum ZoneState {
    Unrestricted,
    Accumulating(ConditionTally),
}

/// Fold every slot's allow/exclude lists into one filter per zone.
///
/// Slots are processed in order. A slot without any filter makes its zone
/// unrestricted for good. Otherwise allow lists are unioned, and only formats
/// excluded by every slot that supplied an exclude list survive.
#[must_use]
pub fn merge_zone_filters(slots: &[SlotRequest]) -> ZoneFilters {
    let mut states: BTreeMap<&str, ZoneState> = BTreeMap::new();

    for slot in slots {
        let allow = slot.params.merge_allow_list();
        let exclude = slot.params.exclude_list();

        let state = states
            .entry(slot.zone())
            .or_insert_with(|| ZoneState::Accumulating(ConditionTally::default()));

        if matches!(state, ZoneState::Unrestricted) {
            continue;
        }
        if allow.is_empty() && exclude.is_empty() {
            *state = ZoneState::Unrestricted;
        } else if let ZoneState::Accumulating(tally) = state {
            tally.record(allow, exclude);
        }
    }

    states
        .into_iter()
        .map(|(zone, state)| {
            let filter = match state {
                ZoneState::Unrestricted => ZoneFilter::Unrestricted,
                ZoneState::Accumulating(tally) => tally.resolve(),
            };
            log::debug!("justpremium: zone {} filter {}", zone, filter);
            (zone.to_string(), filter)
        })
        .collect()
}
