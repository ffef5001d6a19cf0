//! User-sync pixel registration.
//!
//! Pixels accumulate for the lifetime of the process: every sync call with
//! iframes enabled appends another descriptor and the caller always receives
//! the whole list.

use serde::{Deserialize, Serialize};

/// Kind of sync pixel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncType {
    Iframe,
}

/// One sync descriptor handed to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncPixel {
    #[serde(rename = "type")]
    pub sync_type: SyncType,
    #[serde(rename = "src")]
    pub url: String,
}

impl SyncPixel {
    #[must_use]
    pub fn iframe(url: impl Into<String>) -> Self {
        Self {
            sync_type: SyncType::Iframe,
            url: url.into(),
        }
    }
}

/// Sync capabilities granted by the orchestrator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOptions {
    #[serde(default)]
    pub iframe_enabled: bool,
}

/// Process-scoped, append-only list of registered sync pixels.
///
/// Create one at startup and pass it to every sync call.
#[derive(Debug, Default)]
pub struct UserSyncRegistry {
    pixels: Vec<SyncPixel>,
}

impl UserSyncRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pixel. Duplicates are kept.
    pub fn register(&mut self, pixel: SyncPixel) {
        self.pixels.push(pixel);
    }

    #[must_use]
    pub fn pixels(&self) -> &[SyncPixel] {
        &self.pixels
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_appends_without_dedup() {
        let mut registry = UserSyncRegistry::new();
        assert!(registry.is_empty());

        registry.register(SyncPixel::iframe("//sync.example.com/a"));
        registry.register(SyncPixel::iframe("//sync.example.com/a"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.pixels()[0], registry.pixels()[1]);
    }

    #[test]
    fn test_sync_pixel_wire_shape() {
        let pixel = SyncPixel::iframe("//sync.example.com/a");
        assert_eq!(
            serde_json::to_value(&pixel).expect("should serialize"),
            json!({ "type": "iframe", "src": "//sync.example.com/a" })
        );
    }

    #[test]
    fn test_sync_options_from_orchestrator() {
        let options: SyncOptions =
            serde_json::from_value(json!({ "iframeEnabled": true, "pixelEnabled": true }))
                .expect("should parse");
        assert!(options.iframe_enabled);

        let defaults: SyncOptions = serde_json::from_value(json!({})).expect("should parse");
        assert!(!defaults.iframe_enabled);
    }
}
