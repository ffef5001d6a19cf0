//! Bid request commands.
//!
//! Input files describe one auction call:
//!
//! ```json
//! {
//!   "page": { "hostname": "www.example.com", "protocol": "https:" },
//!   "window": { "top": { "screen_width": 1920, "screen_height": 1080,
//!                        "inner_width": 1280, "inner_height": 720 } },
//!   "slots": [ { "bidId": "a1", "params": { "zone": "28313" }, "sizes": [[300, 250]] } ]
//! }
//! ```

use std::fs;
use std::path::Path;

use bytes::Bytes;
use clap::Args;
use justpremium_adapter_common::auction::types::{
    NormalizedBidResponse, PageContext, ServerRequest, SlotRequest, WindowMetrics,
};
use justpremium_adapter_common::auction::BidderAdapter;
use serde::Deserialize;
use serde_json::Value as Json;

use crate::error::CliError;

/// One auction call as read from disk.
#[derive(Debug, Deserialize)]
pub(crate) struct AuctionInput {
    pub page: PageContext,
    #[serde(default)]
    pub window: WindowMetrics,
    pub slots: Vec<SlotRequest>,
}

/// Page fields that replace the ones in the input file.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct PageOverride {
    /// Page hostname sent to the endpoint
    #[arg(long)]
    pub hostname: Option<String>,

    /// Page protocol, with or without the trailing colon (e.g. `https`)
    #[arg(long)]
    pub protocol: Option<String>,
}

impl PageOverride {
    fn apply(&self, page: &mut PageContext) {
        if let Some(hostname) = &self.hostname {
            page.hostname.clone_from(hostname);
        }
        if let Some(protocol) = &self.protocol {
            page.protocol = format!("{}:", protocol.trim_end_matches(':'));
        }
    }
}

pub(crate) fn read_input(path: &Path, page: &PageOverride) -> Result<AuctionInput, CliError> {
    let content = fs::read_to_string(path)?;
    let mut input: AuctionInput = serde_json::from_str(&content)?;
    page.apply(&mut input.page);
    Ok(input)
}

/// Build the server request for an input file.
pub(crate) fn build(
    adapter: &dyn BidderAdapter,
    input: &AuctionInput,
) -> Result<ServerRequest, CliError> {
    adapter
        .build_requests(&input.slots, &input.page, &input.window)?
        .ok_or_else(|| CliError::Config("No slot in the input carries a zone".into()))
}

fn print_bids(bids: &[NormalizedBidResponse]) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(bids)?);
    Ok(())
}

/// Print the URL and payload that would be posted.
pub fn request(
    adapter: &dyn BidderAdapter,
    slots: &Path,
    page: &PageOverride,
) -> Result<(), CliError> {
    let input = read_input(slots, page)?;
    let request = build(adapter, &input)?;

    let payload: Json = serde_json::from_str(&request.data)?;
    println!("{} {}", request.method, request.url);
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

/// Interpret a saved endpoint response against an input file.
pub fn interpret(
    adapter: &dyn BidderAdapter,
    slots: &Path,
    response: &Path,
    page: &PageOverride,
) -> Result<(), CliError> {
    let input = read_input(slots, page)?;
    let request = build(adapter, &input)?;

    let body: Json = serde_json::from_str(&fs::read_to_string(response)?)?;
    print_bids(&adapter.interpret_response(&body, &request))
}

/// Post the request to the live endpoint and print the matched bids.
pub fn send(
    adapter: &dyn BidderAdapter,
    slots: &Path,
    page: &PageOverride,
    verbose: bool,
) -> Result<(), CliError> {
    let input = read_input(slots, page)?;
    let request = build(adapter, &input)?;

    if verbose {
        println!("POST {}", request.url);
    }

    let response = ureq::post(&request.url)
        .header("Content-Type", "application/json")
        .config()
        .http_status_as_error(false)
        .build()
        .send(request.data.as_str())?;

    let status = response.status();
    let body = response
        .into_body()
        .read_to_vec()
        .map_err(|e| CliError::Http(format!("Failed to read response: {}", e)))?;

    let http_response = http::Response::builder()
        .status(status)
        .body(Bytes::from(body))
        .map_err(|e| CliError::Http(format!("Failed to rebuild response: {}", e)))?;

    let bids = adapter.interpret_http_response(&http_response, &request)?;
    print_bids(&bids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use justpremium_adapter_common::auction::find_adapter;
    use justpremium_adapter_common::settings::Settings;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(value: &Json) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("should create temp file");
        file.write_all(value.to_string().as_bytes())
            .expect("should write json");
        file
    }

    fn input_json() -> Json {
        json!({
            "page": { "hostname": "www.example.com", "protocol": "https:" },
            "window": {
                "self": { "screen_width": 1920, "screen_height": 1080,
                          "inner_width": 300, "inner_height": 250 }
            },
            "slots": [
                { "bidId": "a1", "params": { "zone": 28313, "exclude": ["wp"] },
                  "sizes": [[300, 250]] },
                { "bidId": "a2", "params": {} }
            ]
        })
    }

    #[test]
    fn test_build_from_input_file() {
        let file = write_json(&input_json());
        let settings = Settings::from_toml("").expect("defaults should load");
        let adapter = find_adapter(&settings, "justpremium").expect("adapter registered");

        let input =
            read_input(file.path(), &PageOverride::default()).expect("should read input");
        let request = build(adapter.as_ref(), &input).expect("should build");

        assert_eq!(request.bids.len(), 1);
        assert!(request
            .url
            .starts_with("https://pre.ads.justpremium.com/v/2.0/t/xhr?i="));

        let payload: Json = serde_json::from_str(&request.data).expect("payload is json");
        assert_eq!(payload["ww"], 300);
        assert_eq!(payload["c"], json!({ "28313": [[], ["wp"]] }));
    }

    #[test]
    fn test_build_without_eligible_slots() {
        let file = write_json(&json!({
            "page": { "hostname": "www.example.com", "protocol": "https:" },
            "slots": [{ "bidId": "a2", "params": {} }]
        }));
        let settings = Settings::from_toml("").expect("defaults should load");
        let adapter = find_adapter(&settings, "justpremium").expect("adapter registered");

        let input =
            read_input(file.path(), &PageOverride::default()).expect("should read input");
        assert!(matches!(
            build(adapter.as_ref(), &input),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_interpret_saved_response() {
        let slots = write_json(&input_json());
        let response = write_json(&json!({
            "bid": { "28313": [{ "id": "c1", "format": "lu", "price": 0.8 }] }
        }));
        let settings = Settings::from_toml("").expect("defaults should load");
        let adapter = find_adapter(&settings, "justpremium").expect("adapter registered");

        interpret(
            adapter.as_ref(),
            slots.path(),
            response.path(),
            &PageOverride::default(),
        )
        .expect("should interpret");
    }

    #[test]
    fn test_read_input_rejects_bad_json() {
        let mut file = NamedTempFile::new().expect("should create temp file");
        file.write_all(b"{ not json").expect("should write");
        assert!(matches!(
            read_input(file.path(), &PageOverride::default()),
            Err(CliError::Json(_))
        ));
    }

    #[test]
    fn test_page_override_replaces_input_page() {
        let file = write_json(&input_json());
        let settings = Settings::from_toml("").expect("defaults should load");
        let adapter = find_adapter(&settings, "justpremium").expect("adapter registered");
        let overrides = PageOverride {
            hostname: Some("news.example.org".to_string()),
            protocol: Some("http".to_string()),
        };

        let input = read_input(file.path(), &overrides).expect("should read input");
        assert_eq!(input.page.protocol, "http:");

        let request = build(adapter.as_ref(), &input).expect("should build");
        assert!(request
            .url
            .starts_with("http://pre.ads.justpremium.com/v/2.0/t/xhr?i="));

        let payload: Json = serde_json::from_str(&request.data).expect("payload is json");
        assert_eq!(payload["hostname"], "news.example.org");
        assert_eq!(payload["protocol"], "http");
    }

    #[test]
    fn test_page_override_keeps_unset_fields() {
        let file = write_json(&input_json());
        let overrides = PageOverride {
            hostname: None,
            protocol: Some("https:".to_string()),
        };

        let input = read_input(file.path(), &overrides).expect("should read input");
        assert_eq!(input.page.hostname, "www.example.com");
        assert_eq!(input.page.protocol, "https:");
    }
}
