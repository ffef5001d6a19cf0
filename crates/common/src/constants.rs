/// Bidder code reported to the auction orchestrator.
pub const BIDDER_CODE: &str = "justpremium";

pub const DEFAULT_ENDPOINT_HOST: &str = "pre.ads.justpremium.com";
pub const DEFAULT_ENDPOINT_PATH: &str = "/v/2.0/t/xhr";

/// Time-to-live applied when a bid carries none, in milliseconds.
pub const DEFAULT_TTL_MS: u32 = 60_000;
pub const DEFAULT_CURRENCY: &str = "USD";

pub const DEFAULT_SYNC_IFRAME_URL: &str =
    "//us-u.openx.net/w/1.0/pd?plm=10&ph=26e53f82-d199-49df-9eca-7b350c0f9646";

/// Query parameter carrying the cache-busting timestamp.
pub const CACHE_BUST_PARAM: &str = "i";
