//! Error types for the JustPremium bidder adapter.
//!
//! Fallible operations return `error_stack::Report<AdapterError>` so callers
//! can attach context with [`error_stack::ResultExt::change_context`].

use derive_more::{Display, Error};

/// Errors raised by the adapter's I/O glue.
///
/// The matching and merging algorithms never fail; absence of a bid or filter
/// is modelled with `Option`, not with this type.
#[derive(Debug, Display, Error)]
pub enum AdapterError {
    /// Settings could not be loaded, parsed or validated.
    #[display("Configuration error: {message}")]
    Configuration { message: String },

    /// The outgoing bid request could not be assembled.
    #[display("Bid request error: {message}")]
    BidRequest { message: String },

    /// The remote endpoint returned a body that could not be decoded.
    #[display("Bid response error: {message}")]
    BidResponse { message: String },
}
