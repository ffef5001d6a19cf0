//! Bidder adapter implementations.

pub mod justpremium;
