//! Common functionality for the JustPremium bidder adapter.
//!
//! This crate turns an orchestrator's ad-slot requests into a single request
//! to the JustPremium auction endpoint and maps the endpoint's zone bids back
//! onto the slots.
//!
//! # Modules
//!
//! - [`auction`]: Adapter seam, zone filter merging, bid matching, payload assembly
//! - [`constants`]: Bidder code, endpoint and response defaults
//! - [`error`]: Error types and error handling utilities
//! - [`integrations`]: Concrete bidder adapters
//! - [`logging`]: Logger initialization
//! - [`settings`]: Configuration management and validation
//! - [`user_sync`]: Sync pixel registration
//! - [`test_support`]: Testing utilities and fixtures

pub mod auction;
pub mod constants;
pub mod error;
pub mod integrations;
pub mod logging;
pub mod settings;
pub mod user_sync;
