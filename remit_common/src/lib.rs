//!
//! Common types shared by every RemitBuddy quote consumer.
//!
//! This crate aggregates:
//! - `error` — unified error type `QuoteError` and its `Result` alias.
//! - `country` — supported destinations and their currencies.
//! - `request` — validated comparison request and query encoding.
//! - `quote` — provider quotes and best-first ranking.
//! - `net` — endpoint constants and timing defaults.
//! - `config` — client configuration passed explicitly to the client.
#![warn(missing_docs)]
pub mod config;
pub mod country;
pub mod error;
pub mod net;
pub mod quote;
pub mod request;

pub use config::ClientConfig;
pub use country::Country;
pub use error::{QuoteError, Result};
pub use quote::{Quote, QuoteResponse, RankedQuotes};
pub use request::{FetchMode, QuoteRequest};
