//! RemitBuddy quote client.
//!
//! Fetches remittance quotes for an amount of KRW and a destination country
//! from the remote quote endpoint, retries once on transient failure, ranks
//! providers by what the recipient gets, and keeps the last request
//! authoritative when comparisons overlap.
//!
//! - `transport` — the `QuoteTransport` seam and its `reqwest` implementation.
//! - `client` — `QuoteClient`: timeout, single retry, ranking, cancellation.
//! - `session` — `QuoteSession`: last-request-wins result slot and UI events.
//! - `render` — terminal table output.
#![warn(missing_docs)]
pub mod client;
pub mod render;
pub mod session;
pub mod transport;

pub use client::{FetchPhase, QuoteClient};
pub use session::{ComparisonState, QuoteSession, SessionEvent};
pub use transport::{HttpTransport, QuoteTransport, TransportError};
