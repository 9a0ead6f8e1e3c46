//! Provider quotes returned by the endpoint and their best-first ranking.
//!
//! Quotes arrive as JSON and are decoded via `serde_json`. The values are
//! carried through untouched: `recipient_gets` is computed by the endpoint
//! and is never recomputed from `exchange_rate` and `fee` on this side.
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One provider's offer for a given transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Provider display name, unique within a response.
    pub provider: String,
    /// Rate exactly as the endpoint reports it.
    pub exchange_rate: f64,
    /// Fee charged by the provider, in KRW.
    pub fee: f64,
    /// Net amount the recipient receives, in the destination currency.
    pub recipient_gets: f64,
    /// Provider's transfer page.
    #[serde(default)]
    pub link: String,
}

impl Quote {
    /// Provider name as shown in the result list.
    pub fn display_name(&self) -> &str {
        match self.provider.as_str() {
            "JP Remit" => "JRF",
            "The Moin" => "Moin",
            other => other,
        }
    }

    fn rank_key(&self) -> f64 {
        if self.recipient_gets.is_nan() {
            f64::NEG_INFINITY
        } else {
            self.recipient_gets
        }
    }
}

/// Body of a quote endpoint response.
///
/// A missing or `null` `results` field is a valid "no providers" answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteResponse {
    #[serde(default)]
    results: Option<Vec<Quote>>,
}

impl QuoteResponse {
    /// Wraps a list of quotes as a response body.
    pub fn new(results: Vec<Quote>) -> Self {
        QuoteResponse {
            results: Some(results),
        }
    }

    /// Quotes in response order, empty when `results` was absent.
    pub fn into_quotes(self) -> Vec<Quote> {
        self.results.unwrap_or_default()
    }

    /// Decodes a response body.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Quotes of one request, ordered best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedQuotes {
    quotes: Vec<Quote>,
    fetched_at: DateTime<Utc>,
}

impl RankedQuotes {
    /// Sorts descending by `recipient_gets`.
    ///
    /// The sort is stable, so equal amounts keep the response order. NaN
    /// amounts sink to the bottom.
    pub fn rank(mut quotes: Vec<Quote>) -> Self {
        quotes.sort_by(|a, b| b.rank_key().total_cmp(&a.rank_key()));
        RankedQuotes {
            quotes,
            fetched_at: Utc::now(),
        }
    }

    /// Quote with the largest recipient amount.
    pub fn best(&self) -> Option<&Quote> {
        self.quotes.first()
    }

    /// Whether the quote at `index` is the best one.
    pub fn is_best(&self, index: usize) -> bool {
        index == 0 && !self.quotes.is_empty()
    }

    /// All quotes, best first.
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Number of quotes.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// `true` when no provider answered.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// When the list was ranked.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// How much less the recipient gets with the quote at `index` than with the best one.
    pub fn shortfall(&self, index: usize) -> Option<f64> {
        let best = self.best()?;
        let quote = self.quotes.get(index)?;
        Some((best.recipient_gets - quote.recipient_gets).max(0.0))
    }

    /// Folds a later provider batch of the same request into this ranking.
    ///
    /// Providers already present keep their first quote.
    pub fn merge(&mut self, batch: Vec<Quote>) {
        let mut seen: HashSet<String> = self.quotes.iter().map(|q| q.provider.clone()).collect();
        let mut merged = std::mem::take(&mut self.quotes);
        merged.extend(batch.into_iter().filter(|q| seen.insert(q.provider.clone())));
        *self = RankedQuotes::rank(merged);
    }
}
