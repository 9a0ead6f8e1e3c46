//! Comparison request built from the amount and destination a user picked.
//!
//! A `QuoteRequest` is validated on construction and immutable afterwards:
//! a new one is built for every comparison the user starts.
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::country::Country;
use crate::error::QuoteError;

/// Smallest amount, in KRW, the comparison accepts.
pub const MIN_SEND_AMOUNT_KRW: u64 = 10_000;
/// Largest amount, in KRW, the comparison accepts.
pub const MAX_SEND_AMOUNT_KRW: u64 = 5_000_000;
/// Currency the sender pays in.
pub const SEND_CURRENCY: &str = "KRW";

/// Which provider batch the endpoint should answer with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FetchMode {
    /// Every provider in one response. No `mode` parameter is sent.
    #[default]
    Full,
    /// Providers that answer quickly.
    Fast,
    /// Providers that need scraping and answer late.
    Slow,
}

/// Validated comparison input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteRequest {
    send_amount_krw: u64,
    country: Country,
    mode: FetchMode,
}

impl QuoteRequest {
    /// Creates a full-batch request, rejecting amounts outside
    /// `[MIN_SEND_AMOUNT_KRW, MAX_SEND_AMOUNT_KRW]`.
    pub fn new(send_amount_krw: u64, country: Country) -> Result<Self, QuoteError> {
        validate_amount(send_amount_krw)?;
        Ok(QuoteRequest {
            send_amount_krw,
            country,
            mode: FetchMode::Full,
        })
    }

    /// Builds a request from raw form input: an amount that may carry
    /// thousands separators and a country name or code.
    pub fn from_input(amount_text: &str, country_text: &str) -> Result<Self, QuoteError> {
        let amount = parse_amount(amount_text)?;
        let country = Country::parse(country_text)?;
        QuoteRequest::new(amount, country)
    }

    /// Same request for another provider batch.
    pub fn with_mode(&self, mode: FetchMode) -> Self {
        QuoteRequest {
            mode,
            ..self.clone()
        }
    }

    /// Amount to send, in KRW.
    pub fn send_amount_krw(&self) -> u64 {
        self.send_amount_krw
    }

    /// Destination country.
    pub fn country(&self) -> Country {
        self.country
    }

    /// Destination currency, derived from the country.
    pub fn currency(&self) -> &'static str {
        self.country.currency()
    }

    /// Provider batch requested.
    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    /// Query string pairs in the order the endpoint documents them.
    ///
    /// The staged batches also name the send currency and their `mode`;
    /// `_t` always comes last.
    pub fn query_pairs(&self, cache_buster: i64) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("receive_country", self.country.api_name().to_string()),
            ("receive_currency", self.currency().to_string()),
            ("send_amount", self.send_amount_krw.to_string()),
        ];
        if self.mode != FetchMode::Full {
            pairs.push(("send_currency", SEND_CURRENCY.to_string()));
            pairs.push(("mode", self.mode.to_string()));
        }
        pairs.push(("_t", cache_buster.to_string()));
        pairs
    }
}

/// Rejects amounts outside the accepted range.
pub fn validate_amount(amount: u64) -> Result<(), QuoteError> {
    if amount < MIN_SEND_AMOUNT_KRW {
        return Err(QuoteError::InvalidRequest(format!(
            "amount {amount} KRW is below the minimum of {MIN_SEND_AMOUNT_KRW} KRW"
        )));
    }
    if amount > MAX_SEND_AMOUNT_KRW {
        return Err(QuoteError::InvalidRequest(format!(
            "amount {amount} KRW is above the maximum of {MAX_SEND_AMOUNT_KRW} KRW"
        )));
    }
    Ok(())
}

/// Parses a user-typed amount such as `"1,000,000"` or `" 50000 "`.
///
/// Only digits and `,` separators are accepted. Range checks are left to
/// `QuoteRequest::new`.
pub fn parse_amount(text: &str) -> Result<u64, QuoteError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(QuoteError::InvalidRequest("amount is empty".to_string()));
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit() || c == ',') {
        return Err(QuoteError::InvalidRequest(format!(
            "amount is not a whole number of KRW: {trimmed}"
        )));
    }
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    digits
        .parse::<u64>()
        .map_err(|e| QuoteError::InvalidRequest(format!("amount {trimmed}: {e}")))
}

static LAST_CACHE_BUSTER: AtomicI64 = AtomicI64::new(0);

/// Fresh `_t` value: UTC milliseconds, bumped so consecutive calls never repeat.
pub fn cache_buster() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_CACHE_BUSTER.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_CACHE_BUSTER.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(current) => last = current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_bounds_are_inclusive() {
        assert!(QuoteRequest::new(MIN_SEND_AMOUNT_KRW, Country::Nepal).is_ok());
        assert!(QuoteRequest::new(MAX_SEND_AMOUNT_KRW, Country::Nepal).is_ok());
        assert!(matches!(
            QuoteRequest::new(5_000, Country::Nepal),
            Err(QuoteError::InvalidRequest(_))
        ));
        assert!(matches!(
            QuoteRequest::new(6_000_000, Country::Nepal),
            Err(QuoteError::InvalidRequest(_))
        ));
    }

    #[test]
    fn parses_amounts_with_separators() {
        assert_eq!(parse_amount("1,000,000").unwrap(), 1_000_000);
        assert_eq!(parse_amount(" 50000 ").unwrap(), 50_000);
        assert!(parse_amount("").is_err());
        assert!(parse_amount("12.5").is_err());
        assert!(parse_amount("-100").is_err());
        assert!(parse_amount("1e6").is_err());
    }

    #[test]
    fn from_input_combines_both_fields() {
        let request = QuoteRequest::from_input("1,000,000", "vietnam").unwrap();
        assert_eq!(request.send_amount_krw(), 1_000_000);
        assert_eq!(request.country(), Country::Vietnam);
        assert_eq!(request.currency(), "VND");
        assert_eq!(request.mode(), FetchMode::Full);

        assert!(QuoteRequest::from_input("9,999", "vietnam").is_err());
        assert!(QuoteRequest::from_input("100000", "Atlantis").is_err());
    }

    #[test]
    fn query_pairs_follow_endpoint_order() {
        let request = QuoteRequest::new(1_000_000, Country::SriLanka).unwrap();
        let pairs = request.query_pairs(42);
        assert_eq!(
            pairs,
            vec![
                ("receive_country", "Sri Lanka".to_string()),
                ("receive_currency", "LKR".to_string()),
                ("send_amount", "1000000".to_string()),
                ("_t", "42".to_string()),
            ]
        );

        let fast = request.with_mode(FetchMode::Fast).query_pairs(7);
        assert_eq!(fast[3], ("send_currency", "KRW".to_string()));
        assert_eq!(fast[4], ("mode", "fast".to_string()));
        assert_eq!(fast[5], ("_t", "7".to_string()));
    }

    #[test]
    fn cache_buster_never_repeats() {
        let first = cache_buster();
        let second = cache_buster();
        let third = cache_buster();
        assert!(second > first);
        assert!(third > second);
    }
}
