//! Client configuration passed explicitly to the quote client.
use std::time::Duration;

use url::Url;

use crate::error::QuoteError;
use crate::net::{
    DEFAULT_API_BASE_URL, FIRST_ATTEMPT_TIMEOUT, QUOTE_PATH, RETRY_BACKOFF, RETRY_TIMEOUT,
    SLOW_BATCH_TIMEOUT, endpoint,
};

/// Endpoint location and timing knobs for one quote client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    base_url: String,
    /// Timeout of the first attempt.
    pub first_attempt_timeout: Duration,
    /// Timeout of the single retry.
    pub retry_timeout: Duration,
    /// Pause before the retry.
    pub retry_backoff: Duration,
    /// Window for the slow batch of a staged fetch.
    pub slow_batch_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            first_attempt_timeout: FIRST_ATTEMPT_TIMEOUT,
            retry_timeout: RETRY_TIMEOUT,
            retry_backoff: RETRY_BACKOFF,
            slow_batch_timeout: SLOW_BATCH_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Default timings against another API host.
    pub fn with_base_url(base_url: &str) -> Result<Self, QuoteError> {
        Ok(ClientConfig {
            base_url: parse_base_url(base_url)?,
            ..ClientConfig::default()
        })
    }

    /// API host the client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the quote endpoint.
    pub fn quote_url(&self) -> Result<Url, QuoteError> {
        Ok(Url::parse(&endpoint(&self.base_url, QUOTE_PATH))?)
    }
}

fn parse_base_url(raw: &str) -> Result<String, QuoteError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(QuoteError::Config(format!(
            "unsupported scheme '{other}' in base URL {raw}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_endpoint_constants() {
        let config = ClientConfig::default();
        assert_eq!(config.first_attempt_timeout, Duration::from_secs(15));
        assert_eq!(config.retry_timeout, Duration::from_secs(30));
        assert_eq!(config.retry_backoff, Duration::from_secs(2));
        assert_eq!(config.slow_batch_timeout, Duration::from_secs(4));
        assert_eq!(
            config.quote_url().unwrap().as_str(),
            "https://remitbuddy-production.up.railway.app/api/getRemittanceQuote"
        );
    }

    #[test]
    fn base_url_is_validated() {
        let config = ClientConfig::with_base_url("http://localhost:8000/").unwrap();
        assert_eq!(config.base_url(), "http://localhost:8000");
        assert_eq!(
            config.quote_url().unwrap().as_str(),
            "http://localhost:8000/api/getRemittanceQuote"
        );
        assert!(matches!(
            ClientConfig::with_base_url("ftp://example.com"),
            Err(QuoteError::Config(_))
        ));
        assert!(ClientConfig::with_base_url("not a url").is_err());
    }
}
