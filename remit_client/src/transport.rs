//! Transport between the quote client and the remote quote endpoint.
//!
//! `QuoteTransport` is the seam the client is generic over: `HttpTransport`
//! talks to the real endpoint with `reqwest`, tests plug in scripted fakes.
//! Timeouts are enforced by the client around the whole call, so a transport
//! only has to report what went wrong.
use std::future::Future;

use log::debug;
use remit_common::net::NO_CACHE_HEADERS;
use remit_common::{QuoteError, QuoteResponse};
use reqwest::{Client, Url};
use thiserror::Error;

/// Why a single attempt failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The attempt did not finish within its timeout.
    #[error("Request timeout")]
    Timeout,

    /// Connection refused, reset, DNS failure and similar.
    #[error("Failed to fetch: {0}")]
    Network(String),

    /// The endpoint answered with a non-2xx status.
    #[error("{code} - {reason}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Canonical reason phrase, empty when unknown.
        reason: String,
    },

    /// The body was not a quote response.
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl TransportError {
    /// Only timeouts and network failures are worth a retry; an HTTP error
    /// status or a malformed body will not fix itself.
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Timeout | TransportError::Network(_))
    }
}

/// Something that can perform one GET against the quote endpoint.
pub trait QuoteTransport: Send + Sync {
    /// Issues one request to `url` (query string included) and decodes the body.
    fn get_quotes(
        &self,
        url: &Url,
    ) -> impl Future<Output = Result<QuoteResponse, TransportError>> + Send;
}

/// `reqwest`-backed transport used against the real endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a transport with its own connection pool.
    pub fn new() -> Result<Self, QuoteError> {
        let client = Client::builder()
            .build()
            .map_err(|e| QuoteError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(HttpTransport { client })
    }
}

impl QuoteTransport for HttpTransport {
    async fn get_quotes(&self, url: &Url) -> Result<QuoteResponse, TransportError> {
        let mut request = self.client.get(url.clone());
        for (name, value) in NO_CACHE_HEADERS {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.bytes().await.map_err(classify)?;
        debug!("Received {} bytes from {}", body.len(), url.path());
        QuoteResponse::from_json_bytes(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_decode() {
        TransportError::Decode(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeouts_and_network_errors_are_transient() {
        assert!(TransportError::Timeout.is_transient());
        assert!(TransportError::Network("connection refused".into()).is_transient());
        assert!(
            !TransportError::Status {
                code: 502,
                reason: "Bad Gateway".into()
            }
            .is_transient()
        );
        assert!(!TransportError::Decode("expected value".into()).is_transient());
    }

    #[test]
    fn status_error_reads_like_an_api_error() {
        let err = TransportError::Status {
            code: 500,
            reason: "Internal Server Error".into(),
        };
        assert_eq!(
            QuoteError::RequestFailed(err.to_string()).to_string(),
            "API Error: 500 - Internal Server Error"
        );
    }
}
