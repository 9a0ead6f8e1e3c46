//! Quote client: one validated request in, a best-first quote list out.
//!
//! Every fetch follows the same path:
//! 1. build the endpoint URL with a fresh cache-buster,
//! 2. run the first attempt under `first_attempt_timeout`,
//! 3. on a transient failure (timeout, network) wait `retry_backoff` and
//!    retry exactly once under the longer `retry_timeout`,
//! 4. rank the quotes by `recipient_gets`, or report why there are none.
//!
//! Cancellation is cooperative: `fetch_quotes_until` races the whole fetch,
//! backoff included, against a caller-supplied future and drops the in-flight
//! request when that future completes first.
use std::future::Future;
use std::time::Duration;

use log::{debug, error, info, warn};
use remit_common::request::cache_buster;
use remit_common::{
    ClientConfig, Country, FetchMode, Quote, QuoteError, QuoteRequest, QuoteResponse,
    RankedQuotes, Result,
};
use reqwest::Url;
use tokio::time::{sleep, timeout};

use crate::transport::{QuoteTransport, TransportError};

/// Progress of a fetch, reported to observers as it moves along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    /// An attempt is on the wire. `attempt` is 1 or 2.
    Fetching {
        /// Attempt number, starting at 1.
        attempt: u8,
    },
    /// The first attempt failed transiently; the retry starts after `backoff`.
    Retrying {
        /// Pause before the retry.
        backoff: Duration,
    },
}

/// Fetches and ranks provider quotes through a `QuoteTransport`.
pub struct QuoteClient<T> {
    transport: T,
    config: ClientConfig,
}

impl<T: QuoteTransport> QuoteClient<T> {
    /// Creates a client over `transport` with explicit configuration.
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Validates the input and fetches quotes for it.
    ///
    /// Out-of-range amounts come back as `InvalidRequest` without touching
    /// the transport.
    pub async fn compare(&self, send_amount_krw: u64, country: Country) -> Result<RankedQuotes> {
        let request = QuoteRequest::new(send_amount_krw, country)?;
        self.fetch_quotes(&request).await
    }

    /// Fetches quotes for `request`, best first.
    pub async fn fetch_quotes(&self, request: &QuoteRequest) -> Result<RankedQuotes> {
        self.fetch_quotes_observed(request, |_| {}).await
    }

    /// Like `fetch_quotes`, reporting each `FetchPhase` to `on_phase`.
    pub async fn fetch_quotes_observed(
        &self,
        request: &QuoteRequest,
        mut on_phase: impl FnMut(FetchPhase),
    ) -> Result<RankedQuotes> {
        let quotes = self.fetch_with_retry(request, &mut on_phase).await?;
        if quotes.is_empty() {
            info!(
                "No providers for {} KRW to {}",
                request.send_amount_krw(),
                request.country()
            );
            return Err(QuoteError::NoProvidersAvailable);
        }
        let ranked = RankedQuotes::rank(quotes);
        if let Some(best) = ranked.best() {
            info!(
                "{} quotes for {} KRW to {}, best: {} ({} {})",
                ranked.len(),
                request.send_amount_krw(),
                request.country(),
                best.provider,
                best.recipient_gets,
                request.currency()
            );
        }
        Ok(ranked)
    }

    /// Fetches quotes unless `cancel` completes first, in which case the
    /// in-flight request is dropped and `QuoteError::Cancelled` is returned.
    pub async fn fetch_quotes_until<C>(
        &self,
        request: &QuoteRequest,
        cancel: C,
        on_phase: impl FnMut(FetchPhase),
    ) -> Result<RankedQuotes>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                debug!("Fetch for {} KRW to {} cancelled", request.send_amount_krw(), request.country());
                Err(QuoteError::Cancelled)
            }
            result = self.fetch_quotes_observed(request, on_phase) => result,
        }
    }

    /// Fetches the fast provider batch, then gives the slow batch a short
    /// window to join.
    ///
    /// `on_update` sees the ranking after the fast batch and again after a
    /// merge. A late or failing slow batch keeps the fast result.
    pub async fn fetch_staged(
        &self,
        request: &QuoteRequest,
        mut on_update: impl FnMut(&RankedQuotes),
    ) -> Result<RankedQuotes> {
        let fast = self
            .fetch_with_retry(&request.with_mode(FetchMode::Fast), &mut |_: FetchPhase| {})
            .await?;
        let mut ranked = RankedQuotes::rank(fast);
        if !ranked.is_empty() {
            on_update(&ranked);
        }

        let slow_url = self.request_url(&request.with_mode(FetchMode::Slow))?;
        match self
            .attempt(&slow_url, self.config.slow_batch_timeout, 1)
            .await
        {
            Ok(slow) if slow.is_empty() => debug!("Slow batch returned no providers"),
            Ok(slow) => {
                debug!("Merging {} quotes from the slow batch", slow.len());
                ranked.merge(slow);
                on_update(&ranked);
            }
            Err(err) => warn!("Slow provider batch skipped: {}", err),
        }

        if ranked.is_empty() {
            return Err(QuoteError::NoProvidersAvailable);
        }
        Ok(ranked)
    }

    async fn fetch_with_retry(
        &self,
        request: &QuoteRequest,
        on_phase: &mut impl FnMut(FetchPhase),
    ) -> Result<Vec<Quote>> {
        on_phase(FetchPhase::Fetching { attempt: 1 });
        let url = self.request_url(request)?;
        let first_error = match self
            .attempt(&url, self.config.first_attempt_timeout, 1)
            .await
        {
            Ok(quotes) => return Ok(quotes),
            Err(err) if err.is_transient() => err,
            Err(err) => {
                error!("Quote request failed: {}", err);
                return Err(QuoteError::RequestFailed(err.to_string()));
            }
        };

        let backoff = self.config.retry_backoff;
        warn!(
            "Quote request failed ({}), retrying once in {:?}",
            first_error, backoff
        );
        on_phase(FetchPhase::Retrying { backoff });
        sleep(backoff).await;

        on_phase(FetchPhase::Fetching { attempt: 2 });
        let url = self.request_url(request)?;
        self.attempt(&url, self.config.retry_timeout, 2)
            .await
            .map_err(|err| {
                error!("Quote request failed after retry: {}", err);
                QuoteError::RequestFailed(err.to_string())
            })
    }

    async fn attempt(
        &self,
        url: &Url,
        limit: Duration,
        attempt: u8,
    ) -> std::result::Result<Vec<Quote>, TransportError> {
        info!("Quote request attempt {} (timeout {:?}): {}", attempt, limit, url);
        match timeout(limit, self.transport.get_quotes(url)).await {
            Ok(response) => response.map(QuoteResponse::into_quotes),
            Err(_) => Err(TransportError::Timeout),
        }
    }

    fn request_url(&self, request: &QuoteRequest) -> Result<Url> {
        let mut url = self.config.quote_url()?;
        url.query_pairs_mut()
            .extend_pairs(request.query_pairs(cache_buster()));
        Ok(url)
    }
}
