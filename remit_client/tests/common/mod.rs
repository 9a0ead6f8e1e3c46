#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use remit_client::{QuoteTransport, TransportError};
use remit_common::{ClientConfig, Quote, QuoteResponse};
use reqwest::Url;

/// What the fake endpoint does for one call.
pub struct Step {
    pub delay: Duration,
    pub result: Result<QuoteResponse, TransportError>,
}

impl Step {
    pub fn ok(quotes: Vec<Quote>) -> Self {
        Step {
            delay: Duration::from_millis(50),
            result: Ok(QuoteResponse::new(quotes)),
        }
    }

    pub fn err(error: TransportError) -> Self {
        Step {
            delay: Duration::from_millis(50),
            result: Err(error),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Script = Box<dyn Fn(usize, &Url) -> Step + Send + Sync>;

/// Transport answering from a script keyed by call index and URL.
pub struct ScriptedTransport {
    script: Script,
    calls: Arc<Mutex<Vec<Url>>>,
}

impl ScriptedTransport {
    pub fn new(script: impl Fn(usize, &Url) -> Step + Send + Sync + 'static) -> Self {
        ScriptedTransport {
            script: Box::new(script),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answers the calls in order; calls beyond the list get an empty response.
    pub fn sequence(steps: Vec<Step>) -> Self {
        let steps = Mutex::new(steps.into_iter().map(Some).collect::<Vec<_>>());
        ScriptedTransport::new(move |index, _| {
            steps
                .lock()
                .unwrap()
                .get_mut(index)
                .and_then(Option::take)
                .unwrap_or_else(|| Step::ok(vec![]))
        })
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<Url>>> {
        Arc::clone(&self.calls)
    }
}

impl QuoteTransport for ScriptedTransport {
    async fn get_quotes(&self, url: &Url) -> Result<QuoteResponse, TransportError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(url.clone());
            calls.len() - 1
        };
        let step = (self.script)(index, url);
        tokio::time::sleep(step.delay).await;
        step.result
    }
}

pub fn quote(provider: &str, exchange_rate: f64, fee: f64, recipient_gets: f64) -> Quote {
    Quote {
        provider: provider.to_string(),
        exchange_rate,
        fee,
        recipient_gets,
        link: format!("https://{}", provider.to_lowercase()),
    }
}

pub fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

pub fn test_config() -> ClientConfig {
    ClientConfig::with_base_url("http://quotes.test").unwrap()
}

pub fn call_count(calls: &Arc<Mutex<Vec<Url>>>) -> usize {
    calls.lock().unwrap().len()
}
