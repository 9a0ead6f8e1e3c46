//! Last-request-wins coordination between the UI and the quote client.
//!
//! A `QuoteSession` owns the single "current result" slot. Every `submit`
//! starts a new generation, cancels whatever fetch was still running and
//! spawns the new one on the tokio runtime. A finished fetch only writes the
//! slot, and only emits an event, if its generation is still the current one;
//! the check and the write happen under the same lock, so a slow stale
//! response can never overwrite a newer result regardless of completion order.
//!
//! Results are published to the UI over a `crossbeam_channel` so consumers
//! can sit on a plain thread.
use std::sync::{Arc, Mutex};

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error, info};
use remit_common::{QuoteError, QuoteRequest, RankedQuotes, Result};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::client::{FetchPhase, QuoteClient};
use crate::transport::QuoteTransport;

/// What the UI should currently display.
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonState {
    /// Nothing requested yet, or the last request was cancelled.
    Idle,
    /// A fetch is running.
    Loading {
        /// Generation of the running fetch.
        generation: u64,
        /// `true` once the first attempt failed and the retry is pending.
        retrying: bool,
    },
    /// Quotes ranked best first.
    Ready {
        /// Generation that produced the quotes.
        generation: u64,
        /// Ranked quotes.
        quotes: RankedQuotes,
    },
    /// The endpoint had no providers for the request.
    NoProviders {
        /// Generation that came back empty.
        generation: u64,
    },
    /// The fetch failed after its retry.
    Failed {
        /// Generation that failed.
        generation: u64,
        /// Message suitable for display.
        message: String,
    },
}

/// Notifications published to the UI, tagged with the request generation.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A new request became the current one.
    Started {
        /// Generation of the request.
        generation: u64,
        /// The request itself.
        request: QuoteRequest,
    },
    /// The first attempt failed transiently; the retry is scheduled.
    Retrying {
        /// Generation being retried.
        generation: u64,
    },
    /// Ranked quotes for the current request.
    Ready {
        /// Generation of the request.
        generation: u64,
        /// The request the quotes answer.
        request: QuoteRequest,
        /// Ranked quotes.
        quotes: RankedQuotes,
    },
    /// The endpoint had no providers for the current request.
    NoProviders {
        /// Generation of the request.
        generation: u64,
    },
    /// The current request failed.
    Failed {
        /// Generation of the request.
        generation: u64,
        /// Message suitable for display.
        message: String,
    },
}

struct Slot {
    generation: u64,
    state: ComparisonState,
}

type SharedSlot = Arc<Mutex<Slot>>;

struct InFlight {
    // Dropping the sender cancels the fetch.
    _cancel: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Runs comparisons so that only the most recent request is ever shown.
pub struct QuoteSession<T> {
    client: Arc<QuoteClient<T>>,
    slot: SharedSlot,
    events: Sender<SessionEvent>,
    runtime: Handle,
    in_flight: Option<InFlight>,
}

impl<T> QuoteSession<T>
where
    T: QuoteTransport + 'static,
{
    /// Creates a session and the event stream the UI listens on.
    ///
    /// Must be called from within a tokio runtime; fetches are spawned on it.
    pub fn new(client: Arc<QuoteClient<T>>) -> Result<(Self, Receiver<SessionEvent>)> {
        let runtime = Handle::try_current()
            .map_err(|e| QuoteError::Config(format!("quote session needs a tokio runtime: {e}")))?;
        let (events, events_rx) = unbounded();
        let session = QuoteSession {
            client,
            slot: Arc::new(Mutex::new(Slot {
                generation: 0,
                state: ComparisonState::Idle,
            })),
            events,
            runtime,
            in_flight: None,
        };
        Ok((session, events_rx))
    }

    /// Makes `request` the current one and starts fetching it.
    ///
    /// Any fetch still running is cancelled and its outcome discarded.
    /// Returns the generation assigned to the request.
    pub fn submit(&mut self, request: QuoteRequest) -> Result<u64> {
        self.in_flight.take();

        let generation = {
            let mut slot = self.slot.lock()?;
            slot.generation += 1;
            slot.state = ComparisonState::Loading {
                generation: slot.generation,
                retrying: false,
            };
            publish(
                &self.events,
                SessionEvent::Started {
                    generation: slot.generation,
                    request: request.clone(),
                },
            );
            slot.generation
        };
        info!(
            "Comparison #{}: {} KRW to {}",
            generation,
            request.send_amount_krw(),
            request.country()
        );

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let client = Arc::clone(&self.client);
        let slot = Arc::clone(&self.slot);
        let events = self.events.clone();

        let task = self.runtime.spawn(async move {
            let cancelled = async {
                let _ = cancel_rx.await;
            };
            let phase_slot = Arc::clone(&slot);
            let phase_events = events.clone();
            let on_phase = move |phase: FetchPhase| {
                if let FetchPhase::Retrying { .. } = phase {
                    mark_retrying(&phase_slot, &phase_events, generation);
                }
            };
            let outcome = client
                .fetch_quotes_until(&request, cancelled, on_phase)
                .await;
            settle(&slot, &events, generation, request, outcome);
        });

        self.in_flight = Some(InFlight {
            _cancel: cancel_tx,
            task,
        });
        Ok(generation)
    }

    /// Cancels the running fetch, if any, and returns to `Idle`.
    ///
    /// Resolves once the cancelled task has finished, so after this returns
    /// the only event sender left is the session's own.
    pub async fn cancel(&mut self) -> Result<()> {
        {
            let mut slot = self.slot.lock()?;
            slot.generation += 1;
            slot.state = ComparisonState::Idle;
        }
        if let Some(InFlight {
            _cancel: cancel,
            task,
        }) = self.in_flight.take()
        {
            drop(cancel);
            if let Err(e) = task.await {
                error!("Cancelled fetch task failed: {}", e);
            }
        }
        Ok(())
    }

    /// Waits for the current fetch to finish without cancelling it.
    pub async fn wait(&mut self) -> Result<()> {
        if let Some(InFlight {
            _cancel: cancel,
            task,
        }) = self.in_flight.take()
        {
            let joined = task.await;
            drop(cancel);
            joined.map_err(|e| QuoteError::RequestFailed(format!("fetch task failed: {e}")))?;
        }
        Ok(())
    }

    /// Snapshot of what the UI should show.
    pub fn state(&self) -> Result<ComparisonState> {
        Ok(self.slot.lock()?.state.clone())
    }

    /// Generation of the most recent request.
    pub fn current_generation(&self) -> Result<u64> {
        Ok(self.slot.lock()?.generation)
    }
}

fn publish(events: &Sender<SessionEvent>, event: SessionEvent) {
    if let Err(e) = events.send(event) {
        debug!("No listener for session event: {}", e);
    }
}

fn mark_retrying(slot: &SharedSlot, events: &Sender<SessionEvent>, generation: u64) {
    let Ok(mut slot) = slot.lock() else {
        error!("Session slot lock poisoned while marking retry");
        return;
    };
    if slot.generation != generation {
        return;
    }
    slot.state = ComparisonState::Loading {
        generation,
        retrying: true,
    };
    publish(events, SessionEvent::Retrying { generation });
}

fn settle(
    slot: &SharedSlot,
    events: &Sender<SessionEvent>,
    generation: u64,
    request: QuoteRequest,
    outcome: Result<RankedQuotes>,
) {
    let Ok(mut slot) = slot.lock() else {
        error!("Session slot lock poisoned, dropping result of #{}", generation);
        return;
    };
    if slot.generation != generation {
        debug!(
            "Dropping result of #{} superseded by #{}",
            generation, slot.generation
        );
        return;
    }

    let event = match outcome {
        Ok(quotes) => {
            slot.state = ComparisonState::Ready {
                generation,
                quotes: quotes.clone(),
            };
            SessionEvent::Ready {
                generation,
                request,
                quotes,
            }
        }
        Err(QuoteError::NoProvidersAvailable) => {
            slot.state = ComparisonState::NoProviders { generation };
            SessionEvent::NoProviders { generation }
        }
        Err(err) if !err.is_user_visible() => {
            debug!("Comparison #{} ended silently: {}", generation, err);
            return;
        }
        Err(err) => {
            let message = err.to_string();
            slot.state = ComparisonState::Failed {
                generation,
                message: message.clone(),
            };
            SessionEvent::Failed {
                generation,
                message,
            }
        }
    };
    publish(events, event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use remit_common::{Country, Quote};

    fn slot_at(generation: u64) -> SharedSlot {
        Arc::new(Mutex::new(Slot {
            generation,
            state: ComparisonState::Loading {
                generation,
                retrying: false,
            },
        }))
    }

    fn ranked(provider: &str) -> RankedQuotes {
        RankedQuotes::rank(vec![Quote {
            provider: provider.to_string(),
            exchange_rate: 18.5,
            fee: 3000.0,
            recipient_gets: 18_425_000.0,
            link: "https://a".to_string(),
        }])
    }

    fn request() -> QuoteRequest {
        QuoteRequest::new(1_000_000, Country::Vietnam).unwrap()
    }

    #[test]
    fn stale_result_is_dropped() {
        let slot = slot_at(2);
        let (tx, rx) = unbounded();

        settle(&slot, &tx, 1, request(), Ok(ranked("Stale")));

        assert!(rx.try_recv().is_err());
        assert_eq!(
            slot.lock().unwrap().state,
            ComparisonState::Loading {
                generation: 2,
                retrying: false
            }
        );
    }

    #[test]
    fn current_result_is_published() {
        let slot = slot_at(3);
        let (tx, rx) = unbounded();

        settle(&slot, &tx, 3, request(), Ok(ranked("Fresh")));

        match rx.try_recv().unwrap() {
            SessionEvent::Ready {
                generation, quotes, ..
            } => {
                assert_eq!(generation, 3);
                assert_eq!(quotes.best().unwrap().provider, "Fresh");
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(matches!(
            slot.lock().unwrap().state,
            ComparisonState::Ready { generation: 3, .. }
        ));
    }

    #[test]
    fn cancellation_is_silent() {
        let slot = slot_at(1);
        let (tx, rx) = unbounded();

        settle(&slot, &tx, 1, request(), Err(QuoteError::Cancelled));

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn empty_and_failed_outcomes_are_distinct() {
        let slot = slot_at(1);
        let (tx, rx) = unbounded();
        settle(&slot, &tx, 1, request(), Err(QuoteError::NoProvidersAvailable));
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::NoProviders { generation: 1 });

        settle(
            &slot,
            &tx,
            1,
            request(),
            Err(QuoteError::RequestFailed("Request timeout".into())),
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Failed {
                generation: 1,
                message: "API Error: Request timeout".into()
            }
        );
    }

    #[test]
    fn retry_flag_only_for_current_generation() {
        let slot = slot_at(2);
        let (tx, rx) = unbounded();

        mark_retrying(&slot, &tx, 1);
        assert!(rx.try_recv().is_err());

        mark_retrying(&slot, &tx, 2);
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Retrying { generation: 2 });
        assert_eq!(
            slot.lock().unwrap().state,
            ComparisonState::Loading {
                generation: 2,
                retrying: true
            }
        );
    }
}
