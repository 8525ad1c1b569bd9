//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name            | Description                                      | Key Methods         |
// |-----------------|--------------------------------------------------|---------------------|
// | PendingEvent    | Event whose publish failed after its write       |                     |
// | Outbox          | FIFO of pending events                           | park, len, pending  |
// | OutboxRelay     | Retries pending events until the broker takes    | flush, run, spawn   |
// |                 | them                                             |                     |
//--------------------------------------------------------------------------------------------------

use std::{collections::VecDeque, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{select, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::publisher::EventPublisher;
use crate::domain::{error::CatalogError, events::EventMessage};

/// An event that was committed on the write side but not yet accepted by the broker.
#[derive(Debug, Clone)]
pub struct PendingEvent {
    pub event: EventMessage,
    pub routing_key: String,
    pub attempts: u32,
    pub last_error: String,
}

/// Events waiting to be published, in commit order.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Mutex<VecDeque<PendingEvent>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks an event after its first publish attempt failed
    pub fn park(&self, event: EventMessage, routing_key: &str, error: &CatalogError) {
        warn!(
            routing_key,
            event_id = event.event_id().unwrap_or_default(),
            "parking event in outbox: {}",
            error
        );
        self.pending.lock().push_back(PendingEvent {
            event,
            routing_key: routing_key.to_owned(),
            attempts: 1,
            last_error: error.to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Copies of the pending events, oldest first
    pub fn pending(&self) -> Vec<PendingEvent> {
        self.pending.lock().iter().cloned().collect()
    }

    fn pop_front(&self) -> Option<PendingEvent> {
        self.pending.lock().pop_front()
    }

    fn push_front(&self, pending: PendingEvent) {
        self.pending.lock().push_front(pending);
    }
}

/// Background task draining the outbox.
pub struct OutboxRelay {
    outbox: Arc<Outbox>,
    publisher: Arc<dyn EventPublisher>,
    interval: Duration,
}

impl OutboxRelay {
    pub fn new(outbox: Arc<Outbox>, publisher: Arc<dyn EventPublisher>, interval: Duration) -> Self {
        Self {
            outbox,
            publisher,
            interval,
        }
    }

    /// Publishes pending events in order until one fails or the outbox is empty.
    ///
    /// # Returns
    /// How many events the broker accepted during this pass
    pub async fn flush(&self) -> usize {
        let mut published = 0;

        while let Some(mut pending) = self.outbox.pop_front() {
            match self
                .publisher
                .publish(&pending.event, &pending.routing_key)
                .await
            {
                Ok(()) => {
                    info!(
                        routing_key = %pending.routing_key,
                        attempts = pending.attempts + 1,
                        "outbox event published"
                    );
                    published += 1;
                }
                Err(err) => {
                    pending.attempts += 1;
                    pending.last_error = err.to_string();
                    debug!(
                        routing_key = %pending.routing_key,
                        attempts = pending.attempts,
                        "outbox publish still failing: {}",
                        err
                    );
                    self.outbox.push_front(pending);
                    break;
                }
            }
        }

        published
    }

    /// Flushes on every tick until the token is cancelled.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            select! {
                _ = cancel.cancelled() => {
                    info!(pending = self.outbox.len(), "outbox relay stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if !self.outbox.is_empty() {
                        self.flush().await;
                    }
                }
            }
        }
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
