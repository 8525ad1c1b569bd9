//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Process-local topic broker with the same delivery contract as the RabbitMQ transport:
// routing-key bindings fan a published message out to queues, consumers pull deliveries and
// settle them with ack (gone for good) or nack (requeued at the head, flagged as redelivered,
// or discarded without requeue). Messages a consumer still holds when it closes or is dropped
// go back to the head of the queue as redelivered.
//
// | Component            | Description                                                   |
// |----------------------|---------------------------------------------------------------|
// | InMemoryBroker       | Cloneable handle: bindings, publishing, queue inspection      |
// | MemorySubscription   | One consumer of one queue, implements MessageSource           |
//--------------------------------------------------------------------------------------------------

use std::{
    collections::{BTreeSet, HashMap, VecDeque},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::Notify;
use tracing::{debug, info};

use crate::{
    domain::{
        error::CatalogError,
        events::{EventMessage, Headers},
        services::publisher::EventPublisher,
    },
    inbounds::subscriber::{Delivery, MessageSource},
};

#[derive(Debug, Clone)]
struct Envelope {
    payload: Vec<u8>,
    headers: Headers,
    redelivered: bool,
}

#[derive(Debug, Default)]
struct MemoryQueue {
    ready: Mutex<VecDeque<Envelope>>,
    unacked: Mutex<HashMap<u64, Envelope>>,
    notify: Notify,
    acked: AtomicUsize,
    discarded: AtomicUsize,
}

impl MemoryQueue {
    fn push_back(&self, envelope: Envelope) {
        self.ready.lock().push_back(envelope);
        self.notify.notify_one();
    }

    fn push_front(&self, envelope: Envelope) {
        self.ready.lock().push_front(envelope);
        self.notify.notify_one();
    }
}

#[derive(Debug, Default)]
struct BrokerState {
    bindings: RwLock<HashMap<String, Vec<String>>>,
    queues: RwLock<HashMap<String, Arc<MemoryQueue>>>,
    next_tag: AtomicU64,
    offline: AtomicBool,
    closed: AtomicBool,
    closing: Notify,
}

/// Handle to a process-local broker. Clones share the same queues.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBroker {
    state: Arc<BrokerState>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self, name: &str) -> Arc<MemoryQueue> {
        if let Some(queue) = self.state.queues.read().get(name) {
            return queue.clone();
        }
        self.state
            .queues
            .write()
            .entry(name.to_owned())
            .or_default()
            .clone()
    }

    /// Declares `queue` (if needed) and routes `routing_key` to it
    pub fn bind(&self, queue: &str, routing_key: &str) {
        self.queue(queue);
        let mut bindings = self.state.bindings.write();
        let queues = bindings.entry(routing_key.to_owned()).or_default();
        if !queues.iter().any(|bound| bound == queue) {
            queues.push(queue.to_owned());
        }
        debug!(queue, routing_key, "queue bound");
    }

    /// Opens a consumer on `queue`, declaring it if needed
    pub fn subscription(&self, queue: &str) -> MemorySubscription {
        MemorySubscription {
            name: queue.to_owned(),
            queue: self.queue(queue),
            state: self.state.clone(),
            in_flight: BTreeSet::new(),
        }
    }

    /// Delivers raw bytes to every queue bound to `routing_key`.
    ///
    /// # Returns
    /// The number of queues the message was routed to
    pub fn route(&self, routing_key: &str, payload: Vec<u8>, headers: Headers) -> usize {
        let targets: Vec<Arc<MemoryQueue>> = {
            let bindings = self.state.bindings.read();
            let queues = self.state.queues.read();
            bindings
                .get(routing_key)
                .into_iter()
                .flatten()
                .filter_map(|name| queues.get(name).cloned())
                .collect()
        };

        for queue in &targets {
            queue.push_back(Envelope {
                payload: payload.clone(),
                headers: headers.clone(),
                redelivered: false,
            });
        }

        if targets.is_empty() {
            debug!(routing_key, "message unroutable, dropped");
        }
        targets.len()
    }

    /// While offline every publish fails with `CatalogError::Transport`
    pub fn set_offline(&self, offline: bool) {
        self.state.offline.store(offline, Ordering::SeqCst);
    }

    /// Closes the broker: every consumer sees its channel end.
    pub fn close(&self) {
        self.state.closed.store(true, Ordering::SeqCst);
        self.state.closing.notify_waiters();
        info!("in-memory broker closed");
    }

    /// Messages waiting for a consumer
    pub fn queue_depth(&self, queue: &str) -> usize {
        self.queue(queue).ready.lock().len()
    }

    /// Messages handed to a consumer and not settled yet
    pub fn unacked_count(&self, queue: &str) -> usize {
        self.queue(queue).unacked.lock().len()
    }

    pub fn acked_count(&self, queue: &str) -> usize {
        self.queue(queue).acked.load(Ordering::SeqCst)
    }

    /// Messages rejected without requeue
    pub fn discarded_count(&self, queue: &str) -> usize {
        self.queue(queue).discarded.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventPublisher for InMemoryBroker {
    async fn publish(&self, event: &EventMessage, routing_key: &str) -> Result<(), CatalogError> {
        if self.state.offline.load(Ordering::SeqCst) || self.state.closed.load(Ordering::SeqCst) {
            return Err(CatalogError::Transport("broker unreachable".to_owned()));
        }
        self.route(routing_key, event.payload.clone(), event.headers.clone());
        Ok(())
    }
}

/// One consumer of an in-memory queue.
pub struct MemorySubscription {
    name: String,
    queue: Arc<MemoryQueue>,
    state: Arc<BrokerState>,
    in_flight: BTreeSet<u64>,
}

impl MemorySubscription {
    fn settle(&mut self, delivery: &Delivery) -> Result<Envelope, CatalogError> {
        if !self.in_flight.remove(&delivery.tag) {
            return Err(CatalogError::Transport(format!(
                "unknown delivery tag {}",
                delivery.tag
            )));
        }
        self.queue.unacked.lock().remove(&delivery.tag).ok_or_else(|| {
            CatalogError::Transport(format!("unknown delivery tag {}", delivery.tag))
        })
    }

    /// Requeues every message this consumer holds, oldest at the head
    fn release(&mut self) -> usize {
        let tags = std::mem::take(&mut self.in_flight);
        let mut released = 0;
        let mut unacked = self.queue.unacked.lock();
        for tag in tags.into_iter().rev() {
            if let Some(mut envelope) = unacked.remove(&tag) {
                envelope.redelivered = true;
                self.queue.push_front(envelope);
                released += 1;
            }
        }
        if released > 0 {
            debug!(queue = %self.name, released, "unsettled messages requeued");
        }
        released
    }
}

impl Drop for MemorySubscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[async_trait]
impl MessageSource for MemorySubscription {
    fn queue_name(&self) -> &str {
        &self.name
    }

    async fn next_delivery(&mut self) -> Option<Delivery> {
        // a requeued message is ready again at once; let other consumers run first
        tokio::task::yield_now().await;

        loop {
            let notified = self.queue.notify.notified();
            let closing = self.state.closing.notified();
            tokio::pin!(notified, closing);
            notified.as_mut().enable();
            closing.as_mut().enable();

            if self.state.closed.load(Ordering::SeqCst) {
                return None;
            }

            let next = self.queue.ready.lock().pop_front();
            if let Some(envelope) = next {
                let tag = self.state.next_tag.fetch_add(1, Ordering::SeqCst) + 1;
                let delivery = Delivery {
                    tag,
                    payload: envelope.payload.clone(),
                    headers: envelope.headers.clone(),
                    redelivered: envelope.redelivered,
                };
                self.queue.unacked.lock().insert(tag, envelope);
                self.in_flight.insert(tag);
                return Some(delivery);
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = &mut closing => {}
            }
        }
    }

    async fn ack(&mut self, delivery: &Delivery) -> Result<(), CatalogError> {
        self.settle(delivery)?;
        self.queue.acked.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn nack(&mut self, delivery: &Delivery, requeue: bool) -> Result<(), CatalogError> {
        let mut envelope = self.settle(delivery)?;
        if requeue {
            envelope.redelivered = true;
            self.queue.push_front(envelope);
        } else {
            self.queue.discarded.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), CatalogError> {
        self.release();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn headers() -> Headers {
        Headers::new()
    }

    #[tokio::test]
    async fn routes_only_to_bound_queues() {
        let broker = InMemoryBroker::new();
        broker.bind("artist.subscribed", "ARTIST_SUBSCRIBED");
        broker.bind("album.published", "ALBUM_PUBLISHED");

        assert_eq!(broker.route("ARTIST_SUBSCRIBED", b"a".to_vec(), headers()), 1);
        assert_eq!(broker.route("SONG_DELETED", b"x".to_vec(), headers()), 0);

        assert_eq!(broker.queue_depth("artist.subscribed"), 1);
        assert_eq!(broker.queue_depth("album.published"), 0);
    }

    #[tokio::test]
    async fn ack_removes_and_nack_redelivers() {
        let broker = InMemoryBroker::new();
        broker.bind("q", "K");
        broker.route("K", b"m".to_vec(), headers());
        let mut sub = broker.subscription("q");

        let first = sub.next_delivery().await.unwrap();
        assert!(!first.redelivered);
        assert_eq!(broker.unacked_count("q"), 1);

        sub.nack(&first, true).await.unwrap();
        let second = sub.next_delivery().await.unwrap();
        assert!(second.redelivered);
        assert_eq!(second.payload, first.payload);
        assert_ne!(second.tag, first.tag);

        sub.ack(&second).await.unwrap();
        assert_eq!(broker.queue_depth("q"), 0);
        assert_eq!(broker.unacked_count("q"), 0);
        assert_eq!(broker.acked_count("q"), 1);
    }

    #[tokio::test]
    async fn settling_twice_is_a_transport_error() {
        let broker = InMemoryBroker::new();
        broker.bind("q", "K");
        broker.route("K", b"m".to_vec(), headers());
        let mut sub = broker.subscription("q");

        let delivery = sub.next_delivery().await.unwrap();
        sub.ack(&delivery).await.unwrap();
        let err = sub.ack(&delivery).await.unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_)));
    }

    #[tokio::test]
    async fn waiting_consumer_wakes_on_publish() {
        let broker = InMemoryBroker::new();
        broker.bind("q", "K");
        let mut sub = broker.subscription("q");

        let publisher = broker.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            publisher.route("K", b"late".to_vec(), Headers::new());
        });

        let delivery = tokio::time::timeout(Duration::from_secs(1), sub.next_delivery())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(delivery.payload, b"late");
    }

    #[tokio::test]
    async fn close_ends_waiting_consumers() {
        let broker = InMemoryBroker::new();
        let mut sub = broker.subscription("q");

        let closer = broker.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            closer.close();
        });

        let next = tokio::time::timeout(Duration::from_secs(1), sub.next_delivery())
            .await
            .unwrap();
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn offline_broker_rejects_publish() {
        let broker = InMemoryBroker::new();
        broker.set_offline(true);
        let event = EventMessage::encode(&crate::domain::events::SongPlayed {
            song_id: uuid::Uuid::new_v4(),
        })
        .unwrap();

        let err = broker.publish(&event, event.routing_key()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_)));
    }

    #[tokio::test]
    async fn dropped_consumer_hands_back_unsettled_messages() {
        let broker = InMemoryBroker::new();
        broker.bind("q", "K");
        broker.route("K", b"first".to_vec(), headers());
        broker.route("K", b"second".to_vec(), headers());

        let mut sub = broker.subscription("q");
        sub.next_delivery().await.unwrap();
        sub.next_delivery().await.unwrap();
        assert_eq!(broker.unacked_count("q"), 2);
        drop(sub);

        assert_eq!(broker.unacked_count("q"), 0);
        assert_eq!(broker.queue_depth("q"), 2);

        let mut next = broker.subscription("q");
        let first = next.next_delivery().await.unwrap();
        assert_eq!(first.payload, b"first");
        assert!(first.redelivered);
    }

    #[tokio::test]
    async fn close_requeues_only_this_consumers_messages() {
        let broker = InMemoryBroker::new();
        broker.bind("q", "K");
        broker.route("K", b"a".to_vec(), headers());
        broker.route("K", b"b".to_vec(), headers());

        let mut mine = broker.subscription("q");
        let mut other = broker.subscription("q");
        mine.next_delivery().await.unwrap();
        let held = other.next_delivery().await.unwrap();

        mine.close().await.unwrap();
        assert_eq!(broker.queue_depth("q"), 1);
        assert_eq!(broker.unacked_count("q"), 1);

        other.ack(&held).await.unwrap();
        assert_eq!(broker.acked_count("q"), 1);
    }
}
