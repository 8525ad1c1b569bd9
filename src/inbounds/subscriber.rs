//--------------------------------------------------------------------------------------------------
// STRUCTS & TRAITS
//--------------------------------------------------------------------------------------------------
// | Name              | Description                                      | Key Methods         |
// |-------------------|--------------------------------------------------|---------------------|
// | Delivery          | One message pulled from a queue                  |                     |
// | MessageSource     | Pull + settle side of a broker queue             | next_delivery, ack, |
// |                   |                                                  | nack, close         |
// | Settlement        | Ack or requeue, decided from a handler outcome   | for_outcome         |
// | Subscriber        | Consume loop binding a source to a handler       | subscribe           |
// | SubscriptionStats | Counters of one finished consume loop            |                     |
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use async_trait::async_trait;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::handlers::EventHandler;
use crate::domain::{error::CatalogError, events::Headers};

/// A message handed out by a `MessageSource`, awaiting settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub tag: u64,
    pub payload: Vec<u8>,
    pub headers: Headers,
    pub redelivered: bool,
}

/// Consuming side of one broker queue.
///
/// `next_delivery` must be cancel safe: dropping its future before it resolves
/// must not lose a message.
#[async_trait]
pub trait MessageSource: Send {
    fn queue_name(&self) -> &str;

    /// Waits for the next message. `None` means the channel is closed.
    async fn next_delivery(&mut self) -> Option<Delivery>;

    /// Removes the message from the queue for good.
    ///
    /// # Errors
    /// * `CatalogError::Transport` - the broker did not take the acknowledgement
    async fn ack(&mut self, delivery: &Delivery) -> Result<(), CatalogError>;

    /// Hands the message back, for redelivery when `requeue` is set.
    ///
    /// # Errors
    /// * `CatalogError::Transport` - the broker did not take the rejection
    async fn nack(&mut self, delivery: &Delivery, requeue: bool) -> Result<(), CatalogError>;

    /// Releases the underlying channel
    async fn close(&mut self) -> Result<(), CatalogError> {
        Ok(())
    }
}

/// What happens to a message once its handler returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Remove the message
    Ack,
    /// Offer the message again
    Requeue,
}

impl Settlement {
    /// Success and poison messages are acknowledged, every other failure is requeued.
    pub fn for_outcome(outcome: &Result<(), CatalogError>) -> Self {
        match outcome {
            Ok(()) => Settlement::Ack,
            Err(err) if err.is_poison() => Settlement::Ack,
            Err(_) => Settlement::Requeue,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscriptionStats {
    pub processed: usize,
    pub discarded: usize,
    pub requeued: usize,
}

/// Consume loop of a single queue.
pub struct Subscriber<S> {
    source: S,
}

impl<S: MessageSource> Subscriber<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Pulls messages, runs the handler and settles each message.
    ///
    /// # Flow
    ///
    /// 1. Waits for the next delivery, or for the token to be cancelled
    /// 2. Runs the handler to completion, even if cancellation arrives meanwhile
    /// 3. Acks on success or `MalformedPayload`, nacks with requeue otherwise
    /// 4. Stops when the channel closes or the token is cancelled, then closes the source
    ///
    /// # Errors
    /// Returns `CatalogError::Transport` when a message cannot be settled. The
    /// loop cannot continue safely after that.
    pub async fn subscribe(
        mut self,
        handler: Arc<dyn EventHandler>,
        cancel: CancellationToken,
    ) -> Result<SubscriptionStats, CatalogError> {
        let queue = self.source.queue_name().to_owned();
        let kind = handler.event_kind();
        info!(queue = %queue, kind = %kind, "subscription started");

        let mut stats = SubscriptionStats::default();

        let result = loop {
            let next = select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(queue = %queue, "subscription cancelled");
                    break Ok(());
                }
                next = self.source.next_delivery() => next,
            };

            let Some(delivery) = next else {
                info!(queue = %queue, "message channel closed");
                break Ok(());
            };

            debug!(
                queue = %queue,
                tag = delivery.tag,
                redelivered = delivery.redelivered,
                "message received"
            );

            let outcome = handler.handle(&delivery.payload, &delivery.headers).await;

            let settled = match Settlement::for_outcome(&outcome) {
                Settlement::Ack => {
                    match &outcome {
                        Ok(()) => stats.processed += 1,
                        Err(err) => {
                            warn!(queue = %queue, tag = delivery.tag, "discarding poison message: {}", err);
                            stats.discarded += 1;
                        }
                    }
                    self.source.ack(&delivery).await
                }
                Settlement::Requeue => {
                    if let Err(err) = &outcome {
                        warn!(queue = %queue, tag = delivery.tag, "requeueing message: {}", err);
                    }
                    stats.requeued += 1;
                    self.source.nack(&delivery, true).await
                }
            };

            if let Err(err) = settled {
                error!(queue = %queue, tag = delivery.tag, "cannot settle message: {}", err);
                break Err(err);
            }
        };

        if let Err(err) = self.source.close().await {
            warn!(queue = %queue, "error while closing source: {}", err);
        }

        info!(
            queue = %queue,
            processed = stats.processed,
            discarded = stats.discarded,
            requeued = stats.requeued,
            "subscription stopped"
        );
        result.map(|_| stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::EventKind;
    use std::collections::VecDeque;
    use std::time::Duration;

    #[derive(Default)]
    struct ScriptedSource {
        deliveries: VecDeque<Delivery>,
        fail_ack: bool,
        hang_when_empty: bool,
    }

    impl ScriptedSource {
        fn with_payloads(payloads: &[&[u8]]) -> Self {
            let deliveries = payloads
                .iter()
                .enumerate()
                .map(|(i, payload)| Delivery {
                    tag: i as u64 + 1,
                    payload: payload.to_vec(),
                    headers: Headers::new(),
                    redelivered: false,
                })
                .collect();
            Self {
                deliveries,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl MessageSource for ScriptedSource {
        fn queue_name(&self) -> &str {
            "scripted"
        }

        async fn next_delivery(&mut self) -> Option<Delivery> {
            match self.deliveries.pop_front() {
                Some(delivery) => Some(delivery),
                None if self.hang_when_empty => std::future::pending().await,
                None => None,
            }
        }

        async fn ack(&mut self, delivery: &Delivery) -> Result<(), CatalogError> {
            if self.fail_ack {
                return Err(CatalogError::Transport(format!("cannot ack {}", delivery.tag)));
            }
            Ok(())
        }

        async fn nack(&mut self, _delivery: &Delivery, requeue: bool) -> Result<(), CatalogError> {
            assert!(requeue);
            Ok(())
        }
    }

    /// Succeeds on "ok", fails as poison on "poison", transiently on anything else.
    struct ByPayload;

    #[async_trait]
    impl EventHandler for ByPayload {
        fn event_kind(&self) -> EventKind {
            EventKind::ArtistSubscribed
        }

        async fn handle(&self, payload: &[u8], _headers: &Headers) -> Result<(), CatalogError> {
            match payload {
                b"ok" => Ok(()),
                b"poison" => Err(CatalogError::MalformedPayload("bad".into())),
                _ => Err(CatalogError::Persistence("store down".into())),
            }
        }
    }

    #[test]
    fn settlement_policy() {
        assert_eq!(Settlement::for_outcome(&Ok(())), Settlement::Ack);
        assert_eq!(
            Settlement::for_outcome(&Err(CatalogError::MalformedPayload("x".into()))),
            Settlement::Ack
        );
        assert_eq!(
            Settlement::for_outcome(&Err(CatalogError::not_found("album", "a"))),
            Settlement::Requeue
        );
        assert_eq!(
            Settlement::for_outcome(&Err(CatalogError::Persistence("x".into()))),
            Settlement::Requeue
        );
    }

    #[tokio::test]
    async fn settles_each_message_by_outcome() {
        let source = ScriptedSource::with_payloads(&[b"ok", b"poison", b"flaky"]);

        let stats = Subscriber::new(source)
            .subscribe(Arc::new(ByPayload), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            stats,
            SubscriptionStats {
                processed: 1,
                discarded: 1,
                requeued: 1
            }
        );
    }

    #[tokio::test]
    async fn failed_ack_is_fatal() {
        let mut source = ScriptedSource::with_payloads(&[b"ok", b"ok"]);
        source.fail_ack = true;

        let err = Subscriber::new(source)
            .subscribe(Arc::new(ByPayload), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_)));
    }

    #[tokio::test]
    async fn cancellation_stops_an_idle_loop() {
        let mut source = ScriptedSource::with_payloads(&[b"ok"]);
        source.hang_when_empty = true;

        let token = CancellationToken::new();
        let task = tokio::spawn(
            Subscriber::new(source).subscribe(Arc::new(ByPayload), token.clone()),
        );

        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();

        let stats = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(stats.processed, 1);
    }
}
