use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::{
    handlers::EventHandler,
    subscriber::{MessageSource, Subscriber, SubscriptionStats},
};
use crate::domain::error::CatalogError;

type LoopResult = Result<SubscriptionStats, CatalogError>;

/// Runs one subscriber task per queue.
///
/// The loops share nothing but a cancellation token. Shutting down cancels the
/// token and waits until every loop has settled its in-flight message.
///
/// Any loop that ends, whether by error, closed channel or panic, trips the
/// `stopped` signal so a supervisor can react before shutdown was requested.
pub struct ProjectionWorker {
    cancel: CancellationToken,
    stopped: CancellationToken,
    loops: Vec<(String, JoinHandle<LoopResult>)>,
}

impl Default for ProjectionWorker {
    fn default() -> Self {
        Self::new(CancellationToken::new())
    }
}

impl ProjectionWorker {
    /// Creates a worker whose loops stop when `cancel` (or a parent) is cancelled
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            stopped: CancellationToken::new(),
            loops: Vec::new(),
        }
    }

    /// Starts consuming `source` with `handler` on its own task
    pub fn spawn<S>(&mut self, source: S, handler: Arc<dyn EventHandler>)
    where
        S: MessageSource + 'static,
    {
        let queue = source.queue_name().to_owned();
        info!(queue = %queue, kind = %handler.event_kind(), "spawning subscriber");

        let token = self.cancel.child_token();
        let stopped = self.stopped.clone();
        let task = tokio::spawn(async move {
            // dropped on return and on unwind alike
            let _stopped = stopped.drop_guard();
            Subscriber::new(source).subscribe(handler, token).await
        });
        self.loops.push((queue, task));
    }

    /// Resolves once any loop has ended. Never resolves for a worker without loops.
    pub async fn stopped(&self) {
        self.stopped.cancelled().await
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Cancels every loop and waits for them to finish
    pub async fn shutdown(self) -> Vec<(String, LoopResult)> {
        self.cancel.cancel();
        self.join().await
    }

    /// Waits for every loop to end on its own (closed channel or fatal error)
    ///
    /// A panicked loop is reported as `CatalogError::Transport`.
    pub async fn join(self) -> Vec<(String, LoopResult)> {
        let (queues, tasks): (Vec<_>, Vec<_>) = self.loops.into_iter().unzip();

        queues
            .into_iter()
            .zip(join_all(tasks).await)
            .map(|(queue, joined)| {
                let result = joined.unwrap_or_else(|err| {
                    Err(CatalogError::Transport(format!("subscriber task failed: {}", err)))
                });
                if let Err(err) = &result {
                    error!(queue = %queue, "subscriber ended with error: {}", err);
                }
                (queue, result)
            })
            .collect()
    }
}
