use async_trait::async_trait;

use crate::domain::{error::CatalogError, events::EventMessage};

/// Publishing side of the broker transport.
///
/// Implementations resolve once the broker has accepted the message; they
/// never wait for consumers.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Delivers the encoded event under `routing_key`.
    ///
    /// # Errors
    /// * `CatalogError::Transport` - connectivity or protocol failure
    async fn publish(&self, event: &EventMessage, routing_key: &str) -> Result<(), CatalogError>;
}

#[cfg(test)]
use mockall::*;

#[cfg(test)]
mock! {
    pub EventPublisher {}

    #[async_trait]
    impl EventPublisher for EventPublisher {
        async fn publish(&self, event: &EventMessage, routing_key: &str) -> Result<(), CatalogError>;
    }
}
