//! Publishes catalog events to a RabbitMQ topic exchange.

use async_trait::async_trait;
use rabbitmq::{Message, PublisherDispatcher, PublisherContext};
use tracing::{debug, error};

use crate::domain::{
    error::CatalogError, events::EventMessage, services::publisher::EventPublisher,
};

/// `EventPublisher` backed by a topic-mode publisher of the exchange.
///
/// The event id becomes the AMQP message id and every event header is copied
/// to the message headers.
#[derive(Clone)]
pub struct RabbitEventPublisher {
    dispatcher: PublisherDispatcher,
}

impl RabbitEventPublisher {
    pub fn new(dispatcher: PublisherDispatcher) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl EventPublisher for RabbitEventPublisher {
    async fn publish(&self, event: &EventMessage, routing_key: &str) -> Result<(), CatalogError> {
        let message = Message::new(event.payload.clone(), Some(routing_key.to_owned()));
        let ctx = PublisherContext::new(event.event_id().map(str::to_owned)).with_headers(&event.headers);

        self.dispatcher.publish(message, ctx).await.map_err(|err| {
            error!(exchange = self.dispatcher.name(), routing_key, "error publishing event: {}", err);
            CatalogError::Transport(err.to_string())
        })?;

        debug!(exchange = self.dispatcher.name(), routing_key, "event published");
        Ok(())
    }
}
