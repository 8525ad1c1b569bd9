use std::collections::HashMap;

use async_trait::async_trait;
use rabbitmq::{ConsumerMessage, RabbitMQError, Subscription, message_headers};
use tracing::warn;

use super::subscriber::{Delivery, MessageSource};
use crate::domain::error::CatalogError;

/// `MessageSource` over a RabbitMQ subscription.
///
/// Delivered messages are kept until settled because the channel acks by the
/// original frame.
pub struct RabbitMessageSource {
    queue: String,
    subscription: Option<Subscription>,
    inflight: HashMap<u64, ConsumerMessage>,
}

impl RabbitMessageSource {
    pub fn new(subscription: Subscription) -> Self {
        Self {
            queue: subscription.queue_name().to_owned(),
            subscription: Some(subscription),
            inflight: HashMap::new(),
        }
    }

    fn settle_target(
        &mut self,
        delivery: &Delivery,
    ) -> Result<(&Subscription, ConsumerMessage), CatalogError> {
        let message = self.inflight.remove(&delivery.tag).ok_or_else(|| {
            CatalogError::Transport(format!("unknown delivery tag {}", delivery.tag))
        })?;
        let subscription = self
            .subscription
            .as_ref()
            .ok_or_else(|| CatalogError::Transport(format!("subscription {} closed", self.queue)))?;
        Ok((subscription, message))
    }
}

fn transport(err: RabbitMQError) -> CatalogError {
    CatalogError::Transport(err.to_string())
}

#[async_trait]
impl MessageSource for RabbitMessageSource {
    fn queue_name(&self) -> &str {
        &self.queue
    }

    async fn next_delivery(&mut self) -> Option<Delivery> {
        let subscription = self.subscription.as_mut()?;

        loop {
            let message = subscription.receive().await?;

            let Some(deliver) = message.deliver.as_ref() else {
                warn!(queue = %self.queue, "dropping message without delivery info");
                continue;
            };

            let delivery = Delivery {
                tag: deliver.delivery_tag(),
                payload: message.content.clone().unwrap_or_default(),
                headers: message_headers(&message),
                redelivered: deliver.redelivered(),
            };
            self.inflight.insert(delivery.tag, message);
            return Some(delivery);
        }
    }

    async fn ack(&mut self, delivery: &Delivery) -> Result<(), CatalogError> {
        let (subscription, message) = self.settle_target(delivery)?;
        subscription.ack(&message).await.map_err(transport)
    }

    async fn nack(&mut self, delivery: &Delivery, requeue: bool) -> Result<(), CatalogError> {
        let (subscription, message) = self.settle_target(delivery)?;
        subscription.nack(&message, requeue).await.map_err(transport)
    }

    async fn close(&mut self) -> Result<(), CatalogError> {
        self.inflight.clear();
        match self.subscription.take() {
            Some(subscription) => subscription.close().await.map_err(transport),
            None => Ok(()),
        }
    }
}
