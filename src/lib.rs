// Expose the modules
pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod inbounds;
pub mod outbounds;
pub mod seed;

// Re-export key types for easier usage
pub use app::{Catalog, Projections};
pub use config::{Config, ConfigError, QueueNames};
pub use domain::error::{CatalogError, CatalogResult};
pub use domain::events::{EventKind, EventMessage, Headers};
pub use domain::models::{Album, Artist, Gender, Song};
pub use domain::services::outbox::{Outbox, OutboxRelay};
pub use domain::services::publisher::EventPublisher;
pub use domain::services::stores::{CatalogStore, ProjectionStore};
pub use inbounds::{
    handlers::EventHandler,
    subscriber::{Delivery, MessageSource, Subscriber, SubscriptionStats},
    worker::ProjectionWorker,
};
pub use outbounds::{InMemoryBroker, RabbitEventPublisher};
