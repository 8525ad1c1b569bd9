/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------+-------+-------+------------------------------+
/// | Exports:                                                 |
/// |   - memory_broker                                        |
/// |   - rabbit_publisher                                     |
/// +----------------------------------------------------------+

/// Process-local broker used by tests and the in-memory run mode.
pub mod memory_broker;

/// RabbitMQ-backed event publisher.
pub mod rabbit_publisher;

pub use memory_broker::{InMemoryBroker, MemorySubscription};
pub use rabbit_publisher::RabbitEventPublisher;
