/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------+-------+-------+------------------------------+
/// | Exports:                                                 |
/// |   - handlers                                             |
/// |   - rabbit_source                                        |
/// |   - subscriber                                           |
/// |   - worker                                               |
/// +----------------------------------------------------------+

/// Projection handlers, one per event kind.
pub mod handlers;

/// RabbitMQ-backed message source.
pub mod rabbit_source;

/// Consume loop and settlement policy.
pub mod subscriber;

/// Supervisor of the consume loops.
pub mod worker;
