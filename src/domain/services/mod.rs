/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------+-------+-------+------------------------------+
/// | Exports:                                                 |
/// |   - commands                                             |
/// |   - outbox                                               |
/// |   - publisher                                            |
/// |   - queries                                              |
/// |   - stores                                               |
/// +----------------------------------------------------------+

/// Write-side command handlers.
pub mod commands;

/// Retry queue for events whose publish failed after commit.
pub mod outbox;

/// Publishing port of the broker transport.
pub mod publisher;

/// Read-side query handlers and response views.
pub mod queries;

/// Store capabilities and their in-memory implementations.
pub mod stores;
