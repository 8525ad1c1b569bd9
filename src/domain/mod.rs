/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------+-------+-------+------------------------------+
/// | Exports:                                                 |
/// |   - error                                                |
/// |   - events                                               |
/// |   - models                                               |
/// |   - services                                             |
/// +----------------------------------------------------------+

/// Error taxonomy shared by every layer.
pub mod error;

/// Event codec.
pub mod events;

/// Write-side entities and read-side documents.
pub mod models;

/// Commands, queries, stores and the publishing outbox.
pub mod services;
