//--------------------------------------------------------------------------------------------------
// ENUMS
//--------------------------------------------------------------------------------------------------
// | Name            | Description                                      | Key Methods         |
// |-----------------|--------------------------------------------------|---------------------|
// | CatalogError    | Failure taxonomy shared by commands, projections | not_found, is_poison|
// |                 | and queries                                      |                     |
//--------------------------------------------------------------------------------------------------

use std::fmt::Display;

use thiserror::Error;

/// Type alias for Result with CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors produced anywhere along the command, projection and query paths.
///
/// The variant decides what happens to a message on the read path: only
/// `MalformedPayload` is acknowledged without success, everything else is
/// requeued for another attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A referenced entity or projection document does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Event bytes could not be decoded into the expected shape
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// A store read or write failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The entity was stored but its event could not be published
    #[error("Publish error: {0}")]
    Publish(String),

    /// Broker connectivity or protocol failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// The command failed validation before touching any store
    #[error("Invalid command: {0}")]
    Invalid(String),
}

impl CatalogError {
    pub fn not_found(entity: &'static str, id: impl Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns true for messages that can never be processed, no matter how
    /// often they are redelivered.
    pub fn is_poison(&self) -> bool {
        matches!(self, Self::MalformedPayload(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
