//! Error types for the store layer.

use thiserror::Error;

/// Unified error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DbError {
    /// The host zone singleton has not been initialized.
    #[error("host zone not found")]
    HostZoneNotFound,

    /// A record lookup that must succeed did not.
    #[error("{kind} record {id} not found")]
    RecordNotFound {
        /// The record kind.
        kind: &'static str,
        /// The id that was looked up.
        id: u64,
    },

    /// A safe-set refused to overwrite an existing id.
    #[error("{kind} record {id} already exists")]
    RecordAlreadyExists {
        /// The record kind.
        kind: &'static str,
        /// The id that collided.
        id: u64,
    },

    /// A stored value failed to encode or decode.
    #[error("store codec failure: {0}")]
    Codec(String),
}

/// Result alias for store operations.
pub type DbResult<T> = Result<T, DbError>;
