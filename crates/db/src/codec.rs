//! Value codec for stored records.

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::{DbError, DbResult};

/// Encodes a record into its stored form.
pub fn encode<T: Serialize>(value: &T) -> DbResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| DbError::Codec(e.to_string()))
}

/// Decodes a record from its stored form.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> DbResult<T> {
    bincode::deserialize(bytes).map_err(|e| DbError::Codec(e.to_string()))
}
