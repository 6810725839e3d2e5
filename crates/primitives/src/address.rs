//! Bech32 account addresses.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from address validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The string is not valid bech32.
    #[error("invalid bech32 address: {0}")]
    InvalidBech32(String),

    /// The human-readable part does not match the local chain's prefix.
    #[error("wrong address prefix (expected {expected}, got {actual})")]
    WrongPrefix {
        /// The prefix the local chain expects.
        expected: String,
        /// The prefix that was supplied.
        actual: String,
    },

    /// The address is empty.
    #[error("address must not be empty")]
    Empty,
}

/// A bech32-encoded account address.
///
/// Addresses flow in over messages and genesis as plain strings; validation
/// against the local chain's prefix happens at the trust boundary
/// ([`Address::validate`]), after which the value is passed around as-is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wraps a raw string without validating it.
    pub fn new(raw: impl Into<String>) -> Self {
        Address(raw.into())
    }

    /// Decodes the bech32 string and checks the human-readable part.
    pub fn validate(&self, expected_hrp: &str) -> Result<(), AddressError> {
        if self.0.is_empty() {
            return Err(AddressError::Empty);
        }
        let (hrp, _data) =
            bech32::decode(&self.0).map_err(|_| AddressError::InvalidBech32(self.0.clone()))?;
        if hrp.as_str() != expected_hrp {
            return Err(AddressError::WrongPrefix {
                expected: expected_hrp.to_string(),
                actual: hrp.as_str().to_string(),
            });
        }
        Ok(())
    }

    /// The raw bech32 string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The raw bytes used in composite store keys.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Derives an address from raw account bytes under the given prefix.
    pub fn from_bytes(hrp: &str, bytes: &[u8]) -> Result<Self, AddressError> {
        let hrp =
            bech32::Hrp::parse(hrp).map_err(|e| AddressError::InvalidBech32(e.to_string()))?;
        bech32::encode::<bech32::Bech32>(hrp, bytes)
            .map(Address)
            .map_err(|e| AddressError::InvalidBech32(e.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Address(raw.to_string())
    }
}
