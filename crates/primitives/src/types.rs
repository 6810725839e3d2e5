//! Token amounts and coins.

use serde::{Deserialize, Serialize};

/// An unsigned token amount.
///
/// Amounts are base-denom integer quantities; 128 bits is wide enough for any
/// realistic supply and lets the decimal math widen into 256 bits without
/// precision loss.
pub type Amount = u128;

/// A signed token amount, used for operator balance adjustments.
pub type SignedAmount = i128;

/// A (denom, amount) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Coin {
    /// The token denomination.
    pub denom: String,

    /// The integer amount in the base denomination.
    pub amount: Amount,
}

impl Coin {
    /// Creates a new coin.
    pub fn new(denom: impl Into<String>, amount: Amount) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl std::fmt::Display for Coin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_display() {
        let coin = Coin::new("utia", 1_000_000);
        assert_eq!(coin.to_string(), "1000000utia");
    }
}
