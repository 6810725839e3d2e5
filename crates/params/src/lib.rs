//! Protocol parameters for the floe module.
//!
//! These are the knobs the chain operator sets once per deployment: epoch
//! cadence, the undelegation interval, the minimum redemption and the local
//! address prefix. They are plain serde structs so node configuration can
//! load them from TOML.

pub mod default;

use serde::{Deserialize, Serialize};

use floe_primitives::Amount;

pub use default::*;

/// Identifier of the daily protocol epoch.
pub const EPOCH_DAY: &str = "day";

/// Identifier of the hourly protocol epoch.
pub const EPOCH_HOUR: &str = "hour";

/// Deployment-wide protocol parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// Bech32 human-readable prefix for local addresses.
    pub account_prefix: String,

    /// Every how many day epochs the undelegation batch is frozen.
    pub undelegation_epoch_interval: u64,

    /// Smallest staked-token amount a redemption may carry.
    pub min_redemption_amount: Amount,

    /// Seconds before an outbound delegation transfer times out.
    pub transfer_timeout_seconds: u64,

    /// Upper bound on redemption records paid out per distribution pass.
    pub max_claims_per_distribution: usize,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            account_prefix: DEFAULT_ACCOUNT_PREFIX.to_string(),
            undelegation_epoch_interval: DEFAULT_UNDELEGATION_EPOCH_INTERVAL,
            min_redemption_amount: DEFAULT_MIN_REDEMPTION_AMOUNT,
            transfer_timeout_seconds: DEFAULT_TRANSFER_TIMEOUT_SECONDS,
            max_claims_per_distribution: DEFAULT_MAX_CLAIMS_PER_DISTRIBUTION,
        }
    }
}

impl ProtocolParams {
    /// Whether the given day epoch is an undelegation epoch.
    pub fn is_undelegation_epoch(&self, day_epoch: u64) -> bool {
        self.undelegation_epoch_interval != 0 && day_epoch % self.undelegation_epoch_interval == 0
    }
}
