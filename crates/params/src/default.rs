//! Default parameter values.

use floe_primitives::Amount;

/// Default bech32 prefix for local accounts.
pub const DEFAULT_ACCOUNT_PREFIX: &str = "floe";

/// Undelegations batch up over four daily epochs by default.
pub const DEFAULT_UNDELEGATION_EPOCH_INTERVAL: u64 = 4;

/// Redemptions below this staked-token amount are refused.
pub const DEFAULT_MIN_REDEMPTION_AMOUNT: Amount = 1_000;

/// Outbound delegation transfers time out after one day epoch.
pub const DEFAULT_TRANSFER_TIMEOUT_SECONDS: u64 = 24 * 60 * 60;

/// Claim distribution processes at most this many redemption records per
/// pass; the remainder stays CLAIMABLE for the next hourly tick.
pub const DEFAULT_MAX_CLAIMS_PER_DISTRIBUTION: usize = 1_000;
