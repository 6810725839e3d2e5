//! Protocol-wide constants.

/// Name of the module account that mints and burns the staked token.
pub const MODULE_NAME: &str = "floe";

/// Port used by the cross-chain token-transfer application.
pub const TRANSFER_PORT: &str = "transfer";

/// Prefix prepended to a native denom to form the staked-token denom
/// (e.g. `utia` -> `stutia`).
pub const ST_DENOM_PREFIX: &str = "st";

/// Prefix of an IBC voucher denom (`ibc/<hash>`).
pub const IBC_DENOM_PREFIX: &str = "ibc/";

/// Length of a remote transaction hash in hex characters.
pub const TX_HASH_HEX_LEN: usize = 64;

/// Width the channel id is padded to inside composite store keys.
pub const CHANNEL_ID_KEY_WIDTH: usize = 16;
