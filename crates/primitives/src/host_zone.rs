//! The host zone: identity of the remote chain and the protocol accounts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    address::Address,
    dec::Dec,
    denom::ibc_denom_over_channel,
    types::Amount,
};

/// Errors from host-zone validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostZoneError {
    /// A required field was left empty.
    #[error("host zone field must be specified: {0}")]
    MissingField(&'static str),

    /// The IBC denom does not hash out of the channel and base denom.
    #[error("native token ibc denom mismatch (expected {expected}, got {actual})")]
    IbcDenomMismatch {
        /// The hash derived from the transfer channel and base denom.
        expected: String,
        /// The denom that was supplied.
        actual: String,
    },

    /// A local address failed bech32 validation.
    #[error("invalid {field} address: {reason}")]
    InvalidAddress {
        /// Which address field failed.
        field: &'static str,
        /// The underlying bech32 failure.
        reason: String,
    },

    /// The redemption rate or one of its bounds is malformed.
    #[error("invalid redemption rate bounds: {0}")]
    InvalidBounds(&'static str),

    /// The unbonding period was zero.
    #[error("unbonding period must be set")]
    ZeroUnbondingPeriod,
}

/// The remote chain being liquid-staked and the addresses the protocol
/// controls on both sides.
///
/// A module instance manages exactly one host zone; it is read by every
/// component and mutated only through the safety monitor (rate, halt flag),
/// the engine's rate recompute, the delegation lifecycles (remaining
/// delegated balance) and operator control (bounds, operator address).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostZone {
    /// Chain id of the remote chain.
    pub chain_id: String,

    /// The local end of the token-transfer channel to the remote chain.
    pub transfer_channel_id: String,

    /// The native staking token's base denom on the remote chain.
    pub native_token_denom: String,

    /// The native token's voucher denom on the local chain.
    pub native_token_ibc_denom: String,

    /// Remote account the operator delegates from.
    pub delegation_address: String,

    /// Remote account staking rewards accrue to.
    pub reward_address: String,

    /// Local account deposits accumulate in until the next delegation epoch.
    pub deposit_address: Address,

    /// Local account staked tokens are escrowed in while redemptions pend.
    pub redemption_address: Address,

    /// Local account swept unbonded tokens are paid out of.
    pub claim_address: Address,

    /// Local admin with recovery powers.
    pub safe_address: Address,

    /// Local admin that confirms remote transactions.
    pub operator_address: Address,

    /// Remote unbonding period in seconds.
    pub unbonding_period_seconds: u64,

    /// Native tokens per staked token.
    pub redemption_rate: Dec,

    /// The redemption rate as of the previous update.
    pub last_redemption_rate: Dec,

    /// Outer lower bound; crossing it halts the zone.
    pub min_redemption_rate: Dec,

    /// Outer upper bound; crossing it halts the zone.
    pub max_redemption_rate: Dec,

    /// Inner lower bound; crossing it also halts the zone.
    pub min_inner_redemption_rate: Dec,

    /// Inner upper bound; crossing it also halts the zone.
    pub max_inner_redemption_rate: Dec,

    /// Native tokens confirmed as delegated and not yet undelegated.
    pub remaining_delegated_balance: Amount,

    /// Set by the safety monitor; cleared only by the safe admin.
    pub halted: bool,
}

impl HostZone {
    /// Validates the zone the way genesis does: every field populated, the
    /// IBC denom derived from the channel, all local addresses bech32-valid
    /// under `hrp`, the unbonding period nonzero and the bounds well-formed.
    pub fn validate(&self, hrp: &str) -> Result<(), HostZoneError> {
        if self.chain_id.is_empty() {
            return Err(HostZoneError::MissingField("chain-id"));
        }
        if self.transfer_channel_id.is_empty() {
            return Err(HostZoneError::MissingField("transfer channel-id"));
        }
        if self.native_token_denom.is_empty() {
            return Err(HostZoneError::MissingField("native token denom"));
        }
        if self.native_token_ibc_denom.is_empty() {
            return Err(HostZoneError::MissingField("native token ibc denom"));
        }
        if self.delegation_address.is_empty() {
            return Err(HostZoneError::MissingField("delegation address"));
        }
        if self.reward_address.is_empty() {
            return Err(HostZoneError::MissingField("reward address"));
        }

        let expected = ibc_denom_over_channel(
            crate::constants::TRANSFER_PORT,
            &self.transfer_channel_id,
            &self.native_token_denom,
        );
        if self.native_token_ibc_denom != expected {
            return Err(HostZoneError::IbcDenomMismatch {
                expected,
                actual: self.native_token_ibc_denom.clone(),
            });
        }

        for (field, addr) in [
            ("deposit", &self.deposit_address),
            ("redemption", &self.redemption_address),
            ("claim", &self.claim_address),
            ("safe", &self.safe_address),
            ("operator", &self.operator_address),
        ] {
            addr.validate(hrp)
                .map_err(|e| HostZoneError::InvalidAddress {
                    field,
                    reason: e.to_string(),
                })?;
        }

        if self.unbonding_period_seconds == 0 {
            return Err(HostZoneError::ZeroUnbondingPeriod);
        }
        if self.redemption_rate.is_zero() {
            return Err(HostZoneError::InvalidBounds("redemption rate must be positive"));
        }
        self.validate_bounds()
    }

    /// Checks that all four bounds are positive and properly nested.
    pub fn validate_bounds(&self) -> Result<(), HostZoneError> {
        if self.min_redemption_rate.is_zero() || self.max_redemption_rate.is_zero() {
            return Err(HostZoneError::InvalidBounds("outer bounds not set"));
        }
        if self.min_inner_redemption_rate.is_zero() || self.max_inner_redemption_rate.is_zero() {
            return Err(HostZoneError::InvalidBounds("inner bounds not set"));
        }
        if self.min_inner_redemption_rate < self.min_redemption_rate {
            return Err(HostZoneError::InvalidBounds(
                "min inner bound outside of min outer bound",
            ));
        }
        if self.max_inner_redemption_rate > self.max_redemption_rate {
            return Err(HostZoneError::InvalidBounds(
                "max inner bound outside of max outer bound",
            ));
        }
        if self.min_inner_redemption_rate > self.max_inner_redemption_rate {
            return Err(HostZoneError::InvalidBounds(
                "min inner bound greater than max inner bound",
            ));
        }
        Ok(())
    }

    /// The staked-token denom minted against this zone's native token.
    pub fn st_denom(&self) -> String {
        crate::denom::st_denom(&self.native_token_denom)
    }

    /// Whether a rate falls outside the outer safety band.
    pub fn rate_outside_outer_bounds(&self, rate: Dec) -> bool {
        rate < self.min_redemption_rate || rate > self.max_redemption_rate
    }

    /// Whether a rate falls outside the inner safety band.
    pub fn rate_outside_inner_bounds(&self, rate: Dec) -> bool {
        rate < self.min_inner_redemption_rate || rate > self.max_inner_redemption_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_zone() -> HostZone {
        let addr = |n: u8| Address::from_bytes("floe", &[n; 20]).unwrap();
        HostZone {
            chain_id: "celestia-1".to_string(),
            transfer_channel_id: "channel-0".to_string(),
            native_token_denom: "utia".to_string(),
            native_token_ibc_denom: ibc_denom_over_channel("transfer", "channel-0", "utia"),
            delegation_address: "celestia1delegation".to_string(),
            reward_address: "celestia1reward".to_string(),
            deposit_address: addr(1),
            redemption_address: addr(2),
            claim_address: addr(3),
            safe_address: addr(4),
            operator_address: addr(5),
            unbonding_period_seconds: 21 * 24 * 60 * 60,
            redemption_rate: Dec::one(),
            last_redemption_rate: Dec::one(),
            min_redemption_rate: "0.95".parse().unwrap(),
            max_redemption_rate: "1.10".parse().unwrap(),
            min_inner_redemption_rate: "0.97".parse().unwrap(),
            max_inner_redemption_rate: "1.05".parse().unwrap(),
            remaining_delegated_balance: 0,
            halted: false,
        }
    }

    #[test]
    fn valid_zone_passes() {
        assert!(valid_zone().validate("floe").is_ok());
    }

    #[test]
    fn missing_fields_fail() {
        let mut zone = valid_zone();
        zone.chain_id.clear();
        assert_eq!(
            zone.validate("floe"),
            Err(HostZoneError::MissingField("chain-id"))
        );

        let mut zone = valid_zone();
        zone.reward_address.clear();
        assert!(zone.validate("floe").is_err());
    }

    #[test]
    fn ibc_denom_must_match_channel_hash() {
        let mut zone = valid_zone();
        zone.native_token_ibc_denom = "ibc/DEADBEEF".to_string();
        assert!(matches!(
            zone.validate("floe"),
            Err(HostZoneError::IbcDenomMismatch { .. })
        ));
    }

    #[test]
    fn addresses_checked_against_hrp() {
        let mut zone = valid_zone();
        zone.claim_address = Address::from_bytes("cosmos", &[9; 20]).unwrap();
        assert!(matches!(
            zone.validate("floe"),
            Err(HostZoneError::InvalidAddress { field: "claim", .. })
        ));
    }

    #[test]
    fn bounds_must_nest() {
        let mut zone = valid_zone();
        zone.min_inner_redemption_rate = "0.90".parse().unwrap();
        assert!(zone.validate_bounds().is_err());

        let mut zone = valid_zone();
        zone.max_inner_redemption_rate = "1.20".parse().unwrap();
        assert!(zone.validate_bounds().is_err());

        let mut zone = valid_zone();
        zone.min_inner_redemption_rate = "1.06".parse().unwrap();
        assert!(zone.validate_bounds().is_err());
    }

    #[test]
    fn zero_unbonding_period_fails() {
        let mut zone = valid_zone();
        zone.unbonding_period_seconds = 0;
        assert_eq!(
            zone.validate("floe"),
            Err(HostZoneError::ZeroUnbondingPeriod)
        );
    }

    #[test]
    fn bound_predicates() {
        let zone = valid_zone();
        assert!(!zone.rate_outside_inner_bounds("1.0".parse().unwrap()));
        assert!(zone.rate_outside_inner_bounds("1.06".parse().unwrap()));
        assert!(!zone.rate_outside_outer_bounds("1.06".parse().unwrap()));
        assert!(zone.rate_outside_outer_bounds("1.12".parse().unwrap()));
    }
}
