//! Rate-limit records and the flow accounting math.

use std::fmt;

use ethnum::U256;
use serde::{Deserialize, Serialize};

use floe_primitives::Amount;

use crate::errors::RateLimitError;

/// Which way a packet is moving through the wrapped channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketDirection {
    /// An outgoing transfer.
    Send,

    /// An incoming transfer.
    Recv,
}

impl fmt::Display for PacketDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketDirection::Send => f.write_str("send"),
            PacketDirection::Recv => f.write_str("recv"),
        }
    }
}

/// The (denom, channel) pair a rate limit applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    /// The accounting denom.
    pub denom: String,

    /// The local channel id.
    pub channel_id: String,
}

/// The quota applied to a path for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    /// Max net outflow as a percentage of the channel value, in [0, 100].
    pub max_percent_send: u64,

    /// Max net inflow as a percentage of the channel value, in [0, 100].
    pub max_percent_recv: u64,

    /// Window length in hours; the flow resets when an hour epoch divisible
    /// by this fires.
    pub duration_hours: u64,
}

impl Quota {
    /// Stateless validation of the quota fields.
    pub fn validate(&self) -> Result<(), RateLimitError> {
        if self.max_percent_send > 100 || self.max_percent_recv > 100 {
            return Err(RateLimitError::InvalidQuota(format!(
                "percentages must be in [0, 100]: send {}, recv {}",
                self.max_percent_send, self.max_percent_recv
            )));
        }
        if self.duration_hours == 0 {
            return Err(RateLimitError::InvalidQuota(
                "duration must be at least one hour".to_string(),
            ));
        }
        Ok(())
    }
}

/// Running totals for the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    /// Total received on the path this window.
    pub inflow: Amount,

    /// Total sent on the path this window.
    pub outflow: Amount,

    /// Total supply of the denom, captured when the window opened. A zero
    /// snapshot disables the quota for the window (a freshly minted asset is
    /// not limited while it bootstraps).
    pub channel_value: Amount,
}

impl Flow {
    /// An empty flow against the given channel value.
    pub fn new(channel_value: Amount) -> Self {
        Self {
            inflow: 0,
            outflow: 0,
            channel_value,
        }
    }

    fn threshold(&self, percent: u64) -> U256 {
        U256::from(self.channel_value) * U256::from(u128::from(percent)) / U256::from(100u128)
    }

    /// Checks `forward - reverse + amount > threshold` without signed math:
    /// everything is compared as `forward + amount` against
    /// `threshold + reverse` in 256 bits.
    fn check(
        &self,
        direction: PacketDirection,
        forward: Amount,
        reverse: Amount,
        amount: Amount,
        percent: u64,
    ) -> Result<(), RateLimitError> {
        if self.channel_value == 0 {
            return Ok(());
        }
        let threshold = self.threshold(percent);
        let gross = U256::from(forward) + U256::from(amount);
        if gross > threshold + U256::from(reverse) {
            return Err(RateLimitError::QuotaExceeded {
                direction,
                net: (gross - U256::from(reverse)).to_string(),
                threshold: threshold.to_string(),
            });
        }
        Ok(())
    }

    /// Accounts an incoming amount.
    ///
    /// The quota applies to net flow (`inflow - outflow + amount`), so a
    /// round trip within one window consumes no quota. A rejected packet
    /// leaves the flow untouched.
    pub fn add_inflow(&mut self, amount: Amount, quota: Quota) -> Result<(), RateLimitError> {
        self.check(
            PacketDirection::Recv,
            self.inflow,
            self.outflow,
            amount,
            quota.max_percent_recv,
        )?;
        self.inflow += amount;
        Ok(())
    }

    /// Accounts an outgoing amount; symmetric with [`Flow::add_inflow`].
    pub fn add_outflow(&mut self, amount: Amount, quota: Quota) -> Result<(), RateLimitError> {
        self.check(
            PacketDirection::Send,
            self.outflow,
            self.inflow,
            amount,
            quota.max_percent_send,
        )?;
        self.outflow += amount;
        Ok(())
    }
}

/// A rate limit: path, quota, and the window's running flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// What the limit applies to.
    pub path: Path,

    /// The percentage quota.
    pub quota: Quota,

    /// The window's running totals.
    pub flow: Flow,
}

/// A (sender, receiver) pair whose transfers bypass flow accounting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistedAddressPair {
    /// The packet sender.
    pub sender: String,

    /// The packet receiver.
    pub receiver: String,
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn quota(send: u64, recv: u64) -> Quota {
        Quota {
            max_percent_send: send,
            max_percent_recv: recv,
            duration_hours: 24,
        }
    }

    #[test]
    fn quota_validation() {
        assert!(quota(10, 10).validate().is_ok());
        assert!(quota(101, 10).validate().is_err());
        assert!(quota(10, 101).validate().is_err());
        assert!(Quota {
            duration_hours: 0,
            ..quota(10, 10)
        }
        .validate()
        .is_err());
    }

    #[test]
    fn outflow_quota_applies_to_net() {
        // channel value 100, 10% each way
        let mut flow = Flow::new(100);
        let q = quota(10, 10);

        flow.add_outflow(5, q).unwrap();
        flow.add_inflow(6, q).unwrap();
        // net outflow would be 5 - 6 + 6 = 5 <= 10
        flow.add_outflow(6, q).unwrap();
        assert_eq!(flow.outflow, 11);
        assert_eq!(flow.inflow, 6);

        // net outflow would be 11 - 6 + 6 = 11 > 10
        let err = flow.add_outflow(6, q).unwrap_err();
        assert!(matches!(err, RateLimitError::QuotaExceeded { .. }));
        // a rejected packet never updates the flow
        assert_eq!(flow.outflow, 11);
    }

    #[test]
    fn fresh_limit_rejects_oversized_send() {
        let mut flow = Flow::new(100);
        assert!(flow.add_outflow(15, quota(10, 10)).is_err());
        assert_eq!(flow.outflow, 0);
    }

    #[test]
    fn zero_channel_value_disables_check() {
        let mut flow = Flow::new(0);
        flow.add_outflow(1_000_000, quota(1, 1)).unwrap();
        flow.add_inflow(5_000_000, quota(1, 1)).unwrap();
        assert_eq!(flow.outflow, 1_000_000);
        assert_eq!(flow.inflow, 5_000_000);
    }

    #[test]
    fn threshold_division_truncates() {
        // 5% of 99 truncates to 4
        let mut flow = Flow::new(99);
        let q = quota(5, 5);
        flow.add_outflow(4, q).unwrap();
        assert!(flow.add_outflow(1, q).is_err());
    }

    proptest! {
        /// Sends and receives move their own counter by exactly the packet
        /// amount, and a rejected packet moves nothing.
        #[test]
        fn flow_updates_are_exact(
            channel_value in 1u128..1_000_000,
            amounts in prop::collection::vec((any::<bool>(), 1u128..10_000), 1..50),
        ) {
            let q = quota(10, 10);
            let mut flow = Flow::new(channel_value);
            let (mut inflow, mut outflow) = (0u128, 0u128);
            for (is_send, amount) in amounts {
                let before = flow;
                let result = if is_send {
                    flow.add_outflow(amount, q)
                } else {
                    flow.add_inflow(amount, q)
                };
                match result {
                    Ok(()) if is_send => outflow += amount,
                    Ok(()) => inflow += amount,
                    Err(_) => prop_assert_eq!(before, flow),
                }
                prop_assert_eq!(flow.inflow, inflow);
                prop_assert_eq!(flow.outflow, outflow);
            }
        }
    }
}
