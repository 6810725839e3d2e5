//! IBC denom-trace handling.
//!
//! A voucher denom on the local chain is `ibc/<sha256 of the full trace>`.
//! Which trace the rate limiter accounts a packet under depends on the
//! packet direction and on whether the local chain is the source or the sink
//! for the token; both directions funnel through the two parse routines here
//! so the rules exist in exactly one place.

use sha2::{Digest, Sha256};

use crate::constants::{IBC_DENOM_PREFIX, ST_DENOM_PREFIX};

/// A denom split into its transfer-trace path and base denom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenomTrace {
    /// `port/channel` pairs accumulated along the token's path, joined by `/`.
    /// Empty for a native token.
    pub path: String,

    /// The base denomination on the token's origin chain.
    pub base_denom: String,
}

impl DenomTrace {
    /// The denom the local chain uses for this trace: the base denom when the
    /// path is empty, otherwise the `ibc/` hash of the full trace.
    pub fn ibc_denom(&self) -> String {
        if self.path.is_empty() {
            return self.base_denom.clone();
        }
        hash_denom_trace(&format!("{}/{}", self.path, self.base_denom))
    }
}

/// Hashes a full `port/channel/.../base` trace into its `ibc/` voucher form.
pub fn hash_denom_trace(trace: &str) -> String {
    let digest = Sha256::digest(trace.as_bytes());
    format!("{IBC_DENOM_PREFIX}{}", hex::encode_upper(digest))
}

/// Whether a denom is an `ibc/` voucher.
pub fn is_ibc_denom(denom: &str) -> bool {
    denom.starts_with(IBC_DENOM_PREFIX)
}

/// The staked-token denom for a host zone's native denom.
pub fn st_denom(native_denom: &str) -> String {
    format!("{ST_DENOM_PREFIX}{native_denom}")
}

/// The `port/channel/` trace prefix contributed by one hop.
pub fn denom_prefix(port: &str, channel_id: &str) -> String {
    format!("{port}/{channel_id}/")
}

/// The voucher denom for a native token wrapped over a single hop.
pub fn ibc_denom_over_channel(port: &str, channel_id: &str, base_denom: &str) -> String {
    hash_denom_trace(&format!("{port}/{channel_id}/{base_denom}"))
}

fn is_valid_channel_id(id: &str) -> bool {
    id.strip_prefix("channel-")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Splits a raw packet denom into trace path and base denom.
///
/// Pairs of `{port}/{channel}` are consumed from the front for as long as the
/// channel segment looks like a channel id; whatever remains is the base.
pub fn parse_denom_trace(raw: &str) -> DenomTrace {
    let parts: Vec<&str> = raw.split('/').collect();
    let mut n = 0;
    while n + 2 < parts.len() && is_valid_channel_id(parts[n + 1]) {
        n += 2;
    }
    DenomTrace {
        path: parts[..n].join("/"),
        base_denom: parts[n..].join("/"),
    }
}

/// Whether the receiving chain is the source for a packet denom, i.e. the
/// token is returning over the hop it last left through.
pub fn receiver_chain_is_source(source_port: &str, source_channel: &str, denom: &str) -> bool {
    denom.starts_with(&denom_prefix(source_port, source_channel))
}

/// The denom the rate limiter accounts a SEND packet under.
///
/// A native token leaving the chain is accounted as-is; a voucher leaving the
/// chain is accounted as the hash of its full trace.
pub fn parse_denom_from_send(packet_denom: &str) -> String {
    let trace = parse_denom_trace(packet_denom);
    if trace.path.is_empty() {
        packet_denom.to_string()
    } else {
        trace.ibc_denom()
    }
}

/// The denom the rate limiter accounts a RECV packet under.
///
/// When the local chain is the source (the token is returning), one
/// `port/channel` prefix is stripped and the remainder hashed if any trace is
/// left. Otherwise the local chain is a sink: the destination hop is
/// prepended and the whole trace hashed.
pub fn parse_denom_from_recv(
    source_port: &str,
    source_channel: &str,
    dest_port: &str,
    dest_channel: &str,
    packet_denom: &str,
) -> String {
    if receiver_chain_is_source(source_port, source_channel, packet_denom) {
        let prefix = denom_prefix(source_port, source_channel);
        let unprefixed = &packet_denom[prefix.len()..];
        let trace = parse_denom_trace(unprefixed);
        if trace.path.is_empty() {
            unprefixed.to_string()
        } else {
            trace.ibc_denom()
        }
    } else {
        let prefixed = format!("{}{}", denom_prefix(dest_port, dest_channel), packet_denom);
        hash_denom_trace(&prefixed)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn trace_parsing() {
        let native = parse_denom_trace("ufloe");
        assert_eq!(native.path, "");
        assert_eq!(native.base_denom, "ufloe");

        let one_hop = parse_denom_trace("transfer/channel-2/uosmo");
        assert_eq!(one_hop.path, "transfer/channel-2");
        assert_eq!(one_hop.base_denom, "uosmo");

        let two_hops = parse_denom_trace("transfer/channel-0/transfer/channel-5/ujuno");
        assert_eq!(two_hops.path, "transfer/channel-0/transfer/channel-5");
        assert_eq!(two_hops.base_denom, "ujuno");

        // a channel-less path segment is part of the base denom
        let odd = parse_denom_trace("transfer/not-a-channel/udenom");
        assert_eq!(odd.path, "");
        assert_eq!(odd.base_denom, "transfer/not-a-channel/udenom");
    }

    #[test]
    fn send_native_is_unchanged() {
        assert_eq!(parse_denom_from_send("ufloe"), "ufloe");
    }

    #[test]
    fn send_voucher_is_hashed() {
        let expected = hash_denom_trace("transfer/channel-2/uosmo");
        assert_eq!(parse_denom_from_send("transfer/channel-2/uosmo"), expected);
    }

    #[test]
    fn recv_as_sink_prepends_and_hashes() {
        // uosmo arriving over channel-0: the local chain is a sink
        let denom = parse_denom_from_recv("transfer", "channel-9", "transfer", "channel-0", "uosmo");
        assert_eq!(denom, hash_denom_trace("transfer/channel-0/uosmo"));

        // two-hop voucher arriving: the full extended trace is hashed
        let denom = parse_denom_from_recv(
            "transfer",
            "channel-9",
            "transfer",
            "channel-0",
            "transfer/channel-5/ujuno",
        );
        assert_eq!(
            denom,
            hash_denom_trace("transfer/channel-0/transfer/channel-5/ujuno")
        );
    }

    #[test]
    fn recv_as_source_strips_prefix() {
        // native token returning home: prefix stripped, no hash
        let denom = parse_denom_from_recv(
            "transfer",
            "channel-4",
            "transfer",
            "channel-1",
            "transfer/channel-4/ufloe",
        );
        assert_eq!(denom, "ufloe");

        // voucher that visited another chain and came back: strip one hop, hash the rest
        let denom = parse_denom_from_recv(
            "transfer",
            "channel-4",
            "transfer",
            "channel-1",
            "transfer/channel-4/transfer/channel-8/ujuno",
        );
        assert_eq!(denom, hash_denom_trace("transfer/channel-8/ujuno"));
    }

    #[test]
    fn host_zone_voucher_denom() {
        let ibc = ibc_denom_over_channel("transfer", "channel-0", "utia");
        assert!(is_ibc_denom(&ibc));
        assert_eq!(ibc.len(), 4 + 64);
    }

    #[test]
    fn st_denom_prefixing() {
        assert_eq!(st_denom("utia"), "stutia");
    }

    proptest! {
        /// A native denom sent out and received back lands on its original
        /// accounting denom.
        #[test]
        fn send_then_recv_round_trip(
            base in "[a-z]{2,10}",
            channel in 0u32..1000,
        ) {
            let channel_id = format!("channel-{channel}");
            // outbound: native accounted as-is
            let sent = parse_denom_from_send(&base);
            prop_assert_eq!(&sent, &base);

            // the counterparty sends it back with our hop as its prefix
            let returned = format!("transfer/{channel_id}/{base}");
            let received = parse_denom_from_recv("transfer", &channel_id, "transfer", "channel-99", &returned);
            prop_assert_eq!(received, base);
        }
    }
}
