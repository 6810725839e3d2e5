//! Transfer-in-progress markers.
//!
//! When a delegation batch is sent to the remote chain, the (channel,
//! sequence) of the outbound packet is mapped to the delegation record id so
//! the ack or timeout callback can advance the right record.

use crate::{
    keys::{channel_sequence_key, TRANSFER_IN_PROGRESS_PREFIX},
    kv::Store,
};

/// Records that the packet (channel, sequence) carries delegation `record_id`.
pub fn set(store: &dyn Store, channel_id: &str, sequence: u64, record_id: u64) {
    store.set(
        &channel_sequence_key(TRANSFER_IN_PROGRESS_PREFIX, channel_id, sequence),
        &record_id.to_be_bytes(),
    );
}

/// Looks up the delegation record id behind a packet, if any.
pub fn get(store: &dyn Store, channel_id: &str, sequence: u64) -> Option<u64> {
    store
        .get(&channel_sequence_key(
            TRANSFER_IN_PROGRESS_PREFIX,
            channel_id,
            sequence,
        ))
        .and_then(|bytes| Some(u64::from_be_bytes(bytes.try_into().ok()?)))
}

/// Consumes a marker once the packet has resolved.
pub fn remove(store: &dyn Store, channel_id: &str, sequence: u64) {
    store.delete(&channel_sequence_key(
        TRANSFER_IN_PROGRESS_PREFIX,
        channel_id,
        sequence,
    ));
}
