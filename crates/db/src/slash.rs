//! Slash record store: the audit trail of delegated-balance adjustments.

use floe_primitives::records::SlashRecord;

use crate::{
    codec,
    errors::DbResult,
    keys::{id_key, SLASH_PREFIX},
    kv::Store,
};

/// Writes a slash record.
pub fn set(store: &dyn Store, record: &SlashRecord) -> DbResult<()> {
    store.set(&id_key(SLASH_PREFIX, record.id), &codec::encode(record)?);
    Ok(())
}

/// All slash records in id order.
pub fn all(store: &dyn Store) -> DbResult<Vec<SlashRecord>> {
    store
        .scan_prefix(SLASH_PREFIX)
        .into_iter()
        .map(|(_, bytes)| codec::decode(&bytes))
        .collect()
}

/// The next unused slash record id.
pub fn next_id(store: &dyn Store) -> u64 {
    store
        .scan_prefix(SLASH_PREFIX)
        .last()
        .and_then(|(key, _)| {
            let id_bytes = key.get(SLASH_PREFIX.len()..)?;
            Some(u64::from_be_bytes(id_bytes.try_into().ok()?))
        })
        .map_or(1, |last| last + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemStore;

    fn record(id: u64, amount: i128) -> SlashRecord {
        SlashRecord {
            id,
            time: 1_700_000_000,
            validator_address: "celestiavaloper1xyz".to_string(),
            native_amount: amount,
        }
    }

    #[test]
    fn ids_allocate_monotonically() {
        let store = MemStore::new();
        assert_eq!(next_id(&store), 1);

        set(&store, &record(1, -500)).unwrap();
        assert_eq!(next_id(&store), 2);

        set(&store, &record(2, 300)).unwrap();
        assert_eq!(next_id(&store), 3);
        assert_eq!(all(&store).unwrap().len(), 2);
    }
}
