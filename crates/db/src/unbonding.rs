//! Unbonding record store with its archive sub-store.

use floe_primitives::records::{UnbondingRecord, UnbondingStatus};

use crate::{
    codec,
    errors::{DbError, DbResult},
    keys::{id_key, UNBONDING_ACTIVE_PREFIX, UNBONDING_ARCHIVE_PREFIX},
    kv::Store,
};

const KIND: &str = "unbonding";

/// Writes a record into the active store, replacing any existing one.
pub fn set(store: &dyn Store, record: &UnbondingRecord) -> DbResult<()> {
    store.set(
        &id_key(UNBONDING_ACTIVE_PREFIX, record.id),
        &codec::encode(record)?,
    );
    Ok(())
}

/// Writes a record, refusing to reuse an id present in either sub-store.
pub fn safe_set(store: &dyn Store, record: &UnbondingRecord) -> DbResult<()> {
    if exists(store, record.id) {
        return Err(DbError::RecordAlreadyExists {
            kind: KIND,
            id: record.id,
        });
    }
    set(store, record)
}

/// Reads a record from the active store.
pub fn get(store: &dyn Store, id: u64) -> DbResult<Option<UnbondingRecord>> {
    store
        .get(&id_key(UNBONDING_ACTIVE_PREFIX, id))
        .map(|bytes| codec::decode(&bytes))
        .transpose()
}

/// Reads a record from the archive store.
pub fn get_archived(store: &dyn Store, id: u64) -> DbResult<Option<UnbondingRecord>> {
    store
        .get(&id_key(UNBONDING_ARCHIVE_PREFIX, id))
        .map(|bytes| codec::decode(&bytes))
        .transpose()
}

/// Removes a record from the active store.
pub fn remove(store: &dyn Store, id: u64) {
    store.delete(&id_key(UNBONDING_ACTIVE_PREFIX, id));
}

/// Moves a record from the active store to the archive store.
pub fn archive(store: &dyn Store, record: &UnbondingRecord) -> DbResult<()> {
    store.set(
        &id_key(UNBONDING_ARCHIVE_PREFIX, record.id),
        &codec::encode(record)?,
    );
    remove(store, record.id);
    Ok(())
}

/// Whether the id is present in the active or archive store.
pub fn exists(store: &dyn Store, id: u64) -> bool {
    store.has(&id_key(UNBONDING_ACTIVE_PREFIX, id))
        || store.has(&id_key(UNBONDING_ARCHIVE_PREFIX, id))
}

/// All live records in id order.
pub fn all_active(store: &dyn Store) -> DbResult<Vec<UnbondingRecord>> {
    store
        .scan_prefix(UNBONDING_ACTIVE_PREFIX)
        .into_iter()
        .map(|(_, bytes)| codec::decode(&bytes))
        .collect()
}

/// All archived records in id order.
pub fn all_archived(store: &dyn Store) -> DbResult<Vec<UnbondingRecord>> {
    store
        .scan_prefix(UNBONDING_ARCHIVE_PREFIX)
        .into_iter()
        .map(|(_, bytes)| codec::decode(&bytes))
        .collect()
}

/// All live records in the given status, in id order.
pub fn all_by_status(store: &dyn Store, status: UnbondingStatus) -> DbResult<Vec<UnbondingRecord>> {
    Ok(all_active(store)?
        .into_iter()
        .filter(|r| r.status == status)
        .collect())
}

/// The unique record currently accumulating redemptions, if any.
pub fn accumulating(store: &dyn Store) -> DbResult<Option<UnbondingRecord>> {
    let mut matches = all_by_status(store, UnbondingStatus::AccumulatingRedemptions)?;
    Ok(matches.pop())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemStore;

    #[test]
    fn accumulating_lookup() {
        let store = MemStore::new();
        assert_eq!(accumulating(&store).unwrap(), None);

        let record = UnbondingRecord::accumulating(1);
        safe_set(&store, &record).unwrap();
        assert_eq!(accumulating(&store).unwrap(), Some(record));
    }

    #[test]
    fn status_filtering() {
        let store = MemStore::new();
        let mut queued = UnbondingRecord::accumulating(1);
        queued.status = UnbondingStatus::UnbondingQueue;
        set(&store, &queued).unwrap();
        set(&store, &UnbondingRecord::accumulating(2)).unwrap();

        let found = all_by_status(&store, UnbondingStatus::UnbondingQueue).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[test]
    fn archive_round_trip() {
        let store = MemStore::new();
        let mut record = UnbondingRecord::accumulating(6);
        record.status = UnbondingStatus::Archived;
        set(&store, &record).unwrap();

        archive(&store, &record).unwrap();
        assert!(all_active(&store).unwrap().is_empty());
        assert_eq!(get_archived(&store, 6).unwrap(), Some(record));
        assert!(exists(&store, 6));
    }

    #[test]
    fn safe_set_enforces_id_uniqueness_across_archive() {
        let store = MemStore::new();
        let record = UnbondingRecord::accumulating(3);
        set(&store, &record).unwrap();
        archive(&store, &record).unwrap();

        assert_eq!(
            safe_set(&store, &UnbondingRecord::accumulating(3)),
            Err(DbError::RecordAlreadyExists { kind: "unbonding", id: 3 })
        );
    }
}
