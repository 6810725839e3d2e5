//! Delegation record store with its archive sub-store.

use floe_primitives::records::DelegationRecord;

use crate::{
    codec,
    errors::{DbError, DbResult},
    keys::{id_key, DELEGATION_ACTIVE_PREFIX, DELEGATION_ARCHIVE_PREFIX},
    kv::Store,
};

const KIND: &str = "delegation";

/// Writes a record into the active store, replacing any existing one.
pub fn set(store: &dyn Store, record: &DelegationRecord) -> DbResult<()> {
    store.set(
        &id_key(DELEGATION_ACTIVE_PREFIX, record.id),
        &codec::encode(record)?,
    );
    Ok(())
}

/// Writes a record, refusing to reuse an id that exists in the active or
/// archive store. Id uniqueness across both stores is what keeps record ids
/// monotonic for the record's whole history.
pub fn safe_set(store: &dyn Store, record: &DelegationRecord) -> DbResult<()> {
    if exists(store, record.id) {
        return Err(DbError::RecordAlreadyExists {
            kind: KIND,
            id: record.id,
        });
    }
    set(store, record)
}

/// Reads a record from the active store.
pub fn get(store: &dyn Store, id: u64) -> DbResult<Option<DelegationRecord>> {
    store
        .get(&id_key(DELEGATION_ACTIVE_PREFIX, id))
        .map(|bytes| codec::decode(&bytes))
        .transpose()
}

/// Reads a record from the archive store.
pub fn get_archived(store: &dyn Store, id: u64) -> DbResult<Option<DelegationRecord>> {
    store
        .get(&id_key(DELEGATION_ARCHIVE_PREFIX, id))
        .map(|bytes| codec::decode(&bytes))
        .transpose()
}

/// Removes a record from the active store.
pub fn remove(store: &dyn Store, id: u64) {
    store.delete(&id_key(DELEGATION_ACTIVE_PREFIX, id));
}

/// Moves a record from the active store to the archive store.
pub fn archive(store: &dyn Store, id: u64) -> DbResult<()> {
    let record = get(store, id)?.ok_or(DbError::RecordNotFound { kind: KIND, id })?;
    store.set(
        &id_key(DELEGATION_ARCHIVE_PREFIX, id),
        &codec::encode(&record)?,
    );
    remove(store, id);
    Ok(())
}

/// Whether the id is present in the active or archive store.
pub fn exists(store: &dyn Store, id: u64) -> bool {
    store.has(&id_key(DELEGATION_ACTIVE_PREFIX, id))
        || store.has(&id_key(DELEGATION_ARCHIVE_PREFIX, id))
}

/// All live records in id order.
pub fn all_active(store: &dyn Store) -> DbResult<Vec<DelegationRecord>> {
    store
        .scan_prefix(DELEGATION_ACTIVE_PREFIX)
        .into_iter()
        .map(|(_, bytes)| codec::decode(&bytes))
        .collect()
}

/// All archived records in id order.
pub fn all_archived(store: &dyn Store) -> DbResult<Vec<DelegationRecord>> {
    store
        .scan_prefix(DELEGATION_ARCHIVE_PREFIX)
        .into_iter()
        .map(|(_, bytes)| codec::decode(&bytes))
        .collect()
}

#[cfg(test)]
mod tests {
    use floe_primitives::records::DelegationStatus;

    use super::*;
    use crate::kv::MemStore;

    #[test]
    fn set_get_remove() {
        let store = MemStore::new();
        let record = DelegationRecord::new(1, 500);

        set(&store, &record).unwrap();
        assert_eq!(get(&store, 1).unwrap(), Some(record.clone()));

        remove(&store, 1);
        assert_eq!(get(&store, 1).unwrap(), None);
    }

    #[test]
    fn safe_set_refuses_duplicate_ids() {
        let store = MemStore::new();
        let record = DelegationRecord::new(3, 100);

        safe_set(&store, &record).unwrap();
        assert_eq!(
            safe_set(&store, &record),
            Err(DbError::RecordAlreadyExists { kind: "delegation", id: 3 })
        );
    }

    #[test]
    fn safe_set_refuses_archived_ids() {
        let store = MemStore::new();
        let record = DelegationRecord::new(4, 100);
        set(&store, &record).unwrap();
        archive(&store, 4).unwrap();

        assert!(safe_set(&store, &record).is_err());
    }

    #[test]
    fn archive_moves_out_of_active_iteration() {
        let store = MemStore::new();
        let mut record = DelegationRecord::new(2, 250);
        record.status = DelegationStatus::DelegationComplete;
        set(&store, &record).unwrap();

        archive(&store, 2).unwrap();
        assert!(all_active(&store).unwrap().is_empty());
        assert_eq!(all_archived(&store).unwrap(), vec![record.clone()]);
        assert_eq!(get_archived(&store, 2).unwrap(), Some(record));
    }

    #[test]
    fn archive_missing_record_fails() {
        let store = MemStore::new();
        assert_eq!(
            archive(&store, 9),
            Err(DbError::RecordNotFound { kind: "delegation", id: 9 })
        );
    }

    #[test]
    fn active_iteration_is_id_ordered() {
        let store = MemStore::new();
        for id in [5u64, 1, 300] {
            set(&store, &DelegationRecord::new(id, 10)).unwrap();
        }
        let ids: Vec<u64> = all_active(&store).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 5, 300]);
    }
}
