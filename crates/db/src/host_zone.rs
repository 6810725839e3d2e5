//! Host zone singleton store.

use floe_primitives::host_zone::HostZone;

use crate::{
    codec,
    errors::{DbError, DbResult},
    keys::HOST_ZONE_KEY,
    kv::Store,
};

/// Reads the host zone, failing if the module has not been initialized.
pub fn get(store: &dyn Store) -> DbResult<HostZone> {
    let bytes = store.get(HOST_ZONE_KEY).ok_or(DbError::HostZoneNotFound)?;
    codec::decode(&bytes)
}

/// Writes the host zone.
pub fn set(store: &dyn Store, host_zone: &HostZone) -> DbResult<()> {
    store.set(HOST_ZONE_KEY, &codec::encode(host_zone)?);
    Ok(())
}

/// Whether the host zone has been initialized.
pub fn exists(store: &dyn Store) -> bool {
    store.has(HOST_ZONE_KEY)
}
