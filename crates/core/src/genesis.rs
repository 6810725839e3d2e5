//! Genesis initialization and validation.

use serde::{Deserialize, Serialize};
use tracing::info;

use floe_db::{host_zone as host_zone_store, unbonding as unbonding_store, Store};
use floe_primitives::{host_zone::HostZone, records::UnbondingRecord};

use crate::{
    errors::{FloeError, FloeResult},
    keeper::Keeper,
};

/// Id of the unbonding record seeded at genesis.
pub const GENESIS_UNBONDING_RECORD_ID: u64 = 1;

/// The module's genesis state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    /// The host zone to manage.
    pub host_zone: HostZone,
}

impl Keeper {
    /// Stateless genesis validation.
    pub fn validate_genesis(&self, genesis: &GenesisState) -> FloeResult<()> {
        genesis
            .host_zone
            .validate(&self.params.account_prefix)?;
        Ok(())
    }

    /// Initializes the module: writes the host zone and seeds the first
    /// accumulating unbonding record so redemptions have somewhere to land.
    pub fn init_genesis(&self, store: &dyn Store, genesis: &GenesisState) -> FloeResult<()> {
        self.validate_genesis(genesis)?;

        if host_zone_store::exists(store) {
            return Err(FloeError::InvariantBroken(
                "host zone already initialized".to_string(),
            ));
        }

        host_zone_store::set(store, &genesis.host_zone)?;
        unbonding_store::safe_set(
            store,
            &UnbondingRecord::accumulating(GENESIS_UNBONDING_RECORD_ID),
        )?;

        info!(chain_id = %genesis.host_zone.chain_id, "host zone registered");
        Ok(())
    }

    /// Exports the current genesis state.
    pub fn export_genesis(&self, store: &dyn Store) -> FloeResult<GenesisState> {
        Ok(GenesisState {
            host_zone: self.host_zone(store)?,
        })
    }
}
