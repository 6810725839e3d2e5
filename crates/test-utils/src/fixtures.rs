//! Canonical fixtures: addresses, host zones and a wired-up test keeper.

use std::{collections::HashMap, sync::Arc};

use floe_core::{
    collaborators::{Bank, StakingMirror},
    genesis::GenesisState,
    Context, Keeper,
};
use floe_db::{CacheStore, MemStore};
use floe_params::ProtocolParams;
use floe_primitives::{
    denom::ibc_denom_over_channel, events::Event, host_zone::HostZone, Address, Amount, Dec,
};

use crate::{bank::MockBank, channels::MockChannels, mirror::MockStakingMirror, transfer::MockTransfer};

/// Bech32 prefix used by every fixture address.
pub const HRP: &str = "floe";

/// The remote chain fixtures stake on.
pub const CHAIN_ID: &str = "celestia-1";

/// The transfer channel to the remote chain.
pub const CHANNEL_ID: &str = "channel-0";

/// The remote chain's native staking denom.
pub const NATIVE_DENOM: &str = "utia";

/// A deterministic local address from a one-byte seed.
pub fn test_address(seed: u8) -> Address {
    Address::from_bytes(HRP, &[seed; 20]).expect("valid test address")
}

/// A plausible-looking remote address; remote formats are passed through.
pub fn remote_address(name: &str) -> String {
    format!("celestia1{name}")
}

/// The IBC voucher denom of the fixture native token.
pub fn native_ibc_denom() -> String {
    ibc_denom_over_channel("transfer", CHANNEL_ID, NATIVE_DENOM)
}

/// A valid host zone: rate 1.0, inner bounds [0.97, 1.05], outer
/// [0.95, 1.10], 21-day unbonding.
pub fn default_host_zone() -> HostZone {
    HostZone {
        chain_id: CHAIN_ID.to_string(),
        transfer_channel_id: CHANNEL_ID.to_string(),
        native_token_denom: NATIVE_DENOM.to_string(),
        native_token_ibc_denom: native_ibc_denom(),
        delegation_address: remote_address("delegation"),
        reward_address: remote_address("reward"),
        deposit_address: test_address(1),
        redemption_address: test_address(2),
        claim_address: test_address(3),
        safe_address: test_address(4),
        operator_address: test_address(5),
        unbonding_period_seconds: 21 * 24 * 60 * 60,
        redemption_rate: Dec::one(),
        last_redemption_rate: Dec::one(),
        min_redemption_rate: "0.95".parse().expect("valid dec"),
        max_redemption_rate: "1.10".parse().expect("valid dec"),
        min_inner_redemption_rate: "0.97".parse().expect("valid dec"),
        max_inner_redemption_rate: "1.05".parse().expect("valid dec"),
        remaining_delegated_balance: 0,
        halted: false,
    }
}

/// A fully wired keeper over an in-memory store with genesis applied.
#[derive(Debug)]
pub struct TestEnv {
    /// The base store.
    pub store: MemStore,

    /// The keeper under test.
    pub keeper: Keeper,

    /// The bank mock, for funding accounts and asserting balances.
    pub bank: Arc<MockBank>,

    /// The staking mirror, for asserting the delegated-total sync.
    pub mirror: Arc<MockStakingMirror>,

    /// The genesis host zone.
    pub host_zone: HostZone,
}

impl TestEnv {
    /// Builds an environment, optionally with blocked bank addresses.
    pub fn with_blocked(blocked: Vec<Address>) -> Self {
        crate::init_test_logging();

        let bank = Arc::new(MockBank::new(HRP).with_blocked(blocked));
        let transfer = Arc::new(MockTransfer::new(
            bank.clone(),
            HashMap::from([(
                native_ibc_denom(),
                format!("transfer/{CHANNEL_ID}/{NATIVE_DENOM}"),
            )]),
        ));
        let channels = Arc::new(MockChannels::new(vec![(CHANNEL_ID, CHAIN_ID)]));
        let mirror = Arc::new(MockStakingMirror);

        let keeper = Keeper::new(
            bank.clone(),
            bank.clone(),
            transfer,
            channels,
            mirror.clone(),
            ProtocolParams::default(),
        );

        let store = MemStore::new();
        let host_zone = default_host_zone();
        keeper
            .init_genesis(&store, &GenesisState {
                host_zone: host_zone.clone(),
            })
            .expect("genesis applies");

        Self {
            store,
            keeper,
            bank,
            mirror,
            host_zone,
        }
    }

    /// Balance of an account in a denom.
    pub fn bank_balance(&self, address: &Address, denom: &str) -> Amount {
        self.bank.balance(&self.store, address, denom)
    }

    /// Total supply of a denom.
    pub fn supply(&self, denom: &str) -> Amount {
        self.bank.supply(&self.store, denom)
    }

    /// Asserts the host zone's delegated balance and the staking mirror
    /// still agree.
    pub fn assert_mirror_synced(&self) {
        let zone = self.keeper.query_host_zone(&self.store).expect("host zone");
        let mirrored = self.mirror.total_delegations(&self.store, &zone.chain_id);
        assert_eq!(
            zone.remaining_delegated_balance, mirrored,
            "delegated balance and staking mirror diverged"
        );
    }

    /// Runs a closure in an overlay context and commits its writes,
    /// returning the closure result and the emitted events.
    pub fn with_ctx<R>(
        &self,
        block_time: u64,
        block_height: u64,
        run: impl FnOnce(&Keeper, &mut Context<'_>) -> R,
    ) -> (R, Vec<Event>) {
        let sandbox = CacheStore::wrap(&self.store);
        let mut ctx = Context::new(&sandbox, block_time, block_height);
        let result = run(&self.keeper, &mut ctx);
        let events = std::mem::take(&mut ctx.events);
        drop(ctx);
        sandbox.commit();
        (result, events)
    }
}

/// The standard environment.
pub fn test_env() -> TestEnv {
    TestEnv::with_blocked(Vec::new())
}
