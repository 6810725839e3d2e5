//! The safe admin's overwrite facility as the operational recovery path.

use floe_params as _;
use floe_ratelimit as _;
use serde as _;
use serde_json as _;
use thiserror as _;
use tracing as _;

use floe_core::{genesis::GenesisState, hooks::EpochInfo, msgs::Msg, FloeError};
use floe_db::{delegation as delegation_store, MemStore};
use floe_primitives::{
    records::{DelegationStatus, UnbondingRecord},
    Coin, Dec,
};
use floe_test_utils::{default_host_zone, fixtures, test_address, test_env};

const T0: u64 = 1_700_000_000;

fn tx_hash(c: char) -> String {
    c.to_string().repeat(64)
}

#[test]
fn overwrite_repairs_a_failed_transfer() {
    let env = test_env();
    let user = test_address(9);
    env.bank.fund(
        &env.store,
        &user,
        &Coin::new(fixtures::native_ibc_denom(), 500_000),
    );
    env.keeper
        .execute(
            &env.store,
            T0,
            1,
            &Msg::LiquidStake {
                staker: user,
                native_amount: 500_000,
            },
        )
        .unwrap();
    env.with_ctx(T0 + 10, 2, |keeper, ctx| {
        keeper.before_epoch_start(
            ctx,
            &EpochInfo {
                identifier: "day".to_string(),
                number: 1,
            },
        )
    });
    env.with_ctx(T0 + 20, 3, |keeper, ctx| {
        keeper.on_transfer_timeout(ctx, "channel-0", 0)
    })
    .0
    .unwrap();

    // stranded in transfer_failed; the safe rewrites it into the queue
    // (say, after manually re-sending the funds)
    let mut record = delegation_store::get(&env.store, 1).unwrap().unwrap();
    assert_eq!(record.status, DelegationStatus::TransferFailed);
    record.status = DelegationStatus::DelegationQueue;

    let events = env
        .keeper
        .execute(
            &env.store,
            T0 + 30,
            4,
            &Msg::OverwriteDelegationRecord {
                signer: test_address(4),
                record,
            },
        )
        .expect("safe overwrite succeeds");
    assert_eq!(events[0].kind, "record_overwritten");
    assert_eq!(events[0].get("record_kind"), Some("delegation"));

    // the normal confirmation path now applies
    env.keeper
        .execute(
            &env.store,
            T0 + 40,
            5,
            &Msg::ConfirmDelegation {
                signer: test_address(5),
                record_id: 1,
                tx_hash: tx_hash('d'),
            },
        )
        .expect("confirm succeeds after repair");
    let zone = env.keeper.query_host_zone(&env.store).unwrap();
    assert_eq!(zone.remaining_delegated_balance, 500_000);
    env.assert_mirror_synced();
}

#[test]
fn overwrites_are_safe_only() {
    let env = test_env();

    for signer in [test_address(5), test_address(9)] {
        let err = env
            .keeper
            .execute(
                &env.store,
                T0,
                1,
                &Msg::OverwriteUnbondingRecord {
                    signer,
                    record: UnbondingRecord::accumulating(50),
                },
            )
            .unwrap_err();
        assert!(matches!(err, FloeError::InvalidAdmin { .. }));
    }
}

#[test]
fn genesis_validates_the_host_zone() {
    let env = test_env();

    let mut bad = default_host_zone();
    bad.native_token_ibc_denom = "ibc/WRONG".to_string();
    assert!(env
        .keeper
        .validate_genesis(&GenesisState { host_zone: bad })
        .is_err());

    let mut bad = default_host_zone();
    bad.min_inner_redemption_rate = "0.90".parse().unwrap();
    assert!(env
        .keeper
        .validate_genesis(&GenesisState { host_zone: bad })
        .is_err());

    let mut bad = default_host_zone();
    bad.redemption_rate = Dec::zero();
    assert!(env
        .keeper
        .validate_genesis(&GenesisState { host_zone: bad })
        .is_err());
}

#[test]
fn genesis_applies_once() {
    let env = test_env();

    // the fixture env is already initialized; a second init is refused
    let err = env
        .keeper
        .init_genesis(
            &env.store,
            &GenesisState {
                host_zone: default_host_zone(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, FloeError::InvariantBroken(_)));

    // a fresh store accepts it and exports the same zone back
    let fresh = MemStore::new();
    let genesis = GenesisState {
        host_zone: default_host_zone(),
    };
    env.keeper.init_genesis(&fresh, &genesis).unwrap();
    assert_eq!(env.keeper.export_genesis(&fresh).unwrap(), genesis);
}
