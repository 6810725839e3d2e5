//! Accounting identity: user flows never move the redemption rate.
//!
//! Stakes mint at the rate, redemptions escrow at the rate, and batches
//! shuffle native value between the deposit account, in-flight records and
//! the delegated balance. None of that changes locked-native per staked
//! token; only reward/slash adjustments (and operator confirmations of
//! them) do.

use floe_db as _;
use floe_params as _;
use floe_ratelimit as _;
use serde as _;
use serde_json as _;
use thiserror as _;
use tracing as _;

use floe_core::{hooks::EpochInfo, msgs::Msg};
use floe_primitives::{Coin, Dec};
use floe_test_utils::{fixtures, test_address, test_env, TestEnv};

const T0: u64 = 1_700_000_000;

fn day_epoch(number: u64) -> EpochInfo {
    EpochInfo {
        identifier: "day".to_string(),
        number,
    }
}

fn tx_hash(c: char) -> String {
    c.to_string().repeat(64)
}

fn rate(env: &TestEnv) -> Dec {
    env.keeper.query_host_zone(&env.store).unwrap().redemption_rate
}

fn begin_block(env: &TestEnv, time: u64, height: u64) {
    env.with_ctx(time, height, |keeper, ctx| keeper.begin_block(ctx));
    assert!(
        !env.keeper.query_host_zone(&env.store).unwrap().halted,
        "zone must stay unhalted throughout"
    );
}

#[test]
fn rate_is_invariant_under_user_flows() {
    let env = test_env();
    let alice = test_address(9);
    let bob = test_address(10);

    // 1M staked and delegated at par
    env.bank.fund(
        &env.store,
        &alice,
        &Coin::new(fixtures::native_ibc_denom(), 1_000_000),
    );
    env.keeper
        .execute(
            &env.store,
            T0,
            1,
            &Msg::LiquidStake {
                staker: alice,
                native_amount: 1_000_000,
            },
        )
        .unwrap();
    env.with_ctx(T0 + 10, 2, |keeper, ctx| {
        keeper.before_epoch_start(ctx, &day_epoch(1))
    });
    env.with_ctx(T0 + 20, 3, |keeper, ctx| {
        keeper.on_transfer_ack(ctx, "channel-0", 0, true)
    })
    .0
    .unwrap();
    env.keeper
        .execute(
            &env.store,
            T0 + 30,
            4,
            &Msg::ConfirmDelegation {
                signer: test_address(5),
                record_id: 1,
                tx_hash: tx_hash('a'),
            },
        )
        .unwrap();

    // rewards accrue remotely: the safe bumps the delegated balance 3%
    env.keeper
        .execute(
            &env.store,
            T0 + 60,
            5,
            &Msg::AdjustDelegatedBalance {
                signer: test_address(4),
                validator_address: "celestiavaloper1xyz".to_string(),
                delegation_offset: 30_000,
            },
        )
        .unwrap();
    begin_block(&env, T0 + 90, 6);
    assert_eq!(rate(&env), "1.03".parse().unwrap());

    // a stake at the drifted rate mints exactly native / 1.03
    env.bank.fund(
        &env.store,
        &bob,
        &Coin::new(fixtures::native_ibc_denom(), 103_000),
    );
    env.keeper
        .execute(
            &env.store,
            T0 + 120,
            7,
            &Msg::LiquidStake {
                staker: bob.clone(),
                native_amount: 103_000,
            },
        )
        .unwrap();
    assert_eq!(env.bank_balance(&bob, "stutia"), 100_000);
    begin_block(&env, T0 + 150, 8);
    assert_eq!(rate(&env), "1.03".parse().unwrap());

    // a redemption escrows exactly st * 1.03 without moving the rate
    env.keeper
        .execute(
            &env.store,
            T0 + 180,
            9,
            &Msg::RedeemStake {
                redeemer: bob,
                st_token_amount: 50_000,
            },
        )
        .unwrap();
    begin_block(&env, T0 + 210, 10);
    assert_eq!(rate(&env), "1.03".parse().unwrap());

    // the undelegation epoch batches the new deposit and freezes the
    // redemption batch; the rate still does not move
    env.with_ctx(T0 + 240, 11, |keeper, ctx| {
        keeper.before_epoch_start(ctx, &day_epoch(4))
    });
    env.keeper
        .execute(
            &env.store,
            T0 + 270,
            12,
            &Msg::ConfirmUndelegation {
                signer: test_address(5),
                record_id: 1,
                native_amount: 51_500,
                tx_hash: tx_hash('b'),
            },
        )
        .unwrap();
    assert_eq!(env.supply("stutia"), 1_050_000);
    begin_block(&env, T0 + 300, 13);
    assert_eq!(rate(&env), "1.03".parse().unwrap());

    env.assert_mirror_synced();
}
