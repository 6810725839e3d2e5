//! A store-backed mock of the bank module.
//!
//! `send` moves funds unconditionally, like the real bank; honoring
//! `is_blocked` is the caller's responsibility.

use std::collections::HashSet;

use floe_core::collaborators::{AccountKeeper, Bank, CollaboratorError};
use floe_db::Store;
use floe_primitives::{Address, Amount, Coin};
use floe_ratelimit::gov::ChannelValueSource;

const BALANCE_PREFIX: &[u8] = b"mock-bank/balance/";
const SUPPLY_PREFIX: &[u8] = b"mock-bank/supply/";

/// Bank mock holding balances and supply in the shared store.
#[derive(Debug, Clone)]
pub struct MockBank {
    hrp: String,
    blocked: HashSet<String>,
}

impl MockBank {
    /// Creates a bank deriving module addresses under the given prefix.
    pub fn new(hrp: &str) -> Self {
        Self {
            hrp: hrp.to_string(),
            blocked: HashSet::new(),
        }
    }

    /// Marks an address as refusing bank sends.
    pub fn with_blocked(mut self, addresses: Vec<Address>) -> Self {
        self.blocked
            .extend(addresses.into_iter().map(|a| a.to_string()));
        self
    }

    fn balance_key(denom: &str, address: &Address) -> Vec<u8> {
        [
            BALANCE_PREFIX,
            denom.as_bytes(),
            b"/",
            address.as_bytes(),
        ]
        .concat()
    }

    fn supply_key(denom: &str) -> Vec<u8> {
        [SUPPLY_PREFIX, denom.as_bytes()].concat()
    }

    fn read(store: &dyn Store, key: &[u8]) -> Amount {
        store
            .get(key)
            .and_then(|bytes| Some(u128::from_be_bytes(bytes.try_into().ok()?)))
            .unwrap_or(0)
    }

    fn write(store: &dyn Store, key: &[u8], amount: Amount) {
        store.set(key, &amount.to_be_bytes());
    }

    /// Test helper: credits an account and grows the supply to match.
    pub fn fund(&self, store: &dyn Store, address: &Address, coin: &Coin) {
        let balance_key = Self::balance_key(&coin.denom, address);
        Self::write(store, &balance_key, Self::read(store, &balance_key) + coin.amount);
        let supply_key = Self::supply_key(&coin.denom);
        Self::write(store, &supply_key, Self::read(store, &supply_key) + coin.amount);
    }

    fn debit(
        store: &dyn Store,
        address: &Address,
        coin: &Coin,
    ) -> Result<(), CollaboratorError> {
        let key = Self::balance_key(&coin.denom, address);
        let available = Self::read(store, &key);
        let remaining =
            available
                .checked_sub(coin.amount)
                .ok_or(CollaboratorError::InsufficientFunds {
                    address: address.to_string(),
                    denom: coin.denom.clone(),
                    needed: coin.amount,
                    available,
                })?;
        Self::write(store, &key, remaining);
        Ok(())
    }

    fn credit(store: &dyn Store, address: &Address, coin: &Coin) {
        let key = Self::balance_key(&coin.denom, address);
        Self::write(store, &key, Self::read(store, &key) + coin.amount);
    }
}

impl Bank for MockBank {
    fn supply(&self, store: &dyn Store, denom: &str) -> Amount {
        Self::read(store, &Self::supply_key(denom))
    }

    fn balance(&self, store: &dyn Store, address: &Address, denom: &str) -> Amount {
        Self::read(store, &Self::balance_key(denom, address))
    }

    fn send(
        &self,
        store: &dyn Store,
        from: &Address,
        to: &Address,
        coins: &[Coin],
    ) -> Result<(), CollaboratorError> {
        for coin in coins {
            Self::debit(store, from, coin)?;
            Self::credit(store, to, coin);
        }
        Ok(())
    }

    fn mint_to_module(
        &self,
        store: &dyn Store,
        module: &str,
        coins: &[Coin],
    ) -> Result<(), CollaboratorError> {
        let module_account = self.module_address(module);
        for coin in coins {
            Self::credit(store, &module_account, coin);
            let supply_key = Self::supply_key(&coin.denom);
            Self::write(store, &supply_key, Self::read(store, &supply_key) + coin.amount);
        }
        Ok(())
    }

    fn burn_from_module(
        &self,
        store: &dyn Store,
        module: &str,
        coins: &[Coin],
    ) -> Result<(), CollaboratorError> {
        let module_account = self.module_address(module);
        for coin in coins {
            Self::debit(store, &module_account, coin)?;
            let supply_key = Self::supply_key(&coin.denom);
            let supply = Self::read(store, &supply_key);
            Self::write(store, &supply_key, supply.saturating_sub(coin.amount));
        }
        Ok(())
    }

    fn send_from_module(
        &self,
        store: &dyn Store,
        module: &str,
        to: &Address,
        coins: &[Coin],
    ) -> Result<(), CollaboratorError> {
        let module_account = self.module_address(module);
        self.send(store, &module_account, to, coins)
    }

    fn send_to_module(
        &self,
        store: &dyn Store,
        from: &Address,
        module: &str,
        coins: &[Coin],
    ) -> Result<(), CollaboratorError> {
        let module_account = self.module_address(module);
        for coin in coins {
            Self::debit(store, from, coin)?;
            Self::credit(store, &module_account, coin);
        }
        Ok(())
    }

    fn is_blocked(&self, address: &Address) -> bool {
        self.blocked.contains(address.as_str())
    }
}

impl AccountKeeper for MockBank {
    fn module_address(&self, module: &str) -> Address {
        let mut seed = [0u8; 20];
        for (i, byte) in module.bytes().take(20).enumerate() {
            seed[i] = byte;
        }
        Address::from_bytes(&self.hrp, &seed).expect("valid module address")
    }
}

impl ChannelValueSource for MockBank {
    fn channel_value(&self, store: &dyn Store, denom: &str) -> Amount {
        self.supply(store, denom)
    }
}
