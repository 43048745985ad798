//! The single coin balance shared by every game.

use crate::Store;
use parlor_types::store::{Key, Value};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("invalid amount")]
    InvalidAmount,
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: u64, available: u64 },
}

/// Owns the balance and its persistence.
///
/// [Ledger::reserve] and [Ledger::award] are the only mutators, and both persist
/// immediately.
pub struct Ledger<S: Store> {
    store: S,
    balance: u64,
}

impl<S: Store> Ledger<S> {
    /// Load the persisted balance, seeding `default` when it is absent or zero.
    pub fn open(mut store: S, default: u64) -> Self {
        let balance = match store.get(&Key::Balance) {
            Some(Value::Coins(coins)) if coins > 0 => coins,
            _ => {
                info!(balance = default, "seeding balance");
                store.insert(Key::Balance, Value::Coins(default));
                default
            }
        };
        Self { store, balance }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Move `amount` out of the balance to back a wager.
    pub fn reserve(&mut self, amount: u64) -> Result<u64, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if amount > self.balance {
            return Err(LedgerError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        self.persist();
        debug!(amount, balance = self.balance, "reserved");
        Ok(amount)
    }

    /// Credit a (possibly fractional) payout, rounded to the nearest coin.
    pub fn award(&mut self, amount: f64) -> Result<u64, LedgerError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(LedgerError::InvalidAmount);
        }
        let coins = amount.round() as u64;
        self.balance = self.balance.saturating_add(coins);
        self.persist();
        debug!(amount = coins, balance = self.balance, "awarded");
        Ok(coins)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn persist(&mut self) {
        self.store.insert(Key::Balance, Value::Coins(self.balance));
    }
}

/// Parse a wager typed by the player.
///
/// Anything that is not a positive whole number of coins is rejected.
pub fn parse_amount(input: &str) -> Result<u64, LedgerError> {
    match input.trim().parse::<u64>() {
        Ok(amount) if amount > 0 => Ok(amount),
        _ => Err(LedgerError::InvalidAmount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Memory;

    #[test]
    fn test_seeds_default_balance() {
        let ledger = Ledger::open(Memory::default(), 1_000);
        assert_eq!(ledger.balance(), 1_000);
        assert_eq!(
            ledger.store().get(&Key::Balance),
            Some(Value::Coins(1_000))
        );
    }

    #[test]
    fn test_zero_balance_is_reseeded() {
        let mut store = Memory::default();
        store.insert(Key::Balance, Value::Coins(0));
        let ledger = Ledger::open(store, 1_000);
        assert_eq!(ledger.balance(), 1_000);
    }

    #[test]
    fn test_persisted_balance_is_kept() {
        let mut store = Memory::default();
        store.insert(Key::Balance, Value::Coins(37));
        let ledger = Ledger::open(store, 1_000);
        assert_eq!(ledger.balance(), 37);
    }

    #[test]
    fn test_reserve_and_award_conserve() {
        let mut ledger = Ledger::open(Memory::default(), 1_000);
        assert_eq!(ledger.reserve(100), Ok(100));
        assert_eq!(ledger.balance(), 900);
        assert_eq!(ledger.award(193.0), Ok(193));
        assert_eq!(ledger.balance(), 1_093);
        assert_eq!(
            ledger.store().get(&Key::Balance),
            Some(Value::Coins(1_093))
        );
    }

    #[test]
    fn test_reserve_rejections_leave_balance() {
        let mut ledger = Ledger::open(Memory::default(), 50);
        assert_eq!(ledger.reserve(0), Err(LedgerError::InvalidAmount));
        assert_eq!(
            ledger.reserve(51),
            Err(LedgerError::InsufficientFunds {
                requested: 51,
                available: 50
            })
        );
        assert_eq!(ledger.balance(), 50);

        // The whole balance can be wagered, never more.
        assert_eq!(ledger.reserve(50), Ok(50));
        assert_eq!(ledger.balance(), 0);
        assert!(ledger.reserve(1).is_err());
    }

    #[test]
    fn test_award_rounds_and_rejects_nonsense() {
        let mut ledger = Ledger::open(Memory::default(), 10);
        assert_eq!(ledger.award(2.5), Ok(3));
        assert_eq!(ledger.award(0.4), Ok(0));
        assert_eq!(ledger.award(-1.0), Err(LedgerError::InvalidAmount));
        assert_eq!(ledger.award(f64::NAN), Err(LedgerError::InvalidAmount));
        assert_eq!(ledger.award(f64::INFINITY), Err(LedgerError::InvalidAmount));
        assert_eq!(ledger.balance(), 13);
    }

    #[test]
    fn test_award_saturates() {
        let mut store = Memory::default();
        store.insert(Key::Balance, Value::Coins(u64::MAX - 1));
        let mut ledger = Ledger::open(store, 1_000);
        ledger.award(10.0).unwrap();
        assert_eq!(ledger.balance(), u64::MAX);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 25 "), Ok(25));
        for bad in ["", "0", "-5", "2.5", "ten", "1e3"] {
            assert_eq!(parse_amount(bad), Err(LedgerError::InvalidAmount), "{bad}");
        }
    }
}
