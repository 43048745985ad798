//! Single-zero roulette with multi-bet support.
//!
//! Stakes are placed on categories while the wheel is idle and stay on the table across
//! spins until cleared. Spinning reserves the total of every stake, draws one number in
//! 0..=36 and returns `amount * (multiplier + 1)` for each winning stake.
//!
//! Bet types:
//! - Straight: single number (35:1)
//! - Red / Black / Even / Odd / Low (1-18) / High (19-36): 1:1
//! - Dozen: 1-12, 13-24, 25-36 (2:1), number = 0/1/2
//! - Column: first, second, third column (2:1), number = 0/1/2

use super::{Context, Game, GameError};
use crate::{config::RouletteConfig, ledger::LedgerError, scheduler::Timer, session::Session, Step, Store};
use parlor_types::casino::{
    BetType, Controls, Decision, GameId, Phase, Progress, ROULETTE_MAX_NUMBER, ROULETTE_MAX_STAKES,
};
use std::collections::BTreeMap;

/// Red numbers on a roulette wheel.
const RED_NUMBERS: [u8; 18] = [1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36];

/// Check if a number is red.
fn is_red(number: u8) -> bool {
    RED_NUMBERS.contains(&number)
}

/// Check if a bet wins for a given result.
pub fn bet_wins(bet_type: BetType, bet_number: u8, result: u8) -> bool {
    // Zero loses all except straight bet on 0
    if result == 0 {
        return bet_type == BetType::Straight && bet_number == 0;
    }

    match bet_type {
        BetType::Straight => bet_number == result,
        BetType::Red => is_red(result),
        BetType::Black => !is_red(result),
        BetType::Even => result % 2 == 0,
        BetType::Odd => result % 2 == 1,
        BetType::Low => (1..=18).contains(&result),
        BetType::High => (19..=36).contains(&result),
        BetType::Dozen => (result - 1) / 12 == bet_number,
        // Column 0 holds 1, 4, 7, ... 34
        BetType::Column => (result - 1) % 3 == bet_number,
    }
}

/// Get the payout multiplier for a bet type (excludes original bet).
pub fn payout_multiplier(bet_type: BetType) -> u64 {
    match bet_type {
        BetType::Straight => 35,
        BetType::Red
        | BetType::Black
        | BetType::Even
        | BetType::Odd
        | BetType::Low
        | BetType::High => 1,
        BetType::Dozen | BetType::Column => 2,
    }
}

/// The number a stake is keyed by; categories without one use 0.
fn normalize(bet_type: BetType, number: u8) -> Result<u8, GameError> {
    let valid = match bet_type {
        BetType::Straight => number <= ROULETTE_MAX_NUMBER,
        BetType::Dozen | BetType::Column => number <= 2,
        _ => return Ok(0),
    };
    if !valid {
        return Err(GameError::InvalidMove);
    }
    Ok(number)
}

pub struct Roulette {
    session: Session,
    stakes: BTreeMap<(BetType, u8), u64>,
    spin_ms: u64,
}

impl Roulette {
    pub fn new(config: &RouletteConfig) -> Self {
        Self {
            session: Session::new(GameId::Roulette),
            stakes: BTreeMap::new(),
            spin_ms: config.spin_ms,
        }
    }

    /// Coins that the next spin will reserve.
    pub fn total_staked(&self) -> u64 {
        self.stakes
            .values()
            .fold(0u64, |total, amount| total.saturating_add(*amount))
    }

    pub fn stakes(&self) -> impl Iterator<Item = (BetType, u8, u64)> + '_ {
        self.stakes
            .iter()
            .map(|((bet_type, number), amount)| (*bet_type, *number, *amount))
    }

    /// Total returned for a result, stakes included.
    pub fn total_return(&self, result: u8) -> u64 {
        self.stakes
            .iter()
            .filter(|((bet_type, number), _)| bet_wins(*bet_type, *number, result))
            .fold(0u64, |total, ((bet_type, _), amount)| {
                total.saturating_add(amount.saturating_mul(payout_multiplier(*bet_type) + 1))
            })
    }

    fn stake(&mut self, bet_type: BetType, number: u8, amount: u64) -> Result<(), GameError> {
        if !self.session.phase().accepts_wager() {
            return Err(GameError::InvalidMove);
        }
        if amount == 0 {
            return Err(LedgerError::InvalidAmount.into());
        }
        let key = (bet_type, normalize(bet_type, number)?);
        if !self.stakes.contains_key(&key) && self.stakes.len() >= ROULETTE_MAX_STAKES {
            return Err(GameError::InvalidMove);
        }
        let entry = self.stakes.entry(key).or_insert(0);
        *entry = entry.saturating_add(amount);
        Ok(())
    }

    fn spin<S: Store>(&mut self, ctx: &mut Context<'_, S>) -> Result<(), GameError> {
        let result = ctx.rng.next_bounded(u32::from(ROULETTE_MAX_NUMBER) + 1) as u8;
        ctx.progress(GameId::Roulette, Progress::Spun { number: result });
        let payout = self.total_return(result);
        self.session.settle(ctx, payout as f64)?;
        Ok(())
    }
}

impl Game for Roulette {
    fn session(&self) -> &Session {
        &self.session
    }

    /// Spin with the stakes on the table; `amount` is ignored.
    fn start<S: Store>(&mut self, ctx: &mut Context<'_, S>, _amount: u64) -> Result<(), GameError> {
        if self.stakes.is_empty() {
            return Err(GameError::InvalidMove);
        }
        self.session.begin(ctx, self.total_staked())?;
        self.session.resolving()?;
        self.session.schedule(ctx, self.spin_ms, Step::Spin);
        Ok(())
    }

    fn decide<S: Store>(&mut self, _ctx: &mut Context<'_, S>, decision: Decision) -> Result<(), GameError> {
        match decision {
            Decision::Stake {
                bet_type,
                number,
                amount,
            } => self.stake(bet_type, number, amount),
            Decision::ClearStakes if self.session.phase().accepts_wager() => {
                self.stakes.clear();
                Ok(())
            }
            _ => Err(GameError::InvalidMove),
        }
    }

    fn on_timer<S: Store>(&mut self, ctx: &mut Context<'_, S>, timer: Timer) -> Result<(), GameError> {
        self.session.guard(timer.generation)?;
        match timer.step {
            Step::Spin => self.spin(ctx),
            _ => Err(self.session.stale(timer.generation)),
        }
    }

    fn reset<S: Store>(&mut self, ctx: &mut Context<'_, S>, reason: &str) {
        self.session.reset(ctx, reason);
        self.stakes.clear();
    }

    fn controls(&self, _live: bool, balance: u64) -> Controls {
        let idle = self.session.phase().accepts_wager();
        Controls {
            can_bet: idle && !self.stakes.is_empty() && self.total_staked() <= balance,
            can_act: idle,
            can_cash_out: false,
        }
    }
}
