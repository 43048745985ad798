//! Three-reel slots. Each reel stops on its own step of a staggered chain; the round
//! settles when the last reel stops.

use super::{validate_multipliers, Context, Game, GameError};
use crate::{config::SlotsConfig, scheduler::Timer, session::Session, Step, Store};
use parlor_types::casino::{GameId, Progress, SLOT_REELS, SLOT_SYMBOLS};

/// Multiplier for a set of stopped reels.
///
/// Three of a kind pays the triple table; two of a kind pays the pair table for the
/// repeated symbol; anything else pays nothing.
pub fn payout_multiplier(reels: &[u8; SLOT_REELS], triple: &[f64], pair: &[f64]) -> f64 {
    let [a, b, c] = *reels;
    let lookup = |table: &[f64], symbol: u8| table.get(symbol as usize).copied().unwrap_or(0.0);
    if a == b && b == c {
        lookup(triple, a)
    } else if a == b || a == c {
        lookup(pair, a)
    } else if b == c {
        lookup(pair, b)
    } else {
        0.0
    }
}

pub struct Slots {
    session: Session,
    reels: [u8; SLOT_REELS],
    triple: Vec<f64>,
    pair: Vec<f64>,
    first_stop_ms: u64,
    stop_ms: u64,
}

impl Slots {
    pub fn new(config: &SlotsConfig) -> Result<Self, GameError> {
        for (name, table) in [("slots triple", &config.triple), ("slots pair", &config.pair)] {
            validate_multipliers(name, table)?;
            if table.len() != SLOT_SYMBOLS.len() {
                return Err(GameError::InvalidConfiguration(format!(
                    "{name} table has {} entries, expected {}",
                    table.len(),
                    SLOT_SYMBOLS.len()
                )));
            }
        }
        Ok(Self {
            session: Session::new(GameId::Slots),
            reels: [0; SLOT_REELS],
            triple: config.triple.clone(),
            pair: config.pair.clone(),
            first_stop_ms: config.first_stop_ms,
            stop_ms: config.stop_ms,
        })
    }

    pub fn reels(&self) -> [u8; SLOT_REELS] {
        self.reels
    }

    fn stop<S: Store>(&mut self, ctx: &mut Context<'_, S>, reel: u8) -> Result<(), GameError> {
        let index = reel as usize;
        if index >= SLOT_REELS {
            return Err(GameError::InvalidMove);
        }
        let symbol = ctx.rng.next_bounded(SLOT_SYMBOLS.len() as u32) as u8;
        self.reels[index] = symbol;
        ctx.progress(GameId::Slots, Progress::Reel { reel, symbol });
        if index + 1 < SLOT_REELS {
            self.session.schedule(ctx, self.stop_ms, Step::Reel(reel + 1));
            return Ok(());
        }
        let bet = self.session.bet().map_or(0, |bet| bet.amount);
        let multiplier = payout_multiplier(&self.reels, &self.triple, &self.pair);
        self.session.settle(ctx, bet as f64 * multiplier)?;
        Ok(())
    }
}

impl Game for Slots {
    fn session(&self) -> &Session {
        &self.session
    }

    fn start<S: Store>(&mut self, ctx: &mut Context<'_, S>, amount: u64) -> Result<(), GameError> {
        self.session.begin(ctx, amount)?;
        self.session.resolving()?;
        self.session.schedule(ctx, self.first_stop_ms, Step::Reel(0));
        Ok(())
    }

    fn on_timer<S: Store>(&mut self, ctx: &mut Context<'_, S>, timer: Timer) -> Result<(), GameError> {
        self.session.guard(timer.generation)?;
        match timer.step {
            Step::Reel(reel) => self.stop(ctx, reel),
            _ => Err(self.session.stale(timer.generation)),
        }
    }

    fn reset<S: Store>(&mut self, ctx: &mut Context<'_, S>, reason: &str) {
        self.session.reset(ctx, reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::Harness;
    use parlor_types::casino::{SLOT_PAIR_PAYOUTS, SLOT_TRIPLE_PAYOUTS};

    fn multiplier(reels: [u8; 3]) -> f64 {
        payout_multiplier(&reels, &SLOT_TRIPLE_PAYOUTS, &SLOT_PAIR_PAYOUTS)
    }

    #[test]
    fn test_payout_table() {
        // Sevens
        assert_eq!(multiplier([4, 4, 4]), 55.0);
        assert_eq!(multiplier([1, 1, 1]), 15.0);
        // Pairs in any position pay the repeated symbol.
        assert_eq!(multiplier([2, 2, 0]), 2.4);
        assert_eq!(multiplier([3, 0, 3]), 3.0);
        assert_eq!(multiplier([0, 4, 4]), 3.5);
        // Blanks never pay.
        assert_eq!(multiplier([5, 5, 5]), 0.0);
        assert_eq!(multiplier([5, 5, 1]), 0.0);
        assert_eq!(multiplier([0, 1, 2]), 0.0);
    }

    #[test]
    fn test_rejects_short_tables() {
        let config = SlotsConfig {
            pair: vec![1.0; 5],
            ..SlotsConfig::default()
        };
        assert!(matches!(
            Slots::new(&config),
            Err(GameError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_reels_stop_in_order() {
        let mut game = Slots::new(&SlotsConfig::default()).unwrap();
        let mut harness = Harness::new(1_000);
        game.start(&mut harness.ctx(), 10).unwrap();

        assert!(harness.step(&mut game));
        assert_eq!(harness.scheduler.now(), 1_000);
        assert!(harness.step(&mut game));
        assert_eq!(harness.scheduler.now(), 1_800);
        assert!(harness.step(&mut game));
        assert_eq!(harness.scheduler.now(), 2_600);
        assert!(!harness.step(&mut game));

        let paid = (10.0 * multiplier(game.reels())).round() as u64;
        assert_eq!(harness.settlements(), (1, paid));
        assert_eq!(harness.balance(), 990 + paid);
    }
}
