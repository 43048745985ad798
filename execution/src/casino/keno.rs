//! Keno: pick up to ten numbers from 1..=80, then twenty are drawn without replacement
//! and revealed one per step. The payout is `bet * table[picks - 1][hits]`.

use super::{validate_multipliers, Context, Game, GameError};
use crate::{config::KenoConfig, scheduler::Timer, session::Session, Step, Store};
use parlor_types::casino::{Controls, Decision, GameId, Progress, KENO_DRAWS, KENO_MAX_PICKS, KENO_NUMBERS};
use std::collections::BTreeSet;

fn validate_payouts(payouts: &[Vec<f64>]) -> Result<(), GameError> {
    if payouts.len() != KENO_MAX_PICKS {
        return Err(GameError::InvalidConfiguration(format!(
            "keno needs {KENO_MAX_PICKS} payout rows, got {}",
            payouts.len()
        )));
    }
    for (index, row) in payouts.iter().enumerate() {
        let picks = index + 1;
        validate_multipliers(&format!("keno {picks}-pick"), row)?;
        if row.len() != picks + 1 {
            return Err(GameError::InvalidConfiguration(format!(
                "keno {picks}-pick row has {} entries, expected {}",
                row.len(),
                picks + 1
            )));
        }
    }
    Ok(())
}

pub struct Keno {
    session: Session,
    picks: BTreeSet<u8>,
    drawn: Vec<u8>,
    payouts: Vec<Vec<f64>>,
    draw_ms: u64,
}

impl Keno {
    pub fn new(config: &KenoConfig) -> Result<Self, GameError> {
        validate_payouts(&config.payouts)?;
        Ok(Self {
            session: Session::new(GameId::Keno),
            picks: BTreeSet::new(),
            drawn: Vec::new(),
            payouts: config.payouts.clone(),
            draw_ms: config.draw_ms,
        })
    }

    pub fn picks(&self) -> impl Iterator<Item = u8> + '_ {
        self.picks.iter().copied()
    }

    pub fn hits(&self) -> usize {
        self.drawn.iter().filter(|n| self.picks.contains(n)).count()
    }

    /// Multiplier for the current picks with `hits` matches.
    pub fn multiplier(&self, hits: usize) -> f64 {
        self.picks
            .len()
            .checked_sub(1)
            .and_then(|row| self.payouts.get(row))
            .and_then(|row| row.get(hits))
            .copied()
            .unwrap_or(0.0)
    }

    fn toggle(&mut self, number: u8) -> Result<(), GameError> {
        if !self.session.phase().accepts_wager() || !(1..=KENO_NUMBERS).contains(&number) {
            return Err(GameError::InvalidMove);
        }
        if !self.picks.remove(&number) {
            if self.picks.len() >= KENO_MAX_PICKS {
                return Err(GameError::InvalidMove);
            }
            self.picks.insert(number);
        }
        Ok(())
    }

    fn reveal<S: Store>(&mut self, ctx: &mut Context<'_, S>, index: u8) -> Result<(), GameError> {
        if let Some(&number) = self.drawn.get(index as usize) {
            let hit = self.picks.contains(&number);
            ctx.progress(GameId::Keno, Progress::Drawn { number, hit });
            self.session
                .schedule(ctx, self.draw_ms, Step::Draw(index + 1));
            return Ok(());
        }
        let bet = self.session.bet().map_or(0, |bet| bet.amount);
        let payout = bet as f64 * self.multiplier(self.hits());
        self.session.settle(ctx, payout)?;
        Ok(())
    }
}

impl Game for Keno {
    fn session(&self) -> &Session {
        &self.session
    }

    fn start<S: Store>(&mut self, ctx: &mut Context<'_, S>, amount: u64) -> Result<(), GameError> {
        if self.picks.is_empty() {
            return Err(GameError::InvalidMove);
        }
        self.session.begin(ctx, amount)?;
        self.session.resolving()?;
        self.drawn = ctx.rng.sample(KENO_NUMBERS, KENO_DRAWS);
        self.drawn.sort_unstable();
        self.session.schedule(ctx, self.draw_ms, Step::Draw(0));
        Ok(())
    }

    fn decide<S: Store>(&mut self, _ctx: &mut Context<'_, S>, decision: Decision) -> Result<(), GameError> {
        match decision {
            Decision::Pick(number) => self.toggle(number),
            Decision::ClearPicks if self.session.phase().accepts_wager() => {
                self.picks.clear();
                Ok(())
            }
            _ => Err(GameError::InvalidMove),
        }
    }

    fn on_timer<S: Store>(&mut self, ctx: &mut Context<'_, S>, timer: Timer) -> Result<(), GameError> {
        self.session.guard(timer.generation)?;
        match timer.step {
            Step::Draw(index) => self.reveal(ctx, index),
            _ => Err(self.session.stale(timer.generation)),
        }
    }

    fn reset<S: Store>(&mut self, ctx: &mut Context<'_, S>, reason: &str) {
        self.session.reset(ctx, reason);
        self.drawn.clear();
    }

    fn controls(&self, _live: bool, balance: u64) -> Controls {
        let idle = self.session.phase().accepts_wager();
        Controls {
            can_bet: idle && balance > 0 && !self.picks.is_empty(),
            can_act: idle,
            can_cash_out: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::Harness;
    use parlor_types::casino::{Event, Phase};

    fn keno() -> Keno {
        Keno::new(&KenoConfig::default()).unwrap()
    }

    #[test]
    fn test_pick_rules() {
        let mut game = keno();
        let mut harness = Harness::new(1_000);
        let mut ctx = harness.ctx();
        assert_eq!(game.decide(&mut ctx, Decision::Pick(0)), Err(GameError::InvalidMove));
        assert_eq!(game.decide(&mut ctx, Decision::Pick(81)), Err(GameError::InvalidMove));
        for number in 1..=10 {
            game.decide(&mut ctx, Decision::Pick(number)).unwrap();
        }
        assert_eq!(game.decide(&mut ctx, Decision::Pick(11)), Err(GameError::InvalidMove));
        // Toggling off frees a slot.
        game.decide(&mut ctx, Decision::Pick(10)).unwrap();
        game.decide(&mut ctx, Decision::Pick(11)).unwrap();
        assert_eq!(game.picks().count(), 10);
        assert!(!game.picks().any(|n| n == 10));

        game.decide(&mut ctx, Decision::ClearPicks).unwrap();
        assert_eq!(game.picks().count(), 0);
        assert_eq!(game.start(&mut ctx, 10), Err(GameError::InvalidMove));
    }

    #[test]
    fn test_rejects_misshapen_table() {
        let mut config = KenoConfig::default();
        config.payouts[3].push(1.0);
        assert!(matches!(
            Keno::new(&config),
            Err(GameError::InvalidConfiguration(_))
        ));
        config.payouts.pop();
        assert!(Keno::new(&config).is_err());
    }

    #[test]
    fn test_round_reveals_twenty_then_pays() {
        let mut game = keno();
        let mut harness = Harness::new(1_000);
        for number in [3, 17, 42, 64, 80] {
            game.decide(&mut harness.ctx(), Decision::Pick(number))
                .unwrap();
        }
        game.start(&mut harness.ctx(), 100).unwrap();
        assert_eq!(game.session().phase(), Phase::Resolving);
        assert_eq!(
            game.decide(&mut harness.ctx(), Decision::Pick(5)),
            Err(GameError::InvalidMove)
        );

        // Twenty reveals, then the settling step.
        assert_eq!(harness.run(&mut game), 21);
        assert_eq!(harness.scheduler.now(), 2_100);

        let drawn: Vec<(u8, bool)> = harness
            .events
            .iter()
            .filter_map(|event| match event {
                Event::Progress {
                    progress: Progress::Drawn { number, hit },
                    ..
                } => Some((*number, *hit)),
                _ => None,
            })
            .collect();
        assert_eq!(drawn.len(), 20);
        assert!(drawn.windows(2).all(|pair| pair[0].0 < pair[1].0));
        let hits = drawn.iter().filter(|(_, hit)| *hit).count();
        assert_eq!(hits, game.hits());

        let expected = (100.0 * KenoConfig::default().payouts[4][hits]).round() as u64;
        assert_eq!(harness.settlements(), (1, expected));
        assert_eq!(harness.balance(), 900 + expected);
        // Picks survive for the next round.
        assert_eq!(game.picks().count(), 5);
    }
}
