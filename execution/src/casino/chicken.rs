//! Chicken: cross lanes of traffic one at a time.
//!
//! Each crossing takes a short animation step and may get hit with the lane's hit
//! chance, forfeiting the wager. From lane 1 onwards the player may cash out at the
//! lane's multiplier; reaching the last lane settles automatically.

use super::{validate_multipliers, Context, Game, GameError};
use crate::{config::ChickenConfig, scheduler::Timer, session::Session, Step, Store};
use parlor_types::casino::{Controls, Decision, GameId, Phase, Progress};

pub struct Chicken {
    session: Session,
    lane: usize,
    crossing: bool,
    multipliers: Vec<f64>,
    hit_chances: Vec<f64>,
    cross_ms: u64,
}

impl Chicken {
    pub fn new(config: &ChickenConfig) -> Result<Self, GameError> {
        if config.lanes == 0 {
            return Err(GameError::InvalidConfiguration(
                "chicken needs at least one lane".to_string(),
            ));
        }
        validate_multipliers("chicken", &config.multipliers)?;
        let expected = config.lanes + 1;
        if config.multipliers.len() != expected || config.hit_chances.len() != expected {
            return Err(GameError::InvalidConfiguration(format!(
                "chicken tables must have {expected} entries (multipliers {}, hit chances {})",
                config.multipliers.len(),
                config.hit_chances.len()
            )));
        }
        if config
            .hit_chances
            .iter()
            .any(|chance| !(0.0..=1.0).contains(chance))
        {
            return Err(GameError::InvalidConfiguration(
                "chicken hit chances must be probabilities".to_string(),
            ));
        }
        Ok(Self {
            session: Session::new(GameId::Chicken),
            lane: 0,
            crossing: false,
            multipliers: config.multipliers.clone(),
            hit_chances: config.hit_chances.clone(),
            cross_ms: config.cross_ms,
        })
    }

    pub fn lane(&self) -> usize {
        self.lane
    }

    fn lanes(&self) -> usize {
        self.multipliers.len() - 1
    }

    fn payout(&self) -> f64 {
        let bet = self.session.bet().map_or(0, |bet| bet.amount);
        bet as f64 * self.multipliers[self.lane]
    }

    fn can_cash_out(&self) -> bool {
        self.session.is_active() && !self.crossing && self.lane >= 1
    }

    fn cross<S: Store>(&mut self, ctx: &mut Context<'_, S>) -> Result<(), GameError> {
        self.crossing = false;
        let next = self.lane + 1;
        if ctx.rng.next_f64() < self.hit_chances[next] {
            ctx.progress(GameId::Chicken, Progress::Splat { lane: next as u8 });
            self.session.settle(ctx, 0.0)?;
            return Ok(());
        }
        self.lane = next;
        ctx.progress(
            GameId::Chicken,
            Progress::Lane {
                lane: next as u8,
                multiplier: self.multipliers[next],
            },
        );
        if self.lane == self.lanes() {
            let payout = self.payout();
            self.session.settle(ctx, payout)?;
        }
        Ok(())
    }
}

impl Game for Chicken {
    fn session(&self) -> &Session {
        &self.session
    }

    fn start<S: Store>(&mut self, ctx: &mut Context<'_, S>, amount: u64) -> Result<(), GameError> {
        self.session.begin(ctx, amount)?;
        self.lane = 0;
        self.crossing = false;
        Ok(())
    }

    fn decide<S: Store>(&mut self, ctx: &mut Context<'_, S>, decision: Decision) -> Result<(), GameError> {
        match decision {
            Decision::Advance if self.session.is_active() && !self.crossing => {
                self.crossing = true;
                self.session.schedule(ctx, self.cross_ms, Step::Cross);
                Ok(())
            }
            _ => Err(GameError::InvalidMove),
        }
    }

    fn cash_out<S: Store>(&mut self, ctx: &mut Context<'_, S>) -> Result<u64, GameError> {
        if !self.can_cash_out() {
            return Err(GameError::InvalidMove);
        }
        let payout = self.payout();
        self.session.settle(ctx, payout)
    }

    fn on_timer<S: Store>(&mut self, ctx: &mut Context<'_, S>, timer: Timer) -> Result<(), GameError> {
        self.session.guard(timer.generation)?;
        match timer.step {
            Step::Cross if self.crossing => self.cross(ctx),
            _ => Err(self.session.stale(timer.generation)),
        }
    }

    fn reset<S: Store>(&mut self, ctx: &mut Context<'_, S>, reason: &str) {
        self.session.reset(ctx, reason);
        self.lane = 0;
        self.crossing = false;
    }

    fn controls(&self, live: bool, balance: u64) -> Controls {
        let phase = self.session.phase();
        Controls {
            can_bet: phase.accepts_wager() && balance > 0,
            can_act: phase == Phase::Active && !live && !self.crossing,
            can_cash_out: self.can_cash_out(),
        }
    }
}
