//! Crash: a multiplier climbs from 1.0 until it reaches a hidden crash point.
//!
//! The player may cash out at the current multiplier any time before the crash. The
//! shape of the round (crash point and per-tick growth) is a [CrashCurve] policy; the
//! game only relies on growth being strictly above 1 so every round eventually crashes.

use super::{Context, Game, GameError, GameRng};
use crate::{config::CrashConfig, scheduler::Timer, session::Session, Step, Store};
use parlor_types::casino::{Controls, GameId, Phase, Progress};
use tracing::debug;

/// How a crash round is shaped.
pub trait CrashCurve {
    /// Draw the multiplier at which the round crashes.
    fn crash_point(&self, rng: &mut GameRng) -> f64;

    /// Draw the factor the multiplier grows by on the next tick.
    fn growth(&self, rng: &mut GameRng) -> f64;
}

/// Power-law crash points with a rare additive boost.
///
/// `C = max(min_crash, 1 + U^4 * scale + boost)` where `boost` is uniform in
/// `[0, boost_max)` with probability `boost_chance` and zero otherwise.
#[derive(Clone, Debug)]
pub struct PowerTail {
    scale: f64,
    boost_chance: f64,
    boost_max: f64,
    min_crash: f64,
    growth_min: f64,
    growth_max: f64,
}

impl PowerTail {
    pub fn new(config: &CrashConfig) -> Result<Self, GameError> {
        let invalid = |what: &str| -> Result<Self, GameError> {
            Err(GameError::InvalidConfiguration(format!("crash {what}")))
        };
        if !(config.scale.is_finite() && config.scale >= 0.0) {
            return invalid("scale must be finite and non-negative");
        }
        if !(0.0..=1.0).contains(&config.boost_chance) {
            return invalid("boost_chance must be a probability");
        }
        if !(config.boost_max.is_finite() && config.boost_max >= 0.0) {
            return invalid("boost_max must be finite and non-negative");
        }
        if !(config.min_crash.is_finite() && config.min_crash > 1.0) {
            return invalid("min_crash must be above 1");
        }
        if !(config.growth_min > 1.0
            && config.growth_max >= config.growth_min
            && config.growth_max.is_finite())
        {
            return invalid("growth range must be above 1");
        }
        Ok(Self {
            scale: config.scale,
            boost_chance: config.boost_chance,
            boost_max: config.boost_max,
            min_crash: config.min_crash,
            growth_min: config.growth_min,
            growth_max: config.growth_max,
        })
    }
}

impl CrashCurve for PowerTail {
    fn crash_point(&self, rng: &mut GameRng) -> f64 {
        let base = 1.0 + rng.next_f64().powi(4) * self.scale;
        let boost = if rng.next_f64() < self.boost_chance {
            rng.next_f64() * self.boost_max
        } else {
            0.0
        };
        (base + boost).max(self.min_crash)
    }

    fn growth(&self, rng: &mut GameRng) -> f64 {
        self.growth_min + rng.next_f64() * (self.growth_max - self.growth_min)
    }
}

pub struct Crash {
    session: Session,
    curve: Box<dyn CrashCurve>,
    crash_point: f64,
    multiplier: f64,
    tick_ms: u64,
}

impl Crash {
    pub fn new(config: &CrashConfig) -> Result<Self, GameError> {
        if config.tick_ms == 0 {
            return Err(GameError::InvalidConfiguration(
                "crash tick_ms must be > 0".to_string(),
            ));
        }
        Ok(Self::with_curve(Box::new(PowerTail::new(config)?), config.tick_ms))
    }

    /// Build a crash game around a custom curve.
    pub fn with_curve(curve: Box<dyn CrashCurve>, tick_ms: u64) -> Self {
        Self {
            session: Session::new(GameId::Crash),
            curve,
            crash_point: 1.0,
            multiplier: 1.0,
            tick_ms,
        }
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    fn tick<S: Store>(&mut self, ctx: &mut Context<'_, S>) -> Result<(), GameError> {
        let growth = self.curve.growth(ctx.rng);
        self.multiplier = (self.multiplier * growth).max(1.0);
        if self.multiplier >= self.crash_point {
            ctx.progress(
                GameId::Crash,
                Progress::Crashed {
                    multiplier: self.crash_point,
                },
            );
            self.session.settle(ctx, 0.0)?;
            return Ok(());
        }
        ctx.progress(
            GameId::Crash,
            Progress::Ascent {
                multiplier: self.multiplier,
            },
        );
        self.session.schedule(ctx, self.tick_ms, Step::Tick);
        Ok(())
    }
}

impl Game for Crash {
    fn session(&self) -> &Session {
        &self.session
    }

    fn start<S: Store>(&mut self, ctx: &mut Context<'_, S>, amount: u64) -> Result<(), GameError> {
        self.session.begin(ctx, amount)?;
        self.crash_point = self.curve.crash_point(ctx.rng);
        self.multiplier = 1.0;
        debug!(crash_point = self.crash_point, "crash round armed");
        self.session.schedule(ctx, self.tick_ms, Step::Tick);
        Ok(())
    }

    fn cash_out<S: Store>(&mut self, ctx: &mut Context<'_, S>) -> Result<u64, GameError> {
        if !self.session.is_active() || self.multiplier >= self.crash_point {
            return Err(GameError::InvalidMove);
        }
        let bet = self.session.bet().map_or(0, |bet| bet.amount);
        let payout = (bet as f64 * self.multiplier).floor();
        self.session.settle(ctx, payout)
    }

    fn on_timer<S: Store>(&mut self, ctx: &mut Context<'_, S>, timer: Timer) -> Result<(), GameError> {
        self.session.guard(timer.generation)?;
        match timer.step {
            Step::Tick => self.tick(ctx),
            _ => Err(self.session.stale(timer.generation)),
        }
    }

    fn reset<S: Store>(&mut self, ctx: &mut Context<'_, S>, reason: &str) {
        self.session.reset(ctx, reason);
        self.multiplier = 1.0;
    }

    fn controls(&self, _live: bool, balance: u64) -> Controls {
        let phase = self.session.phase();
        Controls {
            can_bet: phase.accepts_wager() && balance > 0,
            can_act: false,
            can_cash_out: phase == Phase::Active,
        }
    }
}
