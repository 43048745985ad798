//! Wheel of multipliers: one uniform segment draw, revealed when the spin stops.

use super::{validate_multipliers, Context, Game, GameError};
use crate::{config::WheelConfig, scheduler::Timer, session::Session, Step, Store};
use parlor_types::casino::{GameId, Progress};

pub struct Wheel {
    session: Session,
    multipliers: Vec<f64>,
    segment: Option<usize>,
    spin_ms: u64,
}

impl Wheel {
    pub fn new(config: &WheelConfig) -> Result<Self, GameError> {
        validate_multipliers("wheel", &config.multipliers)?;
        Ok(Self {
            session: Session::new(GameId::Wheel),
            multipliers: config.multipliers.clone(),
            segment: None,
            spin_ms: config.spin_ms,
        })
    }

    pub fn multipliers(&self) -> &[f64] {
        &self.multipliers
    }

    fn stop<S: Store>(&mut self, ctx: &mut Context<'_, S>) -> Result<(), GameError> {
        let Some(index) = self.segment.take() else {
            return Err(GameError::InvalidMove);
        };
        let multiplier = self.multipliers[index];
        ctx.progress(
            GameId::Wheel,
            Progress::Segment {
                index: index as u8,
                multiplier,
            },
        );
        let bet = self.session.bet().map_or(0, |bet| bet.amount);
        self.session.settle(ctx, bet as f64 * multiplier)?;
        Ok(())
    }
}

impl Game for Wheel {
    fn session(&self) -> &Session {
        &self.session
    }

    fn start<S: Store>(&mut self, ctx: &mut Context<'_, S>, amount: u64) -> Result<(), GameError> {
        self.session.begin(ctx, amount)?;
        self.session.resolving()?;
        self.segment = Some(ctx.rng.next_bounded(self.multipliers.len() as u32) as usize);
        self.session.schedule(ctx, self.spin_ms, Step::Spin);
        Ok(())
    }

    fn on_timer<S: Store>(&mut self, ctx: &mut Context<'_, S>, timer: Timer) -> Result<(), GameError> {
        self.session.guard(timer.generation)?;
        match timer.step {
            Step::Spin => self.stop(ctx),
            _ => Err(self.session.stale(timer.generation)),
        }
    }

    fn reset<S: Store>(&mut self, ctx: &mut Context<'_, S>, reason: &str) {
        self.session.reset(ctx, reason);
        self.segment = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::Harness;
    use parlor_types::casino::{Event, Phase};

    #[test]
    fn test_rejects_empty_wheel() {
        let config = WheelConfig {
            multipliers: Vec::new(),
            ..WheelConfig::default()
        };
        assert!(Wheel::new(&config).is_err());

        let config = WheelConfig {
            multipliers: vec![1.0, f64::NAN],
            ..WheelConfig::default()
        };
        assert!(Wheel::new(&config).is_err());
    }

    #[test]
    fn test_spin_pays_segment() {
        let mut game = Wheel::new(&WheelConfig::default()).unwrap();
        let mut harness = Harness::new(1_000);
        game.start(&mut harness.ctx(), 100).unwrap();
        assert_eq!(game.session().phase(), Phase::Resolving);
        assert_eq!(harness.balance(), 900);

        assert_eq!(harness.run(&mut game), 1);
        assert_eq!(harness.scheduler.now(), 4_000);
        let (index, multiplier) = harness
            .events
            .iter()
            .find_map(|event| match event {
                Event::Progress {
                    progress: Progress::Segment { index, multiplier },
                    ..
                } => Some((*index, *multiplier)),
                _ => None,
            })
            .unwrap();
        assert_eq!(multiplier, game.multipliers()[index as usize]);
        let paid = (100.0 * multiplier).round() as u64;
        assert_eq!(harness.settlements(), (1, paid));
        assert_eq!(harness.balance(), 900 + paid);
    }

    #[test]
    fn test_reset_mid_spin_forfeits() {
        let mut game = Wheel::new(&WheelConfig::default()).unwrap();
        let mut harness = Harness::new(1_000);
        game.start(&mut harness.ctx(), 100).unwrap();
        game.reset(&mut harness.ctx(), "switched");
        assert_eq!(harness.run(&mut game), 0);
        assert_eq!(harness.balance(), 900);
        assert_eq!(harness.settlements(), (0, 0));
    }
}
