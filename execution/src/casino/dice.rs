//! Roll-under dice.
//!
//! A roll is uniform in 1..=100 and wins when strictly below the target, so the true
//! win probability is `(target - 1) / 100`. The payout multiplier is the house edge over
//! that probability, floored at 1.01.

use super::{Context, Game, GameError};
use crate::{config::DiceConfig, session::Session, Store};
use parlor_types::casino::{Decision, GameId, Progress, DICE_MIN_MULTIPLIER, DICE_SIDES};

/// Chance that a roll lands under `target`.
pub fn win_probability(target: u8) -> f64 {
    f64::from(target.saturating_sub(1)) / f64::from(DICE_SIDES)
}

/// Payout multiplier for a roll-under `target`.
pub fn multiplier(target: u8, house_edge: f64) -> f64 {
    let probability = win_probability(target).max(0.0001);
    (house_edge / probability).max(DICE_MIN_MULTIPLIER)
}

fn validate_target(target: u8) -> Result<u8, GameError> {
    if !(2..DICE_SIDES).contains(&target) {
        return Err(GameError::InvalidConfiguration(format!(
            "dice target {target} outside 2..{DICE_SIDES}"
        )));
    }
    Ok(target)
}

pub struct Dice {
    session: Session,
    target: u8,
    house_edge: f64,
}

impl Dice {
    pub fn new(config: &DiceConfig, house_edge: f64) -> Result<Self, GameError> {
        Ok(Self {
            session: Session::new(GameId::Dice),
            target: validate_target(config.target)?,
            house_edge,
        })
    }

    pub fn target(&self) -> u8 {
        self.target
    }

    pub fn multiplier(&self) -> f64 {
        multiplier(self.target, self.house_edge)
    }
}

impl Game for Dice {
    fn session(&self) -> &Session {
        &self.session
    }

    fn start<S: Store>(&mut self, ctx: &mut Context<'_, S>, amount: u64) -> Result<(), GameError> {
        let bet = self.session.begin(ctx, amount)?;
        self.session.resolving()?;

        let roll = ctx.rng.next_bounded(u32::from(DICE_SIDES)) as u8 + 1;
        ctx.progress(
            GameId::Dice,
            Progress::Rolled {
                roll,
                target: self.target,
            },
        );
        let payout = if roll < self.target {
            (bet.amount as f64 * self.multiplier()).floor()
        } else {
            0.0
        };
        self.session.settle(ctx, payout)?;
        Ok(())
    }

    fn decide<S: Store>(&mut self, _ctx: &mut Context<'_, S>, decision: Decision) -> Result<(), GameError> {
        match decision {
            Decision::Target(target) if self.session.phase().accepts_wager() => {
                self.target = validate_target(target)?;
                Ok(())
            }
            _ => Err(GameError::InvalidMove),
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
    use parlor_types::casino::{Event, Phase, HOUSE_EDGE};

    fn dice() -> Dice {
        Dice::new(&DiceConfig::default(), HOUSE_EDGE).unwrap()
    }

    #[test]
    fn test_multiplier() {
        // 49% chance at the default target.
        assert!((win_probability(50) - 0.49).abs() < 1e-12);
        assert!((multiplier(50, 0.95) - 0.95 / 0.49).abs() < 1e-12);
        // Near-certain targets are floored.
        assert_eq!(multiplier(99, 0.95), DICE_MIN_MULTIPLIER);
        assert!((multiplier(2, 0.95) - 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_target_bounds() {
        let mut dice = dice();
        let mut harness = Harness::new(1_000);
        let mut ctx = harness.ctx();
        for bad in [0, 1, 100, 200] {
            assert!(matches!(
                dice.decide(&mut ctx, Decision::Target(bad)),
                Err(GameError::InvalidConfiguration(_))
            ));
        }
        dice.decide(&mut ctx, Decision::Target(75)).unwrap();
        assert_eq!(dice.target(), 75);
        assert!(Dice::new(&DiceConfig { target: 1 }, HOUSE_EDGE).is_err());
    }

    #[test]
    fn test_win_and_loss_balances() {
        let mut saw_win = false;
        let mut saw_loss = false;
        for seed in 0..200 {
            let mut harness = Harness::seeded(1_000, seed);
            let mut dice = dice();
            dice.start(&mut harness.ctx(), 100).unwrap();
            assert_eq!(dice.session().phase(), Phase::Settled);

            let roll = harness
                .events
                .iter()
                .find_map(|event| match event {
                    Event::Progress {
                        progress: Progress::Rolled { roll, .. },
                        ..
                    } => Some(*roll),
                    _ => None,
                })
                .unwrap();
            assert!((1..=100).contains(&roll));
            if roll < 50 {
                assert_eq!(harness.balance(), 1_093);
                saw_win = true;
            } else {
                assert_eq!(harness.balance(), 900);
                saw_loss = true;
            }
            if saw_win && saw_loss {
                break;
            }
        }
        assert!(saw_win && saw_loss);
    }

    #[test]
    fn test_target_locked_while_rolling_only() {
        let mut dice = dice();
        let mut harness = Harness::new(1_000);
        dice.start(&mut harness.ctx(), 10).unwrap();
        // The round settled synchronously, so the target can change again.
        dice.decide(&mut harness.ctx(), Decision::Target(20)).unwrap();
        assert!(dice.decide(&mut harness.ctx(), Decision::Hit).is_err());
    }
}
