//! Round bookkeeping shared by every game.
//!
//! A [Session] walks the Betting → Active → Resolving → Settled machine and owns the
//! outstanding [Bet]. Starting a round or resetting cancels the live chain and bumps the
//! generation before anything else changes; settling pays exactly once.

use crate::{
    casino::{Context, GameError},
    scheduler::{Generation, Step, Timer},
    Store,
};
use parlor_types::casino::{Bet, Event, GameId, Phase};
use tracing::{debug, info, warn};

#[derive(Clone, Debug)]
pub struct Session {
    game: GameId,
    phase: Phase,
    bet: Option<Bet>,
    generation: Generation,
}

impl Session {
    pub fn new(game: GameId) -> Self {
        Self {
            game,
            phase: Phase::Betting,
            bet: None,
            generation: 0,
        }
    }

    pub fn game(&self) -> GameId {
        self.game
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bet(&self) -> Option<Bet> {
        self.bet
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// Reserve `amount` and open a round.
    pub fn begin<S: Store>(&mut self, ctx: &mut Context<'_, S>, amount: u64) -> Result<Bet, GameError> {
        if !self.phase.accepts_wager() {
            return Err(GameError::InvalidMove);
        }
        self.supersede(ctx);
        let amount = ctx.ledger.reserve(amount)?;
        let bet = Bet {
            amount,
            game: self.game,
            created_at: ctx.scheduler.now(),
        };
        self.bet = Some(bet);
        self.phase = Phase::Active;
        ctx.emit(Event::Balance {
            balance: ctx.ledger.balance(),
        });
        ctx.emit(Event::RoundStarted {
            game: self.game,
            bet: amount,
        });
        info!(game = %self.game, bet = amount, generation = self.generation, "round started");
        Ok(bet)
    }

    /// Stop accepting decisions; the round is waiting on its terminal chain.
    pub fn resolving(&mut self) -> Result<(), GameError> {
        if self.phase != Phase::Active {
            return Err(GameError::InvalidMove);
        }
        self.phase = Phase::Resolving;
        Ok(())
    }

    /// Fail with [GameError::StaleResolution] unless `generation` names the open round.
    pub fn guard(&self, generation: Generation) -> Result<(), GameError> {
        if generation != self.generation || !self.phase.holds_bet() {
            return Err(self.stale(generation));
        }
        Ok(())
    }

    pub fn stale(&self, captured: Generation) -> GameError {
        GameError::StaleResolution {
            captured,
            current: self.generation,
        }
    }

    /// Arm the next step of this round's chain.
    pub fn schedule<S: Store>(&self, ctx: &mut Context<'_, S>, delay: u64, step: Step) -> Timer {
        ctx.scheduler
            .schedule(self.game, self.generation, delay, step)
    }

    /// Whether this round still has a pending timer.
    pub fn is_live<S: Store>(&self, ctx: &Context<'_, S>) -> bool {
        ctx.scheduler.is_live(self.game, self.generation)
    }

    /// Pay `payout` (zero on a loss) and close the round.
    ///
    /// Fails without paying if the round was already settled or forfeited.
    pub fn settle<S: Store>(&mut self, ctx: &mut Context<'_, S>, payout: f64) -> Result<u64, GameError> {
        let Some(bet) = self.bet else {
            return Err(self.stale(self.generation));
        };
        let paid = ctx.ledger.award(payout)?;
        self.bet = None;
        self.phase = Phase::Settled;
        ctx.scheduler.cancel(self.game, self.generation);
        if paid > 0 {
            ctx.emit(Event::Balance {
                balance: ctx.ledger.balance(),
            });
        }
        ctx.emit(Event::Settled {
            game: self.game,
            bet: bet.amount,
            payout: paid,
        });
        info!(game = %self.game, bet = bet.amount, payout = paid, "round settled");
        Ok(paid)
    }

    /// Return to Betting, forfeiting any outstanding bet. Safe to repeat.
    pub fn reset<S: Store>(&mut self, ctx: &mut Context<'_, S>, reason: &str) {
        self.supersede(ctx);
        if let Some(bet) = self.bet.take() {
            warn!(game = %self.game, bet = bet.amount, reason, "bet forfeited");
            ctx.emit(Event::Forfeited {
                game: self.game,
                bet: bet.amount,
                reason: reason.to_string(),
            });
        }
        self.phase = Phase::Betting;
    }

    fn supersede<S: Store>(&mut self, ctx: &mut Context<'_, S>) {
        ctx.scheduler.cancel(self.game, self.generation);
        self.generation += 1;
        debug!(game = %self.game, generation = self.generation, "new generation");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::Harness;

    #[test]
    fn test_round_walks_the_phases() {
        let mut harness = Harness::new(1_000);
        let mut session = Session::new(GameId::Wheel);
        let mut ctx = harness.ctx();

        session.begin(&mut ctx, 100).unwrap();
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(ctx.ledger.balance(), 900);

        session.resolving().unwrap();
        assert_eq!(session.phase(), Phase::Resolving);
        assert_eq!(session.resolving(), Err(GameError::InvalidMove));

        assert_eq!(session.settle(&mut ctx, 250.0), Ok(250));
        assert_eq!(session.phase(), Phase::Settled);
        assert_eq!(ctx.ledger.balance(), 1_150);

        // Settled accepts the next wager.
        session.begin(&mut ctx, 10).unwrap();
        assert_eq!(session.phase(), Phase::Active);
    }

    #[test]
    fn test_rejected_wager_changes_nothing() {
        let mut harness = Harness::new(50);
        let mut session = Session::new(GameId::Dice);
        let mut ctx = harness.ctx();

        assert!(session.begin(&mut ctx, 51).is_err());
        assert!(session.begin(&mut ctx, 0).is_err());
        assert_eq!(session.phase(), Phase::Betting);
        assert_eq!(session.bet(), None);
        assert_eq!(ctx.ledger.balance(), 50);
    }

    #[test]
    fn test_no_second_wager_while_open() {
        let mut harness = Harness::new(1_000);
        let mut session = Session::new(GameId::Dice);
        let mut ctx = harness.ctx();
        session.begin(&mut ctx, 10).unwrap();
        assert_eq!(session.begin(&mut ctx, 10), Err(GameError::InvalidMove));
        assert_eq!(ctx.ledger.balance(), 990);
    }

    #[test]
    fn test_settles_once() {
        let mut harness = Harness::new(1_000);
        let mut session = Session::new(GameId::Wheel);
        let mut ctx = harness.ctx();
        session.begin(&mut ctx, 100).unwrap();
        session.settle(&mut ctx, 0.0).unwrap();
        assert!(matches!(
            session.settle(&mut ctx, 500.0),
            Err(GameError::StaleResolution { .. })
        ));
        assert_eq!(ctx.ledger.balance(), 900);
    }

    #[test]
    fn test_reset_forfeits_once_and_cancels() {
        let mut harness = Harness::new(1_000);
        let mut session = Session::new(GameId::Wheel);
        {
            let mut ctx = harness.ctx();
            session.begin(&mut ctx, 100).unwrap();
            let timer = session.schedule(&mut ctx, 4_000, Step::Spin);
            session.reset(&mut ctx, "switched");
            session.reset(&mut ctx, "switched");

            assert_eq!(session.phase(), Phase::Betting);
            assert_eq!(session.bet(), None);
            assert!(ctx.scheduler.pending().next().is_none());
            assert!(session.guard(timer.generation).is_err());
            assert_eq!(ctx.ledger.balance(), 900);
        }
        let forfeits = harness
            .events
            .iter()
            .filter(|event| matches!(event, Event::Forfeited { .. }))
            .count();
        assert_eq!(forfeits, 1);
    }

    #[test]
    fn test_guard_rejects_settled_round() {
        let mut harness = Harness::new(1_000);
        let mut session = Session::new(GameId::Crash);
        let mut ctx = harness.ctx();
        session.begin(&mut ctx, 100).unwrap();
        let generation = session.generation();
        assert!(session.guard(generation).is_ok());
        session.settle(&mut ctx, 120.0).unwrap();
        assert!(session.guard(generation).is_err());
    }
}
