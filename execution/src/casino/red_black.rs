//! Red/Black: guess the color of the next card, doubling the multiplier with each
//! correct guess.
//!
//! A wrong guess forfeits the wager. After a correct guess the player may cash out at
//! `2^streak * house_edge`. The deck is a single shuffled 52-card deck that is replaced
//! by a fresh one when it runs out.

use super::{Context, Game, GameError};
use crate::{config::RedBlackConfig, scheduler::Timer, session::Session, Step, Store};
use parlor_types::casino::{card_color, Color, Controls, Decision, GameId, Phase, Progress};
use tracing::debug;

/// Multiplier after `streak` correct guesses.
pub fn multiplier(streak: u32, house_edge: f64) -> f64 {
    2f64.powi(streak as i32) * house_edge
}

pub struct RedBlack {
    session: Session,
    deck: Vec<u8>,
    streak: u32,
    /// Guess and card awaiting the flip.
    pending: Option<(Color, u8)>,
    house_edge: f64,
    flip_ms: u64,
}

impl RedBlack {
    pub fn new(config: &RedBlackConfig, house_edge: f64) -> Result<Self, GameError> {
        Ok(Self {
            session: Session::new(GameId::RedBlack),
            deck: Vec::new(),
            streak: 0,
            pending: None,
            house_edge,
            flip_ms: config.flip_ms,
        })
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn cards_left(&self) -> usize {
        self.deck.len()
    }

    fn can_cash_out(&self) -> bool {
        self.session.is_active() && self.pending.is_none() && self.streak > 0
    }

    fn guess<S: Store>(&mut self, ctx: &mut Context<'_, S>, color: Color) -> Result<(), GameError> {
        if !self.session.is_active() || self.pending.is_some() {
            return Err(GameError::InvalidMove);
        }
        if self.deck.is_empty() {
            debug!("reshuffling red/black deck");
            self.deck = ctx.rng.create_deck();
        }
        let Some(card) = self.deck.pop() else {
            return Err(GameError::InvalidMove);
        };
        self.pending = Some((color, card));
        self.session.schedule(ctx, self.flip_ms, Step::Flip);
        Ok(())
    }

    fn flip<S: Store>(&mut self, ctx: &mut Context<'_, S>) -> Result<(), GameError> {
        let Some((color, card)) = self.pending.take() else {
            return Err(GameError::InvalidMove);
        };
        let correct = card_color(card) == color;
        if correct {
            self.streak += 1;
        }
        ctx.progress(
            GameId::RedBlack,
            Progress::Flipped {
                card,
                correct,
                streak: self.streak,
            },
        );
        if !correct {
            self.session.settle(ctx, 0.0)?;
        }
        Ok(())
    }
}

impl Game for RedBlack {
    fn session(&self) -> &Session {
        &self.session
    }

    fn start<S: Store>(&mut self, ctx: &mut Context<'_, S>, amount: u64) -> Result<(), GameError> {
        self.session.begin(ctx, amount)?;
        self.deck = ctx.rng.create_deck();
        self.streak = 0;
        self.pending = None;
        Ok(())
    }

    fn decide<S: Store>(&mut self, ctx: &mut Context<'_, S>, decision: Decision) -> Result<(), GameError> {
        match decision {
            Decision::Guess(color) => self.guess(ctx, color),
            _ => Err(GameError::InvalidMove),
        }
    }

    fn cash_out<S: Store>(&mut self, ctx: &mut Context<'_, S>) -> Result<u64, GameError> {
        if !self.can_cash_out() {
            return Err(GameError::InvalidMove);
        }
        let bet = self.session.bet().map_or(0, |bet| bet.amount);
        let payout = (bet as f64 * multiplier(self.streak, self.house_edge)).floor();
        self.session.settle(ctx, payout)
    }

    fn on_timer<S: Store>(&mut self, ctx: &mut Context<'_, S>, timer: Timer) -> Result<(), GameError> {
        self.session.guard(timer.generation)?;
        match timer.step {
            Step::Flip => self.flip(ctx),
            _ => Err(self.session.stale(timer.generation)),
        }
    }

    fn reset<S: Store>(&mut self, ctx: &mut Context<'_, S>, reason: &str) {
        self.session.reset(ctx, reason);
        self.streak = 0;
        self.pending = None;
    }

    fn controls(&self, live: bool, balance: u64) -> Controls {
        let phase = self.session.phase();
        Controls {
            can_bet: phase.accepts_wager() && balance > 0,
            can_act: phase == Phase::Active && !live && self.pending.is_none(),
            can_cash_out: self.can_cash_out(),
        }
    }
}
