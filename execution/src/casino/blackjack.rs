//! Single-deck blackjack against an auto-playing dealer.
//!
//! Two cards each are dealt; the dealer's first card stays hidden until the player
//! stands. A natural 21 pays 2.5x (1x if the dealer also has 21). After standing the
//! dealer draws on a timer chain until reaching 17. A win pays 2x and a tie returns the
//! wager.
//!
//! Cards are 0-51: suit = card/13, rank = card%13 + 1 (1 = Ace, 11-13 = J/Q/K).

use super::{Context, Game, GameError};
use crate::{config::BlackjackConfig, scheduler::Timer, session::Session, Step, Store};
use parlor_types::casino::{Decision, GameId, Progress, DEALER_STANDS_ON};

/// Calculate hand value (returns value and whether it's soft).
/// A soft hand contains an ace counted as 11.
pub fn hand_value(cards: &[u8]) -> (u8, bool) {
    let mut value: u16 = 0;
    let mut aces: u8 = 0;

    for &card in cards {
        let rank = (card % 13) + 1;
        if rank == 1 {
            aces += 1;
            value += 11;
        } else if rank >= 10 {
            value += 10;
        } else {
            value += rank as u16;
        }
    }

    while value > 21 && aces > 0 {
        value -= 10;
        aces -= 1;
    }

    let is_soft = aces > 0 && value <= 21;
    (value.min(255) as u8, is_soft)
}

/// Check if hand is a blackjack (21 with 2 cards).
pub fn is_blackjack(cards: &[u8]) -> bool {
    cards.len() == 2 && hand_value(cards).0 == 21
}

/// Multiplier returned for a finished hand.
pub fn outcome_multiplier(player: u8, dealer: u8) -> f64 {
    if player > 21 {
        0.0
    } else if dealer > 21 || player > dealer {
        2.0
    } else if player == dealer {
        1.0
    } else {
        0.0
    }
}

pub struct Blackjack {
    session: Session,
    deck: Vec<u8>,
    player: Vec<u8>,
    dealer: Vec<u8>,
    first_draw_ms: u64,
    draw_ms: u64,
}

impl Blackjack {
    pub fn new(config: &BlackjackConfig) -> Self {
        Self {
            session: Session::new(GameId::Blackjack),
            deck: Vec::new(),
            player: Vec::new(),
            dealer: Vec::new(),
            first_draw_ms: config.first_draw_ms,
            draw_ms: config.draw_ms,
        }
    }

    pub fn player(&self) -> &[u8] {
        &self.player
    }

    pub fn dealer(&self) -> &[u8] {
        &self.dealer
    }

    /// Draw a card, replacing the deck with the cards not in play if it ran out.
    fn draw<S: Store>(&mut self, ctx: &mut Context<'_, S>) -> u8 {
        loop {
            if let Some(card) = ctx.rng.draw_card(&mut self.deck) {
                return card;
            }
            let in_play: Vec<u8> = self.player.iter().chain(&self.dealer).copied().collect();
            self.deck = ctx.rng.create_deck_excluding(&in_play);
        }
    }

    fn deal_player<S: Store>(&mut self, ctx: &mut Context<'_, S>) -> u8 {
        let card = self.draw(ctx);
        self.player.push(card);
        let total = hand_value(&self.player).0;
        ctx.progress(GameId::Blackjack, Progress::PlayerCard { card, total });
        total
    }

    fn deal_dealer<S: Store>(&mut self, ctx: &mut Context<'_, S>) {
        let card = self.draw(ctx);
        self.dealer.push(card);
    }

    fn show_dealer<S: Store>(&self, ctx: &mut Context<'_, S>, card: u8) {
        let total = hand_value(&self.dealer).0;
        ctx.progress(GameId::Blackjack, Progress::DealerCard { card, total });
    }

    fn payout(&self, multiplier: f64) -> f64 {
        let bet = self.session.bet().map_or(0, |bet| bet.amount);
        bet as f64 * multiplier
    }

    fn dealer_turn<S: Store>(&mut self, ctx: &mut Context<'_, S>) -> Result<(), GameError> {
        let dealer = hand_value(&self.dealer).0;
        if dealer < DEALER_STANDS_ON {
            self.deal_dealer(ctx);
            if let Some(&card) = self.dealer.last() {
                self.show_dealer(ctx, card);
            }
            self.session.schedule(ctx, self.draw_ms, Step::Dealer);
            return Ok(());
        }
        let player = hand_value(&self.player).0;
        let payout = self.payout(outcome_multiplier(player, dealer));
        self.session.settle(ctx, payout)?;
        Ok(())
    }
}

impl Game for Blackjack {
    fn session(&self) -> &Session {
        &self.session
    }

    fn start<S: Store>(&mut self, ctx: &mut Context<'_, S>, amount: u64) -> Result<(), GameError> {
        self.session.begin(ctx, amount)?;
        self.deck = ctx.rng.create_deck();
        self.player.clear();
        self.dealer.clear();

        self.deal_player(ctx);
        self.deal_player(ctx);
        self.deal_dealer(ctx);
        self.deal_dealer(ctx);
        // Only the up card is shown.
        let up = self.dealer[1];
        ctx.progress(
            GameId::Blackjack,
            Progress::DealerCard {
                card: up,
                total: hand_value(&[up]).0,
            },
        );

        if is_blackjack(&self.player) {
            self.session.resolving()?;
            self.show_dealer(ctx, self.dealer[0]);
            let multiplier = if hand_value(&self.dealer).0 == 21 {
                1.0
            } else {
                2.5
            };
            let payout = self.payout(multiplier);
            self.session.settle(ctx, payout)?;
        }
        Ok(())
    }

    fn decide<S: Store>(&mut self, ctx: &mut Context<'_, S>, decision: Decision) -> Result<(), GameError> {
        if !self.session.is_active() {
            return Err(GameError::InvalidMove);
        }
        match decision {
            Decision::Hit => {
                if self.deal_player(ctx) > 21 {
                    self.session.settle(ctx, 0.0)?;
                }
                Ok(())
            }
            Decision::Stand => {
                self.session.resolving()?;
                self.show_dealer(ctx, self.dealer[0]);
                self.session
                    .schedule(ctx, self.first_draw_ms, Step::Dealer);
                Ok(())
            }
            _ => Err(GameError::InvalidMove),
        }
    }

    fn on_timer<S: Store>(&mut self, ctx: &mut Context<'_, S>, timer: Timer) -> Result<(), GameError> {
        self.session.guard(timer.generation)?;
        match timer.step {
            Step::Dealer => self.dealer_turn(ctx),
            _ => Err(self.session.stale(timer.generation)),
        }
    }

    fn reset<S: Store>(&mut self, ctx: &mut Context<'_, S>, reason: &str) {
        self.session.reset(ctx, reason);
        self.player.clear();
        self.dealer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::Harness;
    use parlor_types::casino::Phase;

    #[test]
    fn test_hand_value() {
        // Ace of spades (0) + King (12) = 21
        assert_eq!(hand_value(&[0, 12]), (21, true));
        // Ace + Ace + 9 = 21 (one ace counted as 1)
        assert_eq!(hand_value(&[0, 13, 8]), (21, true));
        // 10 + 6 + 8 = 24 (bust)
        assert_eq!(hand_value(&[9, 5, 7]), (24, false));
        // Ace + 5 + King = 16 (ace counted as 1)
        assert_eq!(hand_value(&[0, 4, 12]), (16, false));
    }

    #[test]
    fn test_is_blackjack() {
        assert!(is_blackjack(&[0, 12]));
        assert!(!is_blackjack(&[0, 4, 5]));
        assert!(!is_blackjack(&[9, 10]));
    }

    #[test]
    fn test_outcome_multiplier() {
        assert_eq!(outcome_multiplier(22, 18), 0.0);
        assert_eq!(outcome_multiplier(18, 22), 2.0);
        assert_eq!(outcome_multiplier(19, 18), 2.0);
        assert_eq!(outcome_multiplier(18, 18), 1.0);
        assert_eq!(outcome_multiplier(17, 20), 0.0);
    }

    #[test]
    fn test_rounds_always_settle_once() {
        for seed in 0..50 {
            let mut game = Blackjack::new(&BlackjackConfig::default());
            let mut harness = Harness::seeded(1_000, seed);
            game.start(&mut harness.ctx(), 100).unwrap();
            assert_eq!(game.player().len(), 2);
            assert_eq!(game.dealer().len(), 2);

            if game.session().is_active() {
                game.decide(&mut harness.ctx(), Decision::Stand).unwrap();
                assert_eq!(game.session().phase(), Phase::Resolving);
                assert_eq!(
                    game.decide(&mut harness.ctx(), Decision::Hit),
                    Err(GameError::InvalidMove)
                );
                harness.run(&mut game);
                assert!(hand_value(game.dealer()).0 >= DEALER_STANDS_ON);
            }

            assert_eq!(game.session().phase(), Phase::Settled);
            let (count, paid) = harness.settlements();
            assert_eq!(count, 1);
            assert!([0, 100, 200, 250].contains(&paid), "paid {paid}");
            assert_eq!(harness.balance(), 900 + paid);
        }
    }

    #[test]
    fn test_bust_forfeits() {
        for seed in 0..50 {
            let mut game = Blackjack::new(&BlackjackConfig::default());
            let mut harness = Harness::seeded(1_000, seed);
            game.start(&mut harness.ctx(), 100).unwrap();
            while game.session().is_active() {
                game.decide(&mut harness.ctx(), Decision::Hit).unwrap();
            }
            if hand_value(game.player()).0 > 21 {
                assert_eq!(harness.balance(), 900);
                assert_eq!(harness.settlements(), (1, 0));
                // Nothing was left scheduled.
                assert!(harness.scheduler.next_due().is_none());
                return;
            }
        }
        panic!("no bust in 50 rounds");
    }

    #[test]
    fn test_dealer_chain_timing() {
        let mut game = Blackjack::new(&BlackjackConfig::default());
        let mut harness = Harness::new(1_000);
        game.start(&mut harness.ctx(), 100).unwrap();
        if !game.session().is_active() {
            return;
        }
        // Force a hand the dealer must draw to.
        game.dealer = vec![1, 2]; // 2 + 3
        game.decide(&mut harness.ctx(), Decision::Stand).unwrap();
        assert_eq!(harness.scheduler.next_due(), Some(500));
        let fired = harness.run(&mut game);
        // One step per dealer card, plus the settling step.
        assert_eq!(fired, game.dealer().len() - 2 + 1);
        assert_eq!(
            harness.scheduler.now(),
            500 + 800 * (game.dealer().len() as u64 - 2)
        );
    }
}
