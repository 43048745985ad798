//! Mines: reveal safe cells on a hidden board and cash out before hitting a mine.
//!
//! With `T` cells and `M` mines, the chance of surviving `g` reveals is the
//! hypergeometric `C(T-M, g) / C(T, g)`. The multiplier after `g` gems is the house
//! edge over that chance, never below 1.

use super::{combinations, Context, Game, GameError};
use crate::{config::MinesConfig, session::Session, Store};
use parlor_types::casino::{Controls, Decision, GameId, Phase, Progress};

/// Probability that `gems` consecutive reveals are all safe.
pub fn survival_probability(cells: u8, mines: u8, gems: u8) -> f64 {
    let safe = u32::from(cells.saturating_sub(mines));
    combinations(safe, u32::from(gems)) / combinations(u32::from(cells), u32::from(gems))
}

/// Multiplier after `gems` safe reveals.
pub fn multiplier(cells: u8, mines: u8, gems: u8, house_edge: f64) -> f64 {
    if gems == 0 {
        return 1.0;
    }
    let gems = gems.min(cells.saturating_sub(mines));
    (house_edge / survival_probability(cells, mines, gems)).max(1.0)
}

fn validate_count(cells: u8, mines: u8) -> Result<(), GameError> {
    if mines < 1 || mines >= cells.saturating_sub(1) {
        return Err(GameError::InvalidConfiguration(format!(
            "mine count {mines} must be in [1, {})",
            cells.saturating_sub(1)
        )));
    }
    Ok(())
}

pub struct Mines {
    session: Session,
    cells: u8,
    mines: u8,
    house_edge: f64,
    board: Vec<bool>,
    revealed: Vec<bool>,
    gems: u8,
}

impl Mines {
    pub fn new(config: &MinesConfig, house_edge: f64) -> Result<Self, GameError> {
        if config.cells < 3 {
            return Err(GameError::InvalidConfiguration(format!(
                "mines board needs at least 3 cells, got {}",
                config.cells
            )));
        }
        validate_count(config.cells, config.mines)?;
        Ok(Self {
            session: Session::new(GameId::Mines),
            cells: config.cells,
            mines: config.mines,
            house_edge,
            board: vec![false; config.cells as usize],
            revealed: vec![false; config.cells as usize],
            gems: 0,
        })
    }

    pub fn mines(&self) -> u8 {
        self.mines
    }

    pub fn gems(&self) -> u8 {
        self.gems
    }

    pub fn revealed(&self) -> &[bool] {
        &self.revealed
    }

    /// Multiplier the player would cash out at now.
    pub fn current_multiplier(&self) -> f64 {
        multiplier(self.cells, self.mines, self.gems, self.house_edge)
    }

    /// Multiplier the next safe reveal would reach.
    pub fn next_multiplier(&self) -> f64 {
        multiplier(self.cells, self.mines, self.gems + 1, self.house_edge)
    }

    fn safe_cells(&self) -> u8 {
        self.cells - self.mines
    }

    #[cfg(test)]
    pub(crate) fn is_mine(&self, cell: u8) -> bool {
        self.board[cell as usize]
    }

    fn clear_board(&mut self) {
        self.board.iter_mut().for_each(|cell| *cell = false);
        self.revealed.iter_mut().for_each(|cell| *cell = false);
        self.gems = 0;
    }

    fn payout(&self) -> f64 {
        let bet = self.session.bet().map_or(0, |bet| bet.amount);
        (bet as f64 * self.current_multiplier()).floor()
    }

    fn reveal<S: Store>(&mut self, ctx: &mut Context<'_, S>, cell: u8) -> Result<(), GameError> {
        if !self.session.is_active() {
            return Err(GameError::InvalidMove);
        }
        let index = cell as usize;
        if index >= self.board.len() || self.revealed[index] {
            return Err(GameError::InvalidMove);
        }
        self.revealed[index] = true;

        if self.board[index] {
            ctx.progress(GameId::Mines, Progress::Mine { cell });
            self.session.settle(ctx, 0.0)?;
            return Ok(());
        }

        self.gems += 1;
        ctx.progress(
            GameId::Mines,
            Progress::Gem {
                cell,
                gems: self.gems,
                multiplier: self.current_multiplier(),
            },
        );
        if self.gems == self.safe_cells() {
            let payout = self.payout();
            self.session.settle(ctx, payout)?;
        }
        Ok(())
    }
}

impl Game for Mines {
    fn session(&self) -> &Session {
        &self.session
    }

    fn start<S: Store>(&mut self, ctx: &mut Context<'_, S>, amount: u64) -> Result<(), GameError> {
        self.session.begin(ctx, amount)?;
        self.clear_board();

        let mut order: Vec<usize> = (0..self.board.len()).collect();
        ctx.rng.shuffle(&mut order);
        for &index in order.iter().take(self.mines as usize) {
            self.board[index] = true;
        }
        Ok(())
    }

    fn decide<S: Store>(&mut self, ctx: &mut Context<'_, S>, decision: Decision) -> Result<(), GameError> {
        match decision {
            Decision::Mines(count) if self.session.phase().accepts_wager() => {
                validate_count(self.cells, count)?;
                self.mines = count;
                Ok(())
            }
            Decision::Reveal(cell) => self.reveal(ctx, cell),
            _ => Err(GameError::InvalidMove),
        }
    }

    fn cash_out<S: Store>(&mut self, ctx: &mut Context<'_, S>) -> Result<u64, GameError> {
        if !self.session.is_active() || self.gems == 0 {
            return Err(GameError::InvalidMove);
        }
        let payout = self.payout();
        self.session.settle(ctx, payout)
    }

    fn reset<S: Store>(&mut self, ctx: &mut Context<'_, S>, reason: &str) {
        self.session.reset(ctx, reason);
        self.clear_board();
    }

    fn controls(&self, _live: bool, balance: u64) -> Controls {
        let phase = self.session.phase();
        Controls {
            can_bet: phase.accepts_wager() && balance > 0,
            can_act: phase == Phase::Active,
            can_cash_out: phase == Phase::Active && self.gems > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::Harness;
    use parlor_types::casino::{HOUSE_EDGE, MINES_CELLS};

    fn mines(count: u8) -> Mines {
        Mines::new(
            &MinesConfig {
                cells: MINES_CELLS,
                mines: count,
            },
            HOUSE_EDGE,
        )
        .unwrap()
    }

    fn safe_cells(game: &Mines) -> Vec<u8> {
        (0..MINES_CELLS).filter(|cell| !game.is_mine(*cell)).collect()
    }

    #[test]
    fn test_multiplier_curve() {
        assert_eq!(multiplier(25, 3, 0, 0.95), 1.0);
        // 0.95 / (22/25)
        assert!((multiplier(25, 3, 1, 0.95) - 1.0795454545).abs() < 1e-6);

        let mut previous = 1.0;
        for gems in 1..=22 {
            let current = multiplier(25, 3, gems, 0.95);
            assert!(current > previous, "gems {gems}");
            previous = current;
        }
        // Every cell safe: C(25,22) / C(22,22) = 2300
        assert!((multiplier(25, 3, 22, 0.95) - 2_185.0).abs() < 1e-6);
        assert_eq!(multiplier(25, 3, 23, 0.95), multiplier(25, 3, 22, 0.95));
    }

    #[test]
    fn test_mine_count_bounds() {
        assert!(validate_count(25, 0).is_err());
        assert!(validate_count(25, 1).is_ok());
        assert!(validate_count(25, 23).is_ok());
        assert!(validate_count(25, 24).is_err());
        assert!(validate_count(25, 25).is_err());

        let mut game = mines(3);
        let mut harness = Harness::new(1_000);
        let mut ctx = harness.ctx();
        assert!(matches!(
            game.decide(&mut ctx, Decision::Mines(24)),
            Err(GameError::InvalidConfiguration(_))
        ));
        game.decide(&mut ctx, Decision::Mines(5)).unwrap();
        assert_eq!(game.mines(), 5);
    }

    #[test]
    fn test_board_has_requested_mines() {
        let mut game = mines(7);
        let mut harness = Harness::new(1_000);
        game.start(&mut harness.ctx(), 10).unwrap();
        let placed = (0..MINES_CELLS).filter(|cell| game.is_mine(*cell)).count();
        assert_eq!(placed, 7);
    }

    #[test]
    fn test_cash_out_after_gems() {
        let mut game = mines(3);
        let mut harness = Harness::new(1_000);
        game.start(&mut harness.ctx(), 100).unwrap();
        assert_eq!(harness.balance(), 900);

        // No gems yet.
        assert_eq!(game.cash_out(&mut harness.ctx()), Err(GameError::InvalidMove));
        assert!(!game.controls(false, 900).can_cash_out);

        let safe = safe_cells(&game);
        game.decide(&mut harness.ctx(), Decision::Reveal(safe[0])).unwrap();
        game.decide(&mut harness.ctx(), Decision::Reveal(safe[1])).unwrap();
        // Revealing twice is rejected.
        assert_eq!(
            game.decide(&mut harness.ctx(), Decision::Reveal(safe[1])),
            Err(GameError::InvalidMove)
        );
        assert!(game.controls(false, 900).can_cash_out);

        let expected = (100.0 * multiplier(25, 3, 2, 0.95)).floor() as u64;
        assert_eq!(game.cash_out(&mut harness.ctx()), Ok(expected));
        assert_eq!(harness.balance(), 900 + expected);
        assert_eq!(game.session().phase(), Phase::Settled);
        assert_eq!(game.cash_out(&mut harness.ctx()), Err(GameError::InvalidMove));
    }

    #[test]
    fn test_mine_forfeits_bet() {
        let mut game = mines(3);
        let mut harness = Harness::new(1_000);
        game.start(&mut harness.ctx(), 100).unwrap();
        let safe = safe_cells(&game);
        game.decide(&mut harness.ctx(), Decision::Reveal(safe[0])).unwrap();
        let mine = (0..MINES_CELLS).find(|cell| game.is_mine(*cell)).unwrap();
        game.decide(&mut harness.ctx(), Decision::Reveal(mine)).unwrap();

        assert_eq!(game.session().phase(), Phase::Settled);
        assert_eq!(harness.balance(), 900);
        assert_eq!(harness.settlements(), (1, 0));
    }

    #[test]
    fn test_clearing_board_forces_settlement() {
        let mut game = mines(3);
        let mut harness = Harness::new(1_000);
        game.start(&mut harness.ctx(), 100).unwrap();
        for cell in safe_cells(&game) {
            game.decide(&mut harness.ctx(), Decision::Reveal(cell)).unwrap();
        }
        assert_eq!(game.gems(), 22);
        assert_eq!(game.session().phase(), Phase::Settled);
        assert_eq!(harness.balance(), 900 + 218_500);
        assert_eq!(harness.settlements(), (1, 218_500));
    }

    #[test]
    fn test_reveal_requires_round() {
        let mut game = mines(3);
        let mut harness = Harness::new(1_000);
        assert_eq!(
            game.decide(&mut harness.ctx(), Decision::Reveal(0)),
            Err(GameError::InvalidMove)
        );
        game.start(&mut harness.ctx(), 10).unwrap();
        assert_eq!(
            game.decide(&mut harness.ctx(), Decision::Reveal(MINES_CELLS)),
            Err(GameError::InvalidMove)
        );
        assert_eq!(
            game.decide(&mut harness.ctx(), Decision::Mines(4)),
            Err(GameError::InvalidMove)
        );
    }
}
