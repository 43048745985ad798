//! Multiplier grid: the pool is shuffled under 25 tiles and the player turns one over.

use super::{validate_multipliers, Context, Game, GameError};
use crate::{config::GridConfig, session::Session, Store};
use parlor_types::casino::{Decision, GameId, Progress, GRID_TILES};

pub struct Grid {
    session: Session,
    pool: Vec<f64>,
    tiles: Vec<f64>,
}

impl Grid {
    pub fn new(config: &GridConfig) -> Result<Self, GameError> {
        validate_multipliers("grid", &config.pool)?;
        if config.pool.len() != GRID_TILES {
            return Err(GameError::InvalidConfiguration(format!(
                "grid pool has {} entries, expected {GRID_TILES}",
                config.pool.len()
            )));
        }
        Ok(Self {
            session: Session::new(GameId::Grid),
            pool: config.pool.clone(),
            tiles: Vec::new(),
        })
    }

    fn pick<S: Store>(&mut self, ctx: &mut Context<'_, S>, tile: u8) -> Result<(), GameError> {
        if !self.session.is_active() {
            return Err(GameError::InvalidMove);
        }
        let Some(&multiplier) = self.tiles.get(tile as usize) else {
            return Err(GameError::InvalidMove);
        };
        ctx.progress(GameId::Grid, Progress::Tile { tile, multiplier });
        let bet = self.session.bet().map_or(0, |bet| bet.amount);
        self.session.settle(ctx, bet as f64 * multiplier)?;
        Ok(())
    }
}

impl Game for Grid {
    fn session(&self) -> &Session {
        &self.session
    }

    fn start<S: Store>(&mut self, ctx: &mut Context<'_, S>, amount: u64) -> Result<(), GameError> {
        self.session.begin(ctx, amount)?;
        self.tiles = self.pool.clone();
        ctx.rng.shuffle(&mut self.tiles);
        Ok(())
    }

    fn decide<S: Store>(&mut self, ctx: &mut Context<'_, S>, decision: Decision) -> Result<(), GameError> {
        match decision {
            Decision::Pick(tile) => self.pick(ctx, tile),
            _ => Err(GameError::InvalidMove),
        }
    }

    fn reset<S: Store>(&mut self, ctx: &mut Context<'_, S>, reason: &str) {
        self.session.reset(ctx, reason);
        self.tiles.clear();
    }
}
