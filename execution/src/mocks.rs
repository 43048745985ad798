use crate::{
    casino::{Context, Game, GameRng},
    config::Config,
    ledger::Ledger,
    lifecycle::{Arcade, Headless, Stage},
    scheduler::Scheduler,
    Memory,
};
use anyhow::anyhow;
use parlor_types::casino::{Event, GameId};
use rand::{rngs::StdRng, RngCore, SeedableRng};

/// Creates a deterministic 32-byte seed
pub fn create_seed(seed: u64) -> [u8; 32] {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    bytes
}

/// Creates a game RNG from a numbered test seed
pub fn create_rng(seed: u64) -> GameRng {
    GameRng::new(&create_seed(seed), 0)
}

/// A stage whose mount always fails for the listed games
pub struct FailingStage {
    pub failing: Vec<GameId>,
}

impl Stage for FailingStage {
    fn mount(&mut self, game: GameId) -> anyhow::Result<()> {
        if self.failing.contains(&game) {
            return Err(anyhow!("template for {game} is missing"));
        }
        Ok(())
    }
}

/// Creates an arcade over a memory store with every game registered
pub fn create_arcade(balance: u64, seed: u64) -> Arcade<Memory, Headless> {
    let config = Config {
        starting_balance: balance,
        ..Config::default()
    };
    create_arcade_with(config, Headless, seed)
}

/// Creates an arcade from a custom config and stage
pub fn create_arcade_with<P: Stage>(config: Config, stage: P, seed: u64) -> Arcade<Memory, P> {
    let mut arcade = Arcade::new(config, Memory::default(), stage, create_seed(seed));
    arcade.register_all();
    arcade
}

/// Resources for driving a single game outside an arcade
pub struct Harness {
    pub ledger: Ledger<Memory>,
    pub scheduler: Scheduler,
    pub rng: GameRng,
    pub events: Vec<Event>,
}

impl Harness {
    pub fn new(balance: u64) -> Self {
        Self::seeded(balance, 0)
    }

    pub fn seeded(balance: u64, seed: u64) -> Self {
        Self {
            ledger: Ledger::open(Memory::default(), balance),
            scheduler: Scheduler::new(),
            rng: create_rng(seed),
            events: Vec::new(),
        }
    }

    pub fn ctx(&mut self) -> Context<'_, Memory> {
        Context {
            ledger: &mut self.ledger,
            scheduler: &mut self.scheduler,
            rng: &mut self.rng,
            events: &mut self.events,
        }
    }

    pub fn balance(&self) -> u64 {
        self.ledger.balance()
    }

    /// Fire every pending timer for `game`, in order, until its chain ends
    pub fn run<G: Game>(&mut self, game: &mut G) -> usize {
        let mut fired = 0;
        while let Some(due) = self.scheduler.next_due() {
            let Some(timer) = self.scheduler.pop_due(due) else {
                break;
            };
            let mut ctx = self.ctx();
            // Stale timers are dropped the same way the arcade drops them.
            let _ = game.on_timer(&mut ctx, timer);
            fired += 1;
        }
        fired
    }

    /// Fire only the next pending timer
    pub fn step<G: Game>(&mut self, game: &mut G) -> bool {
        let Some(due) = self.scheduler.next_due() else {
            return false;
        };
        let Some(timer) = self.scheduler.pop_due(due) else {
            return false;
        };
        let mut ctx = self.ctx();
        let _ = game.on_timer(&mut ctx, timer);
        true
    }

    /// Count settlement events, and sum what they paid
    pub fn settlements(&self) -> (usize, u64) {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Settled { payout, .. } => Some(*payout),
                _ => None,
            })
            .fold((0, 0), |(count, total), payout| (count + 1, total + payout))
    }
}
