//! Casino game execution module.
//!
//! Every game owns a [Session] and resolves its rounds through a [Context] that lends it
//! the ledger, the scheduler, the RNG and the event queue:
//! - Dice
//! - Mines
//! - Plinko
//! - Red/Black
//! - Crash
//! - Roulette
//! - Keno
//! - Chicken
//! - Blackjack
//! - Wheel
//! - Slots
//! - Grid

pub mod blackjack;
pub mod chicken;
pub mod crash;
pub mod dice;
pub mod grid;
pub mod keno;
pub mod mines;
pub mod plinko;
pub mod red_black;
pub mod roulette;
pub mod slots;
pub mod wheel;

use crate::{
    config::Config,
    ledger::{Ledger, LedgerError},
    scheduler::{Generation, Scheduler, Timer},
    session::Session,
    Store,
};
use commonware_cryptography::{sha256::Sha256, Hasher};
use parlor_types::casino::{Controls, Decision, Event, GameId, Phase, Progress, DECK_SIZE};
use thiserror::Error;

/// Deterministic random number generator.
///
/// Uses SHA256 hash chains to expand a 32-byte seed into an arbitrary stream.
#[derive(Clone)]
pub struct GameRng {
    state: [u8; 32],
    index: usize,
}

impl GameRng {
    /// Create a new RNG from a seed and a stream number.
    pub fn new(seed: &[u8; 32], stream: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(&stream.to_be_bytes());
        Self {
            state: hasher.finalize().0,
            index: 0,
        }
    }

    /// Get the next random byte.
    fn next_byte(&mut self) -> u8 {
        if self.index >= 32 {
            // Rehash to get more bytes
            let mut hasher = Sha256::new();
            hasher.update(&self.state);
            self.state = hasher.finalize().0;
            self.index = 0;
        }
        let result = self.state[self.index];
        self.index += 1;
        result
    }

    pub fn next_u8(&mut self) -> u8 {
        self.next_byte()
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        for byte in &mut bytes {
            *byte = self.next_byte();
        }
        u32::from_be_bytes(bytes)
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        for byte in &mut bytes {
            *byte = self.next_byte();
        }
        u64::from_be_bytes(bytes)
    }

    /// Get a random f64 value in range [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Get a random value in range [0, max).
    pub fn next_bounded(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        // Rejection sampling for an unbiased distribution
        let limit = u32::MAX - (u32::MAX % max);
        loop {
            let value = self.next_u32();
            if value < limit {
                return value % max;
            }
        }
    }

    /// Draw a card from the deck without replacement.
    /// Cards are 0-51: suit = card/13, rank = card%13.
    pub fn draw_card(&mut self, deck: &mut Vec<u8>) -> Option<u8> {
        if deck.is_empty() {
            return None;
        }
        let idx = self.next_bounded(deck.len() as u32) as usize;
        Some(deck.swap_remove(idx))
    }

    /// Create a shuffled deck of 52 cards.
    pub fn create_deck(&mut self) -> Vec<u8> {
        let mut deck: Vec<u8> = (0..DECK_SIZE).collect();
        self.shuffle(&mut deck);
        deck
    }

    /// Create a shuffled deck excluding cards already in play.
    pub fn create_deck_excluding(&mut self, excluded: &[u8]) -> Vec<u8> {
        // Use u64 as bit-set for 52 cards (cards 0-51)
        let mut used: u64 = 0;
        for &card in excluded {
            if card < DECK_SIZE {
                used |= 1u64 << card;
            }
        }
        let mut deck: Vec<u8> = (0..DECK_SIZE)
            .filter(|&c| used & (1u64 << c) == 0)
            .collect();
        self.shuffle(&mut deck);
        deck
    }

    /// Shuffle a slice in place using Fisher-Yates.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_bounded((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Pick `count` distinct values from `1..=max`, in draw order.
    pub fn sample(&mut self, max: u8, count: usize) -> Vec<u8> {
        let mut pool: Vec<u8> = (1..=max).collect();
        self.shuffle(&mut pool);
        pool.truncate(count);
        pool
    }
}

/// Error during game execution.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GameError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("stale resolution (captured generation {captured}, current {current})")]
    StaleResolution {
        captured: Generation,
        current: Generation,
    },
    #[error("failed to load presentation for {game}: {reason}")]
    PresentationLoadFailure { game: GameId, reason: String },
    /// Action not allowed in the current phase.
    #[error("invalid move")]
    InvalidMove,
    #[error("{0} is unavailable")]
    Unavailable(GameId),
    #[error("no game is active")]
    NoActiveGame,
}

/// Shared resources lent to a game for the duration of one call.
pub struct Context<'a, S: Store> {
    pub ledger: &'a mut Ledger<S>,
    pub scheduler: &'a mut Scheduler,
    pub rng: &'a mut GameRng,
    pub events: &'a mut Vec<Event>,
}

impl<S: Store> Context<'_, S> {
    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn progress(&mut self, game: GameId, progress: Progress) {
        self.events.push(Event::Progress { game, progress });
    }
}

/// Trait for casino game implementations.
pub trait Game {
    fn session(&self) -> &Session;

    /// Reserve `amount` and begin a round.
    fn start<S: Store>(&mut self, ctx: &mut Context<'_, S>, amount: u64) -> Result<(), GameError>;

    /// Apply a player decision (round parameters while idle, moves while active).
    fn decide<S: Store>(&mut self, ctx: &mut Context<'_, S>, decision: Decision) -> Result<(), GameError> {
        let _ = (ctx, decision);
        Err(GameError::InvalidMove)
    }

    /// Take the current payout and end the round.
    fn cash_out<S: Store>(&mut self, ctx: &mut Context<'_, S>) -> Result<u64, GameError> {
        let _ = ctx;
        Err(GameError::InvalidMove)
    }

    /// Run one step of the round's chain.
    fn on_timer<S: Store>(&mut self, ctx: &mut Context<'_, S>, timer: Timer) -> Result<(), GameError> {
        let _ = ctx;
        Err(self.session().stale(timer.generation))
    }

    /// Cancel the chain, forfeit any outstanding bet and return to Betting.
    fn reset<S: Store>(&mut self, ctx: &mut Context<'_, S>, reason: &str);

    /// Called once the presentation is mounted.
    fn init<S: Store>(&mut self, ctx: &mut Context<'_, S>) {
        self.reset(ctx, "initial load");
    }

    /// Control flags given whether a chain is still pending.
    fn controls(&self, live: bool, balance: u64) -> Controls {
        let phase = self.session().phase();
        Controls {
            can_bet: phase.accepts_wager() && balance > 0,
            can_act: phase == Phase::Active && !live,
            can_cash_out: false,
        }
    }
}

/// Number of ways to choose `k` of `n`, via the multiplicative identity.
pub fn combinations(n: u32, k: u32) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut result = 1.0;
    for i in 1..=k {
        result = result * f64::from(n - i + 1) / f64::from(i);
    }
    result
}

/// Check that every multiplier in a table is usable.
pub(crate) fn validate_multipliers(name: &str, table: &[f64]) -> Result<(), GameError> {
    if table.is_empty() {
        return Err(GameError::InvalidConfiguration(format!("{name} table is empty")));
    }
    if let Some(bad) = table.iter().find(|m| !m.is_finite() || **m < 0.0) {
        return Err(GameError::InvalidConfiguration(format!(
            "{name} table has invalid multiplier {bad}"
        )));
    }
    Ok(())
}

/// A registered game, dispatched by variant.
pub enum Table {
    Dice(dice::Dice),
    Mines(mines::Mines),
    Plinko(plinko::Plinko),
    RedBlack(red_black::RedBlack),
    Crash(crash::Crash),
    Roulette(roulette::Roulette),
    Keno(keno::Keno),
    Chicken(chicken::Chicken),
    Blackjack(blackjack::Blackjack),
    Wheel(wheel::Wheel),
    Slots(slots::Slots),
    Grid(grid::Grid),
}

macro_rules! dispatch {
    ($table:expr, $game:ident => $body:expr) => {
        match $table {
            Table::Dice($game) => $body,
            Table::Mines($game) => $body,
            Table::Plinko($game) => $body,
            Table::RedBlack($game) => $body,
            Table::Crash($game) => $body,
            Table::Roulette($game) => $body,
            Table::Keno($game) => $body,
            Table::Chicken($game) => $body,
            Table::Blackjack($game) => $body,
            Table::Wheel($game) => $body,
            Table::Slots($game) => $body,
            Table::Grid($game) => $body,
        }
    };
}

impl Table {
    /// Build a game from configuration, validating its outcome tables.
    pub fn build(id: GameId, config: &Config) -> Result<Self, GameError> {
        let edge = config.house_edge;
        Ok(match id {
            GameId::Dice => Table::Dice(dice::Dice::new(&config.dice, edge)?),
            GameId::Mines => Table::Mines(mines::Mines::new(&config.mines, edge)?),
            GameId::Plinko => Table::Plinko(plinko::Plinko::new(&config.plinko)?),
            GameId::RedBlack => Table::RedBlack(red_black::RedBlack::new(&config.red_black, edge)?),
            GameId::Crash => Table::Crash(crash::Crash::new(&config.crash)?),
            GameId::Roulette => Table::Roulette(roulette::Roulette::new(&config.roulette)),
            GameId::Keno => Table::Keno(keno::Keno::new(&config.keno)?),
            GameId::Chicken => Table::Chicken(chicken::Chicken::new(&config.chicken)?),
            GameId::Blackjack => Table::Blackjack(blackjack::Blackjack::new(&config.blackjack)),
            GameId::Wheel => Table::Wheel(wheel::Wheel::new(&config.wheel)?),
            GameId::Slots => Table::Slots(slots::Slots::new(&config.slots)?),
            GameId::Grid => Table::Grid(grid::Grid::new(&config.grid)?),
        })
    }

    pub fn id(&self) -> GameId {
        self.session().game()
    }

    pub fn session(&self) -> &Session {
        dispatch!(self, game => game.session())
    }

    pub fn start<S: Store>(&mut self, ctx: &mut Context<'_, S>, amount: u64) -> Result<(), GameError> {
        dispatch!(self, game => game.start(ctx, amount))
    }

    pub fn decide<S: Store>(&mut self, ctx: &mut Context<'_, S>, decision: Decision) -> Result<(), GameError> {
        dispatch!(self, game => game.decide(ctx, decision))
    }

    pub fn cash_out<S: Store>(&mut self, ctx: &mut Context<'_, S>) -> Result<u64, GameError> {
        dispatch!(self, game => game.cash_out(ctx))
    }

    pub fn on_timer<S: Store>(&mut self, ctx: &mut Context<'_, S>, timer: Timer) -> Result<(), GameError> {
        dispatch!(self, game => game.on_timer(ctx, timer))
    }

    pub fn reset<S: Store>(&mut self, ctx: &mut Context<'_, S>, reason: &str) {
        dispatch!(self, game => game.reset(ctx, reason))
    }

    pub fn init<S: Store>(&mut self, ctx: &mut Context<'_, S>) {
        dispatch!(self, game => game.init(ctx))
    }

    pub fn controls(&self, live: bool, balance: u64) -> Controls {
        dispatch!(self, game => game.controls(live, balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::create_rng;

    #[test]
    fn test_game_rng_deterministic() {
        let mut rng1 = create_rng(1);
        let mut rng2 = create_rng(1);

        // Same seed should produce same sequence
        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_game_rng_different_streams() {
        let mut rng1 = create_rng(1);
        let mut rng2 = create_rng(2);

        let seq1: Vec<u8> = (0..10).map(|_| rng1.next_u8()).collect();
        let seq2: Vec<u8> = (0..10).map(|_| rng2.next_u8()).collect();
        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_game_rng_bounded() {
        let mut rng = create_rng(3);
        let mut seen = [false; 37];
        for _ in 0..5_000 {
            let value = rng.next_bounded(37);
            assert!(value < 37);
            seen[value as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_game_rng_unit_interval() {
        let mut rng = create_rng(4);
        for _ in 0..5_000 {
            let value = rng.next_f64();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_game_rng_deck() {
        let mut rng = create_rng(5);
        let deck = rng.create_deck();
        assert_eq!(deck.len(), 52);

        // All cards should be unique
        let mut seen = [false; 52];
        for card in &deck {
            assert!(!seen[*card as usize], "Duplicate card: {}", card);
            seen[*card as usize] = true;
        }

        let rest = rng.create_deck_excluding(&deck[..10]);
        assert_eq!(rest.len(), 42);
        assert!(deck[..10].iter().all(|card| !rest.contains(card)));
    }

    #[test]
    fn test_game_rng_sample_distinct() {
        let mut rng = create_rng(6);
        let mut drawn = rng.sample(80, 20);
        assert_eq!(drawn.len(), 20);
        assert!(drawn.iter().all(|n| (1..=80).contains(n)));
        drawn.sort_unstable();
        drawn.dedup();
        assert_eq!(drawn.len(), 20);
    }

    #[test]
    fn test_combinations() {
        assert_eq!(combinations(25, 0), 1.0);
        assert_eq!(combinations(25, 1), 25.0);
        assert_eq!(combinations(25, 3), 2_300.0);
        assert_eq!(combinations(25, 22), 2_300.0);
        assert_eq!(combinations(16, 8), 12_870.0);
        assert_eq!(combinations(3, 4), 0.0);
    }

    #[test]
    fn test_every_builtin_game_builds() {
        let config = Config::default();
        for id in GameId::ALL {
            let table = Table::build(id, &config).unwrap();
            assert_eq!(table.id(), id);
            assert_eq!(table.session().phase(), Phase::Betting);
        }
    }
}
