/// Balance seeded when nothing (or exactly zero) is stored.
pub const DEFAULT_BALANCE: u64 = 1_000;

/// Fraction of the fair payout returned to the player.
pub const HOUSE_EDGE: f64 = 0.95;

/// Cells on the mines board (5x5).
pub const MINES_CELLS: u8 = 25;

/// Mines placed when the player has not chosen a count.
pub const DEFAULT_MINES: u8 = 3;

/// Dice rolls are uniform in `1..=DICE_SIDES`.
pub const DICE_SIDES: u8 = 100;

/// Default "roll under" target (49% win chance).
pub const DICE_DEFAULT_TARGET: u8 = 50;

/// Smallest dice payout multiplier offered regardless of odds.
pub const DICE_MIN_MULTIPLIER: f64 = 1.01;

/// Row counts the plinko board can be built with.
pub const PLINKO_ROW_COUNTS: [u8; 5] = [8, 10, 12, 14, 16];

/// Rows used when the player has not chosen.
pub const PLINKO_DEFAULT_ROWS: u8 = 16;

/// Numbers on the keno board (1-based).
pub const KENO_NUMBERS: u8 = 80;

/// Maximum numbers a player may pick.
pub const KENO_MAX_PICKS: usize = 10;

/// Numbers drawn per keno round.
pub const KENO_DRAWS: usize = 20;

/// Lanes to cross in chicken.
pub const CHICKEN_LANES: usize = 10;

/// Cards in a single deck.
pub const DECK_SIZE: u8 = 52;

/// Dealer draws while below this total.
pub const DEALER_STANDS_ON: u8 = 17;

/// Tiles on the multiplier grid (5x5).
pub const GRID_TILES: usize = 25;

/// Reels on the slot machine.
pub const SLOT_REELS: usize = 3;

/// Highest number on the roulette wheel (single zero).
pub const ROULETTE_MAX_NUMBER: u8 = 36;

/// Maximum distinct roulette stakes kept on the table.
pub const ROULETTE_MAX_STAKES: usize = 20;
