//! Built-in outcome tables.
//!
//! These are the defaults carried by the configuration; every table is validated
//! against its game's structural parameter when the game is registered.

use super::Risk;

/// Plinko slot multipliers for one (risk, rows) pair. Length is `rows + 1`.
pub fn plinko_multipliers(risk: Risk, rows: u8) -> Option<&'static [f64]> {
    let table: &'static [f64] = match (risk, rows) {
        (Risk::Low, 8) => &[2.2, 1.8, 1.3, 0.9, 0.5, 0.9, 1.3, 1.8, 2.2],
        (Risk::Low, 10) => &[2.5, 2.2, 1.8, 1.2, 0.7, 0.3, 0.7, 1.2, 1.8, 2.2, 2.5],
        (Risk::Low, 12) => &[3.0, 2.5, 2.0, 1.5, 1.0, 0.5, 0.2, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0],
        (Risk::Low, 14) => &[
            3.0, 2.8, 2.3, 1.8, 1.2, 0.7, 0.3, 0.1, 0.3, 0.7, 1.2, 1.8, 2.3, 2.8, 3.0,
        ],
        (Risk::Low, 16) => &[
            3.5, 3.0, 2.5, 2.0, 1.4, 0.9, 0.5, 0.2, 0.1, 0.2, 0.5, 0.9, 1.4, 2.0, 2.5, 3.0, 3.5,
        ],
        (Risk::Medium, 8) => &[5.6, 2.1, 1.1, 1.0, 0.5, 1.0, 1.1, 2.1, 5.6],
        (Risk::Medium, 10) => &[8.9, 3.0, 1.4, 1.1, 1.0, 0.5, 1.0, 1.1, 1.4, 3.0, 8.9],
        (Risk::Medium, 12) => &[6.0, 8.0, 3.0, 1.5, 1.0, 0.8, 0.6, 0.8, 1.0, 1.5, 3.0, 8.0, 6.0],
        (Risk::Medium, 14) => &[
            10.0, 12.0, 5.0, 2.0, 1.2, 0.9, 0.7, 0.5, 0.7, 0.9, 1.2, 2.0, 5.0, 12.0, 10.0,
        ],
        (Risk::Medium, 16) => &[
            20.0, 15.0, 8.0, 3.0, 1.5, 1.0, 0.8, 0.6, 0.4, 0.6, 0.8, 1.0, 1.5, 3.0, 8.0, 15.0,
            20.0,
        ],
        (Risk::High, 8) => &[29.0, 4.0, 1.5, 0.3, 0.2, 0.3, 1.5, 4.0, 29.0],
        (Risk::High, 10) => &[30.0, 10.0, 3.0, 0.8, 0.3, 0.2, 0.3, 0.8, 3.0, 10.0, 30.0],
        (Risk::High, 12) => &[
            50.0, 15.0, 5.0, 1.5, 0.5, 0.3, 0.1, 0.3, 0.5, 1.5, 5.0, 15.0, 50.0,
        ],
        (Risk::High, 14) => &[
            80.0, 25.0, 8.0, 2.0, 0.8, 0.4, 0.2, 0.1, 0.2, 0.4, 0.8, 2.0, 8.0, 25.0, 80.0,
        ],
        (Risk::High, 16) => &[
            100.0, 40.0, 15.0, 4.0, 1.5, 0.6, 0.3, 0.0, 0.0, 0.0, 0.3, 0.6, 1.5, 4.0, 15.0, 40.0,
            100.0,
        ],
        _ => return None,
    };
    Some(table)
}

/// Keno multipliers indexed `[picks - 1][hits]`.
pub const KENO_PAYOUTS: [&[f64]; 10] = [
    &[0.0, 2.5],
    &[0.0, 0.5, 8.0],
    &[0.0, 0.2, 2.0, 20.0],
    &[0.0, 0.1, 1.0, 5.0, 50.0],
    &[0.0, 0.0, 0.5, 2.0, 15.0, 100.0],
    &[0.0, 0.0, 0.2, 1.0, 5.0, 40.0, 250.0],
    &[0.0, 0.0, 0.0, 0.5, 2.0, 15.0, 100.0, 750.0],
    &[0.0, 0.0, 0.0, 0.2, 1.0, 8.0, 50.0, 250.0, 1500.0],
    &[0.0, 0.0, 0.0, 0.0, 0.5, 4.0, 20.0, 100.0, 500.0, 2500.0],
    &[0.0, 0.0, 0.0, 0.0, 0.2, 2.0, 10.0, 50.0, 250.0, 1000.0, 5000.0],
];

/// Multiplier for standing in lane `i` (index 0 is the start area).
pub const CHICKEN_MULTIPLIERS: [f64; 11] = [
    1.0, 1.04, 1.12, 1.24, 1.45, 1.76, 2.26, 3.06, 4.37, 6.72, 12.22,
];

/// Chance of being hit while entering lane `i`.
pub const CHICKEN_HIT_CHANCES: [f64; 11] = [
    0.0, 0.04, 0.07, 0.1, 0.14, 0.18, 0.22, 0.26, 0.3, 0.35, 0.45,
];

/// Wheel segments, clockwise from the pointer.
pub const WHEEL_MULTIPLIERS: [f64; 12] = [
    2.0, 0.1, 5.0, 0.0, 1.5, 0.5, 10.0, 0.2, 1.0, 0.0, 20.0, 0.3,
];

/// Multipliers hidden under the grid tiles (shuffled each round).
pub const GRID_POOL: [f64; 25] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.2, 0.2, 0.2, 0.2, 0.5, 0.5, 0.5, 0.5, 1.0, 1.0, 1.0,
    2.0, 2.0, 3.0, 3.0, 5.0, 8.0, 12.0,
];

/// Slot symbols, indexed by reel value.
pub const SLOT_SYMBOLS: [&str; 6] = ["cherry", "lemon", "bell", "bag", "seven", "blank"];

/// Payout when all three reels show the symbol.
pub const SLOT_TRIPLE_PAYOUTS: [f64; 6] = [25.0, 15.0, 35.0, 45.0, 55.0, 0.0];

/// Payout when exactly two reels show the symbol.
pub const SLOT_PAIR_PAYOUTS: [f64; 6] = [1.8, 1.3, 2.4, 3.0, 3.5, 0.0];
