use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Games that can occupy the arcade's single active slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum GameId {
    Dice = 0,
    Mines = 1,
    Plinko = 2,
    RedBlack = 3,
    Crash = 4,
    Roulette = 5,
    Keno = 6,
    Chicken = 7,
    Blackjack = 8,
    Wheel = 9,
    Slots = 10,
    Grid = 11,
}

impl GameId {
    pub const ALL: [GameId; 12] = [
        GameId::Dice,
        GameId::Mines,
        GameId::Plinko,
        GameId::RedBlack,
        GameId::Crash,
        GameId::Roulette,
        GameId::Keno,
        GameId::Chicken,
        GameId::Blackjack,
        GameId::Wheel,
        GameId::Slots,
        GameId::Grid,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GameId::Dice => "dice",
            GameId::Mines => "mines",
            GameId::Plinko => "plinko",
            GameId::RedBlack => "redblack",
            GameId::Crash => "crash",
            GameId::Roulette => "roulette",
            GameId::Keno => "keno",
            GameId::Chicken => "chicken",
            GameId::Blackjack => "blackjack",
            GameId::Wheel => "wheel",
            GameId::Slots => "slots",
            GameId::Grid => "grid",
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GameId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        GameId::ALL
            .into_iter()
            .find(|game| game.name() == lowered || (lowered == "red_black" && *game == GameId::RedBlack))
            .ok_or_else(|| format!("unknown game: {s}"))
    }
}

/// Phase of the generic per-round state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Idle, accepts a new wager.
    #[default]
    Betting,
    /// Wager placed, player decisions accepted.
    Active,
    /// Terminal draw or animation running, no decisions accepted.
    Resolving,
    /// Payout applied; accepts a new wager.
    Settled,
}

impl Phase {
    /// A bet is outstanding exactly in these phases.
    pub fn holds_bet(&self) -> bool {
        matches!(self, Phase::Active | Phase::Resolving)
    }

    pub fn accepts_wager(&self) -> bool {
        matches!(self, Phase::Betting | Phase::Settled)
    }
}

/// Flags the presentation layer uses to enable its controls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub can_bet: bool,
    pub can_act: bool,
    pub can_cash_out: bool,
}

impl Controls {
    /// Every control disabled (unusable slot, or nothing mounted).
    pub const LOCKED: Controls = Controls {
        can_bet: false,
        can_act: false,
        can_cash_out: false,
    };
}

/// Plinko risk profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Risk {
    Low,
    Medium,
    High,
}

impl FromStr for Risk {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Risk::Low),
            "medium" => Ok(Risk::Medium),
            "high" => Ok(Risk::High),
            _ => Err(format!("unknown risk: {s}")),
        }
    }
}

/// Card color guessed in red/black.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

/// Get the color of a card (0-51, suit = card / 13; hearts and diamonds are red).
pub fn card_color(card: u8) -> Color {
    match card / 13 {
        0 | 1 => Color::Red,
        _ => Color::Black,
    }
}

/// Roulette bet categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BetType {
    Straight, // Single number (35:1)
    Red,      // Red (1:1)
    Black,    // Black (1:1)
    Even,     // Even (1:1)
    Odd,      // Odd (1:1)
    Low,      // 1-18 (1:1)
    High,     // 19-36 (1:1)
    Dozen,    // 1-12, 13-24, 25-36 (2:1)
    Column,   // First, second, third column (2:1)
}

/// A player decision taken while a game is mounted.
///
/// Each game accepts the subset that makes sense for it; everything else is
/// rejected as an invalid move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Decision {
    /// Dice: roll-under target (applies while idle).
    Target(u8),
    /// Mines: mine count for the next round (applies while idle).
    Mines(u8),
    /// Mines: reveal a cell.
    Reveal(u8),
    /// Plinko: board shape for the next drop (applies while idle).
    Board { rows: u8, risk: Risk },
    /// Red/black: guess the next card's color.
    Guess(Color),
    /// Chicken: attempt the next lane.
    Advance,
    /// Blackjack: draw a card.
    Hit,
    /// Blackjack: end the player's turn.
    Stand,
    /// Keno: toggle a number. Grid: pick a tile.
    Pick(u8),
    /// Keno: drop every pick.
    ClearPicks,
    /// Roulette: add to the stake on a category (persists across spins).
    Stake {
        bet_type: BetType,
        number: u8,
        amount: u64,
    },
    /// Roulette: drop every stake.
    ClearStakes,
}

/// An outstanding wager, created by a successful reserve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bet {
    pub amount: u64,
    pub game: GameId,
    /// Scheduler time (ms) the wager was placed at.
    pub created_at: u64,
}
