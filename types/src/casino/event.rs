use super::GameId;

/// Output consumed by the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The balance changed (after every reserve and award).
    Balance { balance: u64 },
    /// The arcade moved its active slot.
    Switched { from: Option<GameId>, to: GameId },
    /// A game could not be mounted and its slot is unusable.
    Unusable { game: GameId, reason: String },
    /// A wager was reserved and a round began.
    RoundStarted { game: GameId, bet: u64 },
    /// Intermediate state of a running round.
    Progress { game: GameId, progress: Progress },
    /// A round finished with `payout` awarded (zero on a loss).
    Settled { game: GameId, bet: u64, payout: u64 },
    /// An outstanding wager was abandoned by a reset.
    Forfeited { game: GameId, bet: u64, reason: String },
}

/// Game-specific progress of a round.
#[derive(Clone, Debug, PartialEq)]
pub enum Progress {
    /// Dice result against the roll-under target.
    Rolled { roll: u8, target: u8 },
    /// A safe cell was revealed.
    Gem { cell: u8, gems: u8, multiplier: f64 },
    /// A mine was revealed.
    Mine { cell: u8 },
    /// The plinko ball passed a peg row; `offset` is in pegs from center.
    Peg { row: u8, offset: f64 },
    /// The plinko ball landed.
    Landed { slot: u8, multiplier: f64 },
    /// A red/black card was flipped.
    Flipped { card: u8, correct: bool, streak: u32 },
    /// The crash multiplier ticked up.
    Ascent { multiplier: f64 },
    /// The crash multiplier crossed the crash point.
    Crashed { multiplier: f64 },
    /// The roulette wheel stopped.
    Spun { number: u8 },
    /// A keno number was revealed.
    Drawn { number: u8, hit: bool },
    /// The chicken reached a lane.
    Lane { lane: u8, multiplier: f64 },
    /// The chicken was hit entering a lane.
    Splat { lane: u8 },
    /// A blackjack card was dealt to the player.
    PlayerCard { card: u8, total: u8 },
    /// A blackjack card was dealt to (or revealed for) the dealer.
    DealerCard { card: u8, total: u8 },
    /// The wheel stopped on a segment.
    Segment { index: u8, multiplier: f64 },
    /// A slot reel stopped.
    Reel { reel: u8, symbol: u8 },
    /// A grid tile was turned over.
    Tile { tile: u8, multiplier: f64 },
}
