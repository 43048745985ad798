//! Line-oriented front-end for the arcade.
//!
//! Each input line parses into a [Command]; the [Driver] applies it to an arcade and
//! renders the resulting events as text.

use parlor_execution::{
    casino::GameError, parse_amount, Arcade, LedgerError, Stage, Store,
};
use parlor_types::casino::{
    card_color, BetType, Color, Decision, Event, GameId, Progress, Risk,
};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

pub const HELP: &str = "\
commands:
  games                         list games
  switch <game>                 mount a game
  bet <amount>                  wager on the active game
  target <n>                    dice: roll-under target
  mines <n>                     mines: mine count for the next round
  reveal <cell>                 mines: open a cell (0-24)
  board <rows> <risk>           plinko: rows 8-16, risk low|medium|high
  guess red|black               red/black: guess the next card
  advance                       chicken: cross the next lane
  hit | stand                   blackjack
  pick <n>                      keno: toggle a number, grid: turn a tile
  clear                         keno: drop picks, roulette: drop stakes
  stake <type> [n] <amount>     roulette: straight <0-36>, dozen|column <0-2>,
                                red|black|even|odd|low|high
  cashout                       take the current multiplier
  reset                         abandon the round
  wait <ms>                     advance the clock
  balance | status | help | quit";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
    #[error("invalid amount: {0}")]
    Amount(#[from] LedgerError),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Games,
    Switch(GameId),
    Bet(u64),
    Decide(Decision),
    /// Clear picks or stakes, whichever the active game keeps.
    Clear,
    CashOut,
    Reset,
    Wait(u64),
    Balance,
    Status,
    Help,
    Quit,
}

fn arg<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<&'a str, ParseError> {
    parts.next().ok_or(ParseError::Missing(name))
}

fn number<'a, T: FromStr>(
    parts: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<T, ParseError> {
    let value = arg(parts, name)?;
    value.parse().map_err(|_| ParseError::Invalid {
        name,
        value: value.to_string(),
    })
}

fn bet_type(value: &str) -> Result<BetType, ParseError> {
    Ok(match value.to_ascii_lowercase().as_str() {
        "straight" => BetType::Straight,
        "red" => BetType::Red,
        "black" => BetType::Black,
        "even" => BetType::Even,
        "odd" => BetType::Odd,
        "low" => BetType::Low,
        "high" => BetType::High,
        "dozen" => BetType::Dozen,
        "column" => BetType::Column,
        _ => {
            return Err(ParseError::Invalid {
                name: "bet type",
                value: value.to_string(),
            })
        }
    })
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(ParseError::Empty);
        };
        let command = match head.to_ascii_lowercase().as_str() {
            "games" => Command::Games,
            "switch" | "play" => {
                let value = arg(&mut parts, "game")?;
                Command::Switch(value.parse().map_err(|_| ParseError::Invalid {
                    name: "game",
                    value: value.to_string(),
                })?)
            }
            "bet" => Command::Bet(parse_amount(arg(&mut parts, "amount")?)?),
            "target" => Command::Decide(Decision::Target(number(&mut parts, "target")?)),
            "mines" => Command::Decide(Decision::Mines(number(&mut parts, "mine count")?)),
            "reveal" => Command::Decide(Decision::Reveal(number(&mut parts, "cell")?)),
            "board" => {
                let rows = number(&mut parts, "rows")?;
                let value = arg(&mut parts, "risk")?;
                let risk = Risk::from_str(value).map_err(|_| ParseError::Invalid {
                    name: "risk",
                    value: value.to_string(),
                })?;
                Command::Decide(Decision::Board { rows, risk })
            }
            "guess" => {
                let color = match arg(&mut parts, "color")?.to_ascii_lowercase().as_str() {
                    "red" | "r" => Color::Red,
                    "black" | "b" => Color::Black,
                    other => {
                        return Err(ParseError::Invalid {
                            name: "color",
                            value: other.to_string(),
                        })
                    }
                };
                Command::Decide(Decision::Guess(color))
            }
            "advance" | "go" => Command::Decide(Decision::Advance),
            "hit" => Command::Decide(Decision::Hit),
            "stand" => Command::Decide(Decision::Stand),
            "pick" => Command::Decide(Decision::Pick(number(&mut parts, "number")?)),
            "clear" => Command::Clear,
            "stake" => {
                let bet_type = bet_type(arg(&mut parts, "bet type")?)?;
                let number = match bet_type {
                    BetType::Straight | BetType::Dozen | BetType::Column => {
                        number(&mut parts, "number")?
                    }
                    _ => 0,
                };
                let amount = parse_amount(arg(&mut parts, "amount")?)?;
                Command::Decide(Decision::Stake {
                    bet_type,
                    number,
                    amount,
                })
            }
            "cashout" | "cash" => Command::CashOut,
            "reset" => Command::Reset,
            "wait" => Command::Wait(number(&mut parts, "milliseconds")?),
            "balance" => Command::Balance,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn card(card: u8) -> String {
    const RANKS: [&str; 13] = [
        "A", "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K",
    ];
    const SUITS: [&str; 4] = ["h", "d", "c", "s"];
    format!(
        "{}{}",
        RANKS[(card % 13) as usize],
        SUITS[(card / 13 % 4) as usize]
    )
}

/// One line of text for an event.
pub fn render(event: &Event) -> String {
    match event {
        Event::Balance { balance } => format!("balance: {balance}"),
        Event::Switched { to, .. } => format!("now playing {to}"),
        Event::Unusable { game, reason } => format!("{game} is unavailable: {reason}"),
        Event::RoundStarted { game, bet } => format!("{game}: wagered {bet}"),
        Event::Settled { game, bet, payout } => {
            if *payout == 0 {
                format!("{game}: lost {bet}")
            } else {
                format!("{game}: paid {payout} on {bet}")
            }
        }
        Event::Forfeited { game, bet, reason } => {
            format!("{game}: forfeited {bet} ({reason})")
        }
        Event::Progress { game, progress } => {
            let detail = match progress {
                Progress::Rolled { roll, target } => format!("rolled {roll} (under {target} wins)"),
                Progress::Gem {
                    cell,
                    gems,
                    multiplier,
                } => format!("gem at {cell}, {gems} found, {multiplier:.2}x"),
                Progress::Mine { cell } => format!("mine at {cell}"),
                Progress::Peg { row, offset } => format!("row {row}, offset {offset:+.1}"),
                Progress::Landed { slot, multiplier } => {
                    format!("landed in slot {slot}, {multiplier}x")
                }
                Progress::Flipped {
                    card: flipped,
                    correct,
                    streak,
                } => {
                    let color = match card_color(*flipped) {
                        Color::Red => "red",
                        Color::Black => "black",
                    };
                    let verdict = if *correct { "right" } else { "wrong" };
                    format!("{} ({color}), {verdict}, streak {streak}", card(*flipped))
                }
                Progress::Ascent { multiplier } => format!("{multiplier:.2}x"),
                Progress::Crashed { multiplier } => format!("crashed at {multiplier:.2}x"),
                Progress::Spun { number } => format!("ball on {number}"),
                Progress::Drawn { number, hit } => {
                    format!("drew {number}{}", if *hit { " (hit)" } else { "" })
                }
                Progress::Lane { lane, multiplier } => {
                    format!("crossed lane {lane}, {multiplier:.2}x")
                }
                Progress::Splat { lane } => format!("hit in lane {lane}"),
                Progress::PlayerCard { card: dealt, total } => {
                    format!("you draw {} ({total})", card(*dealt))
                }
                Progress::DealerCard { card: dealt, total } => {
                    format!("dealer shows {} ({total})", card(*dealt))
                }
                Progress::Segment { index, multiplier } => {
                    format!("segment {index}, {multiplier}x")
                }
                Progress::Reel { reel, symbol } => format!("reel {reel} stops on {symbol}"),
                Progress::Tile { tile, multiplier } => format!("tile {tile}, {multiplier}x"),
            };
            format!("{game}: {detail}")
        }
    }
}

/// Whether the driver keeps reading input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Applies commands to an arcade and collects output lines.
pub struct Driver<S: Store, P: Stage> {
    arcade: Arcade<S, P>,
}

impl<S: Store, P: Stage> Driver<S, P> {
    pub fn new(arcade: Arcade<S, P>) -> Self {
        Self { arcade }
    }

    pub fn arcade(&self) -> &Arcade<S, P> {
        &self.arcade
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.arcade.next_deadline()
    }

    /// Fire every timer due by `now` and render what they produced.
    pub fn advance_to(&mut self, now: u64) -> Result<Vec<String>, GameError> {
        self.arcade.advance_to(now)?;
        Ok(self.drain())
    }

    /// Render pending events.
    pub fn drain(&mut self) -> Vec<String> {
        self.arcade.drain_events().iter().map(render).collect()
    }

    fn status(&self) -> String {
        let game = self
            .arcade
            .active()
            .map_or_else(|| "none".to_string(), |game| game.to_string());
        let phase = self
            .arcade
            .phase()
            .map_or_else(|| "-".to_string(), |phase| format!("{phase:?}").to_lowercase());
        let controls = self.arcade.controls();
        let mut enabled = Vec::new();
        if controls.can_bet {
            enabled.push("bet");
        }
        if controls.can_act {
            enabled.push("act");
        }
        if controls.can_cash_out {
            enabled.push("cashout");
        }
        format!(
            "game: {game}, phase: {phase}, balance: {}, controls: [{}]",
            self.arcade.balance(),
            enabled.join(" ")
        )
    }

    /// Apply one command. Rejected commands are rendered as a line, never returned.
    pub fn apply(&mut self, command: Command) -> (Flow, Vec<String>) {
        debug!(?command, "applying command");
        let result = match command {
            Command::Games => {
                let names: Vec<&str> = GameId::ALL.iter().map(GameId::name).collect();
                return (Flow::Continue, vec![names.join(" ")]);
            }
            Command::Help => return (Flow::Continue, vec![HELP.to_string()]),
            Command::Quit => return (Flow::Quit, self.drain()),
            Command::Balance => {
                return (
                    Flow::Continue,
                    vec![format!("balance: {}", self.arcade.balance())],
                )
            }
            Command::Status => return (Flow::Continue, vec![self.status()]),
            Command::Switch(game) => self.arcade.switch_to(game),
            Command::Bet(amount) => self.arcade.start(amount),
            Command::Decide(decision) => self.arcade.decide(decision),
            Command::Clear => match self.arcade.active() {
                Some(GameId::Roulette) => self.arcade.decide(Decision::ClearStakes),
                _ => self.arcade.decide(Decision::ClearPicks),
            },
            Command::CashOut => self.arcade.cash_out().map(|_| ()),
            Command::Reset => self.arcade.reset("player reset"),
            Command::Wait(ms) => self.arcade.advance(ms).map(|_| ()),
        };
        let mut lines = self.drain();
        if let Err(err) = result {
            lines.push(format!("rejected: {err}"));
        }
        (Flow::Continue, lines)
    }

    /// Parse and apply a line of input.
    pub fn handle_line(&mut self, line: &str) -> (Flow, Vec<String>) {
        match line.parse::<Command>() {
            Ok(command) => self.apply(command),
            Err(ParseError::Empty) => (Flow::Continue, Vec::new()),
            Err(err) => (Flow::Continue, vec![format!("{err} (try `help`)")]),
        }
    }

    /// Fire every pending timer, whatever its deadline.
    pub fn finish(&mut self) -> Result<Vec<String>, GameError> {
        self.arcade.run_until_idle()?;
        Ok(self.drain())
    }

    pub fn into_arcade(self) -> Arcade<S, P> {
        self.arcade
    }
}
