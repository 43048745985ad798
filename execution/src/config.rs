//! Arcade configuration, loaded from YAML.
//!
//! Global values are checked by [Config::validate]. Per-game tables are checked when the
//! game is registered so that one bad table only disables its own game.

use parlor_types::casino::{
    plinko_multipliers, GameId, Risk, CHICKEN_HIT_CHANCES, CHICKEN_LANES, CHICKEN_MULTIPLIERS,
    DEFAULT_BALANCE, DEFAULT_MINES, DICE_DEFAULT_TARGET, GRID_POOL, HOUSE_EDGE, KENO_PAYOUTS,
    MINES_CELLS, PLINKO_DEFAULT_ROWS, PLINKO_ROW_COUNTS, SLOT_PAIR_PAYOUTS, SLOT_TRIPLE_PAYOUTS,
    WHEEL_MULTIPLIERS,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, str::FromStr};
use thiserror::Error;
use tracing::Level;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("house_edge must be in (0, 1] (got {value})")]
    InvalidHouseEdge { value: f64 },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: u64 },
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub starting_balance: u64,
    pub house_edge: f64,
    pub default_game: GameId,
    pub log_level: String,

    pub dice: DiceConfig,
    pub mines: MinesConfig,
    pub plinko: PlinkoConfig,
    pub red_black: RedBlackConfig,
    pub crash: CrashConfig,
    pub roulette: RouletteConfig,
    pub keno: KenoConfig,
    pub chicken: ChickenConfig,
    pub blackjack: BlackjackConfig,
    pub wheel: WheelConfig,
    pub slots: SlotsConfig,
    pub grid: GridConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            starting_balance: DEFAULT_BALANCE,
            house_edge: HOUSE_EDGE,
            default_game: GameId::Dice,
            log_level: "info".to_string(),
            dice: DiceConfig::default(),
            mines: MinesConfig::default(),
            plinko: PlinkoConfig::default(),
            red_black: RedBlackConfig::default(),
            crash: CrashConfig::default(),
            roulette: RouletteConfig::default(),
            keno: KenoConfig::default(),
            chicken: ChickenConfig::default(),
            blackjack: BlackjackConfig::default(),
            wheel: WheelConfig::default(),
            slots: SlotsConfig::default(),
            grid: GridConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_balance == 0 {
            return Err(ConfigError::InvalidNonZero {
                field: "starting_balance",
                value: 0,
            });
        }
        if !(self.house_edge > 0.0 && self.house_edge <= 1.0) {
            return Err(ConfigError::InvalidHouseEdge {
                value: self.house_edge,
            });
        }
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
            value: self.log_level.clone(),
        })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct DiceConfig {
    /// Roll-under target used until the player picks one.
    pub target: u8,
}

impl Default for DiceConfig {
    fn default() -> Self {
        Self {
            target: DICE_DEFAULT_TARGET,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct MinesConfig {
    pub cells: u8,
    pub mines: u8,
}

impl Default for MinesConfig {
    fn default() -> Self {
        Self {
            cells: MINES_CELLS,
            mines: DEFAULT_MINES,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PlinkoTable {
    pub risk: Risk,
    pub rows: u8,
    pub multipliers: Vec<f64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PlinkoConfig {
    pub rows: u8,
    pub risk: Risk,
    pub tables: Vec<PlinkoTable>,
    pub first_step_ms: u64,
    pub step_ms: u64,
    pub land_ms: u64,
}

impl Default for PlinkoConfig {
    fn default() -> Self {
        let tables = [Risk::Low, Risk::Medium, Risk::High]
            .into_iter()
            .flat_map(|risk| PLINKO_ROW_COUNTS.into_iter().map(move |rows| (risk, rows)))
            .filter_map(|(risk, rows)| {
                plinko_multipliers(risk, rows).map(|table| PlinkoTable {
                    risk,
                    rows,
                    multipliers: table.to_vec(),
                })
            })
            .collect();
        Self {
            rows: PLINKO_DEFAULT_ROWS,
            risk: Risk::Medium,
            tables,
            first_step_ms: 50,
            step_ms: 280,
            land_ms: 250,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct RedBlackConfig {
    pub flip_ms: u64,
}

impl Default for RedBlackConfig {
    fn default() -> Self {
        Self { flip_ms: 700 }
    }
}

/// Constants of the default crash curve.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct CrashConfig {
    /// Scale applied to `U^4` in the base crash point.
    pub scale: f64,
    /// Probability of adding a boost to the crash point.
    pub boost_chance: f64,
    /// Largest boost.
    pub boost_max: f64,
    /// Floor of the crash point.
    pub min_crash: f64,
    /// Per-tick growth factor range, `[growth_min, growth_max)`.
    pub growth_min: f64,
    pub growth_max: f64,
    pub tick_ms: u64,
}

impl Default for CrashConfig {
    fn default() -> Self {
        Self {
            scale: 15.0,
            boost_chance: 0.02,
            boost_max: 50.0,
            min_crash: 1.01,
            growth_min: 1.015,
            growth_max: 1.03,
            tick_ms: 100,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct RouletteConfig {
    pub spin_ms: u64,
}

impl Default for RouletteConfig {
    fn default() -> Self {
        Self { spin_ms: 1_500 }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct KenoConfig {
    /// Multipliers indexed `[picks - 1][hits]`.
    pub payouts: Vec<Vec<f64>>,
    pub draw_ms: u64,
}

impl Default for KenoConfig {
    fn default() -> Self {
        Self {
            payouts: KENO_PAYOUTS.iter().map(|row| row.to_vec()).collect(),
            draw_ms: 100,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ChickenConfig {
    pub lanes: usize,
    pub multipliers: Vec<f64>,
    pub hit_chances: Vec<f64>,
    pub cross_ms: u64,
}

impl Default for ChickenConfig {
    fn default() -> Self {
        Self {
            lanes: CHICKEN_LANES,
            multipliers: CHICKEN_MULTIPLIERS.to_vec(),
            hit_chances: CHICKEN_HIT_CHANCES.to_vec(),
            cross_ms: 300,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct BlackjackConfig {
    /// Delay before the dealer's first move.
    pub first_draw_ms: u64,
    pub draw_ms: u64,
}

impl Default for BlackjackConfig {
    fn default() -> Self {
        Self {
            first_draw_ms: 500,
            draw_ms: 800,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct WheelConfig {
    pub multipliers: Vec<f64>,
    pub spin_ms: u64,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            multipliers: WHEEL_MULTIPLIERS.to_vec(),
            spin_ms: 4_000,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SlotsConfig {
    pub triple: Vec<f64>,
    pub pair: Vec<f64>,
    /// Delay before the first reel stops.
    pub first_stop_ms: u64,
    /// Delay between the remaining stops.
    pub stop_ms: u64,
}

impl Default for SlotsConfig {
    fn default() -> Self {
        Self {
            triple: SLOT_TRIPLE_PAYOUTS.to_vec(),
            pair: SLOT_PAIR_PAYOUTS.to_vec(),
            first_stop_ms: 1_000,
            stop_ms: 800,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct GridConfig {
    pub pool: Vec<f64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            pool: GRID_POOL.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.log_level().unwrap(), Level::INFO);
        assert_eq!(config.plinko.tables.len(), 15);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::parse(
            "starting_balance: 250\ndefault_game: red_black\nmines:\n  mines: 5\ncrash:\n  tick_ms: 50\n",
        )
        .unwrap();
        assert_eq!(config.starting_balance, 250);
        assert_eq!(config.default_game, GameId::RedBlack);
        assert_eq!(config.mines.mines, 5);
        assert_eq!(config.mines.cells, MINES_CELLS);
        assert_eq!(config.crash.tick_ms, 50);
        assert_eq!(config.crash.growth_min, 1.015);
        assert_eq!(config.house_edge, HOUSE_EDGE);
    }

    #[test]
    fn test_custom_plinko_table() {
        let config = Config::parse(
            "plinko:\n  rows: 2\n  risk: low\n  tables:\n    - risk: low\n      rows: 2\n      multipliers: [1.5, 0.4, 1.5]\n",
        )
        .unwrap();
        assert_eq!(config.plinko.tables.len(), 1);
        assert_eq!(config.plinko.tables[0].multipliers, vec![1.5, 0.4, 1.5]);
    }

    #[test]
    fn test_rejects_bad_globals() {
        assert!(matches!(
            Config::parse("starting_balance: 0\n"),
            Err(ConfigError::InvalidNonZero { .. })
        ));
        assert!(matches!(
            Config::parse("house_edge: 1.5\n"),
            Err(ConfigError::InvalidHouseEdge { .. })
        ));
        assert!(matches!(
            Config::parse("log_level: loud\n"),
            Err(ConfigError::InvalidLogLevel { .. })
        ));
        assert!(matches!(
            Config::parse("house_edge: [1, 2]\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}
