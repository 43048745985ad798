//! Plinko: a ball falls through `R` peg rows, stepping half a peg left or right at each.
//!
//! The sum of steps `D` maps to a landing slot in `0..=R`. Each (risk, rows) pair has its
//! own multiplier table, which must have one entry per slot and a binomial expected
//! value below one.

use super::{combinations, validate_multipliers, Context, Game, GameError};
use crate::{config::PlinkoConfig, scheduler::Timer, session::Session, Step, Store};
use parlor_types::casino::{Decision, GameId, Progress, Risk};
use std::collections::BTreeMap;

/// Landing slot for a ball whose ±0.5 steps summed to `displacement`.
pub fn slot_for(displacement: f64, rows: u8) -> u8 {
    if rows == 0 {
        return 0;
    }
    let rows = f64::from(rows);
    let normalized = (displacement / (rows / 2.0) + 1.0) / 2.0;
    (normalized * rows).round().clamp(0.0, rows) as u8
}

/// Expected multiplier of a table under the binomial slot distribution.
pub fn expected_value(multipliers: &[f64]) -> f64 {
    let rows = multipliers.len().saturating_sub(1) as u32;
    let paths = 2f64.powi(rows as i32);
    multipliers
        .iter()
        .enumerate()
        .map(|(slot, multiplier)| combinations(rows, slot as u32) / paths * multiplier)
        .sum()
}

fn validate_table(risk: Risk, rows: u8, multipliers: &[f64]) -> Result<(), GameError> {
    let name = format!("plinko {risk:?}/{rows}");
    validate_multipliers(&name, multipliers)?;
    if multipliers.len() != rows as usize + 1 {
        return Err(GameError::InvalidConfiguration(format!(
            "{name} has {} slots, expected {}",
            multipliers.len(),
            rows as usize + 1
        )));
    }
    let ev = expected_value(multipliers);
    if ev >= 1.0 {
        return Err(GameError::InvalidConfiguration(format!(
            "{name} pays {ev:.4} per coin on average"
        )));
    }
    Ok(())
}

pub struct Plinko {
    session: Session,
    rows: u8,
    risk: Risk,
    tables: BTreeMap<(Risk, u8), Vec<f64>>,
    path: Vec<f64>,
    first_step_ms: u64,
    step_ms: u64,
    land_ms: u64,
}

impl Plinko {
    pub fn new(config: &PlinkoConfig) -> Result<Self, GameError> {
        let mut tables = BTreeMap::new();
        for table in &config.tables {
            validate_table(table.risk, table.rows, &table.multipliers)?;
            tables.insert((table.risk, table.rows), table.multipliers.clone());
        }
        if !tables.contains_key(&(config.risk, config.rows)) {
            return Err(GameError::InvalidConfiguration(format!(
                "no plinko table for {:?}/{}",
                config.risk, config.rows
            )));
        }
        Ok(Self {
            session: Session::new(GameId::Plinko),
            rows: config.rows,
            risk: config.risk,
            tables,
            path: Vec::new(),
            first_step_ms: config.first_step_ms,
            step_ms: config.step_ms,
            land_ms: config.land_ms,
        })
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn risk(&self) -> Risk {
        self.risk
    }

    /// Multipliers of the current board.
    pub fn multipliers(&self) -> &[f64] {
        self.tables
            .get(&(self.risk, self.rows))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn land<S: Store>(&mut self, ctx: &mut Context<'_, S>) -> Result<(), GameError> {
        let displacement = self.path.last().copied().unwrap_or(0.0);
        let slot = slot_for(displacement, self.rows);
        let multiplier = self
            .multipliers()
            .get(slot as usize)
            .copied()
            .unwrap_or(0.0);
        ctx.progress(GameId::Plinko, Progress::Landed { slot, multiplier });
        let bet = self.session.bet().map_or(0, |bet| bet.amount);
        self.session.settle(ctx, bet as f64 * multiplier)?;
        Ok(())
    }
}

impl Game for Plinko {
    fn session(&self) -> &Session {
        &self.session
    }

    fn start<S: Store>(&mut self, ctx: &mut Context<'_, S>, amount: u64) -> Result<(), GameError> {
        self.session.begin(ctx, amount)?;
        self.session.resolving()?;

        // Offset after each row, in peg units from the center.
        self.path.clear();
        let mut offset = 0.0;
        for _ in 0..self.rows {
            offset += if ctx.rng.next_u8() & 1 == 0 { -0.5 } else { 0.5 };
            self.path.push(offset);
        }
        self.session.schedule(ctx, self.first_step_ms, Step::Peg(0));
        Ok(())
    }

    fn decide<S: Store>(&mut self, _ctx: &mut Context<'_, S>, decision: Decision) -> Result<(), GameError> {
        match decision {
            Decision::Board { rows, risk } if self.session.phase().accepts_wager() => {
                if !self.tables.contains_key(&(risk, rows)) {
                    return Err(GameError::InvalidConfiguration(format!(
                        "no plinko table for {risk:?}/{rows}"
                    )));
                }
                self.rows = rows;
                self.risk = risk;
                Ok(())
            }
            _ => Err(GameError::InvalidMove),
        }
    }

    fn on_timer<S: Store>(&mut self, ctx: &mut Context<'_, S>, timer: Timer) -> Result<(), GameError> {
        self.session.guard(timer.generation)?;
        match timer.step {
            Step::Peg(row) => {
                let offset = self.path.get(row as usize).copied().unwrap_or(0.0);
                ctx.progress(GameId::Plinko, Progress::Peg { row, offset });
                if row + 1 < self.rows {
                    self.session.schedule(ctx, self.step_ms, Step::Peg(row + 1));
                } else {
                    self.session.schedule(ctx, self.land_ms, Step::Land);
                }
                Ok(())
            }
            Step::Land => self.land(ctx),
            _ => Err(self.session.stale(timer.generation)),
        }
    }

    fn reset<S: Store>(&mut self, ctx: &mut Context<'_, S>, reason: &str) {
        self.session.reset(ctx, reason);
        self.path.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::PlinkoTable, mocks::Harness};
    use parlor_types::casino::{Event, Phase};

    fn plinko(rows: u8, risk: Risk) -> Plinko {
        Plinko::new(&PlinkoConfig {
            rows,
            risk,
            ..PlinkoConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_slot_mapping() {
        // All left, all right, and straight down.
        assert_eq!(slot_for(-8.0, 16), 0);
        assert_eq!(slot_for(8.0, 16), 16);
        assert_eq!(slot_for(0.0, 16), 8);
        // Out of range displacements are clamped.
        assert_eq!(slot_for(-20.0, 8), 0);
        assert_eq!(slot_for(20.0, 8), 8);

        // Every displacement reachable with R rows lands in its own slot.
        for rows in [8u8, 10, 12, 14, 16] {
            let mut slots: Vec<u8> = (0..=rows)
                .map(|right| slot_for(f64::from(right) - f64::from(rows) / 2.0, rows))
                .collect();
            slots.dedup();
            assert_eq!(slots, (0..=rows).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_builtin_tables_keep_an_edge() {
        for table in PlinkoConfig::default().tables {
            let ev = expected_value(&table.multipliers);
            assert!(ev < 1.0, "{:?}/{}: {ev}", table.risk, table.rows);
        }
    }

    #[test]
    fn test_rejects_bad_tables() {
        let mut config = PlinkoConfig {
            rows: 2,
            risk: Risk::Low,
            ..PlinkoConfig::default()
        };

        config.tables = vec![PlinkoTable {
            risk: Risk::Low,
            rows: 2,
            multipliers: vec![1.0, 1.0],
        }];
        assert!(matches!(
            Plinko::new(&config),
            Err(GameError::InvalidConfiguration(_))
        ));

        // EV = 0.25 * 2 + 0.5 * 1 + 0.25 * 2 = 1.5
        config.tables[0].multipliers = vec![2.0, 1.0, 2.0];
        assert!(Plinko::new(&config).is_err());

        config.tables[0].multipliers = vec![1.5, 0.4, 1.5];
        assert!(Plinko::new(&config).is_ok());

        config.rows = 4;
        assert!(Plinko::new(&config).is_err());
    }

    #[test]
    fn test_drop_walks_every_row_then_lands() {
        let mut game = plinko(8, Risk::Low);
        let mut harness = Harness::new(1_000);
        game.start(&mut harness.ctx(), 100).unwrap();
        assert_eq!(game.session().phase(), Phase::Resolving);
        assert_eq!(harness.scheduler.next_due(), Some(50));

        let fired = harness.run(&mut game);
        // Eight rows and the landing.
        assert_eq!(fired, 9);
        assert_eq!(harness.scheduler.now(), 50 + 7 * 280 + 250);
        assert_eq!(game.session().phase(), Phase::Settled);

        let (slot, multiplier) = harness
            .events
            .iter()
            .find_map(|event| match event {
                Event::Progress {
                    progress: Progress::Landed { slot, multiplier },
                    ..
                } => Some((*slot, *multiplier)),
                _ => None,
            })
            .unwrap();
        assert!(slot <= 8);
        assert_eq!(multiplier, game.multipliers()[slot as usize]);
        let paid = (100.0 * multiplier).round() as u64;
        assert_eq!(harness.balance(), 900 + paid);
    }

    #[test]
    fn test_board_changes_only_between_drops() {
        let mut game = plinko(16, Risk::Medium);
        let mut harness = Harness::new(1_000);
        game.decide(
            &mut harness.ctx(),
            Decision::Board {
                rows: 12,
                risk: Risk::High,
            },
        )
        .unwrap();
        assert_eq!((game.rows(), game.risk()), (12, Risk::High));
        assert!(game
            .decide(
                &mut harness.ctx(),
                Decision::Board {
                    rows: 9,
                    risk: Risk::High
                }
            )
            .is_err());

        game.start(&mut harness.ctx(), 10).unwrap();
        assert_eq!(
            game.decide(
                &mut harness.ctx(),
                Decision::Board {
                    rows: 8,
                    risk: Risk::Low
                }
            ),
            Err(GameError::InvalidMove)
        );
    }
}
