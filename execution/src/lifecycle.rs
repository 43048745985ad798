//! The arcade: one ledger, one scheduler and a single active game slot.
//!
//! Switching is two-phase. The outgoing game is reset (its chain cancelled and any
//! outstanding wager forfeited) before the incoming game's presentation is mounted;
//! only a successful mount initialises the incoming game. A failed mount, or a game
//! whose configuration was rejected at registration, leaves the slot unusable until
//! the next switch.

use crate::{
    casino::{Context, GameError, GameRng, Table},
    config::Config,
    ledger::Ledger,
    scheduler::{Scheduler, Timer},
    Store,
};
use parlor_types::casino::{Controls, Decision, Event, GameId, Phase};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Upper bound on timers fired by [Arcade::run_until_idle].
const MAX_IDLE_STEPS: usize = 1_000_000;

/// Mounts a game's presentation (templates, widgets) into the active slot.
pub trait Stage {
    fn mount(&mut self, game: GameId) -> anyhow::Result<()>;
}

/// A stage with nothing to mount.
#[derive(Clone, Copy, Debug, Default)]
pub struct Headless;

impl Stage for Headless {
    fn mount(&mut self, _game: GameId) -> anyhow::Result<()> {
        Ok(())
    }
}

enum Registration {
    Ready(Table),
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Slot {
    Empty,
    Ready(GameId),
    Unusable { game: GameId, reason: String },
}

pub struct Arcade<S: Store, P: Stage> {
    config: Config,
    ledger: Ledger<S>,
    scheduler: Scheduler,
    rng: GameRng,
    stage: P,
    games: BTreeMap<GameId, Registration>,
    slot: Slot,
    events: Vec<Event>,
}

impl<S: Store, P: Stage> Arcade<S, P> {
    pub fn new(config: Config, store: S, stage: P, seed: [u8; 32]) -> Self {
        let ledger = Ledger::open(store, config.starting_balance);
        let events = vec![Event::Balance {
            balance: ledger.balance(),
        }];
        Self {
            config,
            ledger,
            scheduler: Scheduler::new(),
            rng: GameRng::new(&seed, 0),
            stage,
            games: BTreeMap::new(),
            slot: Slot::Empty,
            events,
        }
    }

    /// Build and store a game. Registering twice keeps the first instance.
    pub fn register(&mut self, id: GameId) -> Result<(), GameError> {
        match self.games.get(&id) {
            Some(Registration::Ready(_)) => return Ok(()),
            Some(Registration::Invalid(reason)) => {
                return Err(GameError::InvalidConfiguration(reason.clone()))
            }
            None => {}
        }
        match Table::build(id, &self.config) {
            Ok(table) => {
                debug!(game = %id, "registered");
                self.games.insert(id, Registration::Ready(table));
                Ok(())
            }
            Err(err) => {
                let reason = match &err {
                    GameError::InvalidConfiguration(reason) => reason.clone(),
                    other => other.to_string(),
                };
                warn!(game = %id, reason, "rejected configuration");
                self.games.insert(id, Registration::Invalid(reason.clone()));
                Err(GameError::InvalidConfiguration(reason))
            }
        }
    }

    /// Register every game, returning the ones whose configuration was rejected.
    pub fn register_all(&mut self) -> Vec<(GameId, GameError)> {
        GameId::ALL
            .into_iter()
            .filter_map(|id| self.register(id).err().map(|err| (id, err)))
            .collect()
    }

    pub fn active(&self) -> Option<GameId> {
        match &self.slot {
            Slot::Empty => None,
            Slot::Ready(game) | Slot::Unusable { game, .. } => Some(*game),
        }
    }

    /// Why the active slot cannot be played, if it cannot.
    pub fn unusable_reason(&self) -> Option<&str> {
        match &self.slot {
            Slot::Unusable { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn balance(&self) -> u64 {
        self.ledger.balance()
    }

    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        self.ledger.store()
    }

    /// Give up the arcade, returning its store.
    pub fn into_store(self) -> S {
        self.ledger.into_store()
    }

    pub fn game(&self, id: GameId) -> Option<&Table> {
        match self.games.get(&id) {
            Some(Registration::Ready(table)) => Some(table),
            _ => None,
        }
    }

    /// Phase of the active game, if it is playable.
    pub fn phase(&self) -> Option<Phase> {
        match &self.slot {
            Slot::Ready(id) => self.game(*id).map(|table| table.session().phase()),
            _ => None,
        }
    }

    /// Timers still pending, in firing order.
    pub fn pending(&self) -> Vec<Timer> {
        self.scheduler.pending().copied().collect()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Make `id` the active game.
    pub fn switch_to(&mut self, id: GameId) -> Result<(), GameError> {
        let from = self.active();
        if from == Some(id) {
            return Ok(());
        }
        if let Some(previous) = from {
            let mut ctx = Context {
                ledger: &mut self.ledger,
                scheduler: &mut self.scheduler,
                rng: &mut self.rng,
                events: &mut self.events,
            };
            if let Some(Registration::Ready(table)) = self.games.get_mut(&previous) {
                table.reset(&mut ctx, "switched");
            }
        }
        info!(from = ?from, to = %id, "switching game");
        self.events.push(Event::Switched { from, to: id });

        if let Err(err) = self.stage.mount(id) {
            let reason = format!("{err:#}");
            self.mark_unusable(id, reason.clone());
            return Err(GameError::PresentationLoadFailure { game: id, reason });
        }

        let mut ctx = Context {
            ledger: &mut self.ledger,
            scheduler: &mut self.scheduler,
            rng: &mut self.rng,
            events: &mut self.events,
        };
        match self.games.get_mut(&id) {
            Some(Registration::Ready(table)) => {
                table.init(&mut ctx);
                self.slot = Slot::Ready(id);
                Ok(())
            }
            Some(Registration::Invalid(reason)) => {
                let reason = reason.clone();
                self.mark_unusable(id, reason.clone());
                Err(GameError::InvalidConfiguration(reason))
            }
            None => {
                self.mark_unusable(id, "not registered".to_string());
                Err(GameError::Unavailable(id))
            }
        }
    }

    fn mark_unusable(&mut self, game: GameId, reason: String) {
        warn!(game = %game, reason, "slot unusable");
        self.events.push(Event::Unusable {
            game,
            reason: reason.clone(),
        });
        self.slot = Slot::Unusable { game, reason };
    }

    /// Run `f` against the active game if the slot is playable.
    fn with_active<R>(
        &mut self,
        f: impl FnOnce(&mut Table, &mut Context<'_, S>) -> Result<R, GameError>,
    ) -> Result<R, GameError> {
        let id = match &self.slot {
            Slot::Empty => return Err(GameError::NoActiveGame),
            Slot::Unusable { game, .. } => return Err(GameError::Unavailable(*game)),
            Slot::Ready(id) => *id,
        };
        let Some(Registration::Ready(table)) = self.games.get_mut(&id) else {
            return Err(GameError::Unavailable(id));
        };
        let mut ctx = Context {
            ledger: &mut self.ledger,
            scheduler: &mut self.scheduler,
            rng: &mut self.rng,
            events: &mut self.events,
        };
        f(table, &mut ctx)
    }

    /// Wager `amount` on the active game.
    pub fn start(&mut self, amount: u64) -> Result<(), GameError> {
        self.with_active(|table, ctx| table.start(ctx, amount))
    }

    pub fn decide(&mut self, decision: Decision) -> Result<(), GameError> {
        self.with_active(|table, ctx| table.decide(ctx, decision))
    }

    pub fn cash_out(&mut self) -> Result<u64, GameError> {
        self.with_active(|table, ctx| table.cash_out(ctx))
    }

    /// Reset the active game, forfeiting any outstanding wager.
    pub fn reset(&mut self, reason: &str) -> Result<(), GameError> {
        self.with_active(|table, ctx| {
            table.reset(ctx, reason);
            Ok(())
        })
    }

    pub fn controls(&self) -> Controls {
        let Slot::Ready(id) = &self.slot else {
            return Controls::LOCKED;
        };
        let Some(table) = self.game(*id) else {
            return Controls::LOCKED;
        };
        let live = self
            .scheduler
            .is_live(*id, table.session().generation());
        table.controls(live, self.ledger.balance())
    }

    /// Deliver a timer. Timers for a superseded round are dropped.
    pub fn fire(&mut self, timer: Timer) -> Result<(), GameError> {
        let result = match self.games.get_mut(&timer.game) {
            Some(Registration::Ready(table)) if self.slot == Slot::Ready(timer.game) => {
                let mut ctx = Context {
                    ledger: &mut self.ledger,
                    scheduler: &mut self.scheduler,
                    rng: &mut self.rng,
                    events: &mut self.events,
                };
                table.on_timer(&mut ctx, timer)
            }
            Some(Registration::Ready(table)) => Err(table.session().stale(timer.generation)),
            _ => Err(GameError::Unavailable(timer.game)),
        };
        match result {
            Err(GameError::StaleResolution { captured, current }) => {
                debug!(game = %timer.game, captured, current, step = ?timer.step, "dropped stale timer");
                Ok(())
            }
            Err(GameError::Unavailable(game)) => {
                debug!(game = %game, step = ?timer.step, "dropped timer for unavailable game");
                Ok(())
            }
            other => other,
        }
    }

    /// Fire every timer due at or before `now`, then move the clock to `now`.
    pub fn advance_to(&mut self, now: u64) -> Result<usize, GameError> {
        let mut fired = 0;
        while let Some(timer) = self.scheduler.pop_due(now) {
            self.fire(timer)?;
            fired += 1;
        }
        self.scheduler.advance_clock(now);
        Ok(fired)
    }

    /// Move the clock forward by `elapsed` milliseconds.
    pub fn advance(&mut self, elapsed: u64) -> Result<usize, GameError> {
        self.advance_to(self.scheduler.now().saturating_add(elapsed))
    }

    /// Fire timers until none are pending.
    pub fn run_until_idle(&mut self) -> Result<usize, GameError> {
        let mut fired = 0;
        while let Some(due) = self.scheduler.next_due() {
            if fired >= MAX_IDLE_STEPS {
                warn!(fired, "timer chain did not go idle");
                break;
            }
            fired += self.advance_to(due)?;
        }
        Ok(fired)
    }
}
