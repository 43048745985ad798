//! Virtual-time timer queue driving every multi-step round.
//!
//! Each timer names the game and generation it was armed for. A chain is the set of
//! timers sharing a (game, generation) pair; each step arms the next one from its own
//! handler. Cancelling a chain purges it from the queue, and the owning session bumps
//! its generation so that any timer captured before the purge resolves as stale.

use parlor_types::casino::GameId;
use std::collections::BTreeMap;
use tracing::debug;

/// Round counter used to discard work scheduled for a superseded round.
pub type Generation = u64;

/// What a timer does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Plinko: show the ball at a row.
    Peg(u8),
    /// Plinko: settle the landing slot.
    Land,
    /// Red/black: reveal the guessed card.
    Flip,
    /// Crash: grow the multiplier.
    Tick,
    /// Roulette and wheel: stop the wheel.
    Spin,
    /// Keno: reveal the n-th drawn number (settles once every number is shown).
    Draw(u8),
    /// Chicken: finish crossing into the next lane.
    Cross,
    /// Blackjack: dealer auto-play.
    Dealer,
    /// Slots: stop a reel.
    Reel(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timer {
    pub id: u64,
    pub due: u64,
    pub game: GameId,
    pub generation: Generation,
    pub step: Step,
}

#[derive(Default)]
pub struct Scheduler {
    now: u64,
    next_id: u64,
    queue: BTreeMap<(u64, u64), Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Arm a timer `delay` ms from now.
    pub fn schedule(&mut self, game: GameId, generation: Generation, delay: u64, step: Step) -> Timer {
        let timer = Timer {
            id: self.next_id,
            due: self.now.saturating_add(delay),
            game,
            generation,
            step,
        };
        self.next_id += 1;
        self.queue.insert((timer.due, timer.id), timer);
        debug!(game = %game, generation, due = timer.due, ?step, "armed timer");
        timer
    }

    /// Drop every pending timer of a chain, returning how many were removed.
    pub fn cancel(&mut self, game: GameId, generation: Generation) -> usize {
        let before = self.queue.len();
        self.queue
            .retain(|_, timer| !(timer.game == game && timer.generation == generation));
        let removed = before - self.queue.len();
        if removed > 0 {
            debug!(game = %game, generation, removed, "cancelled chain");
        }
        removed
    }

    /// Whether a chain still has a pending timer.
    pub fn is_live(&self, game: GameId, generation: Generation) -> bool {
        self.queue
            .values()
            .any(|timer| timer.game == game && timer.generation == generation)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Timer> {
        self.queue.values()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Remove the earliest timer due at or before `until`, moving the clock to it.
    pub fn pop_due(&mut self, until: u64) -> Option<Timer> {
        let (&key, _) = self.queue.iter().next()?;
        if key.0 > until {
            return None;
        }
        let timer = self.queue.remove(&key)?;
        self.now = self.now.max(timer.due);
        Some(timer)
    }

    /// Move the clock forward without firing anything.
    pub fn advance_clock(&mut self, until: u64) {
        self.now = self.now.max(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(GameId::Keno, 1, 300, Step::Draw(2));
        scheduler.schedule(GameId::Keno, 1, 100, Step::Draw(0));
        scheduler.schedule(GameId::Keno, 1, 100, Step::Draw(1));

        assert_eq!(scheduler.next_due(), Some(100));
        assert_eq!(scheduler.pop_due(99), None);
        assert_eq!(scheduler.pop_due(1_000).unwrap().step, Step::Draw(0));
        assert_eq!(scheduler.pop_due(1_000).unwrap().step, Step::Draw(1));
        assert_eq!(scheduler.now(), 100);
        assert_eq!(scheduler.pop_due(1_000).unwrap().step, Step::Draw(2));
        assert_eq!(scheduler.now(), 300);
        assert_eq!(scheduler.pop_due(1_000), None);
    }

    #[test]
    fn test_delays_are_relative_to_now() {
        let mut scheduler = Scheduler::new();
        scheduler.advance_clock(500);
        let timer = scheduler.schedule(GameId::Crash, 0, 100, Step::Tick);
        assert_eq!(timer.due, 600);

        // The clock never runs backwards.
        scheduler.advance_clock(10);
        assert_eq!(scheduler.now(), 500);
    }

    #[test]
    fn test_cancel_only_touches_one_chain() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(GameId::Crash, 1, 100, Step::Tick);
        scheduler.schedule(GameId::Crash, 2, 100, Step::Tick);
        scheduler.schedule(GameId::Wheel, 1, 100, Step::Spin);

        assert_eq!(scheduler.cancel(GameId::Crash, 1), 1);
        assert!(!scheduler.is_live(GameId::Crash, 1));
        assert!(scheduler.is_live(GameId::Crash, 2));
        assert!(scheduler.is_live(GameId::Wheel, 1));

        // Cancelling twice is harmless.
        assert_eq!(scheduler.cancel(GameId::Crash, 1), 0);
        assert_eq!(scheduler.pending().count(), 2);
    }
}
