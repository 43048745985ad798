pub mod casino;
pub mod config;
pub mod ledger;
pub mod lifecycle;
pub mod scheduler;
pub mod session;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

mod state;

pub use config::{Config, ConfigError};
pub use ledger::{parse_amount, Ledger, LedgerError};
pub use lifecycle::{Arcade, Headless, Stage};
pub use scheduler::{Generation, Scheduler, Step, Timer};
pub use session::Session;
pub use state::{Journal, JournalError, Memory, Store};
