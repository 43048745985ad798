mod constants;
mod event;
mod game;
mod tables;

pub use constants::*;
pub use event::*;
pub use game::*;
pub use tables::*;
