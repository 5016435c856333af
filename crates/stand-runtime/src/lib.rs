#![deny(warnings)]

//! Lemonade stand runtime: daily resolution, the turn-based session state
//! machine and the presentation adapter contract.

pub mod engine;
pub mod presenter;
pub mod session;

pub use engine::{apply_result, resolve_day, resolve_turn, skip_turn, DayCosts};
pub use presenter::{play, Presenter};
pub use session::{GameSession, SessionError, SessionStatus, Turn, TurnReport};
