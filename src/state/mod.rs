pub mod capture;
pub mod drag;
pub mod landmark;
pub mod pinch;
pub mod session;

pub use landmark::HandFrame;
pub use session::{PuzzleSession, SessionCommand, SessionPhase};
