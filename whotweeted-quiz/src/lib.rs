//! The interactive half of Who Tweeted?.
//!
//! Everything here is synchronous and generic over `BufRead`/`Write`, so the
//! whole game can be driven from a script in tests. Randomness goes through the
//! [`Draw`] seam for the same reason.
pub mod console;
pub mod draw;
pub mod guess;
pub mod quiz;
pub mod session;
pub mod setup;

pub use console::Console;
pub use draw::{Draw, RandomDraw, Seat};
pub use guess::{Guess, parse_guess};
pub use quiz::{Outcome, Quiz};
pub use session::SessionState;
