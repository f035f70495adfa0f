mod env;
mod interpreter;
pub mod object;
pub mod system;

pub use crate::interpreter::{Flow, Interpreter, MAX_FRAMES};
pub use crate::system::{Clock, Console, Sleep, System};
