//! Application layer: drives the kernel store, the async runtime and a map
//! backend from one loop.

pub mod command;
pub mod dashboard;

pub use command::{CommandError, ConsoleCommand, HELP};
pub use dashboard::{Dashboard, StartupError};
