// ABOUTME: External process execution used by every docker-facing component.
// ABOUTME: Exposes CommandSpec, the CommandRunner seam, and the live-stdio SystemRunner.

mod command;
mod error;
mod runner;

pub use command::CommandSpec;
pub use error::{ExitSnafu, ProcessError, SpawnSnafu};
pub use runner::{CommandRunner, SystemRunner};
