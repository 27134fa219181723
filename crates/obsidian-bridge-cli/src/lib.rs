pub mod cli;
pub mod commands;
pub mod error;
pub mod utils;

pub use cli::{Cli, Commands};
pub use error::{CliError, CliResult};
pub use utils::{init_tracing, ColoredOutput};
