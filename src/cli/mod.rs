pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
pub use commands::{lookup_prompt, run};
