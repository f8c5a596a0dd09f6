//! Command-line interface for humaneval_forge.
//!
//! Provides the `direct` and `auto` generation commands.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands};
