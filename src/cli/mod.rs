//! CLI module
//!
//! Command-line consumer of the pagination facade.
//!
//! # Commands
//!
//! - `search` - Fetch one or more pages for a query and print them
//! - `interactive` - Type queries on stdin, empty line loads the next page
//! - `config` - Print the effective configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
