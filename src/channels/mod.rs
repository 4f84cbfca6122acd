//! User-facing channels.

pub mod cli;

pub use cli::CliChannel;
