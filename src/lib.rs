// Library module for hashkit
// Re-exports modules for use in integration tests and the command line tool

pub mod config;
pub mod hash;

pub use config::Config;
pub use hash::{HashError, HashRegistry, Options, OutputFormat};
