//! Command-line filter for the lectern text normalizer
//!
//! Reads standard input, splits it into sentences and writes one normalized
//! line (or JSON object, or link table) per sentence to standard output.

pub mod commands;
pub mod error;
pub mod input;
pub mod output;

pub use error::{CliError, CliResult};
