//! CLI command implementations

pub mod normalize;

pub use normalize::{normalize_stream, NormalizeArgs, OnError, OutputFormat, RunSummary};
