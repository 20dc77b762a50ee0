//! Input handling module

pub mod line_reader;

pub use line_reader::{InputMode, LineReader};
