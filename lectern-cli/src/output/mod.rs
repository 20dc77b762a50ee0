//! Output formatting module

use anyhow::Result;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Write the result of normalizing one sentence
    fn format_sentence(&mut self, sentence: &str, output: &str) -> Result<()>;

    /// Flush anything still buffered
    fn finish(&mut self) -> Result<()>;
}

pub mod json;
pub mod links;
pub mod text;

pub use json::JsonFormatter;
pub use links::LinksFormatter;
pub use text::TextFormatter;
