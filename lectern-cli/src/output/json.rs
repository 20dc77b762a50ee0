//! JSON output formatter

use super::OutputFormatter;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// JSON Lines formatter - one object per sentence, written as it arrives
pub struct JsonFormatter<W: Write> {
    writer: W,
}

/// Data structure for JSON output
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SentenceData {
    /// The sentence as split from the input
    pub sentence: String,
    /// Its normalized form
    pub output: String,
}

impl<W: Write> JsonFormatter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputFormatter for JsonFormatter<W> {
    fn format_sentence(&mut self, sentence: &str, output: &str) -> Result<()> {
        let data = SentenceData {
            sentence: sentence.to_string(),
            output: output.to_string(),
        };
        serde_json::to_writer(&mut self.writer, &data)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
