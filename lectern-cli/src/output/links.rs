//! Token/word link table output

use super::OutputFormatter;
use anyhow::Result;
use std::io::Write;

/// Writes the link table of each sentence followed by a blank line
pub struct LinksFormatter<W: Write> {
    writer: W,
}

impl<W: Write> LinksFormatter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputFormatter for LinksFormatter<W> {
    fn format_sentence(&mut self, _sentence: &str, output: &str) -> Result<()> {
        write!(self.writer, "{output}")?;
        if !output.ends_with('\n') {
            writeln!(self.writer)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
