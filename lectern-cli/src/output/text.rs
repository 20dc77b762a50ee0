//! Plain text output formatter

use super::OutputFormatter;
use anyhow::Result;
use std::io::Write;

/// Plain text formatter - one normalized sentence per line
pub struct TextFormatter<W: Write> {
    writer: W,
}

impl<W: Write> TextFormatter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputFormatter for TextFormatter<W> {
    fn format_sentence(&mut self, _sentence: &str, output: &str) -> Result<()> {
        writeln!(self.writer, "{output}")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_one_line_per_sentence() {
        let mut buffer = Vec::new();
        {
            let mut formatter = TextFormatter::new(&mut buffer);
            formatter.format_sentence("Ja, nee", "Ja sil nee").unwrap();
            formatter.format_sentence("3 koeie", "drie koeie").unwrap();
            formatter.finish().unwrap();
        }
        assert_eq!(String::from_utf8(buffer).unwrap(), "Ja sil nee\ndrie koeie\n");
    }
}
