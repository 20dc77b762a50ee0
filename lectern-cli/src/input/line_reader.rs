//! Logical inputs read from a line-oriented stream

use anyhow::{Context, Result};
use std::io::BufRead;

/// How lines of the input stream map onto normalizer inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Every line is an independent input
    SingleLine,
    /// All lines are joined with spaces into one input
    MultiLine,
}

/// Iterator over logical inputs as raw bytes
///
/// Lines are not decoded here: a line that is not valid UTF-8 is handed on
/// as is and fails as a single sentence downstream.
///
/// In [`InputMode::SingleLine`] each line is yielded as soon as it is read,
/// so the filter stays interactive. [`InputMode::MultiLine`] drains the
/// stream and yields a single joined input, or nothing for empty input.
pub struct LineReader<R> {
    reader: R,
    mode: InputMode,
    drained: bool,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R, mode: InputMode) -> Self {
        Self {
            reader,
            mode,
            drained: false,
        }
    }

    /// Next line without its `\n` or `\r\n` terminator
    fn read_line(&mut self) -> Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        let read = self
            .reader
            .read_until(b'\n', &mut line)
            .context("Failed to read standard input")?;
        if read == 0 {
            return Ok(None);
        }
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    fn join_all(&mut self) -> Result<Option<Vec<u8>>> {
        let mut input: Option<Vec<u8>> = None;
        while let Some(line) = self.read_line()? {
            match input.as_mut() {
                Some(joined) => {
                    joined.push(b' ');
                    joined.extend_from_slice(&line);
                }
                None => input = Some(line),
            }
        }
        Ok(input)
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.drained {
            return None;
        }
        let next = match self.mode {
            InputMode::SingleLine => self.read_line(),
            InputMode::MultiLine => {
                self.drained = true;
                self.join_all()
            }
        };
        if matches!(next, Err(_) | Ok(None)) {
            self.drained = true;
        }
        next.transpose()
    }
}
