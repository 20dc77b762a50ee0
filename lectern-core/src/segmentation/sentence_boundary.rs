//! Regex-driven sentence splitting with an exception list

use regex::Regex;
use std::fs;
use std::io;
use std::path::Path;

/// Boundary used when the configuration names none: a terminal mark and a space
pub const DEFAULT_BOUNDARY_REGEXP: &str = "[.:!?] ";

/// Splits raw text into sentence spans
///
/// Every match of the boundary pattern is a candidate cut. A candidate is
/// vetoed when the text since the previous cut, up to and including the
/// marker, ends with one of the exceptions (typically abbreviations such as
/// `mnr.`). Exceptions are padded with a leading space so that `mnr.` does not
/// veto `pymnr.`; an exception also vetoes a cut when it makes up the whole
/// span since the previous cut.
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    boundary: Regex,
    exceptions: Vec<String>,
    pad_exceptions: bool,
}

impl SentenceSplitter {
    /// Create a splitter for the given boundary pattern
    pub fn new(boundary_regexp: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            boundary: Regex::new(boundary_regexp)?,
            exceptions: Vec::new(),
            pad_exceptions: true,
        })
    }

    /// Toggle padding of exceptions added afterwards
    pub fn with_exception_padding(mut self, pad: bool) -> Self {
        self.pad_exceptions = pad;
        self
    }

    /// Boundary pattern source
    pub fn boundary_regexp(&self) -> &str {
        self.boundary.as_str()
    }

    /// Loaded exceptions, padded as stored
    pub fn exceptions(&self) -> &[String] {
        &self.exceptions
    }

    /// Add exceptions from newline-separated text; blank lines are skipped
    ///
    /// Returns the number of exceptions added.
    pub fn add_exceptions(&mut self, text: &str) -> usize {
        let before = self.exceptions.len();
        for line in text.lines() {
            let entry = line.trim();
            if entry.is_empty() {
                continue;
            }
            if self.pad_exceptions {
                self.exceptions.push(format!(" {entry}"));
            } else {
                self.exceptions.push(entry.to_string());
            }
        }
        self.exceptions.len() - before
    }

    /// Read an exceptions file, one entry per line
    pub fn load_exceptions(&mut self, path: &Path) -> io::Result<usize> {
        let text = fs::read_to_string(path)?;
        let added = self.add_exceptions(&text);
        log::debug!(
            "Loaded {added} sentence boundary exceptions from {}",
            path.display()
        );
        Ok(added)
    }

    /// Split text into trimmed, non-empty sentences
    ///
    /// Text without any accepted boundary comes back as a single sentence;
    /// blank text yields none.
    pub fn extract_sentences(&self, text: &str) -> Vec<String> {
        let mut cutpoints = Vec::new();
        let mut last = 0;
        for candidate in self.boundary.find_iter(text) {
            let before = &text[last..candidate.start()];
            if self.evaluate_candidate(before, candidate.as_str()) {
                cutpoints.push(candidate.end());
                last = candidate.end();
            }
        }

        let mut sentences = Vec::with_capacity(cutpoints.len() + 1);
        let mut last = 0;
        for cut in cutpoints.into_iter().chain(std::iter::once(text.len())) {
            let sentence = text[last..cut].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            last = cut;
        }
        sentences
    }

    /// True if the candidate boundary after `before` is a real boundary
    fn evaluate_candidate(&self, before: &str, marker: &str) -> bool {
        let previous = format!("{before}{marker}");
        let previous = previous.trim();
        for exception in &self.exceptions {
            if previous.ends_with(exception.as_str()) {
                return false;
            }
            if self.pad_exceptions && previous == exception.trim() {
                return false;
            }
        }
        true
    }
}
