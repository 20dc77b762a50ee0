//! Rule engine error types
//!
//! [`GrammarError`] is raised while loading a grammar and is fatal to setup.
//! [`RuleError`] is raised while applying one and only affects the input at
//! hand.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while applying rules to an automaton
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    /// Input could not be compiled into an automaton
    #[error("failed to compile input string {input:?}: {reason}")]
    CompileFailed {
        /// Lossy rendering of the input bytes
        input: String,
        /// Why compilation failed
        reason: String,
    },

    /// A rule in the cascade produced no output path
    #[error("application of rule \"{rule}\" in grammar \"{grammar}\" failed")]
    RuleFailed {
        /// Grammar name
        grammar: String,
        /// Rule that produced nothing
        rule: String,
    },

    /// The automaton has no path to select
    #[error("automaton accepts no path")]
    EmptyResult,

    /// The selected path is not a valid output string
    #[error("failed to print output string: {0}")]
    InvalidOutput(String),
}

/// Errors raised while loading a grammar
#[derive(Error, Debug)]
pub enum GrammarError {
    /// Grammar file could not be read
    #[error("failed to read grammar {path}: {source}")]
    Io {
        /// Grammar path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Grammar file is not a valid grammar document
    #[error("failed to parse grammar {origin}: {source}")]
    Parse {
        /// Where the document came from
        origin: String,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },

    /// The rule order names a rule the grammar does not define
    #[error("rule \"{rule}\" not found in \"{grammar}\"")]
    MissingRule {
        /// Grammar name
        grammar: String,
        /// Missing rule
        rule: String,
    },

    /// A rewrite or context pattern does not compile
    #[error("invalid pattern {pattern:?} in rule \"{rule}\": {source}")]
    InvalidPattern {
        /// Rule holding the pattern
        rule: String,
        /// The pattern text
        pattern: String,
        /// Underlying error
        #[source]
        source: regex::Error,
    },

    /// The grammar applies no rules
    #[error("grammar \"{0}\" has an empty rule order")]
    Empty(String),
}

/// Result type for rule application
pub type Result<T> = std::result::Result<T, RuleError>;
