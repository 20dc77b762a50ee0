//! Normalizer error types
//!
//! Setup errors abort construction of the pipeline. Classification errors
//! fail a single sentence and name the stage and the input span.
//! Verbalization problems are recovered per token and only surface here as
//! [`NormalizerError::MissingWordId`] under the `fail` policy.

use crate::domain::MarkupError;
use crate::rules::{GrammarError, RuleError};
use crate::serialization::SpecError;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Loading configuration and resources
    Setup,
    /// Tokenize and classify
    Classify,
    /// Verbalize
    Verbalize,
}

/// Errors raised by the normalizer
#[derive(Error, Debug)]
pub enum NormalizerError {
    /// A configuration or resource file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The configuration is malformed
    #[error("invalid configuration {origin}: {source}")]
    Config {
        /// Where the configuration came from
        origin: String,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },

    /// A required grammar is not declared
    #[error("configuration does not declare a {0} grammar")]
    MissingGrammar(&'static str),

    /// A grammar failed to load
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// The sentence boundary pattern does not compile
    #[error("invalid sentence boundary regexp {pattern:?}: {source}")]
    BoundaryPattern {
        /// Pattern text
        pattern: String,
        /// Underlying error
        #[source]
        source: regex::Error,
    },

    /// A declared serialization spec failed to load
    #[error("failed to load a valid serialization spec from {path}: {source}")]
    SerializationSpec {
        /// Spec path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: SpecError,
    },

    /// The sentence could not be compiled into an automaton
    #[error("failed to compile input {input:?}: {source}")]
    CompileFailed {
        /// Sentence being classified
        input: String,
        /// Underlying error
        #[source]
        source: RuleError,
    },

    /// The tokenizer/classifier grammar rejected the sentence
    #[error("tokenizer/classifier failed on {input:?}: {source}")]
    RuleApplicationFailed {
        /// Sentence being classified
        input: String,
        /// Underlying error
        #[source]
        source: RuleError,
    },

    /// The classifier output is not valid token markup
    #[error("failed to parse classifier output {output:?} for {input:?}: {source}")]
    ParseFailed {
        /// Sentence being classified
        input: String,
        /// Selected classifier output
        output: String,
        /// Underlying error
        #[source]
        source: MarkupError,
    },

    /// A WORD token has no word id
    #[error("token \"{token}\" has type WORD but there is no word id")]
    MissingWordId {
        /// Token surface form
        token: String,
    },
}

impl NormalizerError {
    /// Stage the error belongs to
    pub fn stage(&self) -> Stage {
        match self {
            NormalizerError::Io { .. }
            | NormalizerError::Config { .. }
            | NormalizerError::MissingGrammar(_)
            | NormalizerError::Grammar(_)
            | NormalizerError::BoundaryPattern { .. }
            | NormalizerError::SerializationSpec { .. } => Stage::Setup,
            NormalizerError::CompileFailed { .. }
            | NormalizerError::RuleApplicationFailed { .. }
            | NormalizerError::ParseFailed { .. } => Stage::Classify,
            NormalizerError::MissingWordId { .. } => Stage::Verbalize,
        }
    }

    /// True for errors that prevent the pipeline from being built
    pub fn is_setup_error(&self) -> bool {
        self.stage() == Stage::Setup
    }

    /// Sentence the error relates to, for per-sentence errors
    pub fn input(&self) -> Option<&str> {
        match self {
            NormalizerError::CompileFailed { input, .. }
            | NormalizerError::RuleApplicationFailed { input, .. }
            | NormalizerError::ParseFailed { input, .. } => Some(input),
            _ => None,
        }
    }
}

/// Result type for normalizer operations
pub type Result<T> = std::result::Result<T, NormalizerError>;
