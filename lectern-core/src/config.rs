//! Normalizer configuration
//!
//! ```toml
//! tokenizer_grammar = "grammars/af_tokenizer.toml"
//! verbalizer_grammar = "grammars/af_verbalizer.toml"
//! sentence_boundary_regexp = "[.:!?] "
//! sentence_boundary_exceptions_file = "af_exceptions.txt"
//! serialization_spec = "af_serialization.toml"
//!
//! [verbalizer]
//! silence_word = "sil"
//! missing_word_id = "drop"
//! ```

use crate::error::{NormalizerError, Result};
use crate::segmentation::DEFAULT_BOUNDARY_REGEXP;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What to do with a WORD token that carries no word id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingWordIdPolicy {
    /// Log an error and emit nothing for the token
    #[default]
    Drop,
    /// Fail the sentence
    Fail,
    /// Emit the token's surface form as its word
    Synthesize,
}

/// Verbalizer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerbalizerOptions {
    /// Word emitted for a phrase break
    pub silence_word: String,
    /// Handling of WORD tokens without a word id
    pub missing_word_id: MissingWordIdPolicy,
}

impl Default for VerbalizerOptions {
    fn default() -> Self {
        Self {
            silence_word: "sil".to_string(),
            missing_word_id: MissingWordIdPolicy::Drop,
        }
    }
}

/// Top-level configuration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NormalizerConfig {
    /// Tokenizer/classifier grammar (required)
    pub tokenizer_grammar: Option<String>,
    /// Verbalizer grammar (required)
    pub verbalizer_grammar: Option<String>,
    /// Candidate sentence boundary pattern
    #[serde(default = "default_boundary_regexp")]
    pub sentence_boundary_regexp: String,
    /// Abbreviations and other strings that veto a boundary
    pub sentence_boundary_exceptions_file: Option<String>,
    /// Custom serialization spec for semiotic tokens
    pub serialization_spec: Option<String>,
    /// Verbalizer settings
    #[serde(default)]
    pub verbalizer: VerbalizerOptions,
}

fn default_boundary_regexp() -> String {
    DEFAULT_BOUNDARY_REGEXP.to_string()
}

impl NormalizerConfig {
    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = load_file_to_string(path)?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Parse a configuration held in memory
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Self::parse(text, "<string>")
    }

    fn parse(text: &str, origin: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| NormalizerError::Config {
            origin: origin.to_string(),
            source,
        })
    }

    /// Tokenizer/classifier and verbalizer grammar paths
    pub fn grammar_paths(&self) -> Result<(&str, &str)> {
        let tokenizer = self
            .tokenizer_grammar
            .as_deref()
            .ok_or(NormalizerError::MissingGrammar("tokenizer/classifier"))?;
        let verbalizer = self
            .verbalizer_grammar
            .as_deref()
            .ok_or(NormalizerError::MissingGrammar("verbalizer"))?;
        Ok((tokenizer, verbalizer))
    }
}

/// Read a whole file
///
/// A missing or unreadable file is an error, never an empty string.
pub fn load_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| NormalizerError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve a configured path against a base directory
///
/// Absolute paths are returned unchanged.
pub fn resolve_path(base: &Path, path: &str) -> PathBuf {
    base.join(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NormalizerConfig::from_toml_str(
            "tokenizer_grammar = \"t.toml\"\nverbalizer_grammar = \"v.toml\"\n",
        )
        .unwrap();

        assert_eq!(config.sentence_boundary_regexp, "[.:!?] ");
        assert_eq!(config.sentence_boundary_exceptions_file, None);
        assert_eq!(config.serialization_spec, None);
        assert_eq!(config.verbalizer, VerbalizerOptions::default());
        assert_eq!(config.verbalizer.silence_word, "sil");
        assert_eq!(config.grammar_paths().unwrap(), ("t.toml", "v.toml"));
    }

    #[test]
    fn test_full_document() {
        let config = NormalizerConfig::from_toml_str(
            r#"
tokenizer_grammar = "t.toml"
verbalizer_grammar = "v.toml"
sentence_boundary_regexp = "[.!?] +"
sentence_boundary_exceptions_file = "exceptions.txt"
serialization_spec = "spec.toml"

[verbalizer]
silence_word = "pau"
missing_word_id = "synthesize"
"#,
        )
        .unwrap();

        assert_eq!(config.sentence_boundary_regexp, "[.!?] +");
        assert_eq!(config.serialization_spec.as_deref(), Some("spec.toml"));
        assert_eq!(config.verbalizer.silence_word, "pau");
        assert_eq!(
            config.verbalizer.missing_word_id,
            MissingWordIdPolicy::Synthesize
        );
    }

    #[test]
    fn test_missing_grammars() {
        let config = NormalizerConfig::from_toml_str("tokenizer_grammar = \"t.toml\"\n").unwrap();
        assert!(matches!(
            config.grammar_paths(),
            Err(NormalizerError::MissingGrammar("verbalizer"))
        ));

        let config = NormalizerConfig::from_toml_str("verbalizer_grammar = \"v.toml\"\n").unwrap();
        assert!(matches!(
            config.grammar_paths(),
            Err(NormalizerError::MissingGrammar("tokenizer/classifier"))
        ));
    }

    #[test]
    fn test_malformed_documents() {
        for text in [
            "tokenizer_grammar = \"t\"\nverbaliser_grammar = \"v\"\n",
            "tokenizer_grammar = 3\n",
            "[verbalizer]\nmissing_word_id = \"ignore\"\n",
        ] {
            assert!(
                matches!(
                    NormalizerConfig::from_toml_str(text),
                    Err(NormalizerError::Config { .. })
                ),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_file_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "tokenizer_grammar = \"t\"\nverbalizer_grammar = \"v\"\n").unwrap();

        assert!(NormalizerConfig::load(&path).is_ok());
        let missing = NormalizerConfig::load(&dir.path().join("absent.toml"));
        assert!(matches!(missing, Err(NormalizerError::Io { .. })));
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            resolve_path(Path::new("/data/af"), "grammars/t.toml"),
            PathBuf::from("/data/af/grammars/t.toml")
        );
        assert_eq!(
            resolve_path(Path::new("/data/af"), "/abs/t.toml"),
            PathBuf::from("/abs/t.toml")
        );
    }
}
