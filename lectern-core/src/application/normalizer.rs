//! The normalization pipeline
//!
//! A [`Normalizer`] is built once, from a configuration file or from parts,
//! and is immutable afterwards. It can be shared across threads; every call
//! works on its own [`Utterance`].

use super::tokenize::TokenizeClassifyStage;
use super::verbalize::VerbalizeStage;
use crate::config::{resolve_path, NormalizerConfig, VerbalizerOptions};
use crate::domain::{Token, Utterance};
use crate::error::{NormalizerError, Result};
use crate::rules::{load_grammar, RuleSystem};
use crate::segmentation::{SentenceSplitter, DEFAULT_BOUNDARY_REGEXP};
use crate::serialization::{MarkupSerializer, SpecSerializer, TokenSerializer};
use std::path::Path;

/// Sentence splitter, tokenizer/classifier and verbalizer composed
pub struct Normalizer {
    splitter: SentenceSplitter,
    tokenizer: TokenizeClassifyStage,
    verbalizer: VerbalizeStage,
}

impl Normalizer {
    /// Load a pipeline from a configuration file
    ///
    /// With a `path_prefix`, the configuration path and every path inside it
    /// are resolved against the prefix. Without one, paths inside the
    /// configuration are resolved against the configuration file's directory.
    pub fn setup(config_path: impl AsRef<Path>, path_prefix: Option<&Path>) -> Result<Self> {
        let config_path = match path_prefix {
            Some(prefix) => prefix.join(config_path),
            None => config_path.as_ref().to_path_buf(),
        };
        let config = NormalizerConfig::load(&config_path)?;
        let base = match path_prefix {
            Some(prefix) => prefix.to_path_buf(),
            None => config_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        log::info!("Setting up normalizer from {}", config_path.display());
        Self::from_config(&config, &base)
    }

    /// Build a pipeline from a parsed configuration
    pub fn from_config(config: &NormalizerConfig, base: &Path) -> Result<Self> {
        let (tokenizer_path, verbalizer_path) = config.grammar_paths()?;
        let tokenizer = load_grammar(tokenizer_path, base)?;
        let verbalizer = load_grammar(verbalizer_path, base)?;

        let mut splitter = SentenceSplitter::new(&config.sentence_boundary_regexp).map_err(|source| {
            NormalizerError::BoundaryPattern {
                pattern: config.sentence_boundary_regexp.clone(),
                source,
            }
        })?;
        if let Some(file) = &config.sentence_boundary_exceptions_file {
            let path = resolve_path(base, file);
            if let Err(e) = splitter.load_exceptions(&path) {
                log::error!(
                    "Cannot load sentence boundary exceptions from {}: {e}; continuing without them",
                    path.display()
                );
            }
        }

        let mut builder = Self::builder()
            .tokenizer(tokenizer)
            .verbalizer(verbalizer)
            .sentence_splitter(splitter)
            .verbalizer_options(config.verbalizer.clone());

        if let Some(spec) = &config.serialization_spec {
            let path = resolve_path(base, spec);
            let serializer = SpecSerializer::load(&path)
                .map_err(|source| NormalizerError::SerializationSpec { path, source })?;
            builder = builder.serializer(serializer);
        }

        builder.build()
    }

    /// Start assembling a pipeline from in-memory parts
    pub fn builder() -> NormalizerBuilder {
        NormalizerBuilder::default()
    }

    /// Normalize one sentence into space-joined words
    pub fn normalize(&self, sentence: &str) -> Result<String> {
        Ok(self.normalize_utterance(sentence)?.linearize_words())
    }

    /// Normalize one sentence given as raw bytes
    ///
    /// Input that is not well-formed UTF-8 fails with
    /// [`NormalizerError::CompileFailed`].
    pub fn normalize_bytes(&self, sentence: &[u8]) -> Result<String> {
        Ok(self.normalize_utterance_bytes(sentence)?.linearize_words())
    }

    /// Normalize one sentence and return the linked tokens and words
    pub fn normalize_utterance(&self, sentence: &str) -> Result<Utterance> {
        self.normalize_utterance_bytes(sentence.as_bytes())
    }

    /// Byte-level counterpart of [`Normalizer::normalize_utterance`]
    pub fn normalize_utterance_bytes(&self, sentence: &[u8]) -> Result<Utterance> {
        let tokens = self.tokenizer.tokenize_and_classify_bytes(sentence)?;
        let mut utt = Utterance::with_tokens(tokens);
        self.verbalizer.verbalize(&mut utt)?;
        Ok(utt)
    }

    /// Normalize one sentence and dump token/word links
    pub fn normalize_and_show_links(&self, sentence: &str) -> Result<String> {
        Ok(self.normalize_utterance(sentence)?.show_links())
    }

    /// Classify one sentence without verbalizing it
    pub fn tokenize_and_classify(&self, sentence: &str) -> Result<Vec<Token>> {
        self.tokenizer.tokenize_and_classify(sentence)
    }

    /// Split text into sentences
    pub fn split_sentences(&self, text: &str) -> Vec<String> {
        self.splitter.extract_sentences(text)
    }

    /// The sentence splitter in use
    pub fn sentence_splitter(&self) -> &SentenceSplitter {
        &self.splitter
    }

    /// Verbalizer settings in use
    pub fn verbalizer_options(&self) -> &VerbalizerOptions {
        self.verbalizer.options()
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("tokenizer", &self.tokenizer.grammar_name())
            .field("verbalizer", &self.verbalizer.grammar_name())
            .field("sentence_boundary", &self.splitter.boundary_regexp())
            .finish()
    }
}

/// Assembles a [`Normalizer`] from loaded parts
#[derive(Default)]
pub struct NormalizerBuilder {
    tokenizer: Option<Box<dyn RuleSystem>>,
    verbalizer: Option<Box<dyn RuleSystem>>,
    serializer: Option<Box<dyn TokenSerializer>>,
    splitter: Option<SentenceSplitter>,
    options: VerbalizerOptions,
}

impl NormalizerBuilder {
    /// Set the tokenizer/classifier grammar
    pub fn tokenizer(mut self, rules: impl RuleSystem + 'static) -> Self {
        self.tokenizer = Some(Box::new(rules));
        self
    }

    /// Set the verbalizer grammar
    pub fn verbalizer(mut self, rules: impl RuleSystem + 'static) -> Self {
        self.verbalizer = Some(Box::new(rules));
        self
    }

    /// Replace the default markup serializer
    pub fn serializer(mut self, serializer: impl TokenSerializer + 'static) -> Self {
        self.serializer = Some(Box::new(serializer));
        self
    }

    /// Set the sentence splitter
    pub fn sentence_splitter(mut self, splitter: SentenceSplitter) -> Self {
        self.splitter = Some(splitter);
        self
    }

    /// Set verbalizer options
    pub fn verbalizer_options(mut self, options: VerbalizerOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the pipeline; both grammars are required
    pub fn build(self) -> Result<Normalizer> {
        let tokenizer = self
            .tokenizer
            .ok_or(NormalizerError::MissingGrammar("tokenizer/classifier"))?;
        let verbalizer = self
            .verbalizer
            .ok_or(NormalizerError::MissingGrammar("verbalizer"))?;
        let splitter = match self.splitter {
            Some(splitter) => splitter,
            None => SentenceSplitter::new(DEFAULT_BOUNDARY_REGEXP).map_err(|source| {
                NormalizerError::BoundaryPattern {
                    pattern: DEFAULT_BOUNDARY_REGEXP.to_string(),
                    source,
                }
            })?,
        };
        let serializer: Box<dyn TokenSerializer> = match self.serializer {
            Some(serializer) => serializer,
            None => Box::new(MarkupSerializer),
        };

        Ok(Normalizer {
            splitter,
            tokenizer: TokenizeClassifyStage::new(tokenizer),
            verbalizer: VerbalizeStage::new(verbalizer, serializer, self.options),
        })
    }
}
