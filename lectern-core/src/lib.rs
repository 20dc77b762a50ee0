//! Grammar-driven text normalization for speech
//!
//! This crate turns written text into the linear word sequence a speech
//! synthesizer reads aloud: `"4,3 - 5,7m"` becomes `"vier komma drie tot
//! vyf komma sewe meter"` given suitable grammars.
//!
//! # Pipeline
//!
//! 1. **Sentence splitting**: a boundary pattern proposes cuts, an
//!    exception list (abbreviations) vetoes some of them.
//! 2. **Tokenize and classify**: the tokenizer/classifier grammar rewrites
//!    the sentence into token markup, which is parsed into typed tokens.
//! 3. **Verbalize**: semiotic tokens are serialized and rewritten by the
//!    verbalizer grammar, with a verbatim fallback; words and punctuation
//!    become the word stream, linked back to their tokens.
//!
//! # Example
//!
//! ```rust
//! use lectern_core::rules::Grammar;
//! use lectern_core::Normalizer;
//!
//! let tokenizer = Grammar::from_toml_str(r#"
//! name = "tokenizer"
//! order = ["TOKENIZE"]
//!
//! [[rules.TOKENIZE.rewrites]]
//! pattern = "[A-Za-z]+"
//! output = 'tokens { name: "${0}" wordid: "${0}" } '
//!
//! [[rules.TOKENIZE.rewrites]]
//! pattern = " "
//!
//! [[rules.TOKENIZE.rewrites]]
//! pattern = "[.]"
//! output = 'tokens { name: "." wordid: "." } '
//! "#).unwrap();
//!
//! let verbalizer = Grammar::from_toml_str(r#"
//! name = "verbalizer"
//! order = ["VERBALIZE"]
//! [rules.VERBALIZE]
//! passthrough = true
//! "#).unwrap();
//!
//! let normalizer = Normalizer::builder()
//!     .tokenizer(tokenizer)
//!     .verbalizer(verbalizer)
//!     .build()
//!     .unwrap();
//!
//! for sentence in normalizer.split_sentences("Dit is nat. Die koeie is ook nat.") {
//!     println!("{}", normalizer.normalize(&sentence).unwrap());
//! }
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod rules;
pub mod segmentation;
pub mod serialization;

pub use application::{Normalizer, NormalizerBuilder, TokenizeClassifyStage, VerbalizeStage};
pub use config::{MissingWordIdPolicy, NormalizerConfig, VerbalizerOptions};
pub use domain::{Token, TokenType, Utterance, Word};
pub use error::{NormalizerError, Result, Stage};
pub use rules::{Grammar, RuleSystem};
pub use segmentation::SentenceSplitter;
pub use serialization::{MarkupSerializer, SpecSerializer, TokenSerializer};
