//! Tokenize and classify a sentence

use crate::domain::{parse_tokens, Token};
use crate::error::{NormalizerError, Result};
use crate::rules::{Automaton, RuleSystem};

/// Turns a sentence into classified tokens with the tokenizer/classifier
/// grammar
pub struct TokenizeClassifyStage {
    rules: Box<dyn RuleSystem>,
}

impl TokenizeClassifyStage {
    /// Create the stage around a loaded tokenizer/classifier grammar
    pub fn new(rules: Box<dyn RuleSystem>) -> Self {
        Self { rules }
    }

    /// Grammar name
    pub fn grammar_name(&self) -> &str {
        self.rules.name()
    }

    /// Classify one sentence
    ///
    /// Compiles the sentence byte by byte, applies the grammar with
    /// lookahead, takes the cheapest path and parses it as token markup.
    /// Tokens get the byte span of their surface form in `input` when it can
    /// be found.
    pub fn tokenize_and_classify(&self, input: &str) -> Result<Vec<Token>> {
        self.tokenize_and_classify_bytes(input.as_bytes())
    }

    /// Classify one sentence given as raw bytes
    ///
    /// Malformed UTF-8 fails here with [`NormalizerError::CompileFailed`].
    pub fn tokenize_and_classify_bytes(&self, input: &[u8]) -> Result<Vec<Token>> {
        let compiled = Automaton::compile(input).map_err(|source| {
            let input = String::from_utf8_lossy(input);
            log::error!("Failed to compile input string \"{input}\"");
            NormalizerError::CompileFailed {
                input: input.into_owned(),
                source,
            }
        })?;
        // Borrows: compilation accepted the bytes as UTF-8
        let text = String::from_utf8_lossy(input);
        let input: &str = &text;

        let output = self
            .rules
            .apply_rules_to_string(&compiled, true)
            .map_err(|source| {
                log::error!("Failed to tokenize \"{input}\"");
                NormalizerError::RuleApplicationFailed {
                    input: input.to_string(),
                    source,
                }
            })?;

        let mut tokens = parse_tokens(&output).map_err(|source| {
            log::error!("Failed to parse tokens for \"{input}\"");
            NormalizerError::ParseFailed {
                input: input.to_string(),
                output: output.clone(),
                source,
            }
        })?;

        locate_tokens(input, &mut tokens);
        log::debug!("Classified \"{input}\" into {} tokens", tokens.len());
        Ok(tokens)
    }
}

/// Set start/end offsets by finding each surface form after the previous one
fn locate_tokens(input: &str, tokens: &mut [Token]) {
    let mut cursor = 0;
    for token in tokens.iter_mut() {
        if token.name.is_empty() {
            continue;
        }
        if let Some(offset) = input[cursor..].find(token.name.as_str()) {
            let start = cursor + offset;
            let end = start + token.name.len();
            token.start_index = Some(start);
            token.end_index = Some(end);
            cursor = end;
        }
    }
}
