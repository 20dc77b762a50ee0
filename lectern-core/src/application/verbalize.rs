//! Verbalize classified tokens into words
//!
//! Dispatch is by token type:
//!
//! - `PUNCT` emits nothing, except a silence word for a phrase break unless
//!   the previous word already is one.
//! - `SEMIOTIC_CLASS` is serialized and rewritten by the verbalizer grammar.
//!   When that fails the token is reduced to its verbatim reading and tried
//!   again; when that fails too its surface form is used as is.
//! - `WORD` emits its word id.

use crate::config::{MissingWordIdPolicy, VerbalizerOptions};
use crate::domain::{format_token, Token, TokenType, Utterance, Word};
use crate::error::{NormalizerError, Result};
use crate::rules::{RuleError, RuleSystem};
use crate::serialization::{SerializeError, TokenSerializer};
use thiserror::Error;

/// Verbalizer output word standing for a pause
const PAUSE_MARK: &str = ",";

#[derive(Error, Debug)]
enum VerbalizeFailure {
    #[error("serialization failed: {0}")]
    Serialize(#[from] SerializeError),
    #[error(transparent)]
    Rules(#[from] RuleError),
    #[error("verbalizer produced no words")]
    NoWords,
}

/// Turns classified tokens into the word stream
pub struct VerbalizeStage {
    rules: Box<dyn RuleSystem>,
    serializer: Box<dyn TokenSerializer>,
    options: VerbalizerOptions,
}

impl VerbalizeStage {
    /// Create the stage around a loaded verbalizer grammar
    pub fn new(
        rules: Box<dyn RuleSystem>,
        serializer: Box<dyn TokenSerializer>,
        options: VerbalizerOptions,
    ) -> Self {
        Self {
            rules,
            serializer,
            options,
        }
    }

    /// Grammar name
    pub fn grammar_name(&self) -> &str {
        self.rules.name()
    }

    /// Verbalizer settings
    pub fn options(&self) -> &VerbalizerOptions {
        &self.options
    }

    /// Verbalize a token sequence and return the words
    pub fn verbalize_tokens(&self, tokens: Vec<Token>) -> Result<Vec<Word>> {
        let mut utt = Utterance::with_tokens(tokens);
        self.verbalize(&mut utt)?;
        Ok(utt.linguistic.words)
    }

    /// Append words for every token of the utterance and link them
    ///
    /// Per-token verbalization failures are recovered and logged. The only
    /// error is a WORD token without a word id under
    /// [`MissingWordIdPolicy::Fail`].
    pub fn verbalize(&self, utt: &mut Utterance) -> Result<()> {
        for index in 0..utt.linguistic.tokens.len() {
            utt.linguistic.tokens[index].daughters = None;
            let token = utt.linguistic.tokens[index].clone();

            match token.token_type {
                TokenType::Punct => self.verbalize_punct(utt, index, &token),
                TokenType::SemioticClass if token.skip => {}
                TokenType::SemioticClass => self.verbalize_with_fallback(utt, index, &token),
                TokenType::Word => self.verbalize_word(utt, index, &token)?,
            }
        }
        log::debug!("Verbalize output: {}", utt.linearize_words());
        Ok(())
    }

    fn verbalize_punct(&self, utt: &mut Utterance, index: usize, token: &Token) {
        if !token.phrase_break {
            return;
        }
        let silence = &self.options.silence_word;
        if utt.last_word().map_or(true, |w| &w.id != silence) {
            utt.add_unlinked_word(index, silence.as_str());
        }
    }

    fn verbalize_word(&self, utt: &mut Utterance, index: usize, token: &Token) -> Result<()> {
        if let Some(word_id) = &token.word_id {
            utt.add_word(index, word_id.as_str());
            return Ok(());
        }

        match self.options.missing_word_id {
            MissingWordIdPolicy::Drop => {
                log::error!(
                    "Token [{}] has type WORD but there is no word id",
                    format_token(token)
                );
                Ok(())
            }
            MissingWordIdPolicy::Fail => Err(NormalizerError::MissingWordId {
                token: token.name.clone(),
            }),
            MissingWordIdPolicy::Synthesize => {
                log::warn!(
                    "Token [{}] has no word id, using its name",
                    format_token(token)
                );
                utt.add_word(index, token.name.as_str());
                Ok(())
            }
        }
    }

    fn verbalize_with_fallback(&self, utt: &mut Utterance, index: usize, token: &Token) {
        let token_form = format_token(token);
        log::debug!("Verbalizing: [{token_form}]");

        let first_error = match self.verbalize_semiotic_class(token) {
            Ok(words) => {
                self.add_words(utt, index, &words);
                return;
            }
            Err(e) => e,
        };
        log::warn!("First-pass verbalization failed for [{token_form}]: {first_error}");

        let fallback = token.to_verbatim_fallback();
        let result = self.verbalize_semiotic_class(&fallback);
        utt.linguistic.tokens[index] = fallback;
        match result {
            Ok(words) => {
                log::warn!("Reversion to verbatim succeeded for [{}]", token.name);
                self.add_words(utt, index, &words);
            }
            Err(e) => {
                log::error!(
                    "Verbalization failed for [{token_form}] ({e}), falling back to token name"
                );
                if word_pieces(&token.name).next().is_none() {
                    log::warn!("Token [{token_form}] has a blank name and yields no words");
                }
                self.add_words(utt, index, &token.name);
            }
        }
    }

    fn verbalize_semiotic_class(&self, token: &Token) -> std::result::Result<String, VerbalizeFailure> {
        let serialized = self.serializer.serialize(token)?;
        let words = self.rules.apply_rules_to_string(&serialized, false)?;
        if word_pieces(&words).next().is_none() {
            return Err(VerbalizeFailure::NoWords);
        }
        Ok(words)
    }

    /// Split verbalizer output on whitespace and append each piece
    fn add_words(&self, utt: &mut Utterance, index: usize, words: &str) {
        for word in word_pieces(words) {
            if word == PAUSE_MARK {
                utt.add_word(index, self.options.silence_word.as_str());
            } else {
                utt.add_word(index, word);
            }
        }
    }
}

fn word_pieces(words: &str) -> impl Iterator<Item = &str> {
    words.split([' ', '\t', '\n']).filter(|w| !w.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DaughterSpan, Payload};
    use crate::rules::Grammar;
    use crate::serialization::MarkupSerializer;

    const VERBALIZER: &str = r#"
name = "test_verbalizer"
order = ["VERBALIZE"]

[[rules.VERBALIZE.rewrites]]
pattern = 'cardinal \{ integer: "3" \}'
output = "drie"

[[rules.VERBALIZE.rewrites]]
pattern = 'measure \{ cardinal \{ integer: "2" \} units: "meter" \}'
output = "twee , meter"

[[rules.VERBALIZE.rewrites]]
pattern = 'cardinal \{ integer: "0" \}'
output = " "

[[rules.VERBALIZE.rewrites]]
pattern = 'verbatim: "([0-9])"'
output = "syfer ${1}"
"#;

    fn stage(policy: MissingWordIdPolicy) -> VerbalizeStage {
        VerbalizeStage::new(
            Box::new(Grammar::from_toml_str(VERBALIZER).unwrap()),
            Box::new(MarkupSerializer),
            VerbalizerOptions {
                silence_word: "sil".to_string(),
                missing_word_id: policy,
            },
        )
    }

    fn cardinal(name: &str, value: &str) -> Token {
        Token::semiotic(
            name,
            Payload::new().with_message("cardinal", Payload::new().with_text("integer", value)),
        )
    }

    fn ids(words: &[Word]) -> Vec<&str> {
        words.iter().map(|w| w.id.as_str()).collect()
    }

    #[test]
    fn test_words_keep_order() {
        let words = stage(MissingWordIdPolicy::Drop)
            .verbalize_tokens(vec![Token::word("a"), cardinal("3", "3"), Token::word("b")])
            .unwrap();
        assert_eq!(ids(&words), vec!["a", "drie", "b"]);
        assert_eq!(words[1].parent, 1);
    }

    #[test]
    fn test_adjacent_phrase_breaks_collapse() {
        let words = stage(MissingWordIdPolicy::Drop)
            .verbalize_tokens(vec![
                Token::word("a"),
                Token::punct(",", true),
                Token::punct(".", true),
                Token::word("b"),
            ])
            .unwrap();
        assert_eq!(ids(&words), vec!["a", "sil", "b"]);
    }

    #[test]
    fn test_punct_never_owns_words() {
        let mut utt = Utterance::with_tokens(vec![
            Token::punct(",", true),
            Token::punct("'", false),
            Token::word("b"),
        ]);
        stage(MissingWordIdPolicy::Drop).verbalize(&mut utt).unwrap();

        assert_eq!(utt.linearize_words(), "sil b");
        assert_eq!(utt.tokens()[0].daughters, None);
        assert_eq!(utt.words()[0].parent, 0);
        assert_eq!(utt.tokens()[2].daughters, Some(DaughterSpan::single(1)));
    }

    #[test]
    fn test_pause_mark_becomes_silence() {
        let token = Token::semiotic(
            "2m",
            Payload::new().with_message(
                "measure",
                Payload::new()
                    .with_message("cardinal", Payload::new().with_text("integer", "2"))
                    .with_text("units", "meter"),
            ),
        );
        let mut utt = Utterance::with_tokens(vec![token]);
        stage(MissingWordIdPolicy::Drop).verbalize(&mut utt).unwrap();

        assert_eq!(utt.linearize_words(), "twee sil meter");
        assert_eq!(utt.tokens()[0].daughters, Some(DaughterSpan { first: 0, last: 2 }));
    }

    #[test]
    fn test_verbatim_fallback_replaces_token() {
        let mut token = cardinal("7", "7");
        token.start_index = Some(4);
        token.end_index = Some(5);
        let mut utt = Utterance::with_tokens(vec![token]);
        stage(MissingWordIdPolicy::Drop).verbalize(&mut utt).unwrap();

        assert_eq!(utt.linearize_words(), "syfer 7");
        let fallback = &utt.tokens()[0];
        assert_eq!(fallback.verbatim.as_deref(), Some("7"));
        assert!(fallback.payload.is_empty());
        assert_eq!(fallback.start_index, Some(4));
        assert_eq!(fallback.daughters, Some(DaughterSpan { first: 0, last: 1 }));
    }

    #[test]
    fn test_blank_verbalization_falls_back_to_verbatim() {
        let mut utt = Utterance::with_tokens(vec![Token::word("a"), cardinal("0", "0")]);
        stage(MissingWordIdPolicy::Drop).verbalize(&mut utt).unwrap();

        assert_eq!(utt.linearize_words(), "a syfer 0");
        assert_eq!(utt.tokens()[1].verbatim.as_deref(), Some("0"));
        assert_eq!(utt.tokens()[1].daughters, Some(DaughterSpan { first: 1, last: 2 }));
    }

    #[test]
    fn test_name_used_when_everything_fails() {
        let words = stage(MissingWordIdPolicy::Drop)
            .verbalize_tokens(vec![cardinal("12 000", "12000")])
            .unwrap();
        assert_eq!(ids(&words), vec!["12", "000"]);
    }

    #[test]
    fn test_skipped_semiotic_token() {
        let mut token = cardinal("3", "3");
        token.skip = true;
        let mut utt = Utterance::with_tokens(vec![token, Token::word("b")]);
        stage(MissingWordIdPolicy::Drop).verbalize(&mut utt).unwrap();
        assert_eq!(utt.linearize_words(), "b");
        assert_eq!(utt.tokens()[0].daughters, None);
    }

    #[test]
    fn test_missing_word_id_policies() {
        let mut bare = Token::word("koei");
        bare.word_id = None;
        let tokens = vec![Token::word("die"), bare];

        let dropped = stage(MissingWordIdPolicy::Drop)
            .verbalize_tokens(tokens.clone())
            .unwrap();
        assert_eq!(ids(&dropped), vec!["die"]);

        let synthesized = stage(MissingWordIdPolicy::Synthesize)
            .verbalize_tokens(tokens.clone())
            .unwrap();
        assert_eq!(ids(&synthesized), vec!["die", "koei"]);

        let failed = stage(MissingWordIdPolicy::Fail).verbalize_tokens(tokens);
        assert!(matches!(
            failed,
            Err(NormalizerError::MissingWordId { ref token }) if token == "koei"
        ));
    }

    #[test]
    fn test_stale_daughters_are_reset() {
        let mut token = Token::word("a");
        token.daughters = Some(DaughterSpan { first: 5, last: 9 });
        let mut utt = Utterance::with_tokens(vec![token]);
        stage(MissingWordIdPolicy::Drop).verbalize(&mut utt).unwrap();
        assert_eq!(utt.tokens()[0].daughters, Some(DaughterSpan::single(0)));
    }
}
