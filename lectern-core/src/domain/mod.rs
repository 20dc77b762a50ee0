//! Domain types: tokens, words, utterances and their markup

pub mod markup;
pub mod token;

pub use markup::{format_payload, format_token, parse_payload, parse_tokens, MarkupError};
pub use token::{
    is_semiotic_class, DaughterSpan, Field, Linguistic, Payload, Token, TokenType, Utterance,
    Value, Word, SEMIOTIC_CLASSES,
};
