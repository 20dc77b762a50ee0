//! Token serialization for the verbalizer
//!
//! Before verbalization a semiotic token is written out as an automaton the
//! verbalizer grammar can rewrite. [`MarkupSerializer`] prints the payload
//! in token markup; [`SpecSerializer`] follows a class/style/record spec.

pub mod field_path;
pub mod spec;

pub use field_path::FieldPath;
pub use spec::{SpecError, SpecSerializer};

use crate::domain::{format_payload, markup::push_quoted, MarkupError, Token};
use crate::rules::{Automaton, RuleError};
use thiserror::Error;

/// Errors raised while serializing a token
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SerializeError {
    /// The payload cannot be printed
    #[error("unrepresentable payload: {0}")]
    Markup(#[from] MarkupError),

    /// No serialization covers the token
    #[error("no serialization applies to token \"{token}\"")]
    NoSerialization {
        /// Token surface form
        token: String,
    },

    /// The serialized form could not be compiled
    #[error(transparent)]
    Compile(#[from] RuleError),
}

/// Writes a token out for the verbalizer grammar
pub trait TokenSerializer: Send + Sync {
    /// Serialize the token's payload (and verbatim reading, if any)
    fn serialize(&self, token: &Token) -> Result<Automaton, SerializeError>;
}

/// Default serializer: the payload in token markup, then the verbatim reading
///
/// `measure { decimal { integer_part: "5" } units: "meter" }` for a measure,
/// `verbatim: "5,7m"` for a verbatim fallback token.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupSerializer;

impl MarkupSerializer {
    /// Serialized text
    pub fn serialize_to_string(&self, token: &Token) -> Result<String, SerializeError> {
        let mut text = format_payload(&token.payload)?;
        if let Some(verbatim) = &token.verbatim {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str("verbatim: ");
            push_quoted(verbatim, &mut text);
        }
        Ok(text)
    }
}

impl TokenSerializer for MarkupSerializer {
    fn serialize(&self, token: &Token) -> Result<Automaton, SerializeError> {
        let text = self.serialize_to_string(token)?;
        Ok(Automaton::compile(text.as_bytes())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Field, Payload, Value};

    #[test]
    fn test_markup_serializer_prints_payload() {
        let token = Token::semiotic(
            "5,7m",
            Payload::new().with_message(
                "measure",
                Payload::new()
                    .with_message("decimal", Payload::new().with_text("integer_part", "5"))
                    .with_text("units", "meter"),
            ),
        );
        let automaton = MarkupSerializer.serialize(&token).unwrap();
        assert_eq!(
            automaton.output_string().unwrap(),
            r#"measure { decimal { integer_part: "5" } units: "meter" }"#
        );
    }

    #[test]
    fn test_markup_serializer_verbatim() {
        let token = Token::semiotic("4,3", Payload::new()).to_verbatim_fallback();
        assert_eq!(
            MarkupSerializer.serialize_to_string(&token).unwrap(),
            r#"verbatim: "4,3""#
        );
    }

    #[test]
    fn test_markup_serializer_rejects_bad_field_name() {
        let mut payload = Payload::new();
        payload.push("not a field", Field::Scalar(Value::Text("x".to_string())));
        let token = Token::semiotic("x", payload);
        assert!(matches!(
            MarkupSerializer.serialize(&token),
            Err(SerializeError::Markup(_))
        ));
    }
}
