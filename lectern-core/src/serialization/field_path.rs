//! Dotted paths into a token's payload

use super::spec::SpecError;
use crate::domain::markup::is_identifier;
use crate::domain::{Field, Payload, Token, Value};

/// Path such as `measure.decimal.integer_part`, ending in a scalar
///
/// Intermediate segments walk nested messages (the first occurrence of
/// each). The terminal segment may repeat, in which case every occurrence is
/// returned. The single segment `verbatim` addresses the token's verbatim
/// reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path
    pub fn parse(path: &str) -> Result<Self, SpecError> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if path.is_empty() || !segments.iter().all(|s| is_identifier(s)) {
            return Err(SpecError::InvalidFieldPath(path.to_string()));
        }
        Ok(Self { segments })
    }

    /// Last segment
    pub fn terminal(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Fields found at the end of the path, scalar or message
    fn resolve<'a>(&self, token: &'a Token) -> Vec<&'a Field> {
        let (terminal, intermediate) = match self.segments.split_last() {
            Some(split) => split,
            None => return Vec::new(),
        };
        let mut message: &Payload = &token.payload;
        for segment in intermediate {
            match message.get(segment) {
                Some(Field::Message(inner)) => message = inner,
                _ => return Vec::new(),
            }
        }
        message.get_all(terminal)
    }

    fn is_verbatim(&self) -> bool {
        self.segments.len() == 1 && self.segments[0] == "verbatim"
    }

    /// Scalar values found at the end of the path
    ///
    /// `None` when the path ends in a nested message, which has no scalar
    /// rendering.
    pub fn follow<'a>(&self, token: &'a Token) -> Option<Vec<&'a str>> {
        if self.is_verbatim() {
            if let Some(verbatim) = &token.verbatim {
                return Some(vec![verbatim.as_str()]);
            }
        }
        self.resolve(token)
            .into_iter()
            .map(|field| match field {
                Field::Scalar(Value::Text(s)) | Field::Scalar(Value::Symbol(s)) => Some(s.as_str()),
                Field::Message(_) => None,
            })
            .collect()
    }

    /// True if the path resolves to at least one field
    pub fn is_set(&self, token: &Token) -> bool {
        (self.is_verbatim() && token.verbatim.is_some()) || !self.resolve(token).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measure() -> Token {
        Token::semiotic(
            "5,7m",
            Payload::new().with_message(
                "measure",
                Payload::new()
                    .with_message(
                        "decimal",
                        Payload::new()
                            .with_text("integer_part", "5")
                            .with_text("fractional_part", "7"),
                    )
                    .with_text("units", "meter")
                    .with_text("units", "second"),
            ),
        )
    }

    #[test]
    fn test_follow_nested() {
        let path = FieldPath::parse("measure.decimal.integer_part").unwrap();
        assert_eq!(path.follow(&measure()), Some(vec!["5"]));
        assert_eq!(path.terminal(), "integer_part");
    }

    #[test]
    fn test_follow_repeated_terminal() {
        let path = FieldPath::parse("measure.units").unwrap();
        assert_eq!(path.follow(&measure()), Some(vec!["meter", "second"]));
    }

    #[test]
    fn test_unset_paths() {
        let token = measure();
        assert!(!FieldPath::parse("measure.cardinal.integer").unwrap().is_set(&token));
        assert!(!FieldPath::parse("money.amount").unwrap().is_set(&token));
        assert_eq!(
            FieldPath::parse("money.amount").unwrap().follow(&token),
            Some(vec![])
        );
    }

    #[test]
    fn test_message_terminal() {
        let token = measure();
        let path = FieldPath::parse("measure.decimal").unwrap();
        assert!(path.is_set(&token));
        assert_eq!(path.follow(&token), None);
    }

    #[test]
    fn test_verbatim_path() {
        let token = measure().to_verbatim_fallback();
        let path = FieldPath::parse("verbatim").unwrap();
        assert!(path.is_set(&token));
        assert_eq!(path.follow(&token), Some(vec!["5,7m"]));
        assert!(!path.is_set(&measure()));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "measure..units", ".units", "measure.", "measure.unit s"] {
            assert!(FieldPath::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}
