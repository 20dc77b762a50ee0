//! Tokens, words and the utterance that links them
//!
//! A [`Token`] is one classified unit of the input sentence. Verbalization turns
//! tokens into [`Word`]s; each word records the token it came from and each
//! token records the contiguous [`DaughterSpan`] of words it produced.

use std::fmt;

/// Semiotic classes a payload or serialization spec may name.
pub const SEMIOTIC_CLASSES: &[&str] = &[
    "abbreviation",
    "cardinal",
    "connector",
    "date",
    "decimal",
    "electronic",
    "fraction",
    "letters",
    "measure",
    "money",
    "ordinal",
    "percent",
    "telephone",
    "time",
    "verbatim",
];

/// Check whether `name` is a known semiotic class
pub fn is_semiotic_class(name: &str) -> bool {
    SEMIOTIC_CLASSES.contains(&name)
}

/// Token category assigned by the tokenizer/classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Punctuation; never verbalized, may trigger a phrase break
    Punct,
    /// Ordinary word carrying a word id
    Word,
    /// Structured token that needs rule-driven expansion
    SemioticClass,
}

impl TokenType {
    /// Markup symbol for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Punct => "PUNCT",
            TokenType::Word => "WORD",
            TokenType::SemioticClass => "SEMIOTIC_CLASS",
        }
    }

    /// Parse a markup symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "PUNCT" => Some(TokenType::Punct),
            "WORD" => Some(TokenType::Word),
            "SEMIOTIC_CLASS" => Some(TokenType::SemioticClass),
            _ => None,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive range of word indices produced by one token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaughterSpan {
    /// Index of the first word
    pub first: usize,
    /// Index of the last word
    pub last: usize,
}

impl DaughterSpan {
    /// Span covering a single word
    pub fn single(index: usize) -> Self {
        Self {
            first: index,
            last: index,
        }
    }

    /// Number of words in the span
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    /// Spans always cover at least one word
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Scalar payload value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Quoted string
    Text(String),
    /// Bare symbol such as an enum name, number or boolean
    Symbol(String),
}

impl Value {
    /// Raw content of the value
    pub fn as_str(&self) -> &str {
        match self {
            Value::Text(s) | Value::Symbol(s) => s,
        }
    }
}

/// One payload field
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Scalar value
    Scalar(Value),
    /// Nested message
    Message(Payload),
}

/// Ordered structured fields of a semiotic token
///
/// Field names may repeat; order is preserved because verbalization grammars
/// match on the serialized form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    fields: Vec<(String, Field)>,
}

impl Payload {
    /// Create an empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Append a field
    pub fn push(&mut self, name: impl Into<String>, field: Field) {
        self.fields.push((name.into(), field));
    }

    /// Append a quoted string field (builder style)
    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, Field::Scalar(Value::Text(value.into())));
        self
    }

    /// Append a bare symbol field (builder style)
    pub fn with_symbol(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, Field::Scalar(Value::Symbol(value.into())));
        self
    }

    /// Append a nested message (builder style)
    pub fn with_message(mut self, name: impl Into<String>, message: Payload) -> Self {
        self.push(name, Field::Message(message));
        self
    }

    /// Iterate over fields in order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// All fields with the given name
    pub fn get_all(&self, name: &str) -> Vec<&Field> {
        self.fields
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, field)| field)
            .collect()
    }

    /// First field with the given name
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, field)| field)
    }

    /// True if a field with the given name is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// One classified unit of input
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Category assigned by the classifier
    pub token_type: TokenType,
    /// Surface form as it appeared in the input
    pub name: String,
    /// Word identifier; set only for WORD tokens
    pub word_id: Option<String>,
    /// Punctuation that forms a prosodic boundary
    pub phrase_break: bool,
    /// Suppresses verbalization
    pub skip: bool,
    /// Whether whitespace followed the token in the input
    pub next_space: Option<bool>,
    /// Pause length symbol attached to punctuation
    pub pause_length: Option<String>,
    /// Literal reading used by the verbatim fallback
    pub verbatim: Option<String>,
    /// Words produced by this token, if any
    pub daughters: Option<DaughterSpan>,
    /// Byte offset of the surface form in the sentence
    pub start_index: Option<usize>,
    /// Byte offset one past the surface form
    pub end_index: Option<usize>,
    /// Semiotic-class fields
    pub payload: Payload,
}

impl Token {
    /// Create a token of the given type with only a surface form
    pub fn new(token_type: TokenType, name: impl Into<String>) -> Self {
        Self {
            token_type,
            name: name.into(),
            word_id: None,
            phrase_break: false,
            skip: false,
            next_space: None,
            pause_length: None,
            verbatim: None,
            daughters: None,
            start_index: None,
            end_index: None,
            payload: Payload::new(),
        }
    }

    /// WORD token whose word id equals its surface form
    pub fn word(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut token = Self::new(TokenType::Word, name.clone());
        token.word_id = Some(name);
        token
    }

    /// PUNCT token
    pub fn punct(name: impl Into<String>, phrase_break: bool) -> Self {
        let mut token = Self::new(TokenType::Punct, name);
        token.phrase_break = phrase_break;
        token
    }

    /// SEMIOTIC_CLASS token with a payload
    pub fn semiotic(name: impl Into<String>, payload: Payload) -> Self {
        let mut token = Self::new(TokenType::SemioticClass, name);
        token.payload = payload;
        token
    }

    /// True if the token belongs to the named semiotic class
    pub fn has_class(&self, class: &str) -> bool {
        if class == "verbatim" && self.verbatim.is_some() {
            return true;
        }
        matches!(self.payload.get(class), Some(Field::Message(_)))
    }

    /// Reduced copy holding only the surface form, read verbatim
    ///
    /// Keeps the position in the input so links still point at the surface
    /// form.
    pub fn to_verbatim_fallback(&self) -> Token {
        let mut token = Token::new(TokenType::SemioticClass, self.name.clone());
        token.verbatim = Some(self.name.clone());
        token.start_index = self.start_index;
        token.end_index = self.end_index;
        token
    }
}

/// One spoken-form unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// Spoken form or word identifier
    pub id: String,
    /// Index of the token that produced this word
    pub parent: usize,
}

/// Token and word streams of one sentence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Linguistic {
    /// Classified tokens in input order
    pub tokens: Vec<Token>,
    /// Verbalized words in emission order
    pub words: Vec<Word>,
}

/// Unit of work for one sentence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Utterance {
    /// Token and word streams
    pub linguistic: Linguistic,
}

impl Utterance {
    /// Create an empty utterance
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an utterance from a classified token sequence
    pub fn with_tokens(tokens: Vec<Token>) -> Self {
        Self {
            linguistic: Linguistic {
                tokens,
                words: Vec::new(),
            },
        }
    }

    /// Classified tokens
    pub fn tokens(&self) -> &[Token] {
        &self.linguistic.tokens
    }

    /// Verbalized words
    pub fn words(&self) -> &[Word] {
        &self.linguistic.words
    }

    /// Most recently appended word
    pub fn last_word(&self) -> Option<&Word> {
        self.linguistic.words.last()
    }

    /// Append a word and extend the daughter span of its token
    ///
    /// Returns the index of the new word.
    pub fn add_word(&mut self, token_index: usize, id: impl Into<String>) -> usize {
        let index = self.add_unlinked_word(token_index, id);
        if let Some(token) = self.linguistic.tokens.get_mut(token_index) {
            token.daughters = Some(match token.daughters {
                Some(span) => DaughterSpan {
                    first: span.first,
                    last: index,
                },
                None => DaughterSpan::single(index),
            });
        }
        index
    }

    /// Append a word that records its parent but is not part of the parent's
    /// daughter span
    pub fn add_unlinked_word(&mut self, token_index: usize, id: impl Into<String>) -> usize {
        self.linguistic.words.push(Word {
            id: id.into(),
            parent: token_index,
        });
        self.linguistic.words.len() - 1
    }

    /// Space-joined word ids
    pub fn linearize_words(&self) -> String {
        self.linguistic
            .words
            .iter()
            .map(|w| w.id.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Tab-separated dump of token and word links
    ///
    /// Unset positions and spans print as `-1`.
    pub fn show_links(&self) -> String {
        fn index(value: Option<usize>) -> String {
            value.map_or_else(|| "-1".to_string(), |v| v.to_string())
        }

        let mut output = String::new();
        for (i, token) in self.linguistic.tokens.iter().enumerate() {
            let (first, last) = match token.daughters {
                Some(span) => (Some(span.first), Some(span.last)),
                None => (None, None),
            };
            output.push_str(&format!(
                "Token:\t{i}\t{}\t{},{}\t{},{}\n",
                token.name,
                index(token.start_index),
                index(token.end_index),
                index(first),
                index(last),
            ));
        }
        for (i, word) in self.linguistic.words.iter().enumerate() {
            output.push_str(&format!("Word:\t{i}\t{}\t{}\n", word.id, word.parent));
        }
        output
    }
}
