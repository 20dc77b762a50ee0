//! Custom serialization from a class/style/record spec
//!
//! A spec document lists, per semiotic class, the styles in which a token of
//! that class may be written out for the verbalizer:
//!
//! ```toml
//! [[class]]
//! name = "measure"
//!
//! [[class.style]]
//! required_fields = ["measure.decimal|measure.cardinal"]
//! prohibited_fields = ["measure.fraction"]
//!
//! [[class.style.record]]
//! field_path = "measure.decimal.integer_part"
//! label = "integer"
//!
//! [[class.style.record]]
//! field_path = "measure.units"
//! ```
//!
//! A token of class `measure` with `integer_part: "5"` and `units: "meter"`
//! serializes to `measure|integer:5|units:meter|`.

use super::field_path::FieldPath;
use super::{SerializeError, TokenSerializer};
use crate::domain::{is_semiotic_class, Token};
use crate::rules::{Automaton, Weight, WeightedPath};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CLASS_SEPARATOR: char = '|';
const LABEL_SEPARATOR: char = ':';
const RECORD_SEPARATOR: char = '|';
const ESCAPE: char = '\\';

/// Errors raised while loading a serialization spec
#[derive(Error, Debug)]
pub enum SpecError {
    /// Spec file could not be read
    #[error("failed to read serialization spec {path}: {source}")]
    Io {
        /// Spec path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Spec is not a valid document
    #[error("failed to parse serialization spec {origin}: {source}")]
    Parse {
        /// Where the document came from
        origin: String,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },

    /// Class name is not a semiotic class
    #[error("cannot find semiotic class \"{0}\"")]
    UnknownClass(String),

    /// Field path does not parse
    #[error("field path failed to parse: \"{0}\"")]
    InvalidFieldPath(String),

    /// A record declares an empty default value
    #[error("empty default value for record \"{0}\"")]
    EmptyDefault(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpecDocument {
    #[serde(default, rename = "class")]
    classes: Vec<ClassSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClassSpec {
    name: String,
    #[serde(default, rename = "style")]
    styles: Vec<StyleSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StyleSpec {
    #[serde(default)]
    required_fields: Vec<String>,
    #[serde(default)]
    prohibited_fields: Vec<String>,
    #[serde(default, rename = "record")]
    records: Vec<RecordSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordSpec {
    field_path: String,
    label: Option<String>,
    default_value: Option<String>,
    #[serde(default)]
    prefix: Vec<RecordSpec>,
    #[serde(default)]
    suffix: Vec<RecordSpec>,
}

#[derive(Debug)]
struct Record {
    field_path: FieldPath,
    label: String,
    default_value: Option<String>,
    prefix: Vec<Record>,
    suffix: Vec<Record>,
}

impl Record {
    fn compile(spec: &RecordSpec) -> Result<Self, SpecError> {
        let field_path = FieldPath::parse(&spec.field_path)?;
        if spec.default_value.as_deref() == Some("") {
            return Err(SpecError::EmptyDefault(spec.field_path.clone()));
        }
        let label = spec
            .label
            .clone()
            .unwrap_or_else(|| field_path.terminal().to_string());
        Ok(Self {
            field_path,
            label,
            default_value: spec.default_value.clone(),
            prefix: spec.prefix.iter().map(Record::compile).collect::<Result<_, _>>()?,
            suffix: spec.suffix.iter().map(Record::compile).collect::<Result<_, _>>()?,
        })
    }

    fn write_value(&self, value: &str, out: &mut String) {
        out.push_str(&self.label);
        out.push(LABEL_SEPARATOR);
        for ch in value.chars() {
            if ch == ESCAPE || ch == RECORD_SEPARATOR {
                out.push(ESCAPE);
            }
            out.push(ch);
        }
        out.push(RECORD_SEPARATOR);
    }

    /// Append this record; `None` if the path ends in a message
    fn serialize(&self, token: &Token, out: &mut String) -> Option<()> {
        let values = match self.field_path.follow(token) {
            Some(values) => values,
            None => {
                log::error!(
                    "Scalar expected for field path ending in \"{}\"",
                    self.field_path.terminal()
                );
                return None;
            }
        };

        if values.is_empty() {
            if let Some(default) = &self.default_value {
                self.write_value(default, out);
            }
            return Some(());
        }

        let mut prefix = String::new();
        for record in &self.prefix {
            record.serialize(token, &mut prefix)?;
        }
        let mut suffix = String::new();
        for record in &self.suffix {
            record.serialize(token, &mut suffix)?;
        }
        for value in values {
            out.push_str(&prefix);
            self.write_value(value, out);
            out.push_str(&suffix);
        }
        Some(())
    }
}

#[derive(Debug)]
struct Style {
    /// Each entry is satisfied by any one of its alternatives
    required: Vec<Vec<FieldPath>>,
    prohibited: Vec<FieldPath>,
    records: Vec<Record>,
}

impl Style {
    fn compile(spec: &StyleSpec) -> Result<Self, SpecError> {
        let required = spec
            .required_fields
            .iter()
            .map(|any_of| any_of.split('|').map(FieldPath::parse).collect::<Result<Vec<_>, _>>())
            .collect::<Result<Vec<_>, _>>()?;
        let prohibited = spec
            .prohibited_fields
            .iter()
            .map(|path| FieldPath::parse(path))
            .collect::<Result<_, _>>()?;
        let records = spec.records.iter().map(Record::compile).collect::<Result<_, _>>()?;
        Ok(Self {
            required,
            prohibited,
            records,
        })
    }

    fn applies_to(&self, token: &Token) -> bool {
        self.required
            .iter()
            .all(|any_of| any_of.iter().any(|path| path.is_set(token)))
            && !self.prohibited.iter().any(|path| path.is_set(token))
    }

    fn serialize(&self, token: &Token) -> Option<String> {
        if !self.applies_to(token) {
            return None;
        }
        let mut out = String::new();
        for record in &self.records {
            if record.serialize(token, &mut out).is_none() {
                log::error!("Record serialization failure for token {}", token.name);
                return None;
            }
        }
        Some(out)
    }
}

#[derive(Debug)]
struct Class {
    name: String,
    styles: Vec<Style>,
}

/// Serializer driven by a class/style/record spec
#[derive(Debug)]
pub struct SpecSerializer {
    classes: Vec<Class>,
}

impl SpecSerializer {
    /// Load a spec document from disk
    pub fn load(path: &Path) -> Result<Self, SpecError> {
        let text = fs::read_to_string(path).map_err(|source| SpecError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Parse a spec document held in memory
    pub fn from_toml_str(text: &str) -> Result<Self, SpecError> {
        Self::parse(text, "<string>")
    }

    fn parse(text: &str, origin: &str) -> Result<Self, SpecError> {
        let document: SpecDocument = toml::from_str(text).map_err(|source| SpecError::Parse {
            origin: origin.to_string(),
            source,
        })?;

        let mut classes = Vec::with_capacity(document.classes.len());
        for class in &document.classes {
            if !is_semiotic_class(&class.name) {
                return Err(SpecError::UnknownClass(class.name.clone()));
            }
            classes.push(Class {
                name: class.name.clone(),
                styles: class.styles.iter().map(Style::compile).collect::<Result<_, _>>()?,
            });
        }
        Ok(Self { classes })
    }

    /// Classes covered by the spec, in declaration order
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.name.as_str())
    }
}

impl TokenSerializer for SpecSerializer {
    /// Every class the token belongs to contributes `<class>|` followed by
    /// each style whose constraints hold, as alternatives
    fn serialize(&self, token: &Token) -> Result<Automaton, SerializeError> {
        let mut paths = Vec::new();
        for class in self.classes.iter().filter(|c| token.has_class(&c.name)) {
            for style in &class.styles {
                if let Some(records) = style.serialize(token) {
                    let text = format!("{}{CLASS_SEPARATOR}{records}", class.name);
                    paths.push(WeightedPath::new(text, Weight::ONE));
                }
            }
        }

        if paths.is_empty() {
            return Err(SerializeError::NoSerialization {
                token: token.name.clone(),
            });
        }
        Ok(Automaton::from_paths(paths))
    }
}
