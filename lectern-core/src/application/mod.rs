//! Pipeline stages and their composition

pub mod normalizer;
pub mod tokenize;
pub mod verbalize;

pub use normalizer::{Normalizer, NormalizerBuilder};
pub use tokenize::TokenizeClassifyStage;
pub use verbalize::VerbalizeStage;
