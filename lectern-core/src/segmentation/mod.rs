//! Sentence segmentation

pub mod sentence_boundary;

pub use sentence_boundary::{SentenceSplitter, DEFAULT_BOUNDARY_REGEXP};
