//! Weighted string automata over the tropical semiring
//!
//! An [`Automaton`] here is the output projection of a weighted transducer,
//! kept as an explicit set of weighted byte strings. Weights are costs: they
//! add along a path and the cheapest path wins. The set is bounded by
//! pruning to the n best paths.

use super::error::{Result, RuleError};
use std::collections::HashSet;

/// Path cost in the tropical semiring
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Weight(pub f32);

impl Weight {
    /// Multiplicative identity (free path)
    pub const ONE: Weight = Weight(0.0);

    /// Semiring product: costs add up
    pub fn times(self, other: Weight) -> Weight {
        Weight(self.0 + other.0)
    }
}

/// One accepted string and its cost
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedPath {
    /// Byte symbols along the path
    pub symbols: Vec<u8>,
    /// Accumulated cost
    pub weight: Weight,
}

impl WeightedPath {
    /// Create a path
    pub fn new(symbols: impl Into<Vec<u8>>, weight: Weight) -> Self {
        Self {
            symbols: symbols.into(),
            weight,
        }
    }
}

/// Weighted set of byte strings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Automaton {
    paths: Vec<WeightedPath>,
}

impl Automaton {
    /// Automaton accepting nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Automaton accepting only the empty string at no cost
    pub fn epsilon() -> Self {
        Self::from_paths(vec![WeightedPath::new(Vec::new(), Weight::ONE)])
    }

    /// Compile input into a byte-level linear automaton
    ///
    /// One symbol per byte. Input must be well-formed UTF-8.
    pub fn compile(input: &[u8]) -> Result<Self> {
        std::str::from_utf8(input).map_err(|e| RuleError::CompileFailed {
            input: String::from_utf8_lossy(input).into_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_paths(vec![WeightedPath::new(input, Weight::ONE)]))
    }

    /// Compile a string that is known to be well-formed
    pub fn from_text(text: &str) -> Self {
        Self::from_paths(vec![WeightedPath::new(text.as_bytes(), Weight::ONE)])
    }

    /// Build from explicit paths
    pub fn from_paths(paths: Vec<WeightedPath>) -> Self {
        Self { paths }
    }

    /// True if no string is accepted
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of accepted strings
    pub fn num_paths(&self) -> usize {
        self.paths.len()
    }

    /// Accepted strings in enumeration order
    pub fn paths(&self) -> &[WeightedPath] {
        &self.paths
    }

    /// Append `other` to every path of `self`
    ///
    /// Concatenating with an empty automaton empties `self`.
    pub fn concat(&mut self, other: &Automaton) {
        let mut joined = Vec::with_capacity(self.paths.len() * other.paths.len());
        for left in &self.paths {
            for right in &other.paths {
                let mut symbols = left.symbols.clone();
                symbols.extend_from_slice(&right.symbols);
                joined.push(WeightedPath::new(symbols, left.weight.times(right.weight)));
            }
        }
        self.paths = joined;
    }

    /// Add the paths of `other` as alternatives
    pub fn union(&mut self, other: Automaton) {
        self.paths.extend(other.paths);
    }

    /// Keep the `max_paths` cheapest distinct strings
    pub fn prune(&mut self, max_paths: usize) {
        prune_paths(&mut self.paths, max_paths);
    }

    /// Cheapest path
    ///
    /// Ties go to the path enumerated first.
    pub fn shortest_path(&self) -> Option<&WeightedPath> {
        self.paths.iter().reduce(|best, path| {
            if path.weight.0 < best.weight.0 {
                path
            } else {
                best
            }
        })
    }

    /// Cheapest path as a string
    pub fn output_string(&self) -> Result<String> {
        let best = self.shortest_path().ok_or(RuleError::EmptyResult)?;
        String::from_utf8(best.symbols.clone()).map_err(|e| RuleError::InvalidOutput(e.to_string()))
    }
}

/// Sort by cost (stable), drop duplicate strings, truncate
///
/// A duplicate keeps its cheapest weight since sorting puts it first.
pub(crate) fn prune_paths(paths: &mut Vec<WeightedPath>, max_paths: usize) {
    paths.sort_by(|a, b| a.weight.0.total_cmp(&b.weight.0));
    let mut seen = HashSet::new();
    paths.retain(|path| seen.insert(path.symbols.clone()));
    paths.truncate(max_paths);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_rejects_malformed_utf8() {
        let err = Automaton::compile(&[b'a', 0xff, b'b']).unwrap_err();
        assert!(matches!(err, RuleError::CompileFailed { .. }));

        let ok = Automaton::compile("4,3 - 5,7m".as_bytes()).unwrap();
        assert_eq!(ok.num_paths(), 1);
        assert_eq!(ok.paths()[0].symbols.len(), 10);
    }

    #[test]
    fn test_concat_is_cross_product() {
        let mut left = Automaton::from_paths(vec![
            WeightedPath::new("a", Weight(1.0)),
            WeightedPath::new("b", Weight(2.0)),
        ]);
        let right = Automaton::from_paths(vec![
            WeightedPath::new("x", Weight(0.5)),
            WeightedPath::new("y", Weight(0.0)),
        ]);
        left.concat(&right);

        assert_eq!(left.num_paths(), 4);
        assert_eq!(left.paths()[0], WeightedPath::new("ax", Weight(1.5)));
        assert_eq!(left.paths()[3], WeightedPath::new("by", Weight(2.0)));
    }

    #[test]
    fn test_concat_with_empty_empties() {
        let mut a = Automaton::from_text("abc");
        a.concat(&Automaton::new());
        assert!(a.is_empty());

        let mut b = Automaton::from_text("abc");
        b.concat(&Automaton::epsilon());
        assert_eq!(b.output_string().unwrap(), "abc");
    }

    #[test]
    fn test_shortest_path_ties_keep_first() {
        let a = Automaton::from_paths(vec![
            WeightedPath::new("first", Weight(1.0)),
            WeightedPath::new("second", Weight(1.0)),
            WeightedPath::new("costly", Weight(3.0)),
        ]);
        assert_eq!(a.output_string().unwrap(), "first");
    }

    #[test]
    fn test_prune_dedups_and_bounds() {
        let mut a = Automaton::from_paths(vec![
            WeightedPath::new("x", Weight(2.0)),
            WeightedPath::new("y", Weight(1.0)),
            WeightedPath::new("x", Weight(0.5)),
            WeightedPath::new("z", Weight(4.0)),
        ]);
        a.prune(2);
        assert_eq!(
            a.paths(),
            &[
                WeightedPath::new("x", Weight(0.5)),
                WeightedPath::new("y", Weight(1.0)),
            ]
        );
    }

    #[test]
    fn test_empty_output() {
        assert_eq!(Automaton::new().output_string(), Err(RuleError::EmptyResult));
        assert_eq!(Automaton::epsilon().output_string().unwrap(), "");
    }
}
