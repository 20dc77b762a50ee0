//! Rule engine adapter
//!
//! The normalization stages only need two capabilities from a rule system:
//! load a grammar by path, and apply it to an automaton. [`RuleSystem`] is
//! that seam; [`Grammar`] is the implementation backed by weighted regex
//! rewrites.

pub mod automaton;
pub mod error;
pub mod grammar;

pub use automaton::{Automaton, Weight, WeightedPath};
pub use error::{GrammarError, RuleError};
pub use grammar::{Grammar, GrammarSpec, RewriteSpec, RuleSpec};

use std::path::Path;

/// A loaded rule cascade that rewrites automata
///
/// Implementations are immutable after loading and shared across threads.
pub trait RuleSystem: Send + Sync {
    /// Grammar name used in diagnostics
    fn name(&self) -> &str;

    /// Apply the cascade and return every surviving weighted path
    ///
    /// `use_lookahead` lets rules inspect upcoming input before committing
    /// to a rewrite.
    fn apply_rules(&self, input: &Automaton, use_lookahead: bool) -> error::Result<Automaton>;

    /// Apply the cascade and return the lowest-cost output string
    fn apply_rules_to_string(&self, input: &Automaton, use_lookahead: bool) -> error::Result<String> {
        self.apply_rules(input, use_lookahead)?.output_string()
    }
}

/// Load a grammar, resolving `path` against `prefix`
pub fn load_grammar(path: &str, prefix: &Path) -> Result<Grammar, GrammarError> {
    Grammar::load(&prefix.join(path))
}
