//! Grammar archives and cascaded rule application
//!
//! A grammar is a TOML document naming an ordered cascade of rules:
//!
//! ```toml
//! name = "af_tokenizer"
//! order = ["TOKENIZE"]
//! max_paths = 16
//!
//! [rules.TOKENIZE]
//! passthrough = false
//!
//! [[rules.TOKENIZE.rewrites]]
//! pattern = "([0-9]+),([0-9]+)"
//! output = 'tokens { name: "${1},${2}" decimal { integer_part: "${1}" } } '
//! weight = 1.0
//! followed_by = "[^0-9m]|$"
//! ```
//!
//! Each rule segments every input path left to right. A segment is either a
//! rewrite whose pattern matches at that position (anchored, greedy) or, when
//! `passthrough` is on, a single copied byte. Every segmentation covering the
//! whole path is an output path whose cost is the sum of its segment weights.
//!
//! Between rules only the `max_paths` cheapest strings are kept. A later rule
//! may accept none of them while accepting a string that was cut, so when a
//! cascade fails past its first rule it is replayed keeping up to
//! `max_intermediate_paths` strings after every rule but the last.

use super::automaton::{prune_paths, Automaton, Weight, WeightedPath};
use super::error::{GrammarError, Result, RuleError};
use super::RuleSystem;
use regex::bytes::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Serialized grammar document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrammarSpec {
    /// Grammar name used in diagnostics
    pub name: String,
    /// Rules applied in sequence, each to the output of the previous one
    pub order: Vec<String>,
    /// Bound on the number of paths kept between rules
    #[serde(default = "default_max_paths")]
    pub max_paths: usize,
    /// Bound used when a failed cascade is replayed
    #[serde(default = "default_max_intermediate_paths")]
    pub max_intermediate_paths: usize,
    /// Rule definitions by name
    #[serde(default)]
    pub rules: BTreeMap<String, RuleSpec>,
}

/// Serialized rule
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    /// Weighted rewrites tried at every position
    #[serde(default)]
    pub rewrites: Vec<RewriteSpec>,
    /// Copy bytes no rewrite covers
    #[serde(default)]
    pub passthrough: bool,
    /// Cost of each copied byte
    #[serde(default = "default_passthrough_weight")]
    pub passthrough_weight: f32,
}

/// Serialized rewrite
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewriteSpec {
    /// Pattern matched at the current position
    pub pattern: String,
    /// Replacement; `${n}` expands capture groups
    #[serde(default)]
    pub output: String,
    /// Cost of taking this rewrite
    #[serde(default)]
    pub weight: f32,
    /// Context the rest of the input must start with (lookahead only)
    #[serde(default)]
    pub followed_by: Option<String>,
}

fn default_max_paths() -> usize {
    16
}

fn default_max_intermediate_paths() -> usize {
    4096
}

fn default_passthrough_weight() -> f32 {
    1.0
}

#[derive(Debug)]
struct Rewrite {
    pattern: Regex,
    output: String,
    weight: Weight,
    followed_by: Option<Regex>,
}

#[derive(Debug)]
struct Rule {
    name: String,
    rewrites: Vec<Rewrite>,
    passthrough: Option<Weight>,
}

/// A loaded, immutable rule cascade
#[derive(Debug)]
pub struct Grammar {
    name: String,
    rules: Vec<Rule>,
    max_paths: usize,
    max_intermediate_paths: usize,
}

impl Grammar {
    /// Load a grammar document from disk
    pub fn load(path: &Path) -> std::result::Result<Self, GrammarError> {
        let text = fs::read_to_string(path).map_err(|source| GrammarError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let spec: GrammarSpec = toml::from_str(&text).map_err(|source| GrammarError::Parse {
            origin: path.display().to_string(),
            source,
        })?;
        let grammar = Self::from_spec(spec)?;
        log::debug!(
            "Loaded grammar \"{}\" with {} rules from {}",
            grammar.name,
            grammar.rules.len(),
            path.display()
        );
        Ok(grammar)
    }

    /// Parse a grammar document held in memory
    pub fn from_toml_str(text: &str) -> std::result::Result<Self, GrammarError> {
        let spec: GrammarSpec = toml::from_str(text).map_err(|source| GrammarError::Parse {
            origin: "<string>".to_string(),
            source,
        })?;
        Self::from_spec(spec)
    }

    /// Compile a grammar document
    ///
    /// Every rule named in the order must exist and every pattern must
    /// compile.
    pub fn from_spec(spec: GrammarSpec) -> std::result::Result<Self, GrammarError> {
        if spec.order.is_empty() {
            return Err(GrammarError::Empty(spec.name));
        }

        let mut rules = Vec::with_capacity(spec.order.len());
        for rule_name in &spec.order {
            let rule_spec = spec
                .rules
                .get(rule_name)
                .ok_or_else(|| GrammarError::MissingRule {
                    grammar: spec.name.clone(),
                    rule: rule_name.clone(),
                })?;
            rules.push(Rule::compile(rule_name, rule_spec)?);
        }

        let max_paths = spec.max_paths.max(1);
        Ok(Self {
            name: spec.name,
            rules,
            max_paths,
            max_intermediate_paths: spec.max_intermediate_paths.max(max_paths),
        })
    }

    /// Names of the rules in application order
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    /// Run the cascade keeping `beam` strings after every rule but the last
    ///
    /// On failure returns the index of the rule that produced nothing.
    fn run_cascade(
        &self,
        input: &Automaton,
        use_lookahead: bool,
        beam: usize,
    ) -> std::result::Result<Automaton, usize> {
        let mut current = input.clone();
        let last = self.rules.len() - 1;
        for (index, rule) in self.rules.iter().enumerate() {
            let bound = if index == last { self.max_paths } else { beam };
            let mut paths = Vec::new();
            for path in current.paths() {
                paths.extend(rule.rewrite_path(path, use_lookahead, bound));
            }
            let mut output = Automaton::from_paths(paths);
            output.prune(bound);
            if output.is_empty() {
                return Err(index);
            }
            if index != last && output.num_paths() == bound && bound > self.max_paths {
                log::warn!(
                    "Rule \"{}\" in grammar \"{}\" kept only {} intermediate paths",
                    rule.name,
                    self.name,
                    bound
                );
            }
            current = output;
        }
        Ok(current)
    }
}

impl RuleSystem for Grammar {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply_rules(&self, input: &Automaton, use_lookahead: bool) -> Result<Automaton> {
        let failed = match self.run_cascade(input, use_lookahead, self.max_paths) {
            Ok(output) => return Ok(output),
            // The first rule sees the input unpruned
            Err(index) if index == 0 || self.max_intermediate_paths == self.max_paths => index,
            Err(index) => {
                log::debug!(
                    "Rule \"{}\" in grammar \"{}\" failed on pruned input, replaying with {} paths",
                    self.rules[index].name,
                    self.name,
                    self.max_intermediate_paths
                );
                match self.run_cascade(input, use_lookahead, self.max_intermediate_paths) {
                    Ok(output) => return Ok(output),
                    Err(index) => index,
                }
            }
        };

        let rule = &self.rules[failed];
        log::error!(
            "Application of rule \"{}\" in grammar \"{}\" failed",
            rule.name,
            self.name
        );
        Err(RuleError::RuleFailed {
            grammar: self.name.clone(),
            rule: rule.name.clone(),
        })
    }
}

impl Rule {
    fn compile(name: &str, spec: &RuleSpec) -> std::result::Result<Self, GrammarError> {
        let anchored = |pattern: &str| {
            Regex::new(&format!("^(?:{pattern})")).map_err(|source| GrammarError::InvalidPattern {
                rule: name.to_string(),
                pattern: pattern.to_string(),
                source,
            })
        };

        let rewrites = spec
            .rewrites
            .iter()
            .map(|rw| {
                Ok(Rewrite {
                    pattern: anchored(&rw.pattern)?,
                    output: rw.output.clone(),
                    weight: Weight(rw.weight),
                    followed_by: rw.followed_by.as_deref().map(|p| anchored(p)).transpose()?,
                })
            })
            .collect::<std::result::Result<Vec<_>, GrammarError>>()?;

        Ok(Self {
            name: name.to_string(),
            rewrites,
            passthrough: spec.passthrough.then_some(Weight(spec.passthrough_weight)),
        })
    }

    /// Segments starting at `pos`: (end, output, weight)
    fn edges_at(&self, input: &[u8], pos: usize, use_lookahead: bool) -> Vec<(usize, Vec<u8>, Weight)> {
        let rest = &input[pos..];
        let mut edges = Vec::new();
        for rewrite in &self.rewrites {
            if rewrite.followed_by.is_some() && !use_lookahead {
                continue;
            }
            let Some(caps) = rewrite.pattern.captures(rest) else {
                continue;
            };
            let Some(whole) = caps.get(0) else {
                continue;
            };
            // Empty matches would never advance
            if whole.end() == 0 {
                continue;
            }
            let end = pos + whole.end();
            if let Some(context) = &rewrite.followed_by {
                if !context.is_match(&input[end..]) {
                    continue;
                }
            }
            let mut output = Vec::new();
            caps.expand(rewrite.output.as_bytes(), &mut output);
            edges.push((end, output, rewrite.weight));
        }
        if let Some(weight) = self.passthrough {
            edges.push((pos + 1, vec![input[pos]], weight));
        }
        edges
    }

    /// All segmentations of one path, n-best per position
    fn rewrite_path(&self, path: &WeightedPath, use_lookahead: bool, max_paths: usize) -> Vec<WeightedPath> {
        let input = &path.symbols;
        let mut chart: Vec<Vec<WeightedPath>> = vec![Vec::new(); input.len() + 1];
        chart[0].push(WeightedPath::new(Vec::new(), path.weight));

        for pos in 0..input.len() {
            let mut partials = std::mem::take(&mut chart[pos]);
            if partials.is_empty() {
                continue;
            }
            prune_paths(&mut partials, max_paths);
            for (end, output, weight) in self.edges_at(input, pos, use_lookahead) {
                for partial in &partials {
                    let mut symbols = partial.symbols.clone();
                    symbols.extend_from_slice(&output);
                    chart[end].push(WeightedPath::new(symbols, partial.weight.times(weight)));
                }
            }
        }

        let mut complete = chart.pop().unwrap_or_default();
        prune_paths(&mut complete, max_paths);
        complete
    }
}
