//! The induced grammar: rules plus the top-level string R0.

use crate::iter::GrammarIter;
use crate::rule::{Rule, RuleInterval};
use crate::symbol::{RuleId, Symbol};
use std::fmt;

/// Result of one induction run.
///
/// Owns every rule in creation order and the final top-level string. Expanding
/// each guard in R0 through its rule reproduces the input tokens exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    rules: Vec<Rule>,
    r0: Vec<Symbol>,
    input_length: usize,
}

impl Grammar {
    pub(crate) fn new(rules: Vec<Rule>, r0: Vec<Symbol>, input_length: usize) -> Self {
        Self {
            rules,
            r0,
            input_length,
        }
    }

    /// Rules in creation order; `rules()[i]` has id `R{i + 1}`.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        if id.0 == 0 {
            return None;
        }
        self.rules.get(id.index())
    }

    /// The top-level string: terminals interleaved with guards.
    pub fn r0(&self) -> &[Symbol] {
        &self.r0
    }

    /// R0 rendered as space-separated tokens and `R<id>` references.
    pub fn r0_string(&self) -> String {
        join(self.r0.iter())
    }

    /// Number of tokens in the original input.
    pub fn input_length(&self) -> usize {
        self.input_length
    }

    /// Iterates over the terminal values of the fully expanded R0.
    pub fn iter(&self) -> GrammarIter<'_> {
        GrammarIter::new(self)
    }

    /// The fully expanded R0, tokens joined by single spaces.
    pub fn expand(&self) -> String {
        join(self.iter())
    }

    /// Every rule occurrence as `(rule, [start, end))`, sorted by interval.
    pub fn rule_intervals(&self) -> Vec<(RuleId, RuleInterval)> {
        let mut intervals: Vec<(RuleId, RuleInterval)> = self
            .rules
            .iter()
            .flat_map(|rule| rule.intervals().map(move |interval| (rule.id(), interval)))
            .collect();
        intervals.sort_by_key(|&(id, interval)| (interval, id));
        intervals
    }

    /// Returns compression statistics.
    pub fn stats(&self) -> GrammarStats {
        GrammarStats {
            input_length: self.input_length,
            grammar_symbols: self.r0.len() + 2 * self.rules.len(),
            num_rules: self.rules.len(),
            max_level: self.rules.iter().map(Rule::level).max().unwrap_or(0),
        }
    }
}

impl<'a> IntoIterator for &'a Grammar {
    type Item = &'a str;
    type IntoIter = GrammarIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "R0 -> {}", self.r0_string())?;
        for rule in &self.rules {
            writeln!(
                f,
                "{} -> {} [level {}] {} @ {:?}",
                rule.id(),
                rule.rule_string(),
                rule.level(),
                rule.expanded(),
                rule.occurrences()
            )?;
        }
        Ok(())
    }
}

fn join<T: fmt::Display>(items: impl Iterator<Item = T>) -> String {
    let mut out = String::new();
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&item.to_string());
    }
    out
}

/// Statistics about an induced grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarStats {
    /// Number of input tokens
    pub input_length: usize,
    /// Symbols in R0 plus two per rule
    pub grammar_symbols: usize,
    /// Number of rules created
    pub num_rules: usize,
    /// Deepest rule nesting
    pub max_level: usize,
}

impl GrammarStats {
    /// Returns the compression ratio as a percentage.
    ///
    /// Lower is better. 100% means no compression.
    pub fn compression_ratio(&self) -> f64 {
        if self.input_length == 0 {
            0.0
        } else {
            (self.grammar_symbols as f64 / self.input_length as f64) * 100.0
        }
    }
}
