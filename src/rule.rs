use crate::symbol::{RuleId, Symbol};
use std::collections::BTreeSet;
use std::fmt;

/// A `[start, end)` span in original-token coordinates covered by one
/// occurrence of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleInterval {
    pub start: usize,
    pub end: usize,
}

impl RuleInterval {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A grammar rule `R<id> -> first second`.
///
/// Rules are created once and never deleted. Children only reference rules
/// created strictly earlier, so the rule graph is acyclic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    id: RuleId,
    first: Symbol,
    second: Symbol,
    level: usize,
    /// Fully expanded terminal string, tokens joined by single spaces.
    expanded: String,
    /// Number of terminal tokens in the expansion.
    expanded_len: usize,
    /// Positions where the rule's guard was placed.
    occurrences: BTreeSet<usize>,
}

impl Rule {
    /// Builds a rule from two children, resolving guard children against
    /// `earlier`, the rules created before this one.
    ///
    /// Returns `None` if a guard child points at a rule not in `earlier`.
    pub(crate) fn new(
        id: RuleId,
        first: Symbol,
        second: Symbol,
        earlier: &[Rule],
    ) -> Option<Self> {
        let (first_level, first_expanded, first_len) = child_expansion(&first, earlier)?;
        let (second_level, second_expanded, second_len) = child_expansion(&second, earlier)?;

        let mut expanded =
            String::with_capacity(first_expanded.len() + second_expanded.len() + 1);
        expanded.push_str(first_expanded);
        expanded.push(' ');
        expanded.push_str(second_expanded);

        Some(Self {
            id,
            first,
            second,
            level: first_level.max(second_level) + 1,
            expanded,
            expanded_len: first_len + second_len,
            occurrences: BTreeSet::new(),
        })
    }

    pub fn id(&self) -> RuleId {
        self.id
    }

    pub fn first(&self) -> &Symbol {
        &self.first
    }

    pub fn second(&self) -> &Symbol {
        &self.second
    }

    /// Nesting depth; a rule over two terminals has level 1.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn expanded(&self) -> &str {
        &self.expanded
    }

    pub fn expanded_len(&self) -> usize {
        self.expanded_len
    }

    /// Original-token positions at which the rule's guard was placed.
    pub fn occurrences(&self) -> &BTreeSet<usize> {
        &self.occurrences
    }

    /// Number of times the guard was placed.
    pub fn frequency(&self) -> usize {
        self.occurrences.len()
    }

    /// The right-hand side, e.g. `"R1 cba"`.
    pub fn rule_string(&self) -> String {
        format!("{} {}", self.first, self.second)
    }

    /// Intervals covered by each occurrence, in ascending start order.
    pub fn intervals(&self) -> impl Iterator<Item = RuleInterval> + '_ {
        self.occurrences.iter().map(move |&start| RuleInterval {
            start,
            end: start + self.expanded_len,
        })
    }

    pub(crate) fn add_occurrence(&mut self, position: usize) {
        self.occurrences.insert(position);
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} {}", self.id, self.first, self.second)
    }
}

/// Level, expansion and expanded length of one rule child.
fn child_expansion<'a>(
    symbol: &'a Symbol,
    earlier: &'a [Rule],
) -> Option<(usize, &'a str, usize)> {
    match symbol {
        Symbol::Terminal(token) => Some((0, token.value(), 1)),
        Symbol::Guard(guard) => {
            let rule = earlier.get(guard.rule().index())?;
            Some((rule.level, rule.expanded.as_str(), rule.expanded_len))
        }
    }
}
