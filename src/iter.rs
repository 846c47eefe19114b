//! Iterator for reconstructing the input from an induced grammar.

use crate::grammar::Grammar;
use crate::symbol::Symbol;

/// Iterator that expands R0 back into the original token values.
///
/// Uses an explicit stack of pending symbols, so deep rule nesting does not
/// recurse.
pub struct GrammarIter<'a> {
    grammar: &'a Grammar,
    stack: Vec<&'a Symbol>,
}

impl<'a> GrammarIter<'a> {
    pub(crate) fn new(grammar: &'a Grammar) -> Self {
        Self {
            grammar,
            stack: grammar.r0().iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for GrammarIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(symbol) = self.stack.pop() {
            match symbol {
                Symbol::Terminal(token) => return Some(token.value()),
                Symbol::Guard(guard) => {
                    // Descend: push children right to left
                    let rule = self.grammar.rule(guard.rule())?;
                    self.stack.push(rule.second());
                    self.stack.push(rule.first());
                }
            }
        }
        None
    }
}
