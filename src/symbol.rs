use crate::token::Token;
use slotmap::DefaultKey;
use std::fmt;

/// Identifier of a grammar rule.
///
/// Rule ids start at 1; `R0` names the top-level string and has no rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(pub(crate) u32);

impl RuleId {
    pub fn get(self) -> u32 {
        self.0
    }

    /// Index of the rule in the grammar's rule vector.
    pub(crate) fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// A non-terminal placeholder standing for a rule at some position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    rule: RuleId,
    position: usize,
}

impl Guard {
    pub(crate) fn new(rule: RuleId, position: usize) -> Self {
        Self { rule, position }
    }

    pub fn rule(&self) -> RuleId {
        self.rule
    }

    /// Original-token position of the leftmost terminal this guard covers.
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Payload of a sequence cell or a rule child.
///
/// Replaces the symbol/guard class hierarchy with a closed enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    /// A terminal symbol wrapping an input token.
    Terminal(Token),

    /// A reference to a rule (non-terminal).
    Guard(Guard),
}

impl Symbol {
    /// Original-token position of the leftmost terminal covered by this symbol.
    pub fn position(&self) -> usize {
        match self {
            Symbol::Terminal(token) => token.position(),
            Symbol::Guard(guard) => guard.position(),
        }
    }

    pub fn is_guard(&self) -> bool {
        matches!(self, Symbol::Guard(_))
    }

    /// The referenced rule, if this is a guard.
    pub fn rule(&self) -> Option<RuleId> {
        match self {
            Symbol::Terminal(_) => None,
            Symbol::Guard(guard) => Some(guard.rule()),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(token) => fmt::Display::fmt(token, f),
            Symbol::Guard(guard) => fmt::Display::fmt(&guard.rule(), f),
        }
    }
}

/// A node in the doubly-linked working string.
///
/// Links are generational SlotMap keys, so a spliced-out node can never be
/// reached through a stale key.
#[derive(Debug)]
pub(crate) struct SymbolNode {
    pub symbol: Symbol,
    pub prev: Option<DefaultKey>,
    pub next: Option<DefaultKey>,
}

impl SymbolNode {
    pub(crate) fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            prev: None,
            next: None,
        }
    }
}

/// Compact identity of a symbol for digram keys.
///
/// Terminals are interned to an index, so keys are `Copy` and a terminal
/// spelled like a rule name (`"R1"`) never collides with a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum SymbolId {
    /// Terminal symbol with index into the interned values
    Terminal(u32),
    /// Non-terminal (rule reference)
    Rule(RuleId),
}
