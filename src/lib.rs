//! # RePair - Grammar Induction over Token Strings
//!
//! Builds a context-free grammar for a space-separated token string by
//! repeatedly replacing the most frequent adjacent pair (digram) with a new
//! rule, until no digram occurs twice.
//!
//! The result is a [`Grammar`]: the rules in creation order, each with its
//! nesting level, full terminal expansion and the original-token positions
//! where it was placed, plus the remaining top-level string `R0`.
//!
//! ## Example
//!
//! ```
//! use repair_gi::parse;
//!
//! let grammar = parse("a b c a b c").unwrap();
//!
//! // Reconstructs the original sequence
//! assert_eq!(grammar.expand(), "a b c a b c");
//! assert_eq!(grammar.r0_string(), "R2 R2");
//!
//! for (rule, interval) in grammar.rule_intervals() {
//!     println!("{rule} covers [{}, {})", interval.start, interval.end);
//! }
//! ```
//!
//! ## Guarantees
//!
//! - Deterministic: identical input yields an identical grammar
//! - Lossless: expanding `R0` reproduces the input tokens
//! - Each rule pass only touches the neighbours of replaced pairs

mod config;
mod digram;
mod error;
mod grammar;
mod iter;
mod observer;
mod queue;
mod repair;
mod rule;
mod symbol;
mod token;

#[cfg(test)]
mod tests;

pub use config::RepairConfig;
pub use error::{GrammarError, Result};
pub use grammar::{Grammar, GrammarStats};
pub use iter::GrammarIter;
pub use observer::{InductionEvent, InductionObserver};
pub use repair::{parse, Repair};
pub use rule::{Rule, RuleInterval};
pub use symbol::{Guard, RuleId, Symbol};
pub use token::{tokenize, Token};
