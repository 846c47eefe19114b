//! Injected callbacks for watching an induction run.
//!
//! The engine holds no global logger. Callers that want a trace pass an
//! [`InductionObserver`]; any `FnMut(&InductionEvent)` closure works.

use crate::rule::Rule;
use crate::symbol::RuleId;

/// Progress notifications emitted by the engine.
#[derive(Debug, Clone, Copy)]
pub enum InductionEvent<'a> {
    /// The input was split and the digram index seeded.
    Indexed {
        tokens: usize,
        digrams: usize,
        queued: usize,
    },

    /// A rule was created for the most frequent digram.
    RuleCreated { rule: &'a Rule, frequency: usize },

    /// One occurrence of the digram was replaced by a guard.
    Substituted { rule: RuleId, position: usize },

    /// Induction finished; `r0_len` is the length of the final top-level string.
    Finished { rules: usize, r0_len: usize },
}

pub trait InductionObserver {
    fn on_event(&mut self, event: &InductionEvent<'_>);
}

impl<F> InductionObserver for F
where
    F: FnMut(&InductionEvent<'_>),
{
    fn on_event(&mut self, event: &InductionEvent<'_>) {
        self(event)
    }
}
