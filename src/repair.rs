//! RePair grammar induction.
//!
//! RePair is a greedy grammar-based compression algorithm that repeatedly
//! replaces the most frequent pair of adjacent symbols with a new rule.
//!
//! The working string lives in a SlotMap arena as a doubly-linked list. A
//! digram index tracks, for every adjacent pair, the positions where it
//! currently occurs, and an indexed priority queue keyed by those counts
//! always yields the globally most frequent digram. Each substitution repairs
//! only the two neighbouring digrams, so no pass rescans the string.
//!
//! # Example
//!
//! ```
//! use repair_gi::Repair;
//!
//! let grammar = Repair::new()
//!     .induce("abc abc cba cba bac XXX abc abc cba cba bac")
//!     .unwrap();
//!
//! assert_eq!(grammar.r0_string(), "R4 XXX R4");
//! assert_eq!(grammar.rules()[3].expanded(), "abc abc cba cba bac");
//! ```

use crate::config::RepairConfig;
use crate::digram::{Digram, DigramIndex};
use crate::error::{GrammarError, Result};
use crate::grammar::Grammar;
use crate::observer::{InductionEvent, InductionObserver};
use crate::queue::{DigramQueue, MIN_FREQUENCY};
use crate::rule::Rule;
use crate::symbol::{Guard, RuleId, Symbol, SymbolId, SymbolNode};
use crate::token::{tokenize, Token};
use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use slotmap::{DefaultKey, SlotMap};

#[cfg(feature = "tracing")]
use tracing::{debug, debug_span, trace};

/// Induces a grammar from `input` with the default configuration.
pub fn parse(input: &str) -> Result<Grammar> {
    Repair::new().induce(input)
}

/// Entry point for grammar induction.
///
/// Holds only configuration and the optional observer; every run builds and
/// drops its own working state, so one `Repair` can induce many inputs.
#[derive(Default)]
pub struct Repair<'o> {
    config: RepairConfig,
    observer: Option<&'o mut dyn InductionObserver>,
}

impl<'o> Repair<'o> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: RepairConfig) -> Self {
        self.config = config;
        self
    }

    /// Attaches an observer notified of every indexing, rule and substitution step.
    pub fn with_observer(mut self, observer: &'o mut dyn InductionObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &RepairConfig {
        &self.config
    }

    fn observer(&mut self) -> Option<&mut dyn InductionObserver> {
        match &mut self.observer {
            Some(observer) => Some(&mut **observer),
            None => None,
        }
    }

    /// Splits `input` on spaces and induces a grammar from the tokens.
    ///
    /// Fails with [`GrammarError::InvalidInput`] if there are no tokens.
    pub fn induce(&mut self, input: &str) -> Result<Grammar> {
        let tokens = tokenize(input)?;
        self.induce_tokens(tokens)
    }

    /// Induces a grammar from already positioned tokens.
    ///
    /// Positions must run `0..tokens.len()` in order, since rule occurrences
    /// and intervals are reported in those coordinates. Fails with
    /// [`GrammarError::InvalidInput`] for an empty list or any other layout.
    pub fn induce_tokens(&mut self, tokens: Vec<Token>) -> Result<Grammar> {
        if tokens.is_empty() {
            return Err(GrammarError::InvalidInput);
        }
        if tokens
            .iter()
            .enumerate()
            .any(|(expected, token)| token.position() != expected)
        {
            return Err(GrammarError::InvalidInput);
        }

        #[cfg(feature = "tracing")]
        let _span = debug_span!("repair_induce", tokens = tokens.len()).entered();

        let config = self.config;
        let mut induction = Induction::new(tokens, self.observer());
        induction.seed()?;

        let mut iterations = 0;
        while config.allows(iterations) && induction.step()? {
            iterations += 1;
        }

        #[cfg(feature = "tracing")]
        debug!(rules = iterations, "induction_finished");

        Ok(induction.finish())
    }
}

/// Mutable state of one induction run.
pub(crate) struct Induction<'a> {
    /// Symbol storage (doubly-linked list nodes)
    pub(crate) symbols: SlotMap<DefaultKey, SymbolNode>,

    /// First node of the working string
    pub(crate) head: Option<DefaultKey>,

    pub(crate) index: DigramIndex,

    pub(crate) queue: DigramQueue,

    /// Rules created so far; `rules[i]` is `R{i + 1}`
    pub(crate) rules: Vec<Rule>,

    /// Maps terminal values to their interned index
    value_to_index: HashMap<String, u32>,

    input_length: usize,

    observer: Option<&'a mut dyn InductionObserver>,
}

impl<'a> Induction<'a> {
    /// Builds the linked working string from `tokens`.
    pub(crate) fn new(
        tokens: Vec<Token>,
        observer: Option<&'a mut dyn InductionObserver>,
    ) -> Self {
        let mut induction = Self {
            symbols: SlotMap::with_capacity(tokens.len()),
            head: None,
            index: DigramIndex::new(),
            queue: DigramQueue::new(),
            rules: Vec::new(),
            value_to_index: HashMap::default(),
            input_length: tokens.len(),
            observer,
        };

        let mut prev_key: Option<DefaultKey> = None;
        for token in tokens {
            induction.intern(token.value());
            let key = induction
                .symbols
                .insert(SymbolNode::new(Symbol::Terminal(token)));

            induction.symbols[key].prev = prev_key;
            match prev_key {
                Some(prev) => induction.symbols[prev].next = Some(key),
                None => induction.head = Some(key),
            }
            prev_key = Some(key);
        }

        induction
    }

    /// Gets or creates an index for a terminal value.
    fn intern(&mut self, value: &str) -> u32 {
        if let Some(&index) = self.value_to_index.get(value) {
            index
        } else {
            let index = self.value_to_index.len() as u32;
            self.value_to_index.insert(value.to_owned(), index);
            index
        }
    }

    /// Gets the digram key component for the symbol at `key`.
    fn symbol_id(&self, key: DefaultKey) -> Result<SymbolId> {
        match &self.symbols[key].symbol {
            Symbol::Terminal(token) => self
                .value_to_index
                .get(token.value())
                .map(|&index| SymbolId::Terminal(index))
                .ok_or_else(|| {
                    GrammarError::inconsistency(format!("terminal {token} was never interned"))
                }),
            Symbol::Guard(guard) => Ok(SymbolId::Rule(guard.rule())),
        }
    }

    fn digram_at(&self, first: DefaultKey, second: DefaultKey) -> Result<Digram> {
        Ok(Digram::new(self.symbol_id(first)?, self.symbol_id(second)?))
    }

    fn position(&self, key: DefaultKey) -> usize {
        self.symbols[key].symbol.position()
    }

    /// Indexes every adjacent pair once and queues the repeated ones.
    ///
    /// Digrams are queued in order of their first occurrence, which fixes the
    /// tie-breaking order of the whole run.
    pub(crate) fn seed(&mut self) -> Result<()> {
        let mut current = self.head;
        while let Some(key) = current {
            let next = self.symbols[key].next;
            if let Some(next_key) = next {
                let digram = self.digram_at(key, next_key)?;
                let position = self.position(key);
                self.index.insert(digram, position, key);
            }
            current = next;
        }

        let mut current = self.head;
        while let Some(key) = current {
            let next = self.symbols[key].next;
            if let Some(next_key) = next {
                let digram = self.digram_at(key, next_key)?;
                let frequency = self.index.frequency(&digram);
                if frequency >= MIN_FREQUENCY && !self.queue.contains(&digram) {
                    self.queue.enqueue(digram, frequency)?;
                }
            }
            current = next;
        }

        #[cfg(feature = "tracing")]
        debug!(
            tokens = self.input_length,
            digrams = self.index.len(),
            queued = self.queue.len(),
            "seeded_digram_index"
        );

        let event = InductionEvent::Indexed {
            tokens: self.input_length,
            digrams: self.index.len(),
            queued: self.queue.len(),
        };
        self.notify(&event);
        Ok(())
    }

    /// Replaces every occurrence of the most frequent digram with a new rule.
    ///
    /// Returns `Ok(false)` once the queue is empty.
    pub(crate) fn step(&mut self) -> Result<bool> {
        let Some(record) = self.queue.dequeue() else {
            return Ok(false);
        };
        let digram = record.digram;

        let positions: Vec<usize> = match self.index.occurrences(&digram) {
            Some(occurrences) => occurrences.keys().copied().collect(),
            None => {
                return Err(GrammarError::inconsistency(format!(
                    "queued digram {digram} is not indexed"
                )))
            }
        };
        if positions.len() != record.frequency {
            return Err(GrammarError::inconsistency(format!(
                "digram {digram} queued with frequency {} but indexed {} times",
                record.frequency,
                positions.len()
            )));
        }

        let rule_id = RuleId(self.rules.len() as u32 + 1);
        let rule = self.create_rule(rule_id, &digram, positions[0])?;

        #[cfg(feature = "tracing")]
        debug!(
            rule = %rule_id,
            rhs = %rule.rule_string(),
            frequency = record.frequency,
            "rule_created"
        );

        let event = InductionEvent::RuleCreated {
            rule: &rule,
            frequency: record.frequency,
        };
        self.notify(&event);
        self.rules.push(rule);

        let mut touched: HashSet<Digram> = HashSet::default();
        for position in positions {
            // Consumed as the right half of an earlier overlapping occurrence
            let Some(key) = self.index.key_at(&digram, position) else {
                continue;
            };
            self.substitute(&digram, rule_id, key, &mut touched)?;

            if let Some(rule) = self.rules.last_mut() {
                rule.add_occurrence(position);
            }
            self.notify(&InductionEvent::Substituted {
                rule: rule_id,
                position,
            });
        }

        self.index.remove_entry(&digram);
        self.flush(touched)?;
        Ok(true)
    }

    /// Builds the rule for `digram` from its occurrence at `position`.
    fn create_rule(&self, id: RuleId, digram: &Digram, position: usize) -> Result<Rule> {
        let first = self
            .index
            .key_at(digram, position)
            .ok_or_else(|| GrammarError::inconsistency(format!("{digram} lost at {position}")))?;
        let second = self.symbols[first].next.ok_or_else(|| {
            GrammarError::inconsistency(format!("{digram} at {position} has no right half"))
        })?;

        Rule::new(
            id,
            self.symbols[first].symbol.clone(),
            self.symbols[second].symbol.clone(),
            &self.rules,
        )
        .ok_or_else(|| GrammarError::inconsistency(format!("{id} references an unknown rule")))
    }

    /// Splices a guard for `rule` in place of the pair starting at `first`.
    fn substitute(
        &mut self,
        digram: &Digram,
        rule: RuleId,
        first: DefaultKey,
        touched: &mut HashSet<Digram>,
    ) -> Result<()> {
        let second = self.symbols[first].next.ok_or_else(|| {
            GrammarError::inconsistency(format!("occurrence of {digram} has no right half"))
        })?;
        let before = self.symbols[first].prev;
        let after = self.symbols[second].next;
        let position = self.position(first);

        // Old neighbours, read through live links
        if let Some(prev) = before {
            let old_left = self.digram_at(prev, first)?;
            let prev_position = self.position(prev);
            self.retire(old_left, prev_position, digram, touched)?;
        }
        if let Some(next) = after {
            let old_right = self.digram_at(second, next)?;
            let second_position = self.position(second);
            self.retire(old_right, second_position, digram, touched)?;
        }

        let guard_key = self.symbols.insert(SymbolNode {
            symbol: Symbol::Guard(Guard::new(rule, position)),
            prev: before,
            next: after,
        });

        match before {
            Some(prev) => self.symbols[prev].next = Some(guard_key),
            None => self.head = Some(guard_key),
        }
        if let Some(next) = after {
            self.symbols[next].prev = Some(guard_key);
        }

        self.symbols.remove(first);
        self.symbols.remove(second);

        #[cfg(feature = "tracing")]
        trace!(rule = %rule, position, "substituted");

        // New neighbours
        if let Some(prev) = before {
            let new_left = Digram::new(self.symbol_id(prev)?, SymbolId::Rule(rule));
            let prev_position = self.position(prev);
            self.index.insert(new_left, prev_position, prev);
            touched.insert(new_left);
        }
        if let Some(next) = after {
            let new_right = Digram::new(SymbolId::Rule(rule), self.symbol_id(next)?);
            self.index.insert(new_right, position, guard_key);
            touched.insert(new_right);
        }

        Ok(())
    }

    /// Drops one occurrence of a neighbour digram broken by a substitution.
    ///
    /// The digram being replaced and digrams created during this pass are not
    /// in the queue; everything else with two or more occurrences must be.
    fn retire(
        &mut self,
        old: Digram,
        position: usize,
        replacing: &Digram,
        touched: &HashSet<Digram>,
    ) -> Result<()> {
        let remaining = self.index.remove(&old, position).ok_or_else(|| {
            GrammarError::inconsistency(format!("{old} is not indexed at {position}"))
        })?;

        if old == *replacing || touched.contains(&old) {
            return Ok(());
        }

        if self.queue.contains(&old) {
            self.queue.update_frequency(&old, remaining)?;
        } else if remaining + 1 >= MIN_FREQUENCY {
            return Err(GrammarError::inconsistency(format!(
                "{old} had {} occurrences but was not queued",
                remaining + 1
            )));
        }
        Ok(())
    }

    /// Queues or re-prioritises the digrams created during one rule pass.
    ///
    /// Processed in ascending order of first occurrence so queue insertion
    /// order never depends on hashing.
    fn flush(&mut self, touched: HashSet<Digram>) -> Result<()> {
        let mut pending: Vec<(usize, Digram)> = touched
            .into_iter()
            .filter_map(|digram| {
                self.index
                    .first_position(&digram)
                    .map(|position| (position, digram))
            })
            .collect();
        pending.sort_unstable();

        for (_, digram) in pending {
            let frequency = self.index.frequency(&digram);
            if self.queue.contains(&digram) {
                self.queue.update_frequency(&digram, frequency)?;
            } else if frequency >= MIN_FREQUENCY {
                self.queue.enqueue(digram, frequency)?;
            }
        }
        Ok(())
    }

    /// Serializes the surviving working string and hands over the rules.
    pub(crate) fn finish(mut self) -> Grammar {
        let mut r0 = Vec::new();
        let mut current = self.head;
        while let Some(key) = current {
            r0.push(self.symbols[key].symbol.clone());
            current = self.symbols[key].next;
        }

        let event = InductionEvent::Finished {
            rules: self.rules.len(),
            r0_len: r0.len(),
        };
        self.notify(&event);

        Grammar::new(self.rules, r0, self.input_length)
    }

    fn notify(&mut self, event: &InductionEvent<'_>) {
        if let Some(observer) = self.observer.as_deref_mut() {
            observer.on_event(event);
        }
    }
}
