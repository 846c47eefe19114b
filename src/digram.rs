//! Digram keys and the occurrence index.

use crate::symbol::SymbolId;
use ahash::AHashMap as HashMap;
use slotmap::DefaultKey;
use std::collections::BTreeMap;
use std::fmt;

/// An ordered pair of adjacent symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Digram {
    pub first: SymbolId,
    pub second: SymbolId,
}

impl Digram {
    pub(crate) fn new(first: SymbolId, second: SymbolId) -> Self {
        Self { first, second }
    }
}

impl fmt::Display for Digram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_id(f: &mut fmt::Formatter<'_>, id: SymbolId) -> fmt::Result {
            match id {
                SymbolId::Terminal(index) => write!(f, "#{index}"),
                SymbolId::Rule(rule) => write!(f, "{rule}"),
            }
        }
        write_id(f, self.first)?;
        f.write_str(" ")?;
        write_id(f, self.second)
    }
}

/// Maps each digram to the left-occurrence positions currently exhibiting it.
///
/// Positions are original-token coordinates of the left node; each maps to
/// the arena key of that node. Ordered maps keep occurrence iteration
/// independent of hashing. An entry exists only while it has at least one
/// position.
#[derive(Debug, Default)]
pub(crate) struct DigramIndex {
    entries: HashMap<Digram, BTreeMap<usize, DefaultKey>>,
}

impl DigramIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records `digram` at `position`, returning its new frequency.
    pub(crate) fn insert(&mut self, digram: Digram, position: usize, key: DefaultKey) -> usize {
        let positions = self.entries.entry(digram).or_default();
        positions.insert(position, key);
        positions.len()
    }

    /// Removes the occurrence of `digram` at `position`.
    ///
    /// Returns the remaining frequency, or `None` if the occurrence was not
    /// indexed. The entry is dropped once its last occurrence goes.
    pub(crate) fn remove(&mut self, digram: &Digram, position: usize) -> Option<usize> {
        let positions = self.entries.get_mut(digram)?;
        positions.remove(&position)?;
        let remaining = positions.len();
        if remaining == 0 {
            self.entries.remove(digram);
        }
        Some(remaining)
    }

    /// Drops the whole entry for `digram`.
    pub(crate) fn remove_entry(&mut self, digram: &Digram) -> Option<BTreeMap<usize, DefaultKey>> {
        self.entries.remove(digram)
    }

    pub(crate) fn frequency(&self, digram: &Digram) -> usize {
        self.entries.get(digram).map_or(0, BTreeMap::len)
    }

    pub(crate) fn occurrences(&self, digram: &Digram) -> Option<&BTreeMap<usize, DefaultKey>> {
        self.entries.get(digram)
    }

    /// Arena key of the node at `position`, if `digram` still occurs there.
    pub(crate) fn key_at(&self, digram: &Digram, position: usize) -> Option<DefaultKey> {
        self.entries.get(digram)?.get(&position).copied()
    }

    pub(crate) fn first_position(&self, digram: &Digram) -> Option<usize> {
        self.entries
            .get(digram)?
            .first_key_value()
            .map(|(&position, _)| position)
    }

    /// Number of distinct digrams indexed.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Digram, &BTreeMap<usize, DefaultKey>)> {
        self.entries.iter()
    }
}
