//! Max-priority queue over digrams with arbitrary-key updates.
//!
//! `std::collections::BinaryHeap` cannot change the priority of an element
//! already in the heap, so this is a binary heap over a `Vec` paired with a
//! digram → slot map. Every swap keeps the map current, which makes
//! `update_frequency` and removal O(log n).

use crate::digram::Digram;
use crate::error::{GrammarError, Result};
use ahash::AHashMap as HashMap;

/// Digrams below this frequency are never queued.
pub(crate) const MIN_FREQUENCY: usize = 2;

/// A queued digram with its live occurrence count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DigramRecord {
    pub digram: Digram,
    pub frequency: usize,
    /// Enqueue order, used to break frequency ties.
    seq: u64,
}

impl DigramRecord {
    /// Higher frequency wins; on a tie the earlier-enqueued record wins.
    fn outranks(&self, other: &DigramRecord) -> bool {
        self.frequency > other.frequency
            || (self.frequency == other.frequency && self.seq < other.seq)
    }
}

#[derive(Debug, Default)]
pub(crate) struct DigramQueue {
    heap: Vec<DigramRecord>,
    slots: HashMap<Digram, usize>,
    next_seq: u64,
}

impl DigramQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn contains(&self, digram: &Digram) -> bool {
        self.slots.contains_key(digram)
    }

    #[cfg(test)]
    pub(crate) fn frequency(&self, digram: &Digram) -> Option<usize> {
        self.slots.get(digram).map(|&slot| self.heap[slot].frequency)
    }

    /// Starts tracking `digram`.
    pub(crate) fn enqueue(&mut self, digram: Digram, frequency: usize) -> Result<()> {
        if frequency < MIN_FREQUENCY {
            return Err(GrammarError::inconsistency(format!(
                "enqueue of {digram} with frequency {frequency}"
            )));
        }
        if self.contains(&digram) {
            return Err(GrammarError::inconsistency(format!(
                "{digram} is already queued"
            )));
        }

        let seq = self.next_seq;
        self.next_seq += 1;

        let slot = self.heap.len();
        self.heap.push(DigramRecord {
            digram,
            frequency,
            seq,
        });
        self.slots.insert(digram, slot);
        self.sift_up(slot);
        Ok(())
    }

    /// Removes and returns the most frequent digram.
    pub(crate) fn dequeue(&mut self) -> Option<DigramRecord> {
        self.remove_at(0)
    }

    /// Sets the frequency of a tracked digram, dropping it below [`MIN_FREQUENCY`].
    pub(crate) fn update_frequency(&mut self, digram: &Digram, frequency: usize) -> Result<()> {
        let Some(&slot) = self.slots.get(digram) else {
            return Err(GrammarError::inconsistency(format!(
                "update of untracked digram {digram}"
            )));
        };

        if frequency < MIN_FREQUENCY {
            self.remove_at(slot);
            return Ok(());
        }

        let old = self.heap[slot].frequency;
        self.heap[slot].frequency = frequency;
        if frequency > old {
            self.sift_up(slot);
        } else {
            self.sift_down(slot);
        }
        Ok(())
    }

    fn remove_at(&mut self, slot: usize) -> Option<DigramRecord> {
        let last = self.heap.len().checked_sub(1)?;
        self.swap(slot, last);
        let record = self.heap.pop()?;
        self.slots.remove(&record.digram);

        if slot < self.heap.len() {
            self.sift_down(slot);
            self.sift_up(slot);
        }
        Some(record)
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.slots.insert(self.heap[a].digram, a);
        self.slots.insert(self.heap[b].digram, b);
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.heap[slot].outranks(&self.heap[parent]) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut best = slot;

            if left < len && self.heap[left].outranks(&self.heap[best]) {
                best = left;
            }
            if right < len && self.heap[right].outranks(&self.heap[best]) {
                best = right;
            }
            if best == slot {
                break;
            }
            self.swap(slot, best);
            slot = best;
        }
    }
}
