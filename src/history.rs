use crate::pose::Pose;
use crate::wind::WindEstimate;
use alloc::vec::Vec;

pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HistoryEntry {
    pub pose: Pose,
    pub wind: WindEstimate,
}

/// Fixed-capacity ring buffer of recent poses and wind estimates.
///
/// Once full, each push overwrites the oldest entry.
#[derive(Clone, Debug)]
pub struct HistoryBuffer {
    entries: Vec<HistoryEntry>,
    capacity: usize,
    /// Index of the oldest entry once the buffer is full.
    idx: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryBuffer {
    /// Create an empty buffer holding at least one entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            idx: 0,
        }
    }

    /// Append an entry, returning the evicted oldest entry if the buffer was full.
    pub fn push(&mut self, pose: Pose, wind: WindEstimate) -> Option<HistoryEntry> {
        let entry = HistoryEntry { pose, wind };
        if self.entries.len() < self.capacity {
            self.entries.push(entry);
            None
        } else {
            let evicted = core::mem::replace(&mut self.entries[self.idx], entry);
            self.idx = (self.idx + 1) % self.capacity;
            Some(evicted)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recently pushed entry.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        let n = self.entries.len();
        if n == 0 {
            return None;
        }
        self.entries.get((self.idx + n - 1) % n)
    }

    pub fn oldest(&self) -> Option<&HistoryEntry> {
        self.iter().next()
    }

    /// Iterate from the oldest to the newest entry.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> + '_ {
        let (newer, older) = self.entries.split_at(self.idx);
        older.iter().chain(newer.iter())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.idx = 0;
    }
}
