//! Raw co-occurrence counts keyed by typed composite keys.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::vocab::{TagId, WordId};

/// (previous tag, current tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransitionKey {
    pub prev: TagId,
    pub cur: TagId,
}

/// (tag, word).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmissionKey {
    pub tag: TagId,
    pub word: WordId,
}

/// Tag-bigram counts, boundary transitions included.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitionCounts {
    pairs: HashMap<TransitionKey, u64>,
    /// count(prev, *): all transitions out of `prev`, EOS included.
    outgoing: HashMap<TagId, u64>,
}

impl TransitionCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, prev: TagId, cur: TagId) {
        self.add(prev, cur, 1);
    }

    pub fn add(&mut self, prev: TagId, cur: TagId, count: u64) {
        *self.pairs.entry(TransitionKey { prev, cur }).or_insert(0) += count;
        *self.outgoing.entry(prev).or_insert(0) += count;
    }

    pub fn get(&self, prev: TagId, cur: TagId) -> u64 {
        self.pairs
            .get(&TransitionKey { prev, cur })
            .copied()
            .unwrap_or(0)
    }

    pub fn outgoing(&self, prev: TagId) -> u64 {
        self.outgoing.get(&prev).copied().unwrap_or(0)
    }

    /// Sum of all recorded transitions.
    pub fn total(&self) -> u64 {
        self.outgoing.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TransitionKey, u64)> + '_ {
        self.pairs.iter().map(|(k, v)| (*k, *v))
    }
}

/// (tag, word) counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmissionCounts {
    pairs: HashMap<EmissionKey, u64>,
    /// count(tag, *): every emission of `tag`.
    per_tag: HashMap<TagId, u64>,
}

impl EmissionCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, tag: TagId, word: WordId) {
        self.add(tag, word, 1);
    }

    pub fn add(&mut self, tag: TagId, word: WordId, count: u64) {
        *self.pairs.entry(EmissionKey { tag, word }).or_insert(0) += count;
        *self.per_tag.entry(tag).or_insert(0) += count;
    }

    pub fn get(&self, tag: TagId, word: WordId) -> u64 {
        self.pairs
            .get(&EmissionKey { tag, word })
            .copied()
            .unwrap_or(0)
    }

    pub fn tag_total(&self, tag: TagId) -> u64 {
        self.per_tag.get(&tag).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.per_tag.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmissionKey, u64)> + '_ {
        self.pairs.iter().map(|(k, v)| (*k, *v))
    }
}
