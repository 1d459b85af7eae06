//! Tag and word vocabularies.
//!
//! Tags are interned into `TagId`s with the two sentence-boundary sentinels
//! at fixed positions and the real tags following in lexicographic order, so
//! that comparing ids of real tags is the same as comparing their labels.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::{Result, TaggerError};

/// Label of the begin-of-sentence sentinel.
pub const BOS_LABEL: &str = "<s>";
/// Label of the end-of-sentence sentinel.
pub const EOS_LABEL: &str = "</s>";

const FIRST_REAL: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagId(u32);

impl TagId {
    pub const BOS: TagId = TagId(0);
    pub const EOS: TagId = TagId(1);

    /// Position of this tag in a dense table that includes the sentinels.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Inverse of `index`; ids are dense over a vocabulary's table.
    #[inline]
    pub(crate) fn from_index(index: usize) -> TagId {
        TagId(index as u32)
    }

    #[inline]
    pub fn is_sentinel(self) -> bool {
        self.0 < FIRST_REAL
    }
}

/// Closed set of tags seen in training, plus BOS and EOS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagVocabulary {
    /// labels[id] is the label of TagId(id); sentinels first.
    labels: Vec<String>,
    ids: HashMap<String, TagId>,
}

impl TagVocabulary {
    /// Build a vocabulary from training tags. Duplicates are merged and the
    /// result is ordered lexicographically.
    ///
    /// Returns `ReservedTag` if a label equals one of the sentinel labels.
    pub fn from_labels<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sorted = BTreeSet::new();
        for label in labels {
            let label = label.into();
            if label == BOS_LABEL || label == EOS_LABEL {
                return Err(TaggerError::ReservedTag(label));
            }
            sorted.insert(label);
        }

        let mut vocab = Self::default();
        for label in sorted {
            let id = TagId(vocab.labels.len() as u32);
            vocab.ids.insert(label.clone(), id);
            vocab.labels.push(label);
        }
        Ok(vocab)
    }

    /// Look up a label, sentinels included.
    pub fn id(&self, label: &str) -> Option<TagId> {
        self.ids.get(label).copied()
    }

    /// Label of `id`.
    ///
    /// Panics if `id` does not come from this vocabulary.
    pub fn label(&self, id: TagId) -> &str {
        &self.labels[id.index()]
    }

    /// Number of real (non-sentinel) tags.
    pub fn len(&self) -> usize {
        self.labels.len() - FIRST_REAL as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of a dense table indexed by `TagId::index`.
    pub fn table_size(&self) -> usize {
        self.labels.len()
    }

    /// Real tags, in label order.
    pub fn tags(&self) -> impl ExactSizeIterator<Item = TagId> + '_ {
        (FIRST_REAL..self.labels.len() as u32).map(TagId)
    }

    /// `k`-th real tag in label order.
    pub fn nth(&self, k: usize) -> TagId {
        TagId(FIRST_REAL + k as u32)
    }

    /// Real tags followed by EOS: every state a transition can lead to.
    pub fn successors(&self) -> impl Iterator<Item = TagId> + '_ {
        self.tags().chain(std::iter::once(TagId::EOS))
    }

    /// Number of possible successors of any tag (real tags plus EOS).
    pub fn successor_count(&self) -> usize {
        self.len() + 1
    }
}

impl Default for TagVocabulary {
    /// A vocabulary holding only the sentinels.
    fn default() -> Self {
        let labels = vec![BOS_LABEL.to_string(), EOS_LABEL.to_string()];
        let ids = HashMap::from([
            (BOS_LABEL.to_string(), TagId::BOS),
            (EOS_LABEL.to_string(), TagId::EOS),
        ]);
        Self { labels, ids }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WordId(u32);

/// Interner for every word observed in training.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordIndex {
    ids: HashMap<String, WordId>,
}

impl WordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id of `word`, assigning a fresh one on first sight.
    pub fn intern(&mut self, word: &str) -> WordId {
        if let Some(&id) = self.ids.get(word) {
            return id;
        }
        let id = WordId(self.ids.len() as u32);
        self.ids.insert(word.to_string(), id);
        id
    }

    pub fn get(&self, word: &str) -> Option<WordId> {
        self.ids.get(word).copied()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.ids.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
