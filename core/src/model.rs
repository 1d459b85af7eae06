//! The trained HMM: counts plus ln-probability tables, built once.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::corpus::TaggedToken;
use crate::counts::{EmissionCounts, EmissionKey, TransitionCounts};
use crate::error::{Result, TaggerError};
use crate::smoothing::SmoothingPolicy;
use crate::vocab::{TagId, TagVocabulary, WordId, WordIndex, BOS_LABEL, EOS_LABEL};

/// Immutable HMM parameters estimated from a tagged corpus.
///
/// Probabilities are stored as natural logarithms. The transition table is
/// dense (`table_size × table_size`, sentinels included); emissions are
/// sparse and fall back to the smoothing floor on a miss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusModel {
    vocab: TagVocabulary,
    words: WordIndex,
    transitions: TransitionCounts,
    emissions: EmissionCounts,

    /// ln P(cur | prev) at `prev.index() * table_size + cur.index()`
    transition_ln: Vec<f64>,

    /// ln P(word | tag) for pairs seen in training
    emission_ln: HashMap<EmissionKey, f64>,

    /// P(word | tag) for every unseen pair
    unseen_floor: f64,

    sentences: usize,
    tokens: usize,
}

impl Default for CorpusModel {
    /// An unbuilt model: sentinels only, nothing to decode with.
    fn default() -> Self {
        let vocab = TagVocabulary::default();
        let size = vocab.table_size();
        let floor = SmoothingPolicy::default().emission_floor();
        Self {
            vocab,
            words: WordIndex::new(),
            transitions: TransitionCounts::new(),
            emissions: EmissionCounts::new(),
            transition_ln: vec![(1.0 / size as f64).ln(); size * size],
            emission_ln: HashMap::new(),
            unseen_floor: floor,
            sentences: 0,
            tokens: 0,
        }
    }
}

impl CorpusModel {
    /// Estimate a model from tagged sentences.
    ///
    /// The input is consumed once. Each non-empty sentence contributes the
    /// chain BOS → t1 → … → tn → EOS to the transition counts and every
    /// (tag, word) pair to the emission counts. Empty sentences are skipped.
    ///
    /// Errors:
    /// - `EmptyCorpus` if no sentence has a token.
    /// - `ReservedTag` if a training tag equals a sentinel label.
    pub fn build<I, S>(sentences: I, policy: &SmoothingPolicy) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[TaggedToken]>,
    {
        // Tags get provisional ids in order of first appearance; the final
        // ids are only known once the whole label set has been sorted.
        let mut provisional: Vec<String> = vec![BOS_LABEL.to_string(), EOS_LABEL.to_string()];
        let mut provisional_ids: HashMap<String, usize> = HashMap::new();
        let mut bigrams: HashMap<(usize, usize), u64> = HashMap::new();
        let mut unigrams: HashMap<(usize, WordId), u64> = HashMap::new();
        let mut words = WordIndex::new();
        let mut n_sentences = 0usize;
        let mut n_tokens = 0usize;

        for sentence in sentences {
            let sentence = sentence.as_ref();
            if sentence.is_empty() {
                continue;
            }
            n_sentences += 1;
            n_tokens += sentence.len();

            let mut prev = 0usize; // BOS
            for token in sentence {
                if token.tag == BOS_LABEL || token.tag == EOS_LABEL {
                    return Err(TaggerError::ReservedTag(token.tag.clone()));
                }
                let cur = match provisional_ids.get(token.tag.as_str()) {
                    Some(&id) => id,
                    None => {
                        let id = provisional.len();
                        provisional.push(token.tag.clone());
                        provisional_ids.insert(token.tag.clone(), id);
                        id
                    }
                };
                *bigrams.entry((prev, cur)).or_insert(0) += 1;
                *unigrams.entry((cur, words.intern(&token.word))).or_insert(0) += 1;
                prev = cur;
            }
            *bigrams.entry((prev, 1)).or_insert(0) += 1; // EOS
        }

        if n_sentences == 0 {
            return Err(TaggerError::EmptyCorpus);
        }

        let vocab = TagVocabulary::from_labels(provisional.iter().skip(2).cloned())?;
        let mut remap = vec![TagId::BOS, TagId::EOS];
        remap.extend(provisional.iter().skip(2).filter_map(|label| vocab.id(label)));

        let mut transitions = TransitionCounts::new();
        for ((p, c), n) in bigrams {
            transitions.add(remap[p], remap[c], n);
        }
        let mut emissions = EmissionCounts::new();
        for ((t, w), n) in unigrams {
            emissions.add(remap[t], w, n);
        }

        let size = vocab.table_size();
        let successors = vocab.successor_count();
        let mut transition_ln = vec![0.0; size * size];
        for prev in 0..size {
            let prev_id = TagId::from_index(prev);
            let outgoing = transitions.outgoing(prev_id);
            for cur in 0..size {
                let count = transitions.get(prev_id, TagId::from_index(cur));
                transition_ln[prev * size + cur] =
                    policy.transition(count, outgoing, successors).ln();
            }
        }

        let mut emission_ln = HashMap::new();
        let mut smallest_seen = 1.0f64;
        for (key, count) in emissions.iter() {
            let p = policy.seen_emission(count, emissions.tag_total(key.tag));
            smallest_seen = smallest_seen.min(p);
            emission_ln.insert(key, p.ln());
        }
        let unseen_floor = policy.unseen_floor(smallest_seen);

        tracing::debug!(
            sentences = n_sentences,
            tokens = n_tokens,
            tags = vocab.len(),
            words = words.len(),
            smallest_seen,
            unseen_floor,
            "built corpus model"
        );

        Ok(Self {
            vocab,
            words,
            transitions,
            emissions,
            transition_ln,
            emission_ln,
            unseen_floor,
            sentences: n_sentences,
            tokens: n_tokens,
        })
    }

    // ========== Probabilities ==========

    /// P(cur | prev). Rows over `successors()` sum to 1.
    ///
    /// `cur == BOS` lies outside the outcome space; the value returned for it
    /// is the weight of an unseen pair and plays no part in decoding.
    pub fn transition_prob(&self, prev: TagId, cur: TagId) -> f64 {
        self.log_transition(prev, cur).exp()
    }

    /// ln P(cur | prev).
    #[inline]
    pub fn log_transition(&self, prev: TagId, cur: TagId) -> f64 {
        self.transition_ln[prev.index() * self.vocab.table_size() + cur.index()]
    }

    /// P(word | tag); the unseen floor when the pair never occurred.
    pub fn emission_prob(&self, tag: TagId, word: &str) -> f64 {
        self.log_emission(tag, self.words.get(word)).exp()
    }

    /// ln P(word | tag) for an already looked-up word (`None` = unknown word).
    #[inline]
    pub fn log_emission(&self, tag: TagId, word: Option<WordId>) -> f64 {
        word.and_then(|word| self.emission_ln.get(&EmissionKey { tag, word }))
            .copied()
            .unwrap_or_else(|| self.unseen_floor.ln())
    }

    /// Probability given to every (tag, word) pair absent from training.
    pub fn unseen_floor(&self) -> f64 {
        self.unseen_floor
    }

    // ========== Vocabulary ==========

    /// Real tags in label order.
    pub fn tags(&self) -> impl ExactSizeIterator<Item = TagId> + '_ {
        self.vocab.tags()
    }

    /// Real tags followed by EOS.
    pub fn successors(&self) -> impl Iterator<Item = TagId> + '_ {
        self.vocab.successors()
    }

    pub fn tag_id(&self, label: &str) -> Option<TagId> {
        self.vocab.id(label)
    }

    pub fn label(&self, tag: TagId) -> &str {
        self.vocab.label(tag)
    }

    pub fn vocabulary(&self) -> &TagVocabulary {
        &self.vocab
    }

    pub fn word_id(&self, word: &str) -> Option<WordId> {
        self.words.get(word)
    }

    /// Whether `word` was seen under any tag in training.
    pub fn is_known_word(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    // ========== Raw counts ==========

    pub fn transition_count(&self, prev: TagId, cur: TagId) -> u64 {
        self.transitions.get(prev, cur)
    }

    pub fn emission_count(&self, tag: TagId, word: &str) -> u64 {
        self.words
            .get(word)
            .map(|w| self.emissions.get(tag, w))
            .unwrap_or(0)
    }

    /// Number of training tokens carrying `tag`.
    pub fn tag_count(&self, tag: TagId) -> u64 {
        self.emissions.tag_total(tag)
    }

    pub fn transition_counts(&self) -> &TransitionCounts {
        &self.transitions
    }

    pub fn emission_counts(&self) -> &EmissionCounts {
        &self.emissions
    }

    /// Non-empty training sentences.
    pub fn sentence_count(&self) -> usize {
        self.sentences
    }

    pub fn token_count(&self) -> usize {
        self.tokens
    }

    // ========== Persistence ==========

    /// Load from a bincode file.
    ///
    /// Errors with `CorruptModel` when the transition table does not cover
    /// the stored vocabulary, which would otherwise surface as a panic in
    /// decoding.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let model: Self = bincode::deserialize_from(reader)?;
        model.check_tables()?;
        Ok(model)
    }

    fn check_tables(&self) -> Result<()> {
        let size = self.vocab.table_size();
        if self.transition_ln.len() != size * size {
            return Err(TaggerError::CorruptModel(format!(
                "transition table has {} cells, expected {} for {} tags",
                self.transition_ln.len(),
                size * size,
                self.vocab.len()
            )));
        }
        if !(self.unseen_floor > 0.0 && self.unseen_floor < 1.0) {
            return Err(TaggerError::CorruptModel(format!(
                "unseen floor {} outside (0, 1)",
                self.unseen_floor
            )));
        }
        Ok(())
    }

    /// Save to a bincode file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(pairs: &[(&str, &str)]) -> Vec<TaggedToken> {
        pairs.iter().map(|(w, t)| TaggedToken::new(*w, *t)).collect()
    }

    fn toy_model() -> CorpusModel {
        let train = vec![
            sentence(&[("the", "DET"), ("dog", "NOUN"), ("barks", "VERB")]),
            sentence(&[("a", "DET"), ("dog", "NOUN"), ("runs", "VERB")]),
            sentence(&[("dogs", "NOUN"), ("bark", "VERB")]),
        ];
        CorpusModel::build(&train, &SmoothingPolicy::default()).unwrap()
    }

    #[test]
    fn counts_include_boundaries() {
        let model = toy_model();
        let det = model.tag_id("DET").unwrap();
        let noun = model.tag_id("NOUN").unwrap();
        let verb = model.tag_id("VERB").unwrap();

        assert_eq!(model.transition_count(TagId::BOS, det), 2);
        assert_eq!(model.transition_count(TagId::BOS, noun), 1);
        assert_eq!(model.transition_count(det, noun), 2);
        assert_eq!(model.transition_count(verb, TagId::EOS), 3);
        assert_eq!(model.emission_count(noun, "dog"), 2);
        assert_eq!(model.tag_count(noun), 3);
        assert_eq!(model.sentence_count(), 3);
        assert_eq!(model.token_count(), 8);
    }

    #[test]
    fn transition_rows_sum_to_one() {
        let model = toy_model();
        let prevs = std::iter::once(TagId::BOS).chain(model.successors());
        for prev in prevs {
            let sum: f64 = model
                .successors()
                .map(|cur| model.transition_prob(prev, cur))
                .sum();
            assert!((sum - 1.0).abs() < 1e-9, "row {} sums to {}", model.label(prev), sum);
        }
    }

    #[test]
    fn laplace_values() {
        let model = toy_model();
        let det = model.tag_id("DET").unwrap();
        let noun = model.tag_id("NOUN").unwrap();
        // count(DET, NOUN) = 2, count(DET, *) = 2, successors = 4
        assert!((model.transition_prob(det, noun) - 3.0 / 6.0).abs() < 1e-12);
        assert!((model.transition_prob(det, det) - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn emissions_are_mle_with_floor() {
        let model = toy_model();
        let noun = model.tag_id("NOUN").unwrap();
        let verb = model.tag_id("VERB").unwrap();
        assert!((model.emission_prob(noun, "dog") - 2.0 / 3.0).abs() < 1e-12);
        assert!((model.emission_prob(noun, "dogs") - 1.0 / 3.0).abs() < 1e-12);

        let floor = model.unseen_floor();
        assert!(floor > 0.0);
        assert!(floor < 1.0 / 3.0);
        assert_eq!(model.emission_prob(verb, "dog"), model.emission_prob(verb, "cat"));
        assert!((model.emission_prob(verb, "cat") - floor).abs() < 1e-20);
    }

    #[test]
    fn every_emission_is_positive() {
        let model = toy_model();
        for tag in model.tags() {
            for word in ["the", "a", "dog", "dogs", "barks", "runs", "bark", "zebra", ""] {
                assert!(model.emission_prob(tag, word) > 0.0);
            }
        }
    }

    #[test]
    fn empty_corpus_is_rejected() {
        let none: Vec<Vec<TaggedToken>> = vec![];
        assert!(matches!(
            CorpusModel::build(&none, &SmoothingPolicy::default()),
            Err(TaggerError::EmptyCorpus)
        ));
        let blank: Vec<Vec<TaggedToken>> = vec![vec![], vec![]];
        assert!(matches!(
            CorpusModel::build(&blank, &SmoothingPolicy::default()),
            Err(TaggerError::EmptyCorpus)
        ));
    }

    #[test]
    fn sentinel_tags_are_rejected() {
        let train = vec![sentence(&[("x", EOS_LABEL)])];
        assert!(matches!(
            CorpusModel::build(&train, &SmoothingPolicy::default()),
            Err(TaggerError::ReservedTag(_))
        ));
    }

    #[test]
    fn save_and_load() {
        let model = toy_model();
        let stamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("hmmtag_model_{}.bin", stamp));

        model.save(&path).expect("save");
        let loaded = CorpusModel::load(&path).expect("load");
        let noun = loaded.tag_id("NOUN").unwrap();
        assert_eq!(loaded.tags().len(), 3);
        assert_eq!(loaded.emission_count(noun, "dog"), 2);
        assert_eq!(
            loaded.transition_prob(TagId::BOS, noun),
            model.transition_prob(TagId::BOS, noun)
        );

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_rejects_truncated_transition_table() {
        let mut model = toy_model();
        model.transition_ln.pop();
        let stamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("hmmtag_truncated_{}.bin", stamp));

        model.save(&path).expect("save");
        let loaded = CorpusModel::load(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(loaded, Err(TaggerError::CorruptModel(_))));
    }
}
