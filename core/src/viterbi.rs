//! Exact Viterbi decoding in log space.
//!
//! Scores are sums of ln-probabilities, so long sentences do not underflow.
//! Ties are broken towards the lexicographically smallest tag: real tags are
//! scanned in label order and a candidate only replaces the current best when
//! it is strictly greater.
use crate::error::{Result, TaggerError};
use crate::model::CorpusModel;
use crate::vocab::{TagId, WordId};

/// Best tag sequence for a sentence together with its joint ln-probability
/// (boundary transitions included).
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub tags: Vec<TagId>,
    pub log_prob: f64,
}

/// Per-sentence dynamic programming table.
///
/// Cells are addressed by (position, k) where k is the rank of a real tag in
/// label order.
struct Lattice {
    n_tags: usize,
    scores: Vec<f64>,
    back: Vec<usize>,
}

impl Lattice {
    fn new(n_words: usize, n_tags: usize) -> Self {
        Self {
            n_tags,
            scores: vec![f64::NEG_INFINITY; n_words * n_tags],
            back: vec![0; n_words * n_tags],
        }
    }

    #[inline]
    fn score(&self, pos: usize, k: usize) -> f64 {
        self.scores[pos * self.n_tags + k]
    }

    #[inline]
    fn set(&mut self, pos: usize, k: usize, score: f64, back: usize) {
        self.scores[pos * self.n_tags + k] = score;
        self.back[pos * self.n_tags + k] = back;
    }

    #[inline]
    fn back(&self, pos: usize, k: usize) -> usize {
        self.back[pos * self.n_tags + k]
    }
}

/// Decode `words` into tag labels, one per word, in input order.
///
/// Errors with `EmptyVocabulary` when the model holds no tags. Unknown words
/// never fail: they carry the emission floor under every tag.
pub fn decode<S: AsRef<str>>(model: &CorpusModel, words: &[S]) -> Result<Vec<String>> {
    let decoded = decode_scored(model, words)?;
    Ok(decoded
        .tags
        .into_iter()
        .map(|tag| model.label(tag).to_string())
        .collect())
}

/// Like `decode`, returning tag ids.
pub fn decode_ids<S: AsRef<str>>(model: &CorpusModel, words: &[S]) -> Result<Vec<TagId>> {
    Ok(decode_scored(model, words)?.tags)
}

/// Decode and report the ln-probability of the best path.
///
/// An empty sentence decodes to an empty sequence with ln-probability 0.
pub fn decode_scored<S: AsRef<str>>(model: &CorpusModel, words: &[S]) -> Result<Decoded> {
    let vocab = model.vocabulary();
    if vocab.is_empty() {
        return Err(TaggerError::EmptyVocabulary);
    }
    let n = words.len();
    if n == 0 {
        return Ok(Decoded {
            tags: Vec::new(),
            log_prob: 0.0,
        });
    }

    let k_tags = vocab.len();
    let word_ids: Vec<Option<WordId>> = words.iter().map(|w| model.word_id(w.as_ref())).collect();
    let mut lattice = Lattice::new(n, k_tags);

    // initialization
    for k in 0..k_tags {
        let tag = vocab.nth(k);
        let score = model.log_transition(TagId::BOS, tag) + model.log_emission(tag, word_ids[0]);
        lattice.set(0, k, score, 0);
    }

    // recursion
    for (pos, &word) in word_ids.iter().enumerate().skip(1) {
        for k in 0..k_tags {
            let cur = vocab.nth(k);
            let mut best = f64::NEG_INFINITY;
            let mut best_prev = 0usize;
            for p in 0..k_tags {
                let cand = lattice.score(pos - 1, p) + model.log_transition(vocab.nth(p), cur);
                if cand > best {
                    best = cand;
                    best_prev = p;
                }
            }
            lattice.set(pos, k, best + model.log_emission(cur, word), best_prev);
        }
    }

    // termination
    let mut best = f64::NEG_INFINITY;
    let mut last = 0usize;
    for k in 0..k_tags {
        let cand = lattice.score(n - 1, k) + model.log_transition(vocab.nth(k), TagId::EOS);
        if cand > best {
            best = cand;
            last = k;
        }
    }

    // backtrace
    let mut ranks = Vec::with_capacity(n);
    ranks.push(last);
    for pos in (1..n).rev() {
        last = lattice.back(pos, last);
        ranks.push(last);
    }
    ranks.reverse();

    tracing::trace!(words = n, log_prob = best, "decoded sentence");

    Ok(Decoded {
        tags: ranks.into_iter().map(|k| vocab.nth(k)).collect(),
        log_prob: best,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::TaggedToken;
    use crate::smoothing::SmoothingPolicy;

    fn train(sentences: &[&[(&str, &str)]]) -> CorpusModel {
        let corpus: Vec<Vec<TaggedToken>> = sentences
            .iter()
            .map(|s| s.iter().map(|(w, t)| TaggedToken::new(*w, *t)).collect())
            .collect();
        CorpusModel::build(&corpus, &SmoothingPolicy::default()).unwrap()
    }

    #[test]
    fn recovers_training_sentence() {
        let model = train(&[&[("the", "DET"), ("dog", "NOUN"), ("barks", "VERB")]]);
        let tags = decode(&model, &["the", "dog", "barks"]).unwrap();
        assert_eq!(tags, ["DET", "NOUN", "VERB"]);
    }

    #[test]
    fn unseen_word_follows_transitions() {
        let model = train(&[&[("the", "DET"), ("dog", "NOUN"), ("barks", "VERB")]]);
        let tags = decode(&model, &["the", "cat", "barks"]).unwrap();
        assert_eq!(tags, ["DET", "NOUN", "VERB"]);
    }

    #[test]
    fn empty_and_single_word_sentences() {
        let model = train(&[&[("the", "DET"), ("dog", "NOUN")]]);
        let empty: [&str; 0] = [];
        assert!(decode(&model, &empty).unwrap().is_empty());
        assert_eq!(decode_scored(&model, &empty).unwrap().log_prob, 0.0);
        assert_eq!(decode(&model, &["dog"]).unwrap(), ["NOUN"]);
    }

    #[test]
    fn single_word_score_is_init_plus_termination() {
        let model = train(&[&[("dog", "NOUN")], &[("runs", "VERB")]]);
        let noun = model.tag_id("NOUN").unwrap();
        let d = decode_scored(&model, &["dog"]).unwrap();
        assert_eq!(d.tags, vec![noun]);
        let expected = model.log_transition(TagId::BOS, noun)
            + model.log_emission(noun, model.word_id("dog"))
            + model.log_transition(noun, TagId::EOS);
        assert!((d.log_prob - expected).abs() < 1e-12);
    }

    #[test]
    fn ties_go_to_smallest_label() {
        // B and A are perfectly symmetric; "x" was seen under both.
        let model = train(&[&[("x", "B")], &[("x", "A")]]);
        assert_eq!(decode(&model, &["x"]).unwrap(), ["A"]);
        assert_eq!(decode(&model, &["unseen", "x"]).unwrap(), ["A", "A"]);
    }

    #[test]
    fn decoding_is_deterministic() {
        let model = train(&[
            &[("I", "PRP"), ("saw", "VBD"), ("her", "PRP$"), ("duck", "NN")],
            &[("ducks", "NNS"), ("saw", "VBP"), ("wood", "NN")],
            &[("I", "PRP"), ("duck", "VBP")],
        ]);
        let words = ["I", "saw", "a", "duck", "saw", "wood"];
        let first = decode(&model, &words).unwrap();
        for _ in 0..10 {
            assert_eq!(decode(&model, &words).unwrap(), first);
        }
        assert_eq!(first.len(), words.len());
    }

    #[test]
    fn long_sentences_stay_finite() {
        let model = train(&[&[("a", "X"), ("b", "Y")]]);
        let words: Vec<String> = (0..2000).map(|i| format!("w{}", i % 7)).collect();
        let d = decode_scored(&model, &words).unwrap();
        assert_eq!(d.tags.len(), 2000);
        assert!(d.log_prob.is_finite());
    }

    #[test]
    fn unbuilt_model_cannot_decode() {
        let model = CorpusModel::default();
        assert!(matches!(
            decode(&model, &["anything"]),
            Err(TaggerError::EmptyVocabulary)
        ));
    }
}
