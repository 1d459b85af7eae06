// core/src/tagger.rs
//
// A trained model plus the configuration that governs post-processing.
// Decoding itself is pure; the tagger only adds the optional unknown-word
// override and batch tagging across threads.

use rayon::prelude::*;
use std::sync::Arc;

use crate::error::Result;
use crate::model::CorpusModel;
use crate::unknown::UnknownWordGuesser;
use crate::viterbi;
use crate::Config;

/// Tags sentences with a shared, read-only model.
///
/// Cloning is cheap: the model sits behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Tagger {
    model: Arc<CorpusModel>,
    guesser: Option<UnknownWordGuesser>,
}

impl Tagger {
    /// Create a tagger from a model and configuration.
    pub fn new(model: CorpusModel, config: &Config) -> Self {
        Self::with_shared_model(Arc::new(model), config)
    }

    pub fn with_shared_model(model: Arc<CorpusModel>, config: &Config) -> Self {
        let guesser = config.guess_unknown_words.then(UnknownWordGuesser::new);
        Self { model, guesser }
    }

    pub fn model(&self) -> &CorpusModel {
        &self.model
    }

    /// Tag one sentence, one label per word.
    ///
    /// With unknown-word guessing enabled, a word absent from training takes
    /// the guessed tag instead of the decoded one, provided the model knows
    /// that tag. The rest of the path is left as decoded.
    pub fn tag<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<String>> {
        let mut tags = viterbi::decode(&self.model, words)?;
        if let Some(guesser) = &self.guesser {
            for (word, tag) in words.iter().zip(tags.iter_mut()) {
                let word = word.as_ref();
                if self.model.is_known_word(word) {
                    continue;
                }
                let guess = guesser.guess(word);
                if self.model.tag_id(guess).is_some() && guess != tag.as_str() {
                    tracing::trace!(word, decoded = %tag, guess, "unknown word override");
                    *tag = guess.to_string();
                }
            }
        }
        Ok(tags)
    }

    /// Tag many sentences in parallel. Output order follows input order; the
    /// first failure aborts the batch.
    pub fn tag_all<S>(&self, sentences: &[Vec<S>]) -> Result<Vec<Vec<String>>>
    where
        S: AsRef<str> + Sync,
    {
        let tagged: Result<Vec<Vec<String>>> =
            sentences.par_iter().map(|words| self.tag(words)).collect();
        if let Ok(tagged) = &tagged {
            let words: usize = tagged.iter().map(Vec::len).sum();
            tracing::debug!(sentences = tagged.len(), words, "tagged batch");
        }
        tagged
    }
}
