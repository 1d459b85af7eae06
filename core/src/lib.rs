//! hmmtag-core
//!
//! Hidden Markov Model part-of-speech tagging: estimating transition and
//! emission tables from a tagged corpus, decoding unseen sentences with the
//! Viterbi algorithm, and scoring decoded output against a gold key.
//!
//! Public API:
//! - `CorpusModel` - Immutable counts and ln-probability tables built once from training data
//! - `SmoothingPolicy` - Laplace transitions and floored emissions
//! - `viterbi::decode` - Exact log-space Viterbi decoding
//! - `Tagger` - Model plus configuration, with batch tagging across threads
//! - `score` / `ConfusionTally` - Accuracy and confusion reporting
//! - `Config` - Configuration loaded from TOML
//!
//! ```
//! use hmmtag_core::{score, CorpusModel, SmoothingPolicy, TaggedToken};
//!
//! let train = vec![vec![
//!     TaggedToken::new("the", "DET"),
//!     TaggedToken::new("dog", "NOUN"),
//!     TaggedToken::new("barks", "VERB"),
//! ]];
//! let model = CorpusModel::build(&train, &SmoothingPolicy::default()).unwrap();
//! let tags = hmmtag_core::viterbi::decode(&model, &["the", "dog", "barks"]).unwrap();
//! assert_eq!(tags, ["DET", "NOUN", "VERB"]);
//!
//! let result = score(&[tags.clone()], &[tags]).unwrap();
//! assert_eq!(result.accuracy, 1.0);
//! ```
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Result, TaggerError};

pub mod vocab;
pub use vocab::{TagId, TagVocabulary, WordId, WordIndex, BOS_LABEL, EOS_LABEL};

pub mod counts;
pub use counts::{EmissionCounts, EmissionKey, TransitionCounts, TransitionKey};

pub mod smoothing;
pub use smoothing::SmoothingPolicy;

pub mod model;
pub use model::CorpusModel;

pub mod viterbi;

pub mod unknown;
pub use unknown::UnknownWordGuesser;

pub mod tagger;
pub use tagger::Tagger;

pub mod scorer;
pub use scorer::{score, ConfusionEntry, ConfusionMatrix, ConfusionTally, LabelMeasure, Score};

pub mod corpus;
pub use corpus::{TaggedSentence, TaggedToken};

/// Tagger configuration.
///
/// Covers the smoothing knobs, how corpora are cut into sentences, and
/// optional post-processing. Every field has a default, so a partial TOML
/// file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Requested emission probability for a (tag, word) pair never observed
    /// in training. The same value is used for every tag.
    pub emission_floor: f64,

    /// The effective floor never exceeds `floor_margin` times the smallest
    /// observed emission probability, whatever `emission_floor` asks for.
    pub floor_margin: f64,

    /// Words that close a sentence when they appear as a token (e.g. ".").
    /// Blank lines always close a sentence.
    pub sentence_terminators: Vec<String>,

    /// Drop stand-alone `[` and `]` chunk markers while reading corpora.
    pub strip_brackets: bool,

    /// Apply Unicode NFC normalization to words on ingestion.
    pub normalize_words: bool,

    /// Override tags of words unseen in training with the rule-based guesser.
    /// Only guesses naming a tag known to the model are applied.
    pub guess_unknown_words: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            emission_floor: 1e-8,
            floor_margin: 0.5,
            sentence_terminators: vec![".".to_string()],
            strip_brackets: true,
            normalize_words: true,
            guess_unknown_words: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check that the smoothing knobs describe a usable probability floor.
    pub fn validate(&self) -> Result<()> {
        if !(self.emission_floor > 0.0 && self.emission_floor < 1.0) {
            return Err(TaggerError::InvalidConfig(format!(
                "emission_floor must lie in (0, 1), got {}",
                self.emission_floor
            )));
        }
        if !(self.floor_margin > 0.0 && self.floor_margin < 1.0) {
            return Err(TaggerError::InvalidConfig(format!(
                "floor_margin must lie in (0, 1), got {}",
                self.floor_margin
            )));
        }
        Ok(())
    }

    /// Whether `word` closes a sentence.
    pub fn is_terminator(&self, word: &str) -> bool {
        self.sentence_terminators.iter().any(|t| t == word)
    }
}
