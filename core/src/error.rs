//! Error taxonomy for model building, decoding and scoring.
use thiserror::Error;

pub type Result<T, E = TaggerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TaggerError {
    /// No non-empty training sentence was supplied.
    #[error("training corpus contains no tagged sentences")]
    EmptyCorpus,

    /// Decoding was attempted against a model with no tags.
    #[error("tag vocabulary is empty; the model was never built")]
    EmptyVocabulary,

    /// Decoded and gold streams are not position-aligned.
    ///
    /// `sentence` is `None` when the number of sentences differs, in which
    /// case `decoded` and `gold` hold the sentence counts.
    #[error("{}", alignment_message(.sentence, .decoded, .gold))]
    Alignment {
        sentence: Option<usize>,
        decoded: usize,
        gold: usize,
    },

    /// Nothing to score.
    #[error("no word positions to score")]
    EmptyInput,

    /// A training tag collides with a sentinel label.
    #[error("tag {0:?} is reserved for sentence boundaries")]
    ReservedTag(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A token lacking the `word/TAG` separator.
    #[error("malformed token {token:?} on line {line}")]
    MalformedToken { line: usize, token: String },

    /// A model file decoded but its tables disagree with its vocabulary.
    #[error("corrupt model: {0}")]
    CorruptModel(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] bincode::Error),

    #[error(transparent)]
    ConfigParse(#[from] toml::de::Error),

    #[error(transparent)]
    ConfigSerialize(#[from] toml::ser::Error),
}

fn alignment_message(sentence: &Option<usize>, decoded: &usize, gold: &usize) -> String {
    match sentence {
        Some(idx) => format!(
            "sentence {idx} has {decoded} decoded tags but {gold} gold tags"
        ),
        None => format!("{decoded} decoded sentences but {gold} gold sentences"),
    }
}
