//! Rule-based tags for words never seen in training.
//!
//! Penn Treebank oriented: the rules name PTB tags. A guess is only ever
//! applied when the model knows the guessed tag.

/// Adverbial particles tagged `RP` when unseen.
const PARTICLES: &[&str] = &[
    "aboard", "about", "above", "across", "ahead", "alongside", "apart", "around", "aside",
    "astray", "away", "back", "before", "behind", "below", "beneath", "besides", "between",
    "beyond", "by", "close", "down", "east", "west", "south", "north", "eastwards", "westwards",
    "southwards", "northwards", "forward", "forwards", "home", "in", "inside", "instead", "near",
    "off", "on", "opposite", "out", "outside", "over", "overhead", "past", "round", "since",
    "through", "throughout", "together", "under", "underneath", "up", "within", "without",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownWordGuesser;

impl UnknownWordGuesser {
    pub fn new() -> Self {
        Self
    }

    /// Guess a tag from the surface form alone. Rules are tried in order.
    pub fn guess(&self, word: &str) -> &'static str {
        if word == "=" {
            return "SYM";
        }
        if PARTICLES.contains(&word) {
            return "RP";
        }
        if word.chars().any(|c| c.is_ascii_digit()) {
            // "3rd", "1980s" read as modifiers; bare numbers as cardinals
            return if word.chars().any(|c| c.is_ascii_alphabetic() || c == ' ') {
                "JJ"
            } else {
                "CD"
            };
        }

        let first = match word.chars().next() {
            Some(c) => c,
            None => return "NNP",
        };
        if first.is_lowercase() {
            if word.ends_with("ing") {
                "VBG"
            } else if word.ends_with("ed") {
                "VBN"
            } else if word.ends_with("ly") {
                "RB"
            } else {
                "NNP"
            }
        } else if word.chars().count() == 1 {
            if word == "C" {
                "CC"
            } else {
                "DT"
            }
        } else {
            "NNP"
        }
    }
}
