// core/src/corpus.rs
//
// Reading `word/TAG` corpora and plain word streams into sentences, and
// formatting decoded sentences back into the same token format.

use std::io::{BufRead, Write};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Result, TaggerError};
use crate::Config;

/// A word and the tag it carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaggedToken {
    pub word: String,
    pub tag: String,
}

pub type TaggedSentence = Vec<TaggedToken>;

impl TaggedToken {
    pub fn new(word: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            tag: tag.into(),
        }
    }

    /// Parse a `word/TAG` token.
    ///
    /// The split happens at the last `/`, so escaped slashes (`\/`) inside
    /// the word survive and are unescaped. For ambiguous tags (`VBD|VBN`)
    /// the first alternative is kept. Returns `None` when the separator is
    /// missing or either side is empty.
    pub fn parse(token: &str) -> Option<Self> {
        let (word, tag) = token.rsplit_once('/')?;
        let tag = tag.split('|').next().unwrap_or(tag);
        if word.is_empty() || tag.is_empty() {
            return None;
        }
        Some(Self::new(unescape_word(word), tag))
    }
}

/// `\/` → `/`
pub fn unescape_word(word: &str) -> String {
    word.replace("\\/", "/")
}

/// `/` → `\/`, the inverse of `unescape_word`.
pub fn escape_word(word: &str) -> String {
    word.replace('/', "\\/")
}

/// Render one decoded sentence as `word/TAG word/TAG ...`.
pub fn format_tagged<W: AsRef<str>, T: AsRef<str>>(words: &[W], tags: &[T]) -> String {
    words
        .iter()
        .zip(tags)
        .map(|(w, t)| format!("{}/{}", escape_word(w.as_ref()), t.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write decoded sentences, one per line, each followed by a blank line.
///
/// The blank line closes the sentence for `read_tags`, so the output reads
/// back into the same sentences whether or not they end in a terminator.
pub fn write_tagged<W, S, T>(mut writer: W, sentences: &[Vec<S>], tags: &[Vec<T>]) -> Result<()>
where
    W: Write,
    S: AsRef<str>,
    T: AsRef<str>,
{
    if sentences.len() != tags.len() {
        return Err(TaggerError::Alignment {
            sentence: None,
            decoded: tags.len(),
            gold: sentences.len(),
        });
    }
    for (i, (words, tags)) in sentences.iter().zip(tags).enumerate() {
        if words.len() != tags.len() {
            return Err(TaggerError::Alignment {
                sentence: Some(i),
                decoded: tags.len(),
                gold: words.len(),
            });
        }
        if words.is_empty() {
            continue;
        }
        writeln!(writer, "{}", format_tagged(words, tags))?;
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Cuts a token stream into sentences.
///
/// A sentence ends at a blank line or right after a terminator word. Lines
/// may hold any number of tokens and a sentence may span several lines.
struct SentenceSplitter<'c, T> {
    config: &'c Config,
    current: Vec<T>,
    done: Vec<Vec<T>>,
}

impl<'c, T> SentenceSplitter<'c, T> {
    fn new(config: &'c Config) -> Self {
        Self {
            config,
            current: Vec::new(),
            done: Vec::new(),
        }
    }

    fn push(&mut self, item: T, word: &str) {
        self.current.push(item);
        if self.config.is_terminator(word) {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.done.push(std::mem::take(&mut self.current));
        }
    }

    fn finish(mut self) -> Vec<Vec<T>> {
        self.flush();
        self.done
    }
}

fn is_chunk_marker(token: &str, config: &Config) -> bool {
    config.strip_brackets && (token == "[" || token == "]")
}

fn normalize_word(word: String, config: &Config) -> String {
    if config.normalize_words {
        word.nfc().collect()
    } else {
        word
    }
}

/// Read a training corpus of `word/TAG` tokens.
///
/// Malformed tokens are logged and skipped.
pub fn read_tagged<R: BufRead>(reader: R, config: &Config) -> Result<Vec<TaggedSentence>> {
    let mut splitter = SentenceSplitter::new(config);
    let mut skipped = 0usize;

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            splitter.flush();
            continue;
        }
        for raw in line.split_whitespace() {
            if is_chunk_marker(raw, config) {
                continue;
            }
            match TaggedToken::parse(raw) {
                Some(mut token) => {
                    token.word = normalize_word(token.word, config);
                    let word = token.word.clone();
                    splitter.push(token, &word);
                }
                None => {
                    skipped += 1;
                    tracing::warn!(line = lineno + 1, token = raw, "skipping malformed token");
                }
            }
        }
    }

    let sentences = splitter.finish();
    tracing::debug!(sentences = sentences.len(), skipped, "read tagged corpus");
    Ok(sentences)
}

/// Read plain whitespace-separated words (a test file).
pub fn read_words<R: BufRead>(reader: R, config: &Config) -> Result<Vec<Vec<String>>> {
    let mut splitter = SentenceSplitter::new(config);

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            splitter.flush();
            continue;
        }
        for raw in line.split_whitespace() {
            if is_chunk_marker(raw, config) {
                continue;
            }
            let word = normalize_word(unescape_word(raw), config);
            let key = word.clone();
            splitter.push(word, &key);
        }
    }

    let sentences = splitter.finish();
    tracing::debug!(sentences = sentences.len(), "read word corpus");
    Ok(sentences)
}

/// Read the tags of a `word/TAG` file (a gold key or a tagged output).
///
/// Sentences are cut exactly as `read_words` would cut the same words, so
/// the result lines up with a test file. Unlike training input, a malformed
/// token here is an error: skipping it would shift every later position.
pub fn read_tags<R: BufRead>(reader: R, config: &Config) -> Result<Vec<Vec<String>>> {
    let mut splitter = SentenceSplitter::new(config);

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            splitter.flush();
            continue;
        }
        for raw in line.split_whitespace() {
            if is_chunk_marker(raw, config) {
                continue;
            }
            let token = TaggedToken::parse(raw).ok_or_else(|| TaggerError::MalformedToken {
                line: lineno + 1,
                token: raw.to_string(),
            })?;
            let word = normalize_word(token.word, config);
            splitter.push(token.tag, &word);
        }
    }

    Ok(splitter.finish())
}
