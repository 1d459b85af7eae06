//! Scoring decoded tags against a gold key.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display};

use crate::error::{Result, TaggerError};

/// Counts of (gold tag, predicted tag) over scored word positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfusionTally {
    counts: BTreeMap<(String, String), usize>,
    total: usize,
}

/// One cell of a `ConfusionTally`, for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionEntry {
    pub gold: String,
    pub predicted: String,
    pub count: usize,
}

impl ConfusionTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, gold: &str, predicted: &str) {
        *self
            .counts
            .entry((gold.to_string(), predicted.to_string()))
            .or_insert(0) += 1;
        self.total += 1;
    }

    pub fn get(&self, gold: &str, predicted: &str) -> usize {
        self.counts
            .get(&(gold.to_string(), predicted.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Scored positions; equals the sum of all cells.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn correct(&self) -> usize {
        self.iter().filter(|(g, p, _)| g == p).map(|(_, _, n)| n).sum()
    }

    pub fn errors(&self) -> usize {
        self.total - self.correct()
    }

    /// Fold another tally into this one (per-sentence tallies scored apart).
    pub fn merge(&mut self, other: &ConfusionTally) {
        for ((gold, predicted), n) in &other.counts {
            *self
                .counts
                .entry((gold.clone(), predicted.clone()))
                .or_insert(0) += n;
        }
        self.total += other.total;
    }

    /// (gold, predicted, count), ordered by gold then predicted.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, usize)> + '_ {
        self.counts
            .iter()
            .map(|((g, p), n)| (g.as_str(), p.as_str(), *n))
    }

    pub fn entries(&self) -> Vec<ConfusionEntry> {
        self.iter()
            .map(|(gold, predicted, count)| ConfusionEntry {
                gold: gold.to_string(),
                predicted: predicted.to_string(),
                count,
            })
            .collect()
    }

    /// Share of all errors per (gold, predicted) pair, in percent.
    ///
    /// Rows are gold tags, columns predicted tags, both over the tags that
    /// take part in at least one error. Pairs never confused are `None`.
    pub fn error_matrix(&self) -> ConfusionMatrix {
        let errors = self.errors();
        let labels: Vec<String> = self
            .iter()
            .filter(|(g, p, _)| g != p)
            .flat_map(|(g, p, _)| [g.to_string(), p.to_string()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let cells = labels
            .iter()
            .map(|gold| {
                labels
                    .iter()
                    .map(|predicted| {
                        if gold == predicted {
                            return None;
                        }
                        match self.get(gold, predicted) {
                            0 => None,
                            n => Some(n as f64 / errors as f64 * 100.0),
                        }
                    })
                    .collect()
            })
            .collect();

        ConfusionMatrix { labels, cells }
    }
}

/// Error-share matrix produced by `ConfusionTally::error_matrix`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    pub labels: Vec<String>,
    /// cells[gold][predicted], percent of all errors
    pub cells: Vec<Vec<Option<f64>>>,
}

impl ConfusionMatrix {
    pub fn cell(&self, gold: &str, predicted: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == gold)?;
        let j = self.labels.iter().position(|l| l == predicted)?;
        self.cells[i][j]
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Label-wise performance values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelMeasure {
    pub label: String,
    /// Number of correct predictions.
    pub num_correct: usize,
    /// Number of occurrences of the label in the gold-standard data.
    pub num_observation: usize,
    /// Number of predictions.
    pub num_prediction: usize,
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

/// Outcome of scoring a decoded corpus against its key.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    /// matches / total, in [0, 1]
    pub accuracy: f64,
    pub matches: usize,
    pub total: usize,
    /// Non-empty sentences scored; empty ones carry no positions.
    pub sentences: usize,
    /// Sentences with every position correct.
    pub sentences_correct: usize,
    pub tally: ConfusionTally,
}

impl Score {
    pub fn accuracy_percent(&self) -> f64 {
        self.accuracy * 100.0
    }

    pub fn sentence_accuracy(&self) -> f64 {
        if self.sentences == 0 {
            return 0.0;
        }
        self.sentences_correct as f64 / self.sentences as f64
    }

    /// Precision, recall and F1 for every tag seen in either stream.
    pub fn label_measures(&self) -> Vec<LabelMeasure> {
        let mut tbl: BTreeMap<&str, (usize, usize, usize)> = BTreeMap::new();
        for (gold, predicted, n) in self.tally.iter() {
            tbl.entry(gold).or_default().1 += n;
            tbl.entry(predicted).or_default().2 += n;
            if gold == predicted {
                tbl.entry(gold).or_default().0 += n;
            }
        }

        tbl.into_iter()
            .map(|(label, (num_correct, num_observation, num_prediction))| {
                let precision = if num_prediction > 0 {
                    num_correct as f64 / num_prediction as f64
                } else {
                    0.0
                };
                let recall = if num_observation > 0 {
                    num_correct as f64 / num_observation as f64
                } else {
                    0.0
                };
                let fmeasure = if precision + recall > 0.0 {
                    precision * recall * 2.0 / (precision + recall)
                } else {
                    0.0
                };
                LabelMeasure {
                    label: label.to_string(),
                    num_correct,
                    num_observation,
                    num_prediction,
                    precision,
                    recall,
                    fmeasure,
                }
            })
            .collect()
    }

    /// Macro-averaged (precision, recall, F1) over tags present in the key.
    pub fn macro_average(&self) -> (f64, f64, f64) {
        let observed: Vec<LabelMeasure> = self
            .label_measures()
            .into_iter()
            .filter(|m| m.num_observation > 0)
            .collect();
        if observed.is_empty() {
            return (0.0, 0.0, 0.0);
        }
        let n = observed.len() as f64;
        let sum = observed.iter().fold((0.0, 0.0, 0.0), |acc, m| {
            (acc.0 + m.precision, acc.1 + m.recall, acc.2 + m.fmeasure)
        });
        (sum.0 / n, sum.1 / n, sum.2 / n)
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Performance by label (#match, #model, #ref) (precision, recall, F1):")?;
        for m in self.label_measures() {
            if m.num_observation == 0 {
                writeln!(
                    f,
                    "\t{}: ({}, {}, {}) (******, ******, ******)",
                    m.label, m.num_correct, m.num_prediction, m.num_observation
                )?;
            } else {
                writeln!(
                    f,
                    "\t{}: ({}, {}, {}) ({:.4}, {:.4}, {:.4})",
                    m.label,
                    m.num_correct,
                    m.num_prediction,
                    m.num_observation,
                    m.precision,
                    m.recall,
                    m.fmeasure
                )?;
            }
        }
        let (p, r, f1) = self.macro_average();
        writeln!(f, "Macro-average precision, recall, F1: ({:.4}, {:.4}, {:.4})", p, r, f1)?;
        writeln!(
            f,
            "Item accuracy: {}/{} => {:.4}",
            self.matches, self.total, self.accuracy
        )?;
        write!(
            f,
            "Sentence accuracy: {}/{} => {:.4}",
            self.sentences_correct,
            self.sentences,
            self.sentence_accuracy()
        )
    }
}

/// Compare decoded sentences with gold sentences position by position.
///
/// Alignment of every sentence is checked before anything is tallied, so a
/// misaligned batch leaves no partial result behind.
///
/// Errors:
/// - `Alignment` when sentence counts or per-sentence lengths differ.
/// - `EmptyInput` when there is no word position to score.
pub fn score<D, G>(decoded: &[Vec<D>], gold: &[Vec<G>]) -> Result<Score>
where
    D: AsRef<str>,
    G: AsRef<str>,
{
    if decoded.len() != gold.len() {
        return Err(TaggerError::Alignment {
            sentence: None,
            decoded: decoded.len(),
            gold: gold.len(),
        });
    }
    for (i, (d, g)) in decoded.iter().zip(gold).enumerate() {
        if d.len() != g.len() {
            return Err(TaggerError::Alignment {
                sentence: Some(i),
                decoded: d.len(),
                gold: g.len(),
            });
        }
    }
    let total: usize = gold.iter().map(Vec::len).sum();
    if total == 0 {
        return Err(TaggerError::EmptyInput);
    }

    let mut tally = ConfusionTally::new();
    let mut matches = 0usize;
    let mut sentences_correct = 0usize;
    let mut sentences = 0usize;
    for (d, g) in decoded.iter().zip(gold) {
        if g.is_empty() {
            continue;
        }
        sentences += 1;
        let mut all_match = true;
        for (predicted, gold_tag) in d.iter().zip(g) {
            let (predicted, gold_tag) = (predicted.as_ref(), gold_tag.as_ref());
            tally.record(gold_tag, predicted);
            if predicted == gold_tag {
                matches += 1;
            } else {
                all_match = false;
            }
        }
        if all_match {
            sentences_correct += 1;
        }
    }

    let accuracy = matches as f64 / total as f64;
    tracing::debug!(matches, total, accuracy, "scored tagged corpus");

    Ok(Score {
        accuracy,
        matches,
        total,
        sentences,
        sentences_correct,
        tally,
    })
}
