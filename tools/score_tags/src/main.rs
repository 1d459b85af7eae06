// tools/score_tags/src/main.rs
//
// Score a tagged file against a gold key. Prints accuracy and a per-label
// report, writes the error confusion matrix as CSV, and optionally a JSON
// summary.
//
// Usage:
//   cargo run -p score_tags -- --tagged data/test.tagged --key data/test.pos
//   cargo run -p score_tags -- --tagged out.tagged --key key.pos --matrix conf.csv --json summary.json

use anyhow::{Context, Result};
use clap::Parser;
use hmmtag_core::{corpus, score, Config, ConfusionEntry, ConfusionMatrix, LabelMeasure};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Args {
    /// Tagged output produced by tag_corpus
    #[arg(long)]
    tagged: PathBuf,

    /// Gold key in word/TAG format
    #[arg(long)]
    key: PathBuf,

    /// Output CSV for the error confusion matrix
    #[arg(long, default_value = "conf_matrix.csv")]
    matrix: PathBuf,

    /// Also write a JSON summary here
    #[arg(long)]
    json: Option<PathBuf>,

    /// Optional TOML configuration
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct Summary {
    accuracy: f64,
    accuracy_percent: f64,
    matches: usize,
    total: usize,
    sentences: usize,
    sentences_correct: usize,
    labels: Vec<LabelMeasure>,
    confusion: Vec<ConfusionEntry>,
}

fn read_tags(path: &Path, config: &Config) -> Result<Vec<Vec<String>>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let tags = corpus::read_tags(BufReader::new(file), config)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(tags)
}

/// Header row of labels, then one row per gold label; "-" marks pairs never
/// confused.
fn write_matrix(path: &Path, matrix: &ConfusionMatrix) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec![String::new()];
    header.extend(matrix.labels.iter().cloned());
    wtr.write_record(&header)?;

    for (gold, row) in matrix.labels.iter().zip(&matrix.cells) {
        let mut record = vec![gold.clone()];
        record.extend(row.iter().map(|cell| match cell {
            Some(pct) => format!("{:.2}", pct),
            None => "-".to_string(),
        }));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load_toml(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    let decoded = read_tags(&args.tagged, &config)?;
    let gold = read_tags(&args.key, &config)?;
    let result = score(&decoded, &gold).context("scoring tagged output against key")?;

    println!("{}", result);
    println!("Accuracy: {:.2}%", result.accuracy_percent());

    let matrix = result.tally.error_matrix();
    write_matrix(&args.matrix, &matrix)?;
    tracing::info!(
        labels = matrix.labels.len(),
        errors = result.tally.errors(),
        path = %args.matrix.display(),
        "confusion matrix written"
    );

    if let Some(path) = &args.json {
        let summary = Summary {
            accuracy: result.accuracy,
            accuracy_percent: result.accuracy_percent(),
            matches: result.matches,
            total: result.total,
            sentences: result.sentences,
            sentences_correct: result.sentences_correct,
            labels: result.label_measures(),
            confusion: result.tally.entries(),
        };
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &summary)?;
        tracing::info!(path = %path.display(), "summary written");
    }
    Ok(())
}
