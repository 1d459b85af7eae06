// tools/train_model/src/main.rs
//
// Estimate an HMM tagging model from a `word/TAG` corpus and save it with
// bincode.
//
// Usage:
//   cargo run -p train_model -- --train data/train.pos --model data/model.bin
//   cargo run -p train_model -- --train data/train.pos --config tagger.toml

use anyhow::{Context, Result};
use clap::Parser;
use hmmtag_core::{corpus, Config, CorpusModel, SmoothingPolicy};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Args {
    /// Training corpus of whitespace-separated word/TAG tokens
    #[arg(long)]
    train: PathBuf,

    /// Output model file (bincode)
    #[arg(long, default_value = "model.bin")]
    model: PathBuf,

    /// Optional TOML configuration
    #[arg(long)]
    config: Option<PathBuf>,
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
    let policy = SmoothingPolicy::from_config(&config)?;

    let file = File::open(&args.train)
        .with_context(|| format!("opening training corpus {}", args.train.display()))?;
    let sentences = corpus::read_tagged(BufReader::new(file), &config)
        .with_context(|| format!("reading {}", args.train.display()))?;

    let model = CorpusModel::build(&sentences, &policy).context("building model")?;
    model
        .save(&args.model)
        .with_context(|| format!("saving model to {}", args.model.display()))?;

    tracing::info!(
        sentences = model.sentence_count(),
        tokens = model.token_count(),
        tags = model.vocabulary().len(),
        words = model.word_count(),
        floor = model.unseen_floor(),
        path = %args.model.display(),
        "model trained"
    );
    Ok(())
}
