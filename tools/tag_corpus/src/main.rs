// tools/tag_corpus/src/main.rs
//
// Tag a plain word file with a trained model. Each sentence is written on
// its own line as `word/TAG` tokens, followed by a blank line.
//
// Usage:
//   cargo run -p tag_corpus -- --model data/model.bin --test data/test.text --output data/test.tagged

use anyhow::{Context, Result};
use clap::Parser;
use hmmtag_core::{corpus, Config, CorpusModel, Tagger};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Args {
    /// Model written by train_model
    #[arg(long, default_value = "model.bin")]
    model: PathBuf,

    /// Whitespace-separated words to tag
    #[arg(long)]
    test: PathBuf,

    /// Tagged output file
    #[arg(long, default_value = "output.tagged")]
    output: PathBuf,

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

    let model = CorpusModel::load(&args.model)
        .with_context(|| format!("loading model {}", args.model.display()))?;
    let tagger = Tagger::new(model, &config);

    let file = File::open(&args.test)
        .with_context(|| format!("opening test file {}", args.test.display()))?;
    let sentences = corpus::read_words(BufReader::new(file), &config)?;
    let tagged = tagger.tag_all(&sentences).context("tagging sentences")?;

    let out = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    corpus::write_tagged(BufWriter::new(out), &sentences, &tagged)
        .with_context(|| format!("writing {}", args.output.display()))?;

    let unknown = sentences
        .iter()
        .flatten()
        .filter(|w| !tagger.model().is_known_word(w))
        .count();
    tracing::info!(
        sentences = sentences.len(),
        words = sentences.iter().map(Vec::len).sum::<usize>(),
        unknown,
        path = %args.output.display(),
        "corpus tagged"
    );
    Ok(())
}
