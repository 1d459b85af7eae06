use hmmtag_core::corpus::{format_tagged, read_tagged, read_tags, read_words, write_tagged};
use hmmtag_core::{score, Config, CorpusModel, SmoothingPolicy, Tagger};
use std::io::Cursor;
use std::path::PathBuf;

const TRAIN: &str = "\
[ The/DT dog/NN ] barks/VBZ ./.
A/DT cat/NN sleeps/VBZ ./.

The/DT dogs/NNS run/VBP quickly/RB ./.
1\\/2/CD of/IN the/DT cats/NNS ran/VBD ./.
";

const TEST: &str = "\
The cat barks .
[ A dog ] sleeps quickly .
";

const KEY: &str = "\
The/DT cat/NN barks/VBZ ./.
[ A/DT dog/NN ] sleeps/VBZ quickly/RB ./.
";

fn temp_path(name: &str) -> PathBuf {
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("hmmtag_{}_{}_{}", std::process::id(), stamp, name))
}

#[test]
fn train_tag_score_from_text() {
    let cfg = Config::default();
    let train = read_tagged(Cursor::new(TRAIN), &cfg).unwrap();
    assert_eq!(train.len(), 4);
    assert_eq!(train[3][0].word, "1/2");

    let policy = SmoothingPolicy::from_config(&cfg).unwrap();
    let model = CorpusModel::build(&train, &policy).unwrap();
    assert_eq!(model.sentence_count(), 4);
    assert_eq!(model.token_count(), 19);

    let tagger = Tagger::new(model, &cfg);
    let words = read_words(Cursor::new(TEST), &cfg).unwrap();
    let tagged = tagger.tag_all(&words).unwrap();

    let output: String = words
        .iter()
        .zip(&tagged)
        .map(|(w, t)| format_tagged(w, t) + "\n")
        .collect();
    let decoded = read_tags(Cursor::new(output.as_str()), &cfg).unwrap();
    let gold = read_tags(Cursor::new(KEY), &cfg).unwrap();
    assert_eq!(decoded, tagged);

    let result = score(&decoded, &gold).unwrap();
    assert_eq!(result.total, 9);
    assert_eq!(result.accuracy, 1.0);
    assert_eq!(result.accuracy_percent(), 100.0);
}

#[test]
fn saved_model_decodes_identically() {
    let cfg = Config::default();
    let train = read_tagged(Cursor::new(TRAIN), &cfg).unwrap();
    let model = CorpusModel::build(&train, &SmoothingPolicy::default()).unwrap();

    let path = temp_path("model.bin");
    model.save(&path).unwrap();
    let loaded = CorpusModel::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    let words = read_words(Cursor::new(TEST), &cfg).unwrap();
    let a = Tagger::new(model, &cfg).tag_all(&words).unwrap();
    let b = Tagger::new(loaded, &cfg).tag_all(&words).unwrap();
    assert_eq!(a, b);
}

#[test]
fn config_file_roundtrip_drives_reading() {
    let mut cfg = Config::default();
    cfg.sentence_terminators = vec![".".into(), "?".into()];
    let path = temp_path("tagger.toml");
    cfg.save_toml(&path).unwrap();
    let loaded = Config::load_toml(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded, cfg);

    let words = read_words(Cursor::new("who is it ? it is me .\n"), &loaded).unwrap();
    assert_eq!(words.len(), 2);
}

#[test]
fn unterminated_sentences_survive_tag_and_score() {
    let cfg = Config::default();
    let train = read_tagged(Cursor::new("the/DT dog/NN\n\na/DT cat/NN\n"), &cfg).unwrap();
    let model = CorpusModel::build(&train, &SmoothingPolicy::default()).unwrap();
    let tagger = Tagger::new(model, &cfg);

    let words = read_words(Cursor::new("the dog\n\na cat\n"), &cfg).unwrap();
    assert_eq!(words.len(), 2);
    let tagged = tagger.tag_all(&words).unwrap();

    let mut out: Vec<u8> = Vec::new();
    write_tagged(&mut out, &words, &tagged).unwrap();
    let decoded = read_tags(Cursor::new(out), &cfg).unwrap();
    let gold = read_tags(Cursor::new("the/DT dog/NN\n\na/DT cat/NN\n"), &cfg).unwrap();
    assert_eq!(decoded.len(), 2);

    let result = score(&decoded, &gold).unwrap();
    assert_eq!(result.sentences, 2);
    assert_eq!(result.accuracy, 1.0);
}
