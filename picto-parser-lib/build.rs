// Reads the lexicon tables under data/ and embeds them as one JSON blob at
// compile time. Conjugations are sorted by descending frequency here so the
// runtime scan order is fixed by the build, not by the source file.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize)]
struct EntryRaw {
    word: String,
    id: u32,
    #[serde(default)]
    skin: bool,
    #[serde(default)]
    hair: bool,
}

#[derive(Serialize, Deserialize)]
struct ConjugationRaw {
    infinitive: String,
    frequency: u32,
    tenses: BTreeMap<String, Vec<String>>,
}

#[derive(Serialize, Deserialize)]
struct QuestionRaw {
    question: String,
    answers: Vec<String>,
}

#[derive(Serialize)]
struct EmbeddedData {
    subjects: Vec<EntryRaw>,
    verbs: Vec<EntryRaw>,
    objects: BTreeMap<String, Vec<EntryRaw>>,
    conjugations: Vec<ConjugationRaw>,
    questions: Vec<QuestionRaw>,
    stopwords: Vec<String>,
}

fn main() {
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap());
    let data_dir = manifest_dir.join("../data");
    let out_dir = std::env::var("OUT_DIR").unwrap();
    let out_path = Path::new(&out_dir).join("lexicon.json");

    let subjects: Vec<EntryRaw> = read_table(&data_dir, "subjects.json");
    let verbs: Vec<EntryRaw> = read_table(&data_dir, "verbs.json");
    let objects: BTreeMap<String, Vec<EntryRaw>> = read_table(&data_dir, "objects.json");
    let mut conjugations: Vec<ConjugationRaw> = read_table(&data_dir, "conjugations.json");
    let questions: Vec<QuestionRaw> = read_table(&data_dir, "questions.json");
    let stopwords: Vec<String> = read_table(&data_dir, "stopwords.json");

    for (verb, list) in &objects {
        if !verbs.iter().any(|v| &v.word == verb) {
            panic!("objects.json: verb {verb:?} has no entry in verbs.json");
        }
        if list.is_empty() {
            panic!("objects.json: verb {verb:?} has an empty object list");
        }
    }
    for c in &conjugations {
        if c.tenses.values().all(|forms| forms.is_empty()) {
            panic!("conjugations.json: {:?} has no surface forms", c.infinitive);
        }
    }

    // Stable: equal frequencies keep their file order.
    conjugations.sort_by(|a, b| b.frequency.cmp(&a.frequency));

    let data = EmbeddedData {
        subjects,
        verbs,
        objects,
        conjugations,
        questions,
        stopwords,
    };
    let json = serde_json::to_string(&data).expect("JSON serialization failed");
    fs::write(&out_path, json).expect("cannot write lexicon.json");

    println!("cargo:rerun-if-changed=build.rs");
}

/// Read and parse one table. A missing or malformed table aborts the build.
fn read_table<T: for<'de> Deserialize<'de>>(data_dir: &Path, name: &str) -> T {
    let path = data_dir.join(name);
    println!("cargo:rerun-if-changed={}", path.display());
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read lexicon table {}: {e}", path.display()));
    // Parse through Value first so the panic names the table, not just a line.
    let value: Value = serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("{name} is not valid JSON: {e}"));
    serde_json::from_value(value).unwrap_or_else(|e| panic!("{name} has an unexpected shape: {e}"))
}
