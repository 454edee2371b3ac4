// Choice extraction from questions: "Preferisci carne o pesce?" → [carne, pesce].

use crate::lexicon::Lexicon;
use crate::normalize::{normalize, strip_punctuation};

/// Verbs that introduce an explicit list of options.
const CHOICE_VERBS: &[&str] = &[
    "preferisci",
    "preferite",
    "preferisce",
    "preferiresti",
    "scegli",
    "scegliete",
    "sceglie",
    "sceglieresti",
];

/// The standalone conjunction separating alternatives.
const OR: &str = "o";

/// Extract the options offered by a question.
///
/// A "prefer/choose" verb followed by a list wins; otherwise, if the sentence
/// contains a `?`, whatever follows the first `?` is split on commas and on
/// the conjunction "o". Returns an empty vector when neither applies.
pub fn extract_choices(sentence: &str) -> Vec<String> {
    let by_verb = after_choice_verb(sentence);
    if !by_verb.is_empty() {
        return by_verb;
    }
    after_question_mark(sentence)
}

/// `extract_choices`, falling back to the canned answers of a known question.
pub fn choices_or_canned(sentence: &str, lexicon: &Lexicon) -> Vec<String> {
    let choices = extract_choices(sentence);
    if !choices.is_empty() {
        return choices;
    }
    lexicon
        .canned_answers(sentence)
        .map(|answers| answers.to_vec())
        .unwrap_or_default()
}

fn after_choice_verb(sentence: &str) -> Vec<String> {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    let Some(pos) = words
        .iter()
        .position(|w| CHOICE_VERBS.contains(&normalize(w).as_str()))
    else {
        return vec![];
    };
    words[pos + 1..]
        .iter()
        .map(|w| strip_punctuation(w))
        .filter(|w| w.chars().count() > 1)
        .collect()
}

fn after_question_mark(sentence: &str) -> Vec<String> {
    let Some((_, rest)) = sentence.split_once('?') else {
        return vec![];
    };
    let mut choices = Vec::new();
    for part in rest.split(',') {
        let mut current: Vec<&str> = Vec::new();
        for word in part.split_whitespace() {
            if normalize(word) == OR {
                push_choice(&mut choices, &current);
                current.clear();
            } else {
                current.push(word);
            }
        }
        push_choice(&mut choices, &current);
    }
    choices
}

fn push_choice(choices: &mut Vec<String>, words: &[&str]) {
    let choice = strip_punctuation(&words.join(" ")).trim().to_string();
    if !choice.is_empty() {
        choices.push(choice);
    }
}
