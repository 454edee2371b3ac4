// Inflected verb form → infinitive.
//
// Resolution is first-match over the conjugation tables in descending
// frequency order, stopping at the frequency cutoff. `scan` is the literal
// linear walk; `ConjugationIndex` answers the same question from two hash
// maps built once at load time, keyed by exact form and by shorthand stem,
// with the scan rank stored so the earliest entry still wins.

use std::collections::HashMap;

use tracing::trace;

use crate::lexicon::Lexicon;
use crate::normalize::fold;
use crate::types::ConjugationEntry;

/// Entries rarer than this are never matched, to avoid rare-verb false
/// positives.
pub const DEFAULT_FREQUENCY_CUTOFF: u32 = 2000;

/// Subject pronouns that may precede a conjugated form.
const PRONOUNS: &[&str] = &["io", "tu", "lui", "lei", "noi", "voi", "loro"];

/// Verbs that form compound tenses with a following participle.
pub const AUXILIARIES: &[&str] = &["essere", "avere"];

/// Find the infinitive of `surface` in the lexicon with the default cutoff.
pub fn find_infinitive(surface: &str, lexicon: &Lexicon) -> Option<String> {
    lexicon
        .conjugation_index()
        .lookup(surface, DEFAULT_FREQUENCY_CUTOFF)
        .map(str::to_string)
}

pub fn is_auxiliary(infinitive: &str) -> bool {
    AUXILIARIES.contains(&infinitive)
}

/// Linear first-match scan over `conjugations`, which must already be in
/// descending frequency order.
pub fn scan<'a>(conjugations: &'a [ConjugationEntry], surface: &str, cutoff: u32) -> Option<&'a str> {
    let folded = fold(surface);
    let input = strip_pronoun(&folded);
    if input.is_empty() {
        return None;
    }
    let truncated = drop_last_char(input);

    for entry in conjugations {
        if entry.frequency < cutoff {
            break;
        }
        for forms in entry.tenses.values() {
            for form in forms {
                let folded_form = fold(form);
                let candidate = strip_pronoun(&folded_form);
                let matched = match shorthand_stem(candidate) {
                    Some(stem) => stem == truncated,
                    None => candidate == input,
                };
                if matched {
                    return Some(entry.infinitive.as_str());
                }
            }
        }
    }
    None
}

/// Hash index over every surface form of the conjugation tables.
#[derive(Debug, Clone, Default)]
pub struct ConjugationIndex {
    /// Folded form → scan rank of the first entry containing it.
    exact: HashMap<String, usize>,
    /// Shorthand stem ("andat" for "andato/a") → scan rank.
    stems: HashMap<String, usize>,
    /// Scan rank → (infinitive, frequency).
    entries: Vec<(String, u32)>,
}

impl ConjugationIndex {
    /// Build the index. `conjugations` must be in descending frequency order.
    pub fn build(conjugations: &[ConjugationEntry]) -> Self {
        let mut index = ConjugationIndex::default();
        for (rank, entry) in conjugations.iter().enumerate() {
            index.entries.push((entry.infinitive.clone(), entry.frequency));
            for form in entry.tenses.values().flatten() {
                let folded = fold(form);
                let candidate = strip_pronoun(&folded);
                match shorthand_stem(candidate) {
                    Some(stem) => {
                        index.stems.entry(stem.to_string()).or_insert(rank);
                    }
                    None => {
                        index.exact.entry(candidate.to_string()).or_insert(rank);
                    }
                }
            }
        }
        index
    }

    /// Same result as `scan` over the tables this index was built from.
    pub fn lookup(&self, surface: &str, cutoff: u32) -> Option<&str> {
        let folded = fold(surface);
        let input = strip_pronoun(&folded);
        if input.is_empty() {
            return None;
        }
        let exact = self.exact.get(input).copied();
        let stem = self.stems.get(drop_last_char(input)).copied();
        let rank = match (exact, stem) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => return None,
        };
        // Ranks are frequency-ordered, so every other candidate is rarer.
        let (infinitive, frequency) = &self.entries[rank];
        if *frequency < cutoff {
            return None;
        }
        Some(infinitive.as_str())
    }
}

/// One token (or token pair) after infinitive resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// A conjugated form resolved to a full verb.
    Verb { surface: String, infinitive: String },
    /// An auxiliary that did not compound with the next token, or a compound
    /// that is itself a form of an auxiliary ("sono stato"). Carries no
    /// pictogram.
    Auxiliary { surface: String },
    /// Not a known verb form.
    Word(String),
}

/// Infinitive resolution with auxiliary compounding.
pub struct Resolver<'a> {
    lexicon: &'a Lexicon,
    cutoff: u32,
}

impl<'a> Resolver<'a> {
    pub fn new(lexicon: &'a Lexicon, cutoff: u32) -> Self {
        Self { lexicon, cutoff }
    }

    pub fn find_infinitive(&self, surface: &str) -> Option<&'a str> {
        self.lexicon.conjugation_index().lookup(surface, self.cutoff)
    }

    /// Resolve a run of plain tokens. An auxiliary first tries to resolve
    /// together with the next token; on success both are consumed.
    pub fn resolve(&self, tokens: &[String]) -> Vec<Resolved> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            match self.find_infinitive(token) {
                Some(infinitive) if is_auxiliary(infinitive) => {
                    if let Some(next) = tokens.get(i + 1) {
                        let pair = format!("{token} {next}");
                        if let Some(compound) = self.find_infinitive(&pair) {
                            trace!(%pair, compound, "auxiliary compound");
                            out.push(if is_auxiliary(compound) {
                                Resolved::Auxiliary { surface: pair }
                            } else {
                                Resolved::Verb {
                                    surface: pair,
                                    infinitive: compound.to_string(),
                                }
                            });
                            i += 2;
                            continue;
                        }
                    }
                    out.push(Resolved::Auxiliary {
                        surface: token.clone(),
                    });
                }
                Some(infinitive) => {
                    trace!(%token, infinitive, "resolved verb form");
                    out.push(Resolved::Verb {
                        surface: token.clone(),
                        infinitive: infinitive.to_string(),
                    });
                }
                None => out.push(Resolved::Word(token.clone())),
            }
            i += 1;
        }
        out
    }
}

/// Strip one leading subject pronoun token.
fn strip_pronoun(s: &str) -> &str {
    match s.split_once(' ') {
        Some((head, rest)) if PRONOUNS.contains(&head) => rest.trim(),
        _ => s,
    }
}

/// "andato/a" → "andat": the form minus its last three characters when the
/// second-to-last one is a slash.
fn shorthand_stem(form: &str) -> Option<&str> {
    let mut rev = form.char_indices().rev();
    let _last = rev.next()?;
    let (_, slash) = rev.next()?;
    if slash != '/' {
        return None;
    }
    let (cut, _) = rev.next()?;
    Some(&form[..cut])
}

fn drop_last_char(s: &str) -> &str {
    match s.char_indices().next_back() {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
