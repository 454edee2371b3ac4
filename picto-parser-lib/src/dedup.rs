// Exact and near-duplicate suppression over pictogram sequences.

use std::collections::HashSet;

use crate::types::{Pictogram, PictogramId};

/// Words within this edit distance of an earlier kept word are dropped when
/// approximate matching is on.
pub const DEFAULT_MAX_EDIT_DISTANCE: usize = 2;

/// Deduplicate pictograms ordered by creation time, earliest first.
///
/// An item is dropped if its id or word was already seen, or, with
/// `use_approx`, if its word is within edit distance 2 of a word already
/// kept. Later near-duplicates of an earlier word are dropped, never the
/// reverse.
pub fn dedupe(pictograms: Vec<Pictogram>, use_approx: bool) -> Vec<Pictogram> {
    let mut sorted = pictograms;
    // Stable: equal timestamps keep their input order.
    sorted.sort_by_key(|p| p.created);
    dedupe_in_order(sorted, use_approx.then_some(DEFAULT_MAX_EDIT_DISTANCE))
}

/// The same walk as `dedupe` without re-sorting: the first occurrence in
/// input order wins. `max_distance` enables approximate matching.
pub fn dedupe_in_order(pictograms: Vec<Pictogram>, max_distance: Option<usize>) -> Vec<Pictogram> {
    let mut seen_ids: HashSet<PictogramId> = HashSet::new();
    let mut seen_words: Vec<String> = Vec::new();
    let mut kept = Vec::with_capacity(pictograms.len());

    for p in pictograms {
        if seen_ids.contains(&p.id) || seen_words.iter().any(|w| *w == p.word) {
            continue;
        }
        if let Some(max) = max_distance {
            if seen_words.iter().any(|w| levenshtein(w, &p.word) <= max) {
                continue;
            }
        }
        seen_ids.insert(p.id.clone());
        seen_words.push(p.word.clone());
        kept.push(p);
    }
    kept
}

/// Edit distance between two strings, counted in chars. Case-sensitive.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two rolling rows of the DP table.
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
