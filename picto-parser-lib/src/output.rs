// Output formatting for extraction results.

use crate::types::Pictogram;

/// Format one pictogram as `{word:source}`, e.g. `{pizza:object}`.
pub fn to_bracketed(p: &Pictogram) -> String {
    format!("{{{}:{}}}", p.word, p.source.as_str())
}

/// Format a whole extraction, comma separated, in sequence order.
pub fn sequence_to_bracketed(pictograms: &[Pictogram]) -> String {
    pictograms
        .iter()
        .map(to_bracketed)
        .collect::<Vec<_>>()
        .join(", ")
}
