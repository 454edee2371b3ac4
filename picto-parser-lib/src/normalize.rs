// Text canonicalization shared by every other component.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Punctuation stripped from tokens before lookup.
const PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '"', '\'', '(', ')', '[', ']', '{', '}', '«', '»', '“', '”',
    '‘', '’', '…', '-', '_', '/', '*',
];

/// Canonicalize text for comparison: lowercase, strip diacritics, drop
/// everything that is neither a word character nor whitespace, collapse
/// whitespace runs and trim.
///
/// `normalize(normalize(x)) == normalize(x)` for every input.
pub fn normalize(text: &str) -> String {
    let folded = fold(text);
    let kept: String = folded
        .chars()
        .filter(|&c| is_word_char(c) || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `normalize` for message text that may be missing.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// Lowercase, strip diacritics and non-whitespace control characters, and
/// collapse whitespace runs to single spaces, leaving punctuation in place.
/// Used where punctuation carries meaning, such as the "andato/a" shorthand
/// in conjugation tables.
pub fn fold(text: &str) -> String {
    let folded = text
        .nfd()
        .filter(|&c| !is_combining_mark(c) && (!c.is_control() || c.is_whitespace()))
        .collect::<String>()
        .to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip the fixed punctuation set from both ends and the inside of a token.
pub fn strip_punctuation(token: &str) -> String {
    token.chars().filter(|c| !PUNCTUATION.contains(c)).collect()
}

/// Split a sentence into normalized tokens, dropping anything that ends up
/// one character long or shorter. Elided articles ("l'acqua") split at the
/// apostrophe.
pub fn tokenize(sentence: &str) -> Vec<String> {
    sentence
        .split(|c: char| c.is_whitespace() || c == '\'' || c == '’')
        .map(|t| normalize(&strip_punctuation(t)))
        .flat_map(|t| t.split(' ').map(str::to_string).collect::<Vec<_>>())
        .filter(|t| t.chars().count() > 1)
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_accents_and_punctuation() {
        assert_eq!(normalize("Città!"), normalize("citta"));
        assert_eq!(normalize("Città!"), "citta");
        assert_eq!(normalize("Perché?"), "perche");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  Ho   FAME,\tvoglio\n mangiare  "), "ho fame voglio mangiare");
        assert_eq!(normalize("fame\tvoglio"), "fame voglio");
        assert_eq!(normalize("cosa vuoi\r\nmangiare"), "cosa vuoi mangiare");
    }

    #[test]
    fn test_fold_collapses_control_whitespace() {
        assert_eq!(fold("Ho\tMangiato"), "ho mangiato");
        assert_eq!(fold("io  sono\nandato/a"), "io sono andato/a");
    }

    #[test]
    fn test_normalize_strips_control_chars() {
        assert_eq!(normalize("pi\u{7}zza\u{0}"), "pizza");
    }

    #[test]
    fn test_normalize_idempotent() {
        for s in ["Città!", "  L'acqua è FREDDA... ", "«Sì» — no", "", "àèìòù ÀÈÌÒÙ"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_normalize_missing_input() {
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_opt(Some("Sì")), "si");
    }

    #[test]
    fn test_fold_keeps_shorthand_slash() {
        assert_eq!(fold("Io sono Andato/a"), "io sono andato/a");
        assert_eq!(fold("mangerò"), "mangero");
    }

    #[test]
    fn test_tokenize_drops_short_tokens() {
        assert_eq!(
            tokenize("Ho fame, voglio mangiare una pizza!"),
            vec!["ho", "fame", "voglio", "mangiare", "una", "pizza"]
        );
        assert_eq!(tokenize("è a casa"), vec!["casa"]);
    }

    #[test]
    fn test_tokenize_splits_elision() {
        assert_eq!(tokenize("bevo l'acqua"), vec!["bevo", "acqua"]);
        assert_eq!(tokenize("dell’acqua"), vec!["dell", "acqua"]);
    }
}
