// User-authored pictograms: the in-sentence matcher and the per-user store.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLock;
use tempfile::NamedTempFile;
use tracing::{debug, trace};

use crate::error::Error;
use crate::lexicon::Lexicon;
use crate::normalize::normalize;
use crate::types::{Category, PersonalPictogram, Pictogram, PictogramId, Source};

/// Longest personal phrase, in words after stopword removal.
pub const DEFAULT_MAX_PERSONAL_WORDS: usize = 3;

/// One position of a sentence during extraction: a plain token or a
/// pictogram already bound to that position.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Token(String),
    Pictogram(Pictogram),
}

impl PersonalPictogram {
    pub fn new(name: &str, category: Category, image: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            category,
            image: image.to_string(),
            created: Utc::now().timestamp_millis(),
        }
    }

    /// Normalized name, the identity of a personal pictogram.
    pub fn key(&self) -> String {
        normalize(&self.name)
    }

    pub fn to_pictogram(&self) -> Pictogram {
        Pictogram {
            id: PictogramId::Personal(self.key()),
            word: self.name.clone(),
            image: self.image.clone(),
            source: Source::Personal,
            tags: vec![],
            categories: vec![self.category.to_string()],
            synsets: vec![],
            created: self.created,
            skin: false,
            hair: false,
        }
    }
}

/// Replace the first run of tokens spelling each personal pictogram's name
/// with that pictogram. Names are compared word by word after normalization
/// and stopword removal; names longer than `max_words` are skipped.
pub fn splice_personal(
    slots: &mut Vec<Slot>,
    personal: &[PersonalPictogram],
    lexicon: &Lexicon,
    max_words: usize,
) {
    for p in personal {
        let words = lexicon.phrase_key(&p.name);
        if words.is_empty() || words.len() > max_words {
            continue;
        }
        if let Some(start) = find_run(slots, &words) {
            trace!(name = %p.name, start, "personal pictogram matched");
            slots.splice(start..start + words.len(), [Slot::Pictogram(p.to_pictogram())]);
        }
    }
}

fn find_run(slots: &[Slot], words: &[String]) -> Option<usize> {
    if slots.len() < words.len() {
        return None;
    }
    (0..=slots.len() - words.len()).find(|&start| {
        words.iter().enumerate().all(|(k, w)| {
            matches!(&slots[start + k], Slot::Token(t) if t == w)
        })
    })
}

/// Parse a "category: name" annotation from an incoming message, such as
/// "soggetto: nonna Maria". Unknown categories yield `None`: message text is
/// user data, not a programming error.
pub fn parse_annotation(text: &str) -> Option<(Category, String)> {
    let (label, name) = text.split_once(':')?;
    let category = label.parse::<Category>().ok()?;
    let name = name.trim();
    if normalize(name).is_empty() || name.split_whitespace().count() > DEFAULT_MAX_PERSONAL_WORDS {
        return None;
    }
    Some((category, name.to_string()))
}

/// Per-user personal pictogram list.
///
/// Additions are idempotent by normalized name, so concurrent writers (an
/// import from an incoming message racing an explicit edit) never create
/// duplicates.
pub struct PersonalStore {
    entries: RwLock<Vec<PersonalPictogram>>,
    path: Option<PathBuf>,
}

impl PersonalStore {
    /// An empty store that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            path: None,
        }
    }

    /// Open a store backed by a JSON file. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader)?
        } else {
            Vec::new()
        };
        Ok(Self {
            entries: RwLock::new(entries),
            path: Some(path),
        })
    }

    /// Snapshot of the current entries, in insertion order.
    pub fn list(&self) -> Vec<PersonalPictogram> {
        self.entries.read().clone()
    }

    /// Add an entry. Returns `false` without changing anything if an entry
    /// with the same normalized name already exists.
    pub fn add(&self, pictogram: PersonalPictogram) -> Result<bool, Error> {
        let key = pictogram.key();
        if key.is_empty() {
            return Err(Error::EmptyName);
        }
        let mut entries = self.entries.write();
        if entries.iter().any(|e| e.key() == key) {
            debug!(name = %pictogram.name, "personal pictogram already present");
            return Ok(false);
        }
        entries.push(pictogram);
        Ok(true)
    }

    /// Add an entry from a category label such as "subject" or "oggetto".
    pub fn add_named(&self, name: &str, category: &str, image: &str) -> Result<bool, Error> {
        let category = category.parse::<Category>()?;
        self.add(PersonalPictogram::new(name, category, image))
    }

    /// Remove the entry with this name. Returns whether one was removed.
    pub fn remove(&self, name: &str) -> bool {
        let key = normalize(name);
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.key() != key);
        entries.len() != before
    }

    /// Create a personal pictogram from an annotated incoming message with an
    /// attached image. Returns the entry if it was new.
    pub fn import_from_message(
        &self,
        text: &str,
        image: &str,
    ) -> Result<Option<PersonalPictogram>, Error> {
        let Some((category, name)) = parse_annotation(text) else {
            return Ok(None);
        };
        let pictogram = PersonalPictogram::new(&name, category, image);
        if self.add(pictogram.clone())? {
            Ok(Some(pictogram))
        } else {
            Ok(None)
        }
    }

    /// Write the store to its backing file through a temporary file in the
    /// same directory, so a crash never leaves a truncated file behind.
    pub fn save(&self) -> Result<(), Error> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let snapshot = self.list();
        let temp_file = NamedTempFile::new_in(parent)?;
        {
            let mut writer = BufWriter::new(&temp_file);
            serde_json::to_writer_pretty(&mut writer, &snapshot)?;
            writer.flush()?;
        }
        temp_file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl Default for PersonalStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn slots(s: &str) -> Vec<Slot> {
        s.split_whitespace().map(|t| Slot::Token(t.to_string())).collect()
    }

    fn personal(name: &str) -> PersonalPictogram {
        PersonalPictogram::new(name, Category::Object, &format!("data:{name}"))
    }

    #[test]
    fn test_splice_single_word() {
        let lex = Lexicon::new();
        let mut s = slots("andare casa");
        splice_personal(&mut s, &[personal("casa")], &lex, DEFAULT_MAX_PERSONAL_WORDS);
        assert_eq!(s.len(), 2);
        assert!(matches!(&s[1], Slot::Pictogram(p) if p.image == "data:casa"));
    }

    #[test]
    fn test_splice_multi_word_with_stopwords() {
        let lex = Lexicon::new();
        // "della" is a stopword, so the name matches the filtered tokens.
        let mut s = slots("mangiare torta nonna pizza");
        splice_personal(&mut s, &[personal("torta della nonna")], &lex, DEFAULT_MAX_PERSONAL_WORDS);
        assert_eq!(s.len(), 3);
        assert_eq!(s[0], Slot::Token("mangiare".into()));
        assert!(matches!(&s[1], Slot::Pictogram(p) if p.word == "torta della nonna"));
        assert_eq!(s[2], Slot::Token("pizza".into()));
    }

    #[test]
    fn test_splice_only_first_occurrence() {
        let lex = Lexicon::new();
        let mut s = slots("casa casa");
        splice_personal(&mut s, &[personal("casa")], &lex, DEFAULT_MAX_PERSONAL_WORDS);
        assert!(matches!(&s[0], Slot::Pictogram(_)));
        assert_eq!(s[1], Slot::Token("casa".into()));
    }

    #[test]
    fn test_splice_skips_long_names() {
        let lex = Lexicon::new();
        let mut s = slots("gatto rosso grande peloso");
        splice_personal(
            &mut s,
            &[personal("gatto rosso grande peloso")],
            &lex,
            DEFAULT_MAX_PERSONAL_WORDS,
        );
        assert!(s.iter().all(|slot| matches!(slot, Slot::Token(_))));
    }

    #[test]
    fn test_splice_later_entries_see_mutated_sequence() {
        let lex = Lexicon::new();
        let mut s = slots("nonna maria");
        splice_personal(
            &mut s,
            &[personal("nonna maria"), personal("maria")],
            &lex,
            DEFAULT_MAX_PERSONAL_WORDS,
        );
        assert_eq!(s.len(), 1);
        assert!(matches!(&s[0], Slot::Pictogram(p) if p.word == "nonna maria"));
    }

    #[test]
    fn test_parse_annotation() {
        assert_eq!(
            parse_annotation("Soggetto: Nonna Maria"),
            Some((Category::Subject, "Nonna Maria".to_string()))
        );
        assert_eq!(parse_annotation("colore: rosso"), None);
        assert_eq!(parse_annotation("oggetto:   "), None);
        assert_eq!(parse_annotation("nessuna annotazione"), None);
    }

    #[test]
    fn test_store_add_is_idempotent_by_name() {
        let store = PersonalStore::in_memory();
        assert!(store.add(personal("Casa")).unwrap());
        assert!(!store.add(personal("casa!")).unwrap());
        assert_eq!(store.list().len(), 1);
        assert!(matches!(store.add(personal("?!")), Err(Error::EmptyName)));
    }

    #[test]
    fn test_store_add_named_rejects_bad_category() {
        let store = PersonalStore::in_memory();
        let err = store.add_named("nonna", "colore", "data:x").unwrap_err();
        assert!(matches!(err, Error::InvalidCategory(_)));
        assert!(store.add_named("nonna", "soggetto", "data:x").unwrap());
    }

    #[test]
    fn test_store_remove() {
        let store = PersonalStore::in_memory();
        store.add(personal("gelato")).unwrap();
        assert!(store.remove("Gelato"));
        assert!(!store.remove("gelato"));
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_store_concurrent_adds() {
        let store = Arc::new(PersonalStore::in_memory());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.add(personal("cane")).unwrap())
            })
            .collect();
        let added: usize = handles
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(added, 1);
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_import_from_message() {
        let store = PersonalStore::in_memory();
        let imported = store
            .import_from_message("oggetto: peluche", "https://example.org/p.png")
            .unwrap()
            .expect("annotation should be imported");
        assert_eq!(imported.category, Category::Object);
        assert!(store
            .import_from_message("oggetto: peluche", "https://example.org/q.png")
            .unwrap()
            .is_none());
        assert!(store.import_from_message("ciao!", "x").unwrap().is_none());
    }

    #[test]
    fn test_store_save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("personal.json");
        let store = PersonalStore::open(&path).unwrap();
        store.add(personal("mare")).unwrap();
        store.save().unwrap();

        let reopened = PersonalStore::open(&path).unwrap();
        let list = reopened.list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "mare");
        assert_eq!(list[0].category, Category::Object);
    }
}
