use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Identity of a pictogram for exact deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PictogramId {
    /// Numeric id from the pictogram catalog.
    Catalog(u32),
    /// A user-authored pictogram, keyed by its normalized name.
    Personal(String),
}

/// Where a pictogram in an extraction result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Personal,
    Subject,
    Verb,
    Object,
    Search,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Personal => "personal",
            Source::Subject => "subject",
            Source::Verb => "verb",
            Source::Object => "object",
            Source::Search => "search",
        }
    }
}

/// One picture-symbol bound to a word of the current extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pictogram {
    pub id: PictogramId,
    /// The word this pictogram stands for in the sentence it was extracted from.
    pub word: String,
    /// URL or opaque handle of the image asset.
    pub image: String,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synsets: Vec<String>,
    /// Creation time in milliseconds since the epoch; 0 for catalog entries.
    #[serde(default)]
    pub created: i64,
    /// True if the image supports skin tone variants.
    #[serde(default)]
    pub skin: bool,
    /// True if the image supports hair color variants.
    #[serde(default)]
    pub hair: bool,
}

impl Pictogram {
    /// Return a copy bound to another word.
    pub fn bound_to(&self, word: &str, source: Source) -> Pictogram {
        Pictogram {
            word: word.to_string(),
            source,
            ..self.clone()
        }
    }
}

/// Semantic role of a personal pictogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Subject,
    Verb,
    Object,
}

impl FromStr for Category {
    type Err = Error;

    /// Accepts the English role names and the Italian labels used in message
    /// annotations.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "subject" | "soggetto" | "persona" => Ok(Category::Subject),
            "verb" | "verbo" | "azione" => Ok(Category::Verb),
            "object" | "oggetto" | "cosa" => Ok(Category::Object),
            other => Err(Error::InvalidCategory(other.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Subject => "subject",
            Category::Verb => "verb",
            Category::Object => "object",
        };
        f.write_str(s)
    }
}

/// A user-authored pictogram bound to a custom word or phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalPictogram {
    /// Trigger phrase, at most a few words.
    pub name: String,
    pub category: Category,
    /// User-supplied image (URL or data URI).
    pub image: String,
    #[serde(default)]
    pub created: i64,
}

/// Full conjugation table of one verb.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConjugationEntry {
    pub infinitive: String,
    /// Usage rank; the lexicon is scanned in descending order of this value.
    pub frequency: u32,
    /// Tense name to surface forms. Forms may carry a leading pronoun and a
    /// gender/number shorthand such as "andato/a".
    pub tenses: BTreeMap<String, Vec<String>>,
}

/// Canned answers for a question that carries no explicit choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceQuestion {
    pub question: String,
    pub answers: Vec<String>,
}

/// Skin tones supported by the catalog's image variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinTone {
    White,
    Black,
    Assian,
    Mulatto,
    Aztec,
}

impl SkinTone {
    pub fn as_str(self) -> &'static str {
        match self {
            SkinTone::White => "white",
            SkinTone::Black => "black",
            SkinTone::Assian => "assian",
            SkinTone::Mulatto => "mulatto",
            SkinTone::Aztec => "aztec",
        }
    }
}

/// Hair colors supported by the catalog's image variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HairTone {
    Blonde,
    Brown,
    DarkBrown,
    Gray,
    DarkGray,
    Red,
    Black,
}

impl HairTone {
    pub fn as_str(self) -> &'static str {
        match self {
            HairTone::Blonde => "blonde",
            HairTone::Brown => "brown",
            HairTone::DarkBrown => "darkBrown",
            HairTone::Gray => "gray",
            HairTone::DarkGray => "darkGray",
            HairTone::Red => "red",
            HairTone::Black => "black",
        }
    }
}

/// Per-user display preferences. `None` keeps the catalog default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default)]
    pub skin: Option<SkinTone>,
    #[serde(default)]
    pub hair: Option<HairTone>,
    #[serde(default)]
    pub font_size: Option<u16>,
}

/// Everything an extraction call needs to know about the current user.
#[derive(Debug, Clone, Default)]
pub struct ExtractionContext {
    pub settings: DisplaySettings,
    pub personal: Vec<PersonalPictogram>,
}

impl ExtractionContext {
    pub fn new(settings: DisplaySettings, personal: Vec<PersonalPictogram>) -> Self {
        Self { settings, personal }
    }
}

/// Raw lexicon data as embedded by build.rs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconData {
    pub subjects: Vec<LexiconEntry>,
    pub verbs: Vec<LexiconEntry>,
    pub objects: BTreeMap<String, Vec<LexiconEntry>>,
    pub conjugations: Vec<ConjugationEntry>,
    pub questions: Vec<ChoiceQuestion>,
    pub stopwords: Vec<String>,
}

/// A word bound to a catalog pictogram in the static lexicon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub word: String,
    pub id: u32,
    #[serde(default)]
    pub skin: bool,
    #[serde(default)]
    pub hair: bool,
}
