use std::collections::{HashMap, HashSet};

use crate::catalog::image_url;
use crate::error::LexiconError;
use crate::infinitive::ConjugationIndex;
use crate::normalize::normalize;
use crate::types::{
    ChoiceQuestion, ConjugationEntry, LexiconData, LexiconEntry, Pictogram, PictogramId, Source,
};

const EMBEDDED_JSON: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/lexicon.json"));

/// In-memory lexicon loaded once from compile-time embedded data.
///
/// All word keys are normalized with stopwords removed, so "succo di frutta"
/// is found under "succo frutta".
pub struct Lexicon {
    subjects: HashMap<String, LexiconEntry>,
    verbs: HashMap<String, LexiconEntry>,
    /// Verb infinitive → objects that verb takes, in table order.
    objects_by_verb: HashMap<String, Vec<(String, LexiconEntry)>>,
    /// Every object regardless of verb. When several verbs list a word, the
    /// alphabetically first verb wins.
    objects: HashMap<String, LexiconEntry>,
    conjugations: Vec<ConjugationEntry>,
    index: ConjugationIndex,
    questions: Vec<(String, ChoiceQuestion)>,
    stopwords: HashSet<String>,
    /// Longest lexicon key, in words.
    max_phrase_len: usize,
}

impl Lexicon {
    /// Load the lexicon from embedded JSON data. The tables were validated by
    /// the build, so a failure here means a corrupted binary.
    pub fn new() -> Self {
        Self::from_json(EMBEDDED_JSON).expect("embedded lexicon JSON is invalid")
    }

    /// Build a lexicon from caller-supplied JSON in the embedded layout.
    pub fn from_json(bytes: &[u8]) -> Result<Self, LexiconError> {
        let data: LexiconData = serde_json::from_slice(bytes)?;
        Self::from_data(data)
    }

    pub fn from_data(mut data: LexiconData) -> Result<Self, LexiconError> {
        if data.verbs.is_empty() {
            return Err(LexiconError::MissingTable("verbs"));
        }
        if data.conjugations.is_empty() {
            return Err(LexiconError::MissingTable("conjugations"));
        }

        let stopwords: HashSet<String> = data
            .stopwords
            .iter()
            .map(|w| normalize(w))
            .filter(|w| !w.is_empty())
            .collect();
        let key = |text: &str| phrase_key(text, &stopwords).join(" ");

        let mut max_phrase_len = 1;
        let mut keyed = |entries: Vec<LexiconEntry>| -> HashMap<String, LexiconEntry> {
            let mut map = HashMap::new();
            for entry in entries {
                let k = key(&entry.word);
                if k.is_empty() {
                    continue;
                }
                max_phrase_len = max_phrase_len.max(k.split(' ').count());
                map.entry(k).or_insert(entry);
            }
            map
        };
        let subjects = keyed(std::mem::take(&mut data.subjects));
        let verbs = keyed(std::mem::take(&mut data.verbs));

        let mut objects_by_verb: HashMap<String, Vec<(String, LexiconEntry)>> = HashMap::new();
        let mut objects: HashMap<String, LexiconEntry> = HashMap::new();
        for (verb, list) in std::mem::take(&mut data.objects) {
            let verb_key = key(&verb);
            if !verbs.contains_key(&verb_key) {
                return Err(LexiconError::OrphanObjects(verb));
            }
            let mut keyed_list = Vec::with_capacity(list.len());
            for entry in list {
                let k = key(&entry.word);
                if k.is_empty() {
                    continue;
                }
                max_phrase_len = max_phrase_len.max(k.split(' ').count());
                objects.entry(k.clone()).or_insert_with(|| entry.clone());
                keyed_list.push((k, entry));
            }
            objects_by_verb.insert(verb_key, keyed_list);
        }

        // Stable sort: equal frequencies keep their table order.
        data.conjugations
            .sort_by(|a, b| b.frequency.cmp(&a.frequency));
        let index = ConjugationIndex::build(&data.conjugations);

        let questions = data
            .questions
            .into_iter()
            .map(|q| (normalize(&q.question), q))
            .collect();

        Ok(Self {
            subjects,
            verbs,
            objects_by_verb,
            objects,
            conjugations: data.conjugations,
            index,
            questions,
            stopwords,
            max_phrase_len,
        })
    }

    /// Check whether a normalized token is in the garbage-word stoplist.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Normalize `text`, split it into words and drop stopwords.
    pub fn phrase_key(&self, text: &str) -> Vec<String> {
        phrase_key(text, &self.stopwords)
    }

    /// Look up a subject pictogram by normalized key.
    pub fn subject(&self, key: &str) -> Option<Pictogram> {
        self.subjects.get(key).map(|e| to_pictogram(e, Source::Subject))
    }

    /// Look up a verb pictogram by infinitive.
    pub fn verb(&self, infinitive: &str) -> Option<Pictogram> {
        self.verbs.get(infinitive).map(|e| to_pictogram(e, Source::Verb))
    }

    /// Look up an object among those taken by `verb`.
    pub fn object_of(&self, verb: &str, key: &str) -> Option<Pictogram> {
        self.objects_by_verb
            .get(verb)?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, e)| to_pictogram(e, Source::Object))
    }

    /// Look up an object regardless of verb.
    pub fn object(&self, key: &str) -> Option<Pictogram> {
        self.objects.get(key).map(|e| to_pictogram(e, Source::Object))
    }

    /// Conjugation tables in scan order (descending frequency).
    pub fn conjugations(&self) -> &[ConjugationEntry] {
        &self.conjugations
    }

    pub(crate) fn conjugation_index(&self) -> &ConjugationIndex {
        &self.index
    }

    /// Canned answers for a question, matched by normalized exact equality.
    pub fn canned_answers(&self, question: &str) -> Option<&[String]> {
        let key = normalize(question);
        if key.is_empty() {
            return None;
        }
        self.questions
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, q)| q.answers.as_slice())
    }

    /// Length in words of the longest multi-word lexicon entry.
    pub fn max_phrase_len(&self) -> usize {
        self.max_phrase_len
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

fn phrase_key(text: &str, stopwords: &HashSet<String>) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|w| !w.is_empty() && !stopwords.contains(*w))
        .map(str::to_string)
        .collect()
}

fn to_pictogram(entry: &LexiconEntry, source: Source) -> Pictogram {
    Pictogram {
        id: PictogramId::Catalog(entry.id),
        word: entry.word.clone(),
        image: image_url(entry.id),
        source,
        tags: vec![],
        categories: vec![],
        synsets: vec![],
        created: 0,
        skin: entry.skin,
        hair: entry.hair,
    }
}
