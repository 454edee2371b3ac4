// Sentence-level extraction: tokens → personal matches → infinitives →
// lexicon lookups → catalog search → ordered pictograms.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

use crate::catalog::{apply_variants, Catalog, NoCatalog};
use crate::config::ExtractorConfig;
use crate::dedup::dedupe_in_order;
use crate::error::CatalogError;
use crate::infinitive::{Resolved, Resolver};
use crate::lexicon::Lexicon;
use crate::normalize::{normalize, tokenize};
use crate::personal::{splice_personal, Slot};
use crate::types::{ExtractionContext, Pictogram, Source};

/// Lexicon phrases longer than this are not looked for.
const MAX_WINDOW: usize = 3;

/// A sentence position after personal matching and infinitive resolution.
#[derive(Debug, Clone)]
enum Unit {
    Personal(Pictogram),
    Verb { surface: String, infinitive: String },
    Word(String),
    Auxiliary,
}

/// A sentence position after lexicon lookup.
#[derive(Debug)]
enum Item {
    Found(Pictogram),
    /// Not in the lexicon; the word to search the catalog for.
    Pending(String),
}

/// The extraction engine: one shared read-only lexicon, one catalog.
pub struct Extractor {
    lexicon: Arc<Lexicon>,
    catalog: Arc<dyn Catalog>,
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(lexicon: Arc<Lexicon>, catalog: Arc<dyn Catalog>, config: ExtractorConfig) -> Self {
        Self {
            lexicon,
            catalog,
            config,
        }
    }

    /// An extractor that never leaves the embedded lexicon.
    pub fn offline(lexicon: Arc<Lexicon>) -> Self {
        Self::new(lexicon, Arc::new(NoCatalog), ExtractorConfig::default())
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// `extract` for message text that may be missing.
    pub async fn extract_message(&self, message: Option<&str>, ctx: &ExtractionContext) -> Vec<Pictogram> {
        match message {
            Some(text) => self.extract(text, ctx).await,
            None => vec![],
        }
    }

    /// Extract the pictograms of a sentence, in the order their words appear.
    ///
    /// Unknown words are dropped silently; catalog failures count as "no
    /// match" for the word concerned.
    pub async fn extract(&self, sentence: &str, ctx: &ExtractionContext) -> Vec<Pictogram> {
        let lexicon = &*self.lexicon;

        // 1. Tokens without stopwords.
        let mut slots: Vec<Slot> = tokenize(sentence)
            .into_iter()
            .filter(|t| !lexicon.is_stopword(t))
            .map(Slot::Token)
            .collect();
        if slots.is_empty() {
            return vec![];
        }

        // 2. Personal vocabulary first.
        splice_personal(&mut slots, &ctx.personal, lexicon, self.config.max_personal_words);

        // 3. Infinitives, run by run between personal matches.
        let units = self.resolve(slots);

        // 4. Lexicon lookups in sentence order.
        let mut items = self.lookup(&units);

        // 5. Catalog search for whatever is left.
        self.search_pending(&mut items).await;

        // 6. Personal overrides, variants, dedup.
        let personal: HashMap<String, &_> = ctx.personal.iter().map(|p| (p.key(), p)).collect();
        let pictograms: Vec<Pictogram> = items
            .into_iter()
            .filter_map(|item| match item {
                Item::Found(p) => Some(p),
                Item::Pending(_) => None,
            })
            .map(|p| {
                if p.source == Source::Personal {
                    return p;
                }
                match personal.get(&normalize(&p.word)) {
                    Some(own) => own.to_pictogram(),
                    None => p,
                }
            })
            .map(|mut p| {
                apply_variants(&mut p, &ctx.settings);
                p
            })
            .collect();

        let max_distance = self
            .config
            .approx_dedup
            .then_some(self.config.max_edit_distance);
        dedupe_in_order(pictograms, max_distance)
    }

    fn resolve(&self, slots: Vec<Slot>) -> Vec<Unit> {
        let resolver = Resolver::new(&self.lexicon, self.config.frequency_cutoff);
        let mut units = Vec::with_capacity(slots.len());
        let mut run: Vec<String> = Vec::new();

        let flush = |run: &mut Vec<String>, units: &mut Vec<Unit>| {
            for r in resolver.resolve(run) {
                units.push(match r {
                    Resolved::Verb {
                        surface,
                        infinitive,
                    } => Unit::Verb {
                        surface,
                        infinitive,
                    },
                    Resolved::Auxiliary { .. } => Unit::Auxiliary,
                    Resolved::Word(w) => Unit::Word(w),
                });
            }
            run.clear();
        };

        for slot in slots {
            match slot {
                Slot::Token(t) => run.push(t),
                Slot::Pictogram(p) => {
                    flush(&mut run, &mut units);
                    units.push(Unit::Personal(p));
                }
            }
        }
        flush(&mut run, &mut units);
        units
    }

    fn lookup(&self, units: &[Unit]) -> Vec<Item> {
        let lexicon = &*self.lexicon;
        let verbs: Vec<&str> = units
            .iter()
            .filter_map(|u| match u {
                Unit::Verb { infinitive, .. } => Some(infinitive.as_str()),
                _ => None,
            })
            .collect();
        let max_window = lexicon.max_phrase_len().min(MAX_WINDOW);

        let mut items = Vec::with_capacity(units.len());
        let mut i = 0;
        while i < units.len() {
            match &units[i] {
                Unit::Personal(p) => items.push(Item::Found(p.clone())),
                Unit::Auxiliary => {}
                Unit::Verb {
                    surface,
                    infinitive,
                } => match lexicon.verb(infinitive) {
                    Some(p) => items.push(Item::Found(p.bound_to(infinitive, Source::Verb))),
                    None => {
                        debug!(%surface, %infinitive, "verb has no lexicon pictogram");
                        items.push(Item::Pending(infinitive.clone()));
                    }
                },
                Unit::Word(word) => {
                    // Multi-word lexicon phrases before single words.
                    let mut matched = false;
                    for window in (2..=max_window).rev() {
                        let Some(words) = word_window(units, i, window) else {
                            continue;
                        };
                        let key = words.join(" ");
                        if let Some(p) = lookup_key(lexicon, &key, &verbs) {
                            items.push(Item::Found(p));
                            i += window;
                            matched = true;
                            break;
                        }
                    }
                    if matched {
                        continue;
                    }
                    match lookup_key(lexicon, word, &verbs) {
                        Some(p) => items.push(Item::Found(p)),
                        None => items.push(Item::Pending(word.clone())),
                    }
                }
            }
            i += 1;
        }
        items
    }

    /// Resolve every pending word against the catalog concurrently and wait
    /// for all of them.
    async fn search_pending(&self, items: &mut [Item]) {
        if !self.config.search_fallback {
            return;
        }
        let timeout = self.config.search_timeout();
        let timeout_ms = self.config.search_timeout_ms;
        let catalog = &*self.catalog;
        let searches = items.iter().enumerate().filter_map(|(i, item)| match item {
            Item::Pending(word) => Some(async move {
                let result = tokio::time::timeout(timeout, catalog.search_keyword(word, true))
                    .await
                    .unwrap_or(Err(CatalogError::Timeout(timeout_ms)));
                let found = match result {
                    Ok(results) => results
                        .into_iter()
                        .next()
                        .map(|p| p.bound_to(word, Source::Search)),
                    Err(e) => {
                        debug!(%word, error = %e, "catalog search dropped");
                        None
                    }
                };
                (i, found)
            }),
            Item::Found(_) => None,
        });
        let results = join_all(searches).await;

        for (i, found) in results {
            if let Some(p) = found {
                items[i] = Item::Found(p);
            }
        }
    }
}

/// The words of `window` consecutive plain-word units starting at `start`.
fn word_window(units: &[Unit], start: usize, window: usize) -> Option<Vec<&str>> {
    let slice = units.get(start..start + window)?;
    slice
        .iter()
        .map(|u| match u {
            Unit::Word(w) => Some(w.as_str()),
            _ => None,
        })
        .collect()
}

/// Subject, then verb, then an object of a verb in the sentence, then any
/// object.
fn lookup_key(lexicon: &Lexicon, key: &str, verbs: &[&str]) -> Option<Pictogram> {
    lexicon
        .subject(key)
        .or_else(|| lexicon.verb(key))
        .or_else(|| verbs.iter().find_map(|v| lexicon.object_of(v, key)))
        .or_else(|| lexicon.object(key))
}
