// Regression tests for known edge cases.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use picto_parser_lib::catalog::image_url;
use picto_parser_lib::normalize::normalize;
use picto_parser_lib::output::sequence_to_bracketed;
use picto_parser_lib::types::{HairTone, SkinTone};
use picto_parser_lib::{
    choices_or_canned, dedupe, extract_choices, find_infinitive, Catalog, CatalogError, Category,
    DisplaySettings, ExtractionContext, Extractor, ExtractorConfig, ImageOptions, Lexicon,
    PersonalPictogram, PersonalStore, Pictogram, PictogramId, Source,
};

fn lexicon() -> Arc<Lexicon> {
    Arc::new(Lexicon::new())
}

fn words(ps: &[Pictogram]) -> Vec<&str> {
    ps.iter().map(|p| p.word.as_str()).collect()
}

fn catalog_picto(id: u32, word: &str) -> Pictogram {
    Pictogram {
        id: PictogramId::Catalog(id),
        word: word.to_string(),
        image: image_url(id),
        source: Source::Search,
        tags: vec![],
        categories: vec![],
        synsets: vec![],
        created: 0,
        skin: false,
        hair: false,
    }
}

enum Reply {
    Found(u32),
    Fail,
    Hang,
}

/// A catalog that answers from a script and counts the searches it receives.
struct ScriptedCatalog {
    replies: HashMap<&'static str, Reply>,
    searches: AtomicUsize,
}

impl ScriptedCatalog {
    fn new(replies: Vec<(&'static str, Reply)>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            searches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Catalog for ScriptedCatalog {
    async fn search_keyword(&self, word: &str, _exact: bool) -> Result<Vec<Pictogram>, CatalogError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(word) {
            Some(Reply::Found(id)) => Ok(vec![catalog_picto(*id, "keyword")]),
            Some(Reply::Fail) => Err(CatalogError::Status(500)),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(vec![])
            }
            None => Ok(vec![]),
        }
    }

    async fn image_from_id(&self, id: u32, _options: &ImageOptions) -> Result<Pictogram, CatalogError> {
        Ok(catalog_picto(id, ""))
    }
}

fn scripted(catalog: Arc<ScriptedCatalog>, config: ExtractorConfig) -> Extractor {
    Extractor::new(lexicon(), catalog, config)
}

#[test]
fn normalize_folds_accents_and_is_idempotent() {
    assert_eq!(normalize("Città!"), normalize("citta"));
    for s in ["Città!", "  Perché   no? ", "Papà è andato", "succo-di-frutta"] {
        let once = normalize(s);
        assert_eq!(normalize(&once), once, "normalize not idempotent on {s:?}");
    }
}

#[test]
fn compound_and_bare_participle_resolve() {
    let lex = Lexicon::new();
    assert_eq!(find_infinitive("ho mangiato", &lex).as_deref(), Some("mangiare"));
    assert_eq!(find_infinitive("mangiato", &lex).as_deref(), Some("mangiare"));
}

#[test]
fn higher_frequency_entry_wins() {
    let data = serde_json::json!({
        "subjects": [],
        "verbs": [{ "word": "vedere", "id": 1 }, { "word": "vedare", "id": 2 }],
        "objects": {},
        "conjugations": [
            { "infinitive": "vedare", "frequency": 2500, "tenses": { "presente": ["io vedo"] } },
            { "infinitive": "vedere", "frequency": 5500, "tenses": { "presente": ["io vedo"] } }
        ],
        "questions": [],
        "stopwords": []
    });
    let lex = Lexicon::from_json(data.to_string().as_bytes()).unwrap();
    assert_eq!(find_infinitive("vedo", &lex).as_deref(), Some("vedere"));
}

#[test]
fn choices_from_prefer_verb() {
    assert_eq!(extract_choices("Preferisci carne o pesce"), vec!["carne", "pesce"]);
}

#[test]
fn choices_empty_without_list_or_canned_answer() {
    assert!(extract_choices("Cosa vuoi?").is_empty());
    assert!(choices_or_canned("Cosa vuoi?", &Lexicon::new()).is_empty());
    assert_eq!(
        choices_or_canned("cosa vuoi MANGIARE?", &Lexicon::new()),
        vec!["pizza", "pasta", "gelato"]
    );
}

#[test]
fn approx_dedupe_keeps_earlier_word() {
    let mut gatti = catalog_picto(2, "gatti");
    gatti.created = 200;
    let mut gatto = catalog_picto(1, "gatto");
    gatto.created = 100;
    let out = dedupe(vec![gatti, gatto], true);
    assert_eq!(words(&out), vec!["gatto"]);
}

#[tokio::test]
async fn modal_and_auxiliary_leave_no_pictogram() {
    let out = Extractor::offline(lexicon())
        .extract("Ho fame, voglio mangiare una pizza", &ExtractionContext::default())
        .await;
    let w = words(&out);
    let verb = w.iter().position(|x| *x == "mangiare").unwrap();
    let pizza = w.iter().position(|x| *x == "pizza").unwrap();
    assert!(verb < pizza);
    assert!(!w.contains(&"avere"));
    assert!(!w.contains(&"volere"));
}

#[tokio::test]
async fn compound_tense_consumes_both_tokens() {
    let out = Extractor::offline(lexicon())
        .extract("Ho mangiato", &ExtractionContext::default())
        .await;
    assert_eq!(sequence_to_bracketed(&out), "{mangiare:verb}");
}

#[tokio::test]
async fn personal_pictogram_overrides_lexicon() {
    let ctx = ExtractionContext {
        personal: vec![PersonalPictogram::new("Casa", Category::Object, "data:image/png;base64,AAAA")],
        ..Default::default()
    };
    let out = Extractor::offline(lexicon()).extract("Andiamo a casa", &ctx).await;
    assert_eq!(sequence_to_bracketed(&out), "{andare:verb}, {Casa:personal}");
    assert_eq!(out[1].image, "data:image/png;base64,AAAA");
    assert_eq!(out[1].id, PictogramId::Personal("casa".into()));
}

#[tokio::test]
async fn imported_personal_pictogram_is_used() {
    let store = PersonalStore::in_memory();
    let added = store
        .import_from_message("soggetto: nonna Maria", "img://nonna-maria")
        .unwrap();
    assert!(added.is_some());
    // A second import of the same name is a no-op.
    assert!(store
        .import_from_message("persona: Nonna maria", "img://other")
        .unwrap()
        .is_none());

    let ctx = ExtractionContext::new(DisplaySettings::default(), store.list());
    let out = Extractor::offline(lexicon())
        .extract("La nonna Maria cucina la pasta", &ctx)
        .await;
    assert_eq!(
        sequence_to_bracketed(&out),
        "{nonna Maria:personal}, {cucinare:verb}, {pasta:object}"
    );
}

#[tokio::test]
async fn missing_input_is_empty() {
    let e = Extractor::offline(lexicon());
    let ctx = ExtractionContext::default();
    assert!(e.extract_message(None, &ctx).await.is_empty());
    assert!(e.extract_message(Some(""), &ctx).await.is_empty());
}

#[tokio::test]
async fn variants_follow_settings() {
    let ctx = ExtractionContext {
        settings: DisplaySettings {
            skin: Some(SkinTone::Black),
            hair: Some(HairTone::Red),
            font_size: None,
        },
        personal: vec![],
    };
    let out = Extractor::offline(lexicon())
        .extract("La mamma mangia la pizza", &ctx)
        .await;
    assert_eq!(out[0].image, format!("{}?skin=black&hair=red", image_url(2458)));
    // Objects carry no skin or hair variants.
    assert_eq!(out[2].image, image_url(2527));
}

#[tokio::test]
async fn search_fills_unknown_words_in_place() {
    let catalog = Arc::new(ScriptedCatalog::new(vec![
        ("dinosauro", Reply::Found(9001)),
        ("banana", Reply::Found(9002)),
    ]));
    let e = scripted(catalog.clone(), ExtractorConfig::default());
    let out = e
        .extract("Il dinosauro mangia la banana", &ExtractionContext::default())
        .await;
    assert_eq!(
        sequence_to_bracketed(&out),
        "{dinosauro:search}, {mangiare:verb}, {banana:search}"
    );
    assert_eq!(out[0].id, PictogramId::Catalog(9001));
    assert_eq!(catalog.searches.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_and_slow_searches_are_dropped() {
    let catalog = Arc::new(ScriptedCatalog::new(vec![
        ("razzo", Reply::Fail),
        ("drago", Reply::Hang),
        ("banana", Reply::Found(9002)),
    ]));
    let config = ExtractorConfig {
        search_timeout_ms: 50,
        ..ExtractorConfig::default()
    };
    let e = scripted(catalog.clone(), config);
    let out = e
        .extract(
            "Il razzo e il drago mangiano la banana",
            &ExtractionContext::default(),
        )
        .await;
    assert_eq!(sequence_to_bracketed(&out), "{mangiare:verb}, {banana:search}");
    assert_eq!(catalog.searches.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn search_fallback_can_be_disabled() {
    let catalog = Arc::new(ScriptedCatalog::new(vec![("dinosauro", Reply::Found(9001))]));
    let config = ExtractorConfig {
        search_fallback: false,
        ..ExtractorConfig::default()
    };
    let e = scripted(catalog.clone(), config);
    let out = e
        .extract("Il dinosauro mangia", &ExtractionContext::default())
        .await;
    assert_eq!(sequence_to_bracketed(&out), "{mangiare:verb}");
    assert_eq!(catalog.searches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn lexicon_words_never_reach_the_catalog() {
    let catalog = Arc::new(ScriptedCatalog::new(vec![("pizza", Reply::Found(1))]));
    let e = scripted(catalog.clone(), ExtractorConfig::default());
    let out = e
        .extract("Io mangio la pizza", &ExtractionContext::default())
        .await;
    assert_eq!(out[2].source, Source::Object);
    assert_eq!(catalog.searches.load(Ordering::SeqCst), 0);
}
