pub mod types;
pub mod error;
pub mod normalize;
pub mod lexicon;
pub mod infinitive;
pub mod choices;
pub mod personal;
pub mod dedup;
pub mod catalog;
#[cfg(feature = "arasaac")]
pub mod arasaac;
pub mod config;
pub mod extract;
pub mod output;

#[cfg(feature = "arasaac")]
pub use arasaac::ArasaacCatalog;
pub use catalog::{Catalog, ImageOptions, NoCatalog};
pub use choices::{choices_or_canned, extract_choices};
pub use config::ExtractorConfig;
pub use dedup::dedupe;
pub use error::{CatalogError, Error, LexiconError};
pub use extract::Extractor;
pub use infinitive::find_infinitive;
pub use lexicon::Lexicon;
pub use personal::PersonalStore;
pub use types::{
    Category, DisplaySettings, ExtractionContext, PersonalPictogram, Pictogram, PictogramId, Source,
};
