// Error types for the extraction engine.
//
// Ordinary unmatched text is never an error; these cover programmer errors,
// caller-supplied data and the catalog boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown pictogram category '{0}'")]
    InvalidCategory(String),

    #[error("personal pictogram name is empty after normalization")]
    EmptyName,

    #[error(transparent)]
    Lexicon(#[from] LexiconError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("personal store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("personal store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("lexicon data is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("lexicon table '{0}' is empty")]
    MissingTable(&'static str),

    #[error("objects are listed for verb '{0}' which has no verb entry")]
    OrphanObjects(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Http(String),

    #[error("catalog answered with status {0}")]
    Status(u16),

    #[error("catalog response could not be read: {0}")]
    Malformed(String),

    #[error("catalog did not answer within {0} ms")]
    Timeout(u64),
}
