// HTTP client for the ARASAAC pictogram API.
//
// Responses are validated record by record: anything that does not have the
// shape of a pictogram is skipped, never passed on half-filled.

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::catalog::{variant_url, Catalog, ImageOptions, ARASAAC_API};
use crate::error::CatalogError;
use crate::types::{Pictogram, PictogramId, Source};

#[derive(Debug, Deserialize)]
struct RawKeyword {
    keyword: String,
}

/// One pictogram record as the API returns it.
#[derive(Debug, Deserialize)]
struct RawPictogram {
    #[serde(rename = "_id")]
    id: u32,
    #[serde(default)]
    keywords: Vec<RawKeyword>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    synsets: Vec<String>,
    #[serde(default)]
    skin: bool,
    #[serde(default)]
    hair: bool,
    #[serde(default)]
    created: Option<String>,
}

impl RawPictogram {
    fn into_pictogram(self, word: Option<&str>, options: &ImageOptions) -> Pictogram {
        let word = match word {
            Some(w) => w.to_string(),
            None => self
                .keywords
                .first()
                .map(|k| k.keyword.clone())
                .unwrap_or_default(),
        };
        let created = self
            .created
            .as_deref()
            .and_then(|c| DateTime::parse_from_rfc3339(c).ok())
            .map(|d| d.timestamp_millis())
            .unwrap_or(0);
        Pictogram {
            id: PictogramId::Catalog(self.id),
            word,
            image: variant_url(self.id, options),
            source: Source::Search,
            tags: self.tags,
            categories: self.categories,
            synsets: self.synsets,
            created,
            skin: self.skin,
            hair: self.hair,
        }
    }
}

/// ARASAAC-backed [`Catalog`].
pub struct ArasaacCatalog {
    client: Client,
    base: Url,
    locale: String,
}

impl ArasaacCatalog {
    pub fn new(locale: &str) -> Result<Self, CatalogError> {
        let base = Url::parse(ARASAAC_API).map_err(|e| CatalogError::Malformed(e.to_string()))?;
        Self::with_base_url(base, locale)
    }

    /// Point the client at another deployment of the API.
    pub fn with_base_url(base: Url, locale: &str) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(concat!("picto-parser/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Http(e.to_string()))?;
        Ok(Self {
            client,
            base,
            locale: locale.to_string(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::Malformed(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Option<Value>, CatalogError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Http(e.to_string()))?;
        match response.status() {
            // The API answers 404 when nothing matches.
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => response
                .json::<Value>()
                .await
                .map(Some)
                .map_err(|e| CatalogError::Malformed(e.to_string())),
            s => Err(CatalogError::Status(s.as_u16())),
        }
    }
}

#[async_trait]
impl Catalog for ArasaacCatalog {
    async fn search_keyword(&self, word: &str, exact: bool) -> Result<Vec<Pictogram>, CatalogError> {
        let kind = if exact { "bestsearch" } else { "search" };
        let url = self.endpoint(&["pictograms", &self.locale, kind, word])?;
        let Some(body) = self.get_json(url).await? else {
            return Ok(vec![]);
        };
        let Value::Array(records) = body else {
            return Err(CatalogError::Malformed("search result is not an array".into()));
        };
        let options = ImageOptions {
            color: true,
            ..ImageOptions::default()
        };
        Ok(parse_records(records, word, &options))
    }

    async fn image_from_id(&self, id: u32, options: &ImageOptions) -> Result<Pictogram, CatalogError> {
        let url = self.endpoint(&["pictograms", &self.locale, &id.to_string()])?;
        let body = self
            .get_json(url)
            .await?
            .ok_or(CatalogError::Status(StatusCode::NOT_FOUND.as_u16()))?;
        let raw: RawPictogram =
            serde_json::from_value(body).map_err(|e| CatalogError::Malformed(e.to_string()))?;
        Ok(raw.into_pictogram(None, options))
    }
}

/// Convert search records, skipping the ones that fail validation.
fn parse_records(records: Vec<Value>, word: &str, options: &ImageOptions) -> Vec<Pictogram> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<RawPictogram>(record) {
            Ok(raw) => Some(raw.into_pictogram(Some(word), options)),
            Err(e) => {
                debug!(%word, error = %e, "skipping malformed catalog record");
                None
            }
        })
        .collect()
}
