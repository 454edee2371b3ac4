// The external pictogram catalog boundary.
//
// The extractor only talks to the catalog through `Catalog`. Failures and
// empty answers both mean "no match"; the orchestrator never propagates
// them.

use async_trait::async_trait;
use url::Url;

use crate::error::CatalogError;
use crate::types::{DisplaySettings, HairTone, Pictogram, PictogramId, SkinTone, Source};

/// Base of the ARASAAC pictogram API.
pub const ARASAAC_API: &str = "https://api.arasaac.org/api/";

/// Image URL of a catalog pictogram with default variants.
pub fn image_url(id: u32) -> String {
    format!("{ARASAAC_API}pictograms/{id}")
}

/// Variant parameters for a catalog image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageOptions {
    pub color: bool,
    pub skin: Option<SkinTone>,
    pub hair: Option<HairTone>,
}

impl ImageOptions {
    pub fn from_settings(settings: &DisplaySettings) -> Self {
        Self {
            color: true,
            skin: settings.skin,
            hair: settings.hair,
        }
    }
}

/// Image URL of a catalog pictogram with explicit variants.
pub fn variant_url(id: u32, options: &ImageOptions) -> String {
    let mut url = format!("{}?color={}", image_url(id), options.color);
    if let Some(skin) = options.skin {
        url.push_str("&skin=");
        url.push_str(skin.as_str());
    }
    if let Some(hair) = options.hair {
        url.push_str("&hair=");
        url.push_str(hair.as_str());
    }
    url
}

/// Rewrite the skin/hair parameters of a pictogram's image to match the
/// user's settings. Only dimensions the pictogram supports are touched;
/// images that are not URLs are left alone.
pub fn apply_variants(pictogram: &mut Pictogram, settings: &DisplaySettings) {
    let skin = settings.skin.filter(|_| pictogram.skin);
    let hair = settings.hair.filter(|_| pictogram.hair);
    if skin.is_none() && hair.is_none() {
        return;
    }
    let Ok(mut url) = Url::parse(&pictogram.image) else {
        return;
    };
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !(k == "skin" && skin.is_some()) && !(k == "hair" && hair.is_some()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.extend_pairs(&kept);
        if let Some(skin) = skin {
            query.append_pair("skin", skin.as_str());
        }
        if let Some(hair) = hair {
            query.append_pair("hair", hair.as_str());
        }
    }
    pictogram.image = url.into();
}

/// A searchable pictogram catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Pictograms matching `word`. `exact` asks for the catalog's best match
    /// rather than a broad keyword search.
    async fn search_keyword(&self, word: &str, exact: bool) -> Result<Vec<Pictogram>, CatalogError>;

    /// A pictogram by catalog id, with its image bound to `options`.
    async fn image_from_id(&self, id: u32, options: &ImageOptions) -> Result<Pictogram, CatalogError>;
}

/// A catalog with nothing in it, for offline use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCatalog;

#[async_trait]
impl Catalog for NoCatalog {
    async fn search_keyword(&self, _word: &str, _exact: bool) -> Result<Vec<Pictogram>, CatalogError> {
        Ok(vec![])
    }

    async fn image_from_id(&self, id: u32, options: &ImageOptions) -> Result<Pictogram, CatalogError> {
        Ok(Pictogram {
            id: PictogramId::Catalog(id),
            word: String::new(),
            image: variant_url(id, options),
            source: Source::Search,
            tags: vec![],
            categories: vec![],
            synsets: vec![],
            created: 0,
            skin: options.skin.is_some(),
            hair: options.hair.is_some(),
        })
    }
}
