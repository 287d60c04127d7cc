//! Taxon page lookup parameters.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{EolError, Result};

/// Trust level filter for returned content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vetted {
    /// All content.
    #[default]
    All,
    /// Only trusted content.
    Trusted,
    /// Trusted and unreviewed content.
    TrustedAndUnreviewed,
}

impl Vetted {
    fn as_param(self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Trusted => Some("1"),
            Self::TrustedAndUnreviewed => Some("2"),
        }
    }
}

/// Parameters for fetching one taxon page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaxonPageQuery {
    /// EOL page id.
    pub id: u64,
    /// Maximum image objects.
    #[serde(default)]
    pub images: u32,
    /// Maximum video objects.
    #[serde(default)]
    pub videos: u32,
    /// Maximum sound objects.
    #[serde(default)]
    pub sounds: u32,
    /// Maximum map objects.
    #[serde(default)]
    pub maps: u32,
    /// Maximum text objects.
    #[serde(default)]
    pub text: u32,
    /// Include the IUCN Red List status.
    #[serde(default)]
    pub iucn: bool,
    /// `overview`, `all`, or a `|`-separated list of subject names.
    #[serde(default)]
    pub subjects: Option<String>,
    /// `all` or a `|`-separated list of licenses (cc-by, cc-by-nc, pd, ...).
    #[serde(default)]
    pub licenses: Option<String>,
    /// Include all metadata for data objects.
    #[serde(default)]
    pub details: bool,
    /// Include every common name.
    #[serde(default)]
    pub common_names: bool,
    /// Include every synonym.
    #[serde(default)]
    pub synonyms: bool,
    /// Include references.
    #[serde(default)]
    pub references: bool,
    /// Trust level filter.
    #[serde(default)]
    pub vetted: Vetted,
    /// Seconds the API should cache the response for; zero disables.
    #[serde(default)]
    pub cache_ttl: u32,
}

impl TaxonPageQuery {
    /// Creates a query for a page id with no media.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Sets how many images, texts, videos, sounds and maps to return.
    #[must_use]
    pub fn with_media(mut self, images: u32, text: u32, videos: u32, sounds: u32, maps: u32) -> Self {
        self.images = images;
        self.text = text;
        self.videos = videos;
        self.sounds = sounds;
        self.maps = maps;
        self
    }

    /// Includes data object metadata.
    #[must_use]
    pub fn with_details(mut self) -> Self {
        self.details = true;
        self
    }

    /// Includes synonyms.
    #[must_use]
    pub fn with_synonyms(mut self) -> Self {
        self.synonyms = true;
        self
    }

    /// Includes common names.
    #[must_use]
    pub fn with_common_names(mut self) -> Self {
        self.common_names = true;
        self
    }

    /// Sets the trust filter.
    #[must_use]
    pub fn with_vetted(mut self, vetted: Vetted) -> Self {
        self.vetted = vetted;
        self
    }

    /// Rejects queries that cannot be sent.
    pub fn validate(&self) -> Result<()> {
        if self.id == 0 {
            return Err(EolError::Validation("a page id is required".to_string()));
        }
        Ok(())
    }

    /// Builds the request URL under an API root.
    pub fn request_url(&self, api_root: &Url) -> Result<Url> {
        let mut url = api_root.join(&format!("pages/1.0/{}.json", self.id))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("images", &self.images.to_string());
            pairs.append_pair("videos", &self.videos.to_string());
            pairs.append_pair("sounds", &self.sounds.to_string());
            pairs.append_pair("maps", &self.maps.to_string());
            pairs.append_pair("text", &self.text.to_string());
            pairs.append_pair("iucn", if self.iucn { "true" } else { "false" });
            if let Some(subjects) = self.subjects.as_deref().filter(|s| !s.is_empty()) {
                pairs.append_pair("subjects", subjects);
            }
            if let Some(licenses) = self.licenses.as_deref().filter(|s| !s.is_empty()) {
                pairs.append_pair("licenses", licenses);
            }
            for (flag, name) in [
                (self.common_names, "common_names"),
                (self.details, "details"),
                (self.synonyms, "synonyms"),
                (self.references, "references"),
            ] {
                if flag {
                    pairs.append_pair(name, "true");
                }
            }
            if let Some(vetted) = self.vetted.as_param() {
                pairs.append_pair("vetted", vetted);
            }
            if self.cache_ttl > 0 {
                pairs.append_pair("cache_ttl", &self.cache_ttl.to_string());
            }
        }
        Ok(url)
    }
}
