//! Data models for taxon page responses.

use serde::{Deserialize, Serialize};

/// Dublin Core type URI for text data objects.
pub const DATA_TYPE_TEXT: &str = "http://purl.org/dc/dcmitype/Text";
/// Dublin Core type URI for still image data objects.
pub const DATA_TYPE_STILL_IMAGE: &str = "http://purl.org/dc/dcmitype/StillImage";

/// A contributor credited on a data object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Agent {
    /// Contributor name.
    #[serde(default)]
    pub full_name: String,
    /// Contributor homepage.
    #[serde(default)]
    pub homepage: String,
    /// Role such as author or photographer.
    #[serde(default)]
    pub role: String,
}

/// One media or text object attached to a taxon page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataObject {
    /// Credited contributors.
    #[serde(default)]
    pub agents: Vec<Agent>,
    /// Creation timestamp.
    #[serde(default)]
    pub created: String,
    /// Version id of this object.
    #[serde(default, rename = "dataObjectVersionID")]
    pub data_object_version_id: i64,
    /// Community rating.
    #[serde(default)]
    pub data_rating: f64,
    /// Subtype, e.g. map.
    #[serde(default)]
    pub data_subtype: String,
    /// Dublin Core type URI, see [`DATA_TYPE_TEXT`] and [`DATA_TYPE_STILL_IMAGE`].
    #[serde(default)]
    pub data_type: String,
    /// Text body, for text objects.
    #[serde(default)]
    pub description: String,
    /// Object identifier.
    #[serde(default)]
    pub identifier: String,
    /// Language code.
    #[serde(default)]
    pub language: String,
    /// License URI.
    #[serde(default)]
    pub license: String,
    /// MIME type.
    #[serde(default)]
    pub mime_type: String,
    /// Original media URL.
    #[serde(default, rename = "mediaURL")]
    pub media_url: String,
    /// EOL-hosted copy of the media.
    #[serde(default, rename = "eolMediaURL")]
    pub eol_media_url: String,
    /// Last modification timestamp.
    #[serde(default)]
    pub modified: String,
    /// Literature references.
    #[serde(default)]
    pub references: Vec<serde_json::Value>,
    /// Rights holder.
    #[serde(default)]
    pub rights_holder: String,
    /// Source page URL.
    #[serde(default)]
    pub source: String,
    /// Curation status.
    #[serde(default)]
    pub vetted_status: String,
    /// Subject URI for texts.
    #[serde(default)]
    pub subject: String,
    /// Image height in pixels.
    #[serde(default)]
    pub height: u32,
    /// Image width in pixels.
    #[serde(default)]
    pub width: u32,
}

impl DataObject {
    /// Whether this object is a text.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.data_type == DATA_TYPE_TEXT
    }

    /// Whether this object is a still image.
    #[must_use]
    pub fn is_still_image(&self) -> bool {
        self.data_type == DATA_TYPE_STILL_IMAGE
    }
}

/// An alternative name for the taxon.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Synonym {
    /// Kind of synonym.
    #[serde(default)]
    pub relationship: String,
    /// Source hierarchy.
    #[serde(default)]
    pub resource: String,
    /// The alternative name.
    #[serde(default)]
    pub synonym: String,
}

/// The taxon as described by one source hierarchy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaxonConcept {
    /// Canonical name.
    #[serde(default)]
    pub canonical_form: String,
    /// EOL identifier.
    #[serde(default)]
    pub identifier: i64,
    /// Source hierarchy name.
    #[serde(default)]
    pub name_according_to: String,
    /// Scientific name with authority.
    #[serde(default)]
    pub scientific_name: String,
    /// Identifier within the source hierarchy (the API misspells the key).
    #[serde(default, rename = "sourceIdentfier")]
    pub source_identifier: String,
    /// Rank, e.g. Species.
    #[serde(default)]
    pub taxon_rank: String,
}

/// A common name in some language.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VernacularName {
    /// Whether EOL prefers this name for its language.
    #[serde(default)]
    pub eol_preferred: bool,
    /// Language code.
    #[serde(default)]
    pub language: String,
    /// The common name.
    #[serde(default, rename = "vernacularName")]
    pub vernacular_name: String,
}

/// A text or image value together with where it came from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Media {
    /// The text body or image URL.
    pub value: String,
    /// Attribution source.
    pub source: String,
}

/// One EOL taxon page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaxonPage {
    /// Attached texts and media.
    #[serde(default, rename = "dataObjects")]
    pub data_objects: Vec<DataObject>,
    /// EOL identifier.
    #[serde(default)]
    pub identifier: i64,
    /// Literature references.
    #[serde(default)]
    pub references: Vec<String>,
    /// EOL content richness score.
    #[serde(default)]
    pub richness_score: f64,
    /// Scientific name with authority.
    #[serde(default, rename = "scientificName")]
    pub scientific_name: String,
    /// Alternative names.
    #[serde(default)]
    pub synonyms: Vec<Synonym>,
    /// Descriptions of the taxon in source hierarchies.
    #[serde(default, rename = "taxonConcepts")]
    pub taxon_concepts: Vec<TaxonConcept>,
    /// Common names.
    #[serde(default, rename = "vernacularNames")]
    pub vernacular_names: Vec<VernacularName>,
}

impl TaxonPage {
    /// Text objects with a non-empty description.
    #[must_use]
    pub fn texts(&self) -> Vec<Media> {
        self.data_objects
            .iter()
            .filter(|o| o.is_text() && !o.description.is_empty())
            .map(|o| Media {
                value: o.description.clone(),
                source: o.source.clone(),
            })
            .collect()
    }

    /// Still images with an EOL-hosted media URL.
    #[must_use]
    pub fn images(&self) -> Vec<Media> {
        self.data_objects
            .iter()
            .filter(|o| o.is_still_image() && !o.eol_media_url.is_empty())
            .map(|o| Media {
                value: o.eol_media_url.clone(),
                source: o.source.clone(),
            })
            .collect()
    }

    /// The preferred English common name, if any.
    #[must_use]
    pub fn preferred_common_name(&self) -> Option<&str> {
        self.vernacular_names
            .iter()
            .find(|v| v.eol_preferred && v.language == "en")
            .map(|v| v.vernacular_name.as_str())
    }
}
