//! Taxon page lookup.
//!
//! A single request per lookup, no pagination.

mod models;
mod query;

pub use models::{
    Agent, DataObject, Media, Synonym, TaxonConcept, TaxonPage, VernacularName,
    DATA_TYPE_STILL_IMAGE, DATA_TYPE_TEXT,
};
pub use query::{TaxonPageQuery, Vetted};
