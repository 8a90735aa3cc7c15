//! Named-entity tagging seam.
//!
//! The extraction engine never recognises entities itself; it consumes any
//! [`EntityTagger`] implementation (a model-backed tagger or a rule-based
//! substitute).

use serde::{Deserialize, Serialize};

/// Entity labels, following the common span-tagger vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityCategory {
    /// Countries, cities, states.
    Gpe,
    /// Non-political locations: mountains, rivers, regions.
    Loc,
    Date,
    Time,
    Person,
    Org,
    Product,
    Event,
    Language,
    /// Any other label, carried verbatim.
    Other(String),
}

impl EntityCategory {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gpe => "GPE",
            Self::Loc => "LOC",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Person => "PERSON",
            Self::Org => "ORG",
            Self::Product => "PRODUCT",
            Self::Event => "EVENT",
            Self::Language => "LANGUAGE",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for EntityCategory {
    fn from(label: String) -> Self {
        match label.to_uppercase().as_str() {
            "GPE" => Self::Gpe,
            "LOC" => Self::Loc,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "PERSON" => Self::Person,
            "ORG" => Self::Org,
            "PRODUCT" => Self::Product,
            "EVENT" => Self::Event,
            "LANGUAGE" => Self::Language,
            _ => Self::Other(label),
        }
    }
}

impl From<EntityCategory> for String {
    fn from(category: EntityCategory) -> Self {
        match category {
            EntityCategory::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recognised entity span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedEntity {
    pub span: String,
    pub category: EntityCategory,
}

impl TaggedEntity {
    #[must_use]
    pub fn new(span: impl Into<String>, category: EntityCategory) -> Self {
        Self {
            span: span.into(),
            category,
        }
    }
}

/// Named-entity recognition capability.
///
/// A call may be slow but is never partial: it returns the full tagging of
/// `text` or an error.
pub trait EntityTagger: Send + Sync {
    fn tag(&self, text: &str) -> anyhow::Result<Vec<TaggedEntity>>;
}

impl<T: EntityTagger + ?Sized> EntityTagger for std::sync::Arc<T> {
    fn tag(&self, text: &str) -> anyhow::Result<Vec<TaggedEntity>> {
        (**self).tag(text)
    }
}
