use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tagger::EntityCategory;

/// Subject every record is attributed to. There is no multi-user resolution.
pub const DEFAULT_USER_ID: &str = "default_user";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceCategory {
    Food,
    Music,
    WorkStyle,
    Technology,
    Communication,
    Personality,
    Lifestyle,
    Hobby,
    Health,
    #[default]
    General,
}

impl PreferenceCategory {
    pub const ALL: [Self; 10] = [
        Self::Food,
        Self::Music,
        Self::WorkStyle,
        Self::Technology,
        Self::Communication,
        Self::Personality,
        Self::Lifestyle,
        Self::Hobby,
        Self::Health,
        Self::General,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::Food => "food",
            Self::Music => "music",
            Self::WorkStyle => "work_style",
            Self::Technology => "technology",
            Self::Communication => "communication",
            Self::Personality => "personality",
            Self::Lifestyle => "lifestyle",
            Self::Hobby => "hobby",
            Self::Health => "health",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for PreferenceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PreferenceCategory {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or("unknown preference category")
    }
}

/// Emotional patterns the extractor recognises.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalPattern {
    Stress,
    Appreciation,
    Overthinking,
    Excited,
    Tired,
    Happy,
    Confused,
}

impl EmotionalPattern {
    pub const ALL: [Self; 7] = [
        Self::Stress,
        Self::Appreciation,
        Self::Overthinking,
        Self::Excited,
        Self::Tired,
        Self::Happy,
        Self::Confused,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::Stress => "stress",
            Self::Appreciation => "appreciation",
            Self::Overthinking => "overthinking",
            Self::Excited => "excited",
            Self::Tired => "tired",
            Self::Happy => "happy",
            Self::Confused => "confused",
        }
    }
}

impl std::fmt::Display for EmotionalPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum FactType {
    Location,
    Date,
    Time,
    Person,
    Organization,
    Product,
    Event,
    Language,
    #[default]
    General,
}

impl FactType {
    pub const ALL: [Self; 9] = [
        Self::Location,
        Self::Date,
        Self::Time,
        Self::Person,
        Self::Organization,
        Self::Product,
        Self::Event,
        Self::Language,
        Self::General,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::Location => "location",
            Self::Date => "date",
            Self::Time => "time",
            Self::Person => "person",
            Self::Organization => "organization",
            Self::Product => "product",
            Self::Event => "event",
            Self::Language => "language",
            Self::General => "general",
        }
    }

    /// Map a tagger category onto the fact taxonomy.
    #[must_use]
    pub const fn from_entity(category: &EntityCategory) -> Self {
        match category {
            EntityCategory::Gpe | EntityCategory::Loc => Self::Location,
            EntityCategory::Date => Self::Date,
            EntityCategory::Time => Self::Time,
            EntityCategory::Person => Self::Person,
            EntityCategory::Org => Self::Organization,
            EntityCategory::Product => Self::Product,
            EntityCategory::Event => Self::Event,
            EntityCategory::Language => Self::Language,
            EntityCategory::Other(_) => Self::General,
        }
    }
}

impl std::fmt::Display for FactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreferenceRecord {
    pub category: PreferenceCategory,
    pub value: String,
    pub confidence: f32,
    pub source_messages: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmotionalPatternRecord {
    pub pattern: EmotionalPattern,
    pub confidence: f32,
    pub source_messages: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactRecord {
    pub fact_type: FactType,
    pub value: String,
    pub confidence: f32,
    pub source_messages: Vec<usize>,
}

/// Audit trail entry, one per unique fact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawExtraction {
    pub text: String,
    pub message_index: usize,
    #[serde(alias = "entity_type")]
    pub entity_category: EntityCategory,
}

/// Structured memory distilled from one batch of messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    pub user_id: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub preferences: Vec<PreferenceRecord>,
    #[serde(default)]
    pub emotional_patterns: Vec<EmotionalPatternRecord>,
    #[serde(default)]
    pub facts: Vec<FactRecord>,
    #[serde(default)]
    pub raw_extractions: Vec<RawExtraction>,
}

impl MemoryRecord {
    /// An empty record stamped with the current time.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            generated_at: Utc::now(),
            preferences: Vec::new(),
            emotional_patterns: Vec::new(),
            facts: Vec::new(),
            raw_extractions: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.preferences.is_empty() && self.emotional_patterns.is_empty() && self.facts.is_empty()
    }

    /// Every message index referenced anywhere in the record.
    pub fn source_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.preferences
            .iter()
            .flat_map(|p| p.source_messages.iter().copied())
            .chain(
                self.emotional_patterns
                    .iter()
                    .flat_map(|e| e.source_messages.iter().copied()),
            )
            .chain(self.facts.iter().flat_map(|f| f.source_messages.iter().copied()))
            .chain(self.raw_extractions.iter().map(|r| r.message_index))
    }
}
