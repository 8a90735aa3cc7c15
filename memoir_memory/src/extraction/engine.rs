//! Extraction engine.
//!
//! Drives the pattern catalog and an entity tagger over a message batch and
//! folds the hits into a deduplicated [`MemoryRecord`].

use std::collections::HashSet;

use chrono::Utc;
use memoir_core::{
    DEFAULT_USER_ID, EmotionalPatternRecord, EntityTagger, Error, FactRecord, FactType,
    MemoryRecord, Message, PreferenceRecord, RawExtraction,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dedup::SeenKeys;
use crate::extraction::catalog::{
    BuildError, Detector, DetectorDef, EMOTION_CONFIDENCE, EmotionDef, EmotionDetector,
    default_detectors, default_emotions,
};
use crate::extraction::tagger::RuleBasedTagger;

/// Confidence of every tagger-derived fact.
pub const FACT_CONFIDENCE: f32 = 0.88;

/// Configuration for the extraction engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Preference detectors, in evaluation order.
    #[serde(default = "default_detectors")]
    pub detectors: Vec<DetectorDef>,

    /// Emotional-pattern detectors.
    #[serde(default = "default_emotions")]
    pub emotions: Vec<EmotionDef>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            detectors: default_detectors(),
            emotions: default_emotions(),
        }
    }
}

/// Deterministic memory extractor.
///
/// Holds only read-only tables and the tagger handle, so one instance can
/// serve concurrent callers.
pub struct Extractor {
    detectors: Vec<Detector>,
    emotions: Vec<EmotionDetector>,
    tagger: Box<dyn EntityTagger>,
}

impl Extractor {
    /// Create an extractor from configuration and a tagger.
    ///
    /// # Errors
    /// Returns an error if a detector fails to compile.
    pub fn new(
        config: &ExtractionConfig,
        tagger: impl EntityTagger + 'static,
    ) -> Result<Self, BuildError> {
        let detectors = config
            .detectors
            .iter()
            .map(DetectorDef::build)
            .collect::<Result<Vec<_>, _>>()?;
        let emotions = config
            .emotions
            .iter()
            .map(EmotionDef::build)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            detectors,
            emotions,
            tagger: Box::new(tagger),
        })
    }

    /// Create an extractor with the default catalog and the rule-based tagger.
    ///
    /// # Errors
    /// Returns an error if default compilation fails.
    pub fn with_defaults() -> Result<Self, BuildError> {
        let tagger = RuleBasedTagger::new().map_err(|e| BuildError::Tagger(e.to_string()))?;
        Self::new(&ExtractionConfig::default(), tagger)
    }

    /// Extract a memory record from one batch.
    ///
    /// Only user messages are read, in input order. Every record cites the
    /// `index` of the first message that produced it.
    ///
    /// # Errors
    /// Returns [`Error::Tagger`] if the entity tagger fails; no partial record
    /// is returned.
    pub fn extract(&self, messages: &[Message]) -> memoir_core::Result<MemoryRecord> {
        let mut preferences = Vec::new();
        let mut emotional_patterns = Vec::new();
        let mut facts = Vec::new();
        let mut raw_extractions = Vec::new();

        let mut seen_preferences = SeenKeys::new();
        let mut seen_emotions = HashSet::new();
        let mut seen_facts = SeenKeys::new();

        for message in messages.iter().filter(|m| m.is_user()) {
            let index = message.index;
            let content = message.content.as_str();

            for detector in &self.detectors {
                let Some(detection) = detector.detect(content) else {
                    continue;
                };
                if seen_preferences.insert(&detector.name, &detection.matched) {
                    preferences.push(PreferenceRecord {
                        category: detection.category,
                        value: detection.value,
                        confidence: detection.confidence,
                        source_messages: vec![index],
                    });
                }
            }

            for emotion in &self.emotions {
                if !seen_emotions.contains(&emotion.pattern) && emotion.is_match(content) {
                    seen_emotions.insert(emotion.pattern);
                    emotional_patterns.push(EmotionalPatternRecord {
                        pattern: emotion.pattern,
                        confidence: EMOTION_CONFIDENCE,
                        source_messages: vec![index],
                    });
                }
            }

            let entities = self
                .tagger
                .tag(content)
                .map_err(|e| Error::Tagger(e.to_string()))?;
            for entity in entities {
                if !seen_facts.insert(entity.category.as_str(), &entity.span) {
                    continue;
                }
                facts.push(FactRecord {
                    fact_type: FactType::from_entity(&entity.category),
                    value: entity.span.clone(),
                    confidence: FACT_CONFIDENCE,
                    source_messages: vec![index],
                });
                raw_extractions.push(RawExtraction {
                    text: entity.span,
                    message_index: index,
                    entity_category: entity.category,
                });
            }
        }

        debug!(
            messages = messages.len(),
            preferences = preferences.len(),
            emotional_patterns = emotional_patterns.len(),
            facts = facts.len(),
            "Deterministic extraction finished"
        );

        Ok(MemoryRecord {
            user_id: DEFAULT_USER_ID.to_string(),
            generated_at: Utc::now(),
            preferences,
            emotional_patterns,
            facts,
            raw_extractions,
        })
    }

    /// Extract independent batches in parallel.
    ///
    /// Results are returned in batch order.
    #[must_use]
    pub fn extract_many(&self, batches: &[Vec<Message>]) -> Vec<memoir_core::Result<MemoryRecord>> {
        batches.par_iter().map(|batch| self.extract(batch)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoir_core::{EmotionalPattern, EntityCategory, PreferenceCategory, Role, TaggedEntity};

    /// Tags a fixed span wherever it appears.
    struct StubTagger(Vec<TaggedEntity>);

    impl EntityTagger for StubTagger {
        fn tag(&self, text: &str) -> anyhow::Result<Vec<TaggedEntity>> {
            Ok(self
                .0
                .iter()
                .filter(|e| text.to_lowercase().contains(&e.span.to_lowercase()))
                .cloned()
                .collect())
        }
    }

    struct FailingTagger;

    impl EntityTagger for FailingTagger {
        fn tag(&self, _text: &str) -> anyhow::Result<Vec<TaggedEntity>> {
            anyhow::bail!("model not loaded")
        }
    }

    fn extractor(tagger: impl EntityTagger + 'static) -> Extractor {
        Extractor::new(&ExtractionConfig::default(), tagger)
            .unwrap_or_else(|e| panic!("default catalog should build: {e}"))
    }

    fn extract(tagger: impl EntityTagger + 'static, messages: &[Message]) -> MemoryRecord {
        extractor(tagger)
            .extract(messages)
            .unwrap_or_else(|e| panic!("extraction should succeed: {e}"))
    }

    #[test]
    fn repeated_phrase_yields_one_preference() {
        let messages = vec![
            Message::user(0, "I'm vegetarian"),
            Message::user(1, "I'm vegetarian btw"),
            Message::user(2, "Did I mention I'm vegetarian?"),
        ];
        let record = extract(StubTagger(vec![]), &messages);

        let vegetarian: Vec<_> = record
            .preferences
            .iter()
            .filter(|p| p.value.contains("vegetarian"))
            .collect();
        assert_eq!(vegetarian.len(), 1);
        assert_eq!(vegetarian[0].source_messages, vec![0]);
        assert_eq!(vegetarian[0].category, PreferenceCategory::Food);
    }

    #[test]
    fn non_user_messages_are_skipped() {
        let messages = vec![
            Message::new(0, Role::Assistant, "I use Linux and I'm stressed"),
            Message::new(1, Role::System, "You are vegetarian"),
            Message::user(2, "hello"),
        ];
        let tagger = StubTagger(vec![TaggedEntity::new("Linux", EntityCategory::Product)]);
        let record = extract(tagger, &messages);
        assert!(record.is_empty());
        assert!(record.raw_extractions.is_empty());
    }

    #[test]
    fn source_index_is_the_message_index_not_its_position() {
        let messages = vec![
            Message::user(40, "hello there"),
            Message::user(17, "I work from home on Linux"),
        ];
        let record = extract(StubTagger(vec![]), &messages);
        assert!(!record.preferences.is_empty());
        assert!(record.preferences.iter().all(|p| p.source_messages == vec![17]));
    }

    #[test]
    fn parameterized_detectors_build_values() {
        let messages = vec![
            Message::user(0, "I'm allergic to shellfish"),
            Message::user(1, "My dog Biscuit snores"),
        ];
        let record = extract(StubTagger(vec![]), &messages);

        let allergy = record.preferences.iter().find(|p| p.category == PreferenceCategory::Health);
        assert_eq!(allergy.map(|p| p.value.as_str()), Some("allergic to shellfish"));
        assert!(allergy.is_some_and(|p| (p.confidence - 0.95).abs() < f32::EPSILON));

        let pet = record.preferences.iter().find(|p| p.category == PreferenceCategory::Lifestyle);
        assert_eq!(pet.map(|p| p.value.as_str()), Some("has dog named Biscuit"));
    }

    #[test]
    fn emotional_patterns_are_emitted_once() {
        let messages = vec![
            Message::user(0, "I'm so stressed about the launch"),
            Message::user(1, "still overwhelmed, and tired"),
        ];
        let record = extract(StubTagger(vec![]), &messages);

        let stress: Vec<_> = record
            .emotional_patterns
            .iter()
            .filter(|e| e.pattern == EmotionalPattern::Stress)
            .collect();
        assert_eq!(stress.len(), 1);
        assert_eq!(stress[0].source_messages, vec![0]);

        let tired = record
            .emotional_patterns
            .iter()
            .find(|e| e.pattern == EmotionalPattern::Tired);
        assert_eq!(tired.map(|e| e.source_messages.clone()), Some(vec![1]));
    }

    #[test]
    fn facts_are_deduplicated_case_insensitively() {
        let tagger = StubTagger(vec![TaggedEntity::new("Berlin", EntityCategory::Gpe)]);
        let messages = vec![
            Message::user(3, "I live in Berlin"),
            Message::user(4, "berlin is cold"),
        ];
        let record = extract(tagger, &messages);

        assert_eq!(record.facts.len(), 1);
        assert_eq!(record.facts[0].fact_type, FactType::Location);
        assert_eq!(record.facts[0].source_messages, vec![3]);
        assert_eq!(record.raw_extractions.len(), 1);
        assert_eq!(record.raw_extractions[0].message_index, 3);
        assert_eq!(record.raw_extractions[0].entity_category, EntityCategory::Gpe);
    }

    #[test]
    fn same_span_in_different_categories_is_two_facts() {
        let tagger = StubTagger(vec![
            TaggedEntity::new("Jordan", EntityCategory::Person),
            TaggedEntity::new("Jordan", EntityCategory::Gpe),
        ]);
        let record = extract(tagger, &[Message::user(0, "Jordan")]);
        assert_eq!(record.facts.len(), 2);
    }

    #[test]
    fn tagger_failure_fails_the_whole_call() {
        let result = extractor(FailingTagger).extract(&[Message::user(0, "I use Linux")]);
        assert!(matches!(result, Err(Error::Tagger(_))));
    }

    #[test]
    fn confidences_are_within_bounds() {
        let messages = vec![
            Message::user(0, "I'm vegan, allergic to nuts, stressed, and I live in Paris"),
            Message::user(1, "My cat Miso and I work late on Linux"),
        ];
        let tagger = StubTagger(vec![TaggedEntity::new("Paris", EntityCategory::Gpe)]);
        let record = extract(tagger, &messages);

        let confidences = record
            .preferences
            .iter()
            .map(|p| p.confidence)
            .chain(record.emotional_patterns.iter().map(|e| e.confidence))
            .chain(record.facts.iter().map(|f| f.confidence));
        for confidence in confidences {
            assert!((0.0..=1.0).contains(&confidence));
        }
    }

    #[test]
    fn empty_batch_gives_empty_record() {
        let record = extract(StubTagger(vec![]), &[]);
        assert!(record.is_empty());
        assert_eq!(record.user_id, DEFAULT_USER_ID);
    }

    #[test]
    fn extract_many_keeps_batch_order() {
        let extractor = extractor(StubTagger(vec![]));
        let batches = vec![
            vec![Message::user(0, "I use Linux")],
            vec![Message::user(0, "I'm an early bird")],
        ];
        let results = extractor.extract_many(&batches);
        assert_eq!(results.len(), 2);
        let values: Vec<String> = results
            .into_iter()
            .map(|r| r.map(|m| m.preferences[0].value.clone()).unwrap_or_default())
            .collect();
        assert_eq!(values, vec!["linux".to_string(), "early bird".to_string()]);
    }
}
