use std::collections::BTreeMap;
use std::sync::Arc;

use memoir_core::{MemoryAssist, MemoryRecord, Message, Personality, Result};
use memoir_memory::{BuildError, Extractor, RecordValidator};
use memoir_persona::PersonalityEngine;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Which path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Llm,
    Deterministic,
}

impl Method {
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::Llm => "llm",
            Self::Deterministic => "deterministic",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub record: MemoryRecord,
    pub method: Method,
}

#[derive(Debug, Clone, Serialize)]
pub struct Rewrite {
    pub original: String,
    pub rewritten: String,
    pub personality: Personality,
    pub method: Method,
}

#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub llm_available: bool,
    pub components: BTreeMap<&'static str, &'static str>,
}

pub struct MemoryService {
    extractor: Extractor,
    personality: PersonalityEngine,
    validator: RecordValidator,
    assist: Option<Arc<dyn MemoryAssist>>,
}

impl MemoryService {
    #[must_use]
    pub fn new(extractor: Extractor) -> Self {
        Self {
            extractor,
            personality: PersonalityEngine::new(),
            validator: RecordValidator::new(),
            assist: None,
        }
    }

    /// Service over the default catalog and rule-based tagger.
    pub fn with_defaults() -> std::result::Result<Self, BuildError> {
        Ok(Self::new(Extractor::with_defaults()?))
    }

    #[must_use]
    pub fn with_assist(mut self, assist: Arc<dyn MemoryAssist>) -> Self {
        self.assist = Some(assist);
        self
    }

    #[must_use]
    pub fn llm_available(&self) -> bool {
        self.assist.as_ref().is_some_and(|a| a.is_available())
    }

    fn assist_for(&self, use_llm: bool) -> Option<&Arc<dyn MemoryAssist>> {
        if !use_llm {
            return None;
        }
        let assist = self.assist.as_ref().filter(|a| a.is_available());
        if assist.is_none() {
            info!("LLM requested but not available");
        }
        assist
    }

    /// Extract a memory record from one batch.
    ///
    /// With `use_llm`, the LLM assist is tried first; if it cannot serve the
    /// request the deterministic extractor is used. Either way the record is
    /// validated against the batch before it is returned.
    ///
    /// # Errors
    /// [`memoir_core::Error::Tagger`] if deterministic extraction fails, and
    /// [`memoir_core::Error::SchemaViolation`] if the produced record is
    /// invalid.
    #[tracing::instrument(skip(self, messages), fields(messages = messages.len()))]
    pub async fn extract(&self, messages: &[Message], use_llm: bool) -> Result<Extraction> {
        if let Some(assist) = self.assist_for(use_llm) {
            info!("Using LLM for extraction");
            match assist.extract_memories(messages).await {
                Ok(record) => return self.validated(record, messages, Method::Llm),
                Err(e) if e.is_capability_unavailable() => {
                    warn!("LLM extraction failed: {e}. Falling back to deterministic.");
                }
                Err(e) => return Err(e),
            }
        } else {
            info!("Using deterministic extraction");
        }

        let record = self.extractor.extract(messages)?;
        self.validated(record, messages, Method::Deterministic)
    }

    /// Deterministically extract independent batches in parallel.
    ///
    /// Results are in batch order; one failing batch does not affect the
    /// others.
    pub fn extract_batches(&self, batches: &[Vec<Message>]) -> Vec<Result<Extraction>> {
        info!(batches = batches.len(), "Using deterministic extraction");
        self.extractor
            .extract_many(batches)
            .into_iter()
            .zip(batches)
            .map(|(record, messages)| self.validated(record?, messages, Method::Deterministic))
            .collect()
    }

    fn validated(
        &self,
        record: MemoryRecord,
        messages: &[Message],
        method: Method,
    ) -> Result<Extraction> {
        self.validator.validate(&record, messages)?;
        Ok(Extraction { record, method })
    }

    /// Rewrite `text` in the personality named by `key`.
    ///
    /// The key is checked before anything else. Critical tokens of `text` are
    /// guarded on both paths.
    ///
    /// # Errors
    /// [`memoir_core::Error::InvalidPersonality`] for an unknown key.
    #[tracing::instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn rewrite(&self, text: &str, key: &str, use_llm: bool) -> Result<Rewrite> {
        let personality: Personality = key.parse()?;

        if let Some(assist) = self.assist_for(use_llm) {
            info!("Using LLM for rewriting with personality: {personality}");
            match assist.rewrite(text, personality).await {
                Ok(styled) => {
                    return Ok(Rewrite {
                        original: text.to_string(),
                        rewritten: self.personality.guard(text, &styled),
                        personality,
                        method: Method::Llm,
                    });
                }
                Err(e) if e.is_capability_unavailable() => {
                    warn!("LLM rewrite failed: {e}. Falling back to deterministic.");
                }
                Err(e) => return Err(e),
            }
        } else {
            info!("Using deterministic rewriting with personality: {personality}");
        }

        let rewritten = self
            .personality
            .rewrite_with(text, personality, &mut rand::thread_rng());
        Ok(Rewrite {
            original: text.to_string(),
            rewritten,
            personality,
            method: Method::Deterministic,
        })
    }

    /// Memory-aware reply for `record` in the personality named by `key`.
    ///
    /// # Errors
    /// [`memoir_core::Error::InvalidPersonality`] for an unknown key.
    pub fn respond(&self, record: &MemoryRecord, key: &str) -> Result<String> {
        let personality: Personality = key.parse()?;
        Ok(memoir_persona::respond(
            record,
            personality,
            &mut rand::thread_rng(),
        ))
    }

    #[must_use]
    pub fn health(&self) -> Health {
        let llm_available = self.llm_available();
        let components = BTreeMap::from([
            ("extractor", "operational"),
            ("personality_engine", "operational"),
            ("validator", "operational"),
            ("llm", if llm_available { "operational" } else { "unavailable" }),
        ]);
        Health {
            llm_available,
            components,
        }
    }
}
