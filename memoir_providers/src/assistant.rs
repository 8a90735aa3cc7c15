//! LLM-backed memory assist.
//!
//! Prompts a chat provider for extraction and rewriting. Every failure to
//! serve a request (transport, status, unparseable payload) is reported as
//! [`Error::CapabilityUnavailable`] so the caller can fall back.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use memoir_core::{
    ChatMessage, CompletionOptions, DEFAULT_USER_ID, EmotionalPattern, EmotionalPatternRecord,
    Error, FactRecord, FactType, LLMProvider, MemoryAssist, MemoryRecord, Message, Personality,
    PreferenceCategory, PreferenceRecord, Result,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

const EXTRACT_SYSTEM_PROMPT: &str =
    "You are a memory extraction assistant. Always return valid JSON.";

/// Sampling settings for the two prompts.
#[derive(Debug, Clone)]
pub struct AssistSettings {
    pub extract_temperature: f32,
    pub rewrite_temperature: f32,
    pub rewrite_max_tokens: u32,
}

impl Default for AssistSettings {
    fn default() -> Self {
        Self {
            extract_temperature: 0.3,
            rewrite_temperature: 0.7,
            rewrite_max_tokens: 200,
        }
    }
}

/// [`MemoryAssist`] over any [`LLMProvider`].
pub struct LlmAssistant<P: LLMProvider> {
    provider: P,
    settings: AssistSettings,
}

impl<P: LLMProvider> LlmAssistant<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            settings: AssistSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: AssistSettings) -> Self {
        self.settings = settings;
        self
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String> {
        self.provider
            .chat(messages, options)
            .await
            .map(|response| response.content)
            .map_err(|e| Error::CapabilityUnavailable(format!("LLM request failed: {e:#}")))
    }
}

fn extraction_prompt(messages: &[Message]) -> String {
    let transcript = messages
        .iter()
        .filter(|m| m.is_user())
        .map(|m| format!("[{}] {}: {}", m.index, m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n");
    let list = |items: Vec<&str>| items.join(", ");

    format!(
        "Analyze the following user messages and extract structured information.\n\n\
         Messages:\n{transcript}\n\n\
         Extract:\n\
         1. Preferences (categories: {categories})\n\
         2. Emotional patterns (patterns: {patterns})\n\
         3. Facts (fact types: {fact_types})\n\n\
         Return a JSON object with:\n\
         - preferences: array of {{category, value, confidence, source_messages}}\n\
         - emotional_patterns: array of {{pattern, confidence, source_messages}}\n\
         - facts: array of {{fact_type, value, confidence, source_messages}}\n\n\
         Confidence is a number between 0 and 1. Be specific and include the \
         bracketed message indices in source_messages.",
        categories = list(PreferenceCategory::ALL.iter().map(PreferenceCategory::as_str).collect()),
        patterns = list(EmotionalPattern::ALL.iter().map(EmotionalPattern::as_str).collect()),
        fact_types = list(FactType::ALL.iter().map(FactType::as_str).collect()),
    )
}

const fn rewrite_instruction(personality: Personality) -> &'static str {
    match personality {
        Personality::CalmMentor => {
            "Rewrite this in a calm, thoughtful, mentor-like tone. Be gentle and encouraging."
        }
        Personality::WittyFriend => {
            "Rewrite this in a casual, witty, friendly tone. Add some humor and emojis."
        }
        Personality::Therapist => {
            "Rewrite this in a validating, empathetic therapist tone. Add reflective questions."
        }
    }
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    preferences: Vec<PayloadPreference>,
    #[serde(default)]
    emotional_patterns: Vec<PayloadEmotion>,
    #[serde(default)]
    facts: Vec<PayloadFact>,
}

#[derive(Debug, Deserialize)]
struct PayloadPreference {
    #[serde(default)]
    category: String,
    value: String,
    confidence: f32,
    #[serde(default)]
    source_messages: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct PayloadEmotion {
    pattern: String,
    confidence: f32,
    #[serde(default)]
    source_messages: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct PayloadFact {
    #[serde(default)]
    fact_type: String,
    value: String,
    confidence: f32,
    #[serde(default)]
    source_messages: Vec<usize>,
}

/// Parse a snake_case vocabulary label.
fn label<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let normalized = raw.trim().to_lowercase().replace([' ', '-'], "_");
    serde_json::from_value(Value::String(normalized)).ok()
}

/// Strip a Markdown code fence some models wrap JSON in.
fn unfence(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, str::trim)
}

/// Turn a model payload into a record citing only user messages of the batch.
///
/// Entries whose sources all fall outside the batch are dropped; unknown
/// emotional patterns are dropped; unknown categories and fact types fall
/// back to `general`. Confidences are kept as given.
fn into_record(payload: Payload, messages: &[Message]) -> MemoryRecord {
    let user_indices: HashSet<usize> = messages
        .iter()
        .filter(|m| m.is_user())
        .map(|m| m.index)
        .collect();
    let cited = |sources: Vec<usize>| -> Option<Vec<usize>> {
        let mut kept: Vec<usize> = Vec::with_capacity(sources.len());
        for index in sources {
            if user_indices.contains(&index) && !kept.contains(&index) {
                kept.push(index);
            }
        }
        (!kept.is_empty()).then_some(kept)
    };

    let preferences = payload
        .preferences
        .into_iter()
        .filter_map(|p| {
            Some(PreferenceRecord {
                category: label(&p.category).unwrap_or_default(),
                value: p.value,
                confidence: p.confidence,
                source_messages: cited(p.source_messages)?,
            })
        })
        .collect();

    let emotional_patterns = payload
        .emotional_patterns
        .into_iter()
        .filter_map(|e| {
            let Some(pattern) = label::<EmotionalPattern>(&e.pattern) else {
                debug!(pattern = %e.pattern, "Dropping unknown emotional pattern");
                return None;
            };
            Some(EmotionalPatternRecord {
                pattern,
                confidence: e.confidence,
                source_messages: cited(e.source_messages)?,
            })
        })
        .collect();

    let facts = payload
        .facts
        .into_iter()
        .filter_map(|f| {
            Some(FactRecord {
                fact_type: label(&f.fact_type).unwrap_or_default(),
                value: f.value,
                confidence: f.confidence,
                source_messages: cited(f.source_messages)?,
            })
        })
        .collect();

    MemoryRecord {
        user_id: DEFAULT_USER_ID.to_string(),
        generated_at: Utc::now(),
        preferences,
        emotional_patterns,
        facts,
        raw_extractions: Vec::new(),
    }
}

#[async_trait]
impl<P: LLMProvider> MemoryAssist for LlmAssistant<P> {
    fn is_available(&self) -> bool {
        true
    }

    async fn extract_memories(&self, messages: &[Message]) -> Result<MemoryRecord> {
        let chat = [
            ChatMessage::system(EXTRACT_SYSTEM_PROMPT),
            ChatMessage::user(extraction_prompt(messages)),
        ];
        let options = CompletionOptions {
            temperature: Some(self.settings.extract_temperature),
            json_response: true,
            ..CompletionOptions::default()
        };

        let content = self.complete(&chat, &options).await?;
        let payload: Payload = serde_json::from_str(unfence(&content)).map_err(|e| {
            Error::CapabilityUnavailable(format!("LLM returned an unreadable payload: {e}"))
        })?;

        let record = into_record(payload, messages);
        info!(
            preferences = record.preferences.len(),
            emotional_patterns = record.emotional_patterns.len(),
            facts = record.facts.len(),
            "LLM extraction finished"
        );
        Ok(record)
    }

    async fn rewrite(&self, text: &str, personality: Personality) -> Result<String> {
        let chat = [
            ChatMessage::system(rewrite_instruction(personality)),
            ChatMessage::user(format!("Rewrite this: {text}")),
        ];
        let options = CompletionOptions {
            temperature: Some(self.settings.rewrite_temperature),
            max_tokens: Some(self.settings.rewrite_max_tokens),
            ..CompletionOptions::default()
        };

        let rewritten = self.complete(&chat, &options).await?.trim().to_string();
        if rewritten.is_empty() {
            return Err(Error::CapabilityUnavailable(
                "LLM returned an empty rewrite".to_string(),
            ));
        }
        Ok(rewritten)
    }
}
