#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod error;
pub mod memory;
mod message;
mod personality;
mod tagger;

pub use error::{Error, Result};
pub use memory::{
    DEFAULT_USER_ID, EmotionalPattern, EmotionalPatternRecord, FactRecord, FactType,
    MemoryRecord, PreferenceCategory, PreferenceRecord, RawExtraction,
};
pub use message::{Message, parse_messages};
pub use personality::Personality;
pub use tagger::{EntityCategory, EntityTagger, TaggedEntity};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
    /// Any role the caller sends that we do not model. Never processed.
    #[serde(other)]
    Other,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
            Self::Tool => "tool",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single turn sent to a chat completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Sampling options for a single completion request.
#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    /// Overrides the provider's default model.
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Ask the provider to return a JSON object.
    pub json_response: bool,
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> anyhow::Result<LLMResponse>;
    fn get_default_model(&self) -> &str;
}

/// Optional LLM-backed alternative to the deterministic engines.
///
/// Implementations signal any failure to serve a request with
/// [`Error::CapabilityUnavailable`]; callers then fall back to the
/// deterministic path.
#[async_trait]
pub trait MemoryAssist: Send + Sync {
    fn is_available(&self) -> bool;

    async fn extract_memories(&self, messages: &[Message]) -> Result<MemoryRecord>;

    async fn rewrite(&self, text: &str, personality: Personality) -> Result<String>;
}
