use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A message in the input batch is missing or mistypes a required field.
    #[error("malformed message at position {position}: {reason}")]
    Structural { position: usize, reason: String },

    #[error("unknown personality: {0} (expected one of: calm_mentor, witty_friend, therapist)")]
    InvalidPersonality(String),

    /// The optional LLM path cannot serve this request.
    #[error("capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// A produced memory record breaks the wire contract.
    #[error("memory record failed validation: {0}")]
    SchemaViolation(String),

    #[error("entity tagger failed: {0}")]
    Tagger(String),
}

impl Error {
    /// Whether the caller should retry on the deterministic path.
    #[must_use]
    pub const fn is_capability_unavailable(&self) -> bool {
        matches!(self, Self::CapabilityUnavailable(_))
    }
}
