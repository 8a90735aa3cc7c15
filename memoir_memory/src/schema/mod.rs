//! Schema validation for memory records.
//!
//! A [`MemoryRecord`] is a wire contract: required fields present, every
//! confidence in `[0, 1]`, and every source index pointing at a user message
//! of the batch it was extracted from. Records from any path (deterministic
//! or LLM) go through the same checks.

use std::collections::HashSet;

use memoir_core::{MemoryRecord, Message};
use serde_json::Value;

/// Schema validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The value could not be read as a memory record at all.
    Malformed(String),
    MissingUserId,
    ConfidenceOutOfRange {
        section: &'static str,
        position: usize,
        confidence: f32,
    },
    EmptyValue {
        section: &'static str,
        position: usize,
    },
    NoSources {
        section: &'static str,
        position: usize,
    },
    UnknownSource {
        section: &'static str,
        position: usize,
        index: usize,
    },
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "malformed memory record: {e}"),
            Self::MissingUserId => write!(f, "user_id must not be empty"),
            Self::ConfidenceOutOfRange {
                section,
                position,
                confidence,
            } => write!(
                f,
                "{section}[{position}].confidence must be within [0, 1], got {confidence}"
            ),
            Self::EmptyValue { section, position } => {
                write!(f, "{section}[{position}].value must not be empty")
            }
            Self::NoSources { section, position } => {
                write!(f, "{section}[{position}].source_messages must not be empty")
            }
            Self::UnknownSource {
                section,
                position,
                index,
            } => write!(
                f,
                "{section}[{position}] cites message {index}, which is not a user message of the batch"
            ),
        }
    }
}

impl std::error::Error for SchemaError {}

impl From<SchemaError> for memoir_core::Error {
    fn from(err: SchemaError) -> Self {
        Self::SchemaViolation(err.to_string())
    }
}

/// Validates memory records against the wire contract.
#[derive(Debug, Clone, Default)]
pub struct RecordValidator {
    /// Reject preferences/facts without sources. LLM output often omits them.
    allow_unsourced: bool,
}

impl RecordValidator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            allow_unsourced: false,
        }
    }

    /// Accept records whose `source_messages` lists are empty.
    #[must_use]
    pub const fn allow_unsourced(mut self) -> Self {
        self.allow_unsourced = true;
        self
    }

    /// Validate a record extracted from `messages`.
    ///
    /// # Errors
    /// Returns the first violation found.
    pub fn validate(&self, record: &MemoryRecord, messages: &[Message]) -> Result<(), SchemaError> {
        let user_indices: HashSet<usize> = messages
            .iter()
            .filter(|m| m.is_user())
            .map(|m| m.index)
            .collect();
        self.check(record, Some(&user_indices))
    }

    /// Validate a record without knowing its batch; source indices are not
    /// cross-checked.
    ///
    /// # Errors
    /// Returns the first violation found.
    pub fn validate_standalone(&self, record: &MemoryRecord) -> Result<(), SchemaError> {
        self.check(record, None)
    }

    /// Read and validate a record from untyped JSON.
    ///
    /// # Errors
    /// Returns [`SchemaError::Malformed`] if required fields are missing or
    /// mistyped, otherwise the first contract violation.
    pub fn validate_value(&self, value: Value) -> Result<MemoryRecord, SchemaError> {
        let record: MemoryRecord =
            serde_json::from_value(value).map_err(|e| SchemaError::Malformed(e.to_string()))?;
        self.validate_standalone(&record)?;
        Ok(record)
    }

    fn check(
        &self,
        record: &MemoryRecord,
        user_indices: Option<&HashSet<usize>>,
    ) -> Result<(), SchemaError> {
        if record.user_id.trim().is_empty() {
            return Err(SchemaError::MissingUserId);
        }

        let preferences = record.preferences.iter().enumerate().map(|(i, p)| {
            let value = Some(p.value.as_str());
            ("preferences", i, p.confidence, value, &p.source_messages)
        });
        let emotions = record.emotional_patterns.iter().enumerate().map(|(i, e)| {
            ("emotional_patterns", i, e.confidence, None, &e.source_messages)
        });
        let facts = record.facts.iter().enumerate().map(|(i, f)| {
            ("facts", i, f.confidence, Some(f.value.as_str()), &f.source_messages)
        });
        let entries = preferences.chain(emotions).chain(facts);

        for (section, position, confidence, value, sources) in entries {
            if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
                return Err(SchemaError::ConfidenceOutOfRange {
                    section,
                    position,
                    confidence,
                });
            }
            if value.is_some_and(|v| v.trim().is_empty()) {
                return Err(SchemaError::EmptyValue { section, position });
            }
            if sources.is_empty() && !self.allow_unsourced {
                return Err(SchemaError::NoSources { section, position });
            }
            if let Some(known) = user_indices {
                if let Some(&index) = sources.iter().find(|i| !known.contains(i)) {
                    return Err(SchemaError::UnknownSource {
                        section,
                        position,
                        index,
                    });
                }
            }
        }

        if let Some(known) = user_indices {
            for (position, raw) in record.raw_extractions.iter().enumerate() {
                if !known.contains(&raw.message_index) {
                    return Err(SchemaError::UnknownSource {
                        section: "raw_extractions",
                        position,
                        index: raw.message_index,
                    });
                }
            }
        }

        Ok(())
    }
}
