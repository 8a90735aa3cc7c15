//! Conversation messages and batch parsing.
//!
//! Batches arrive as untyped JSON from callers, so parsing checks every
//! element up front and rejects the whole batch on the first malformed one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Role;
use crate::error::{Error, Result};

/// One message of a conversation.
///
/// `index` is the caller's identifier for the message. It is not assumed to
/// match the position in the batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub index: usize,
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(index: usize, role: Role, content: impl Into<String>) -> Self {
        Self {
            index,
            role,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(index: usize, content: impl Into<String>) -> Self {
        Self::new(index, Role::User, content)
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Build a message from one element of a JSON batch.
    ///
    /// `position` is only used for error reporting.
    pub fn from_value(value: &Value, position: usize) -> Result<Self> {
        let structural = |reason: String| Error::Structural { position, reason };

        let object = value
            .as_object()
            .ok_or_else(|| structural(format!("expected an object, got {}", kind_of(value))))?;

        let index = match object.get("index") {
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| {
                    structural(format!("'index' must be a non-negative integer, got {n}"))
                })?,
            Some(other) => {
                return Err(structural(format!(
                    "'index' must be a non-negative integer, got {}",
                    kind_of(other)
                )));
            }
            None => return Err(structural("missing field 'index'".to_string())),
        };

        let role = match object.get("role") {
            Some(v @ Value::String(_)) => Role::deserialize(v)
                .map_err(|e| structural(format!("invalid 'role': {e}")))?,
            Some(other) => {
                return Err(structural(format!(
                    "'role' must be a string, got {}",
                    kind_of(other)
                )));
            }
            None => return Err(structural("missing field 'role'".to_string())),
        };

        let content = match object.get("content") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(structural(format!(
                    "'content' must be a string, got {}",
                    kind_of(other)
                )));
            }
            None => return Err(structural("missing field 'content'".to_string())),
        };

        Ok(Self {
            index,
            role,
            content,
        })
    }
}

/// Parse a JSON message batch.
///
/// Accepts either a bare array of messages or an object with a `messages`
/// array. Fails on the first malformed element; nothing is returned for a
/// partially valid batch.
pub fn parse_messages(json: &str) -> Result<Vec<Message>> {
    let value: Value = serde_json::from_str(json).map_err(|e| Error::Structural {
        position: 0,
        reason: format!("batch is not valid JSON: {e}"),
    })?;

    let items = match &value {
        Value::Array(items) => items,
        Value::Object(obj) => match obj.get("messages") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(Error::Structural {
                    position: 0,
                    reason: "expected an array of messages or an object with a 'messages' array"
                        .to_string(),
                });
            }
        },
        other => {
            return Err(Error::Structural {
                position: 0,
                reason: format!("expected an array of messages, got {}", kind_of(other)),
            });
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(position, item)| Message::from_value(item, position))
        .collect()
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
