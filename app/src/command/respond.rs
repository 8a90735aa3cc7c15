use std::path::PathBuf;

use anyhow::Context;
use memoir_memory::RecordValidator;
use memoir_service::MemoryService;
use serde_json::{Value, json};

/// Input for the respond command.
pub struct RespondInput {
    pub memory_file: PathBuf,
    pub personality: String,
}

/// Strategy for replying from a stored memory record.
///
/// Accepts a bare record or the output of `memoir extract`.
#[derive(Debug, Clone, Copy)]
pub struct RespondStrategy;

impl super::CommandStrategy for RespondStrategy {
    type Input = RespondInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let path = &input.memory_file;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;
        let value = match value {
            Value::Object(mut map) if map.contains_key("memory") => {
                map.remove("memory").unwrap_or_default()
            }
            other => other,
        };

        let record = RecordValidator::new()
            .validate_value(value)
            .with_context(|| format!("Invalid memory record in {}", path.display()))?;

        let service = MemoryService::with_defaults()?;
        let response = service.respond(&record, &input.personality)?;

        let output = json!({
            "success": true,
            "personality": input.personality,
            "response": response,
        });
        super::print_json(&output, false)
    }
}
