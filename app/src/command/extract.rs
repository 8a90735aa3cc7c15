use std::path::{Path, PathBuf};

use anyhow::Context;
use memoir_config::Config;
use memoir_core::{Message, parse_messages};
use memoir_service::Extraction;
use serde_json::json;
use tracing::info;

/// Input for the extract command.
pub struct ExtractInput {
    pub config: Config,
    pub files: Vec<PathBuf>,
    pub use_llm: bool,
    pub compact: bool,
}

/// Strategy for extracting memory records from message batch files.
///
/// Every file is parsed up front, so a malformed batch fails the command
/// before any extraction runs. Without the LLM the batches are extracted in
/// parallel.
#[derive(Debug, Clone, Copy)]
pub struct ExtractStrategy;

fn read_batch(path: &Path) -> anyhow::Result<Vec<Message>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    parse_messages(&content).with_context(|| format!("Invalid message batch in {}", path.display()))
}

impl super::CommandStrategy for ExtractStrategy {
    type Input = ExtractInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let batches = input
            .files
            .iter()
            .map(PathBuf::as_path)
            .map(read_batch)
            .collect::<anyhow::Result<Vec<_>>>()?;
        let use_llm = input.use_llm || input.config.llm.enabled;
        let service = super::build_service(&input.config)?;

        let extractions: Vec<Extraction> = if use_llm {
            let mut extractions = Vec::with_capacity(batches.len());
            for messages in &batches {
                extractions.push(service.extract(messages, true).await?);
            }
            extractions
        } else {
            service
                .extract_batches(&batches)
                .into_iter()
                .collect::<memoir_core::Result<_>>()?
        };

        for (path, extraction) in input.files.iter().zip(extractions) {
            info!(
                "Extracted {} with {} method",
                path.display(),
                extraction.method
            );
            let output = json!({
                "success": true,
                "memory": extraction.record,
                "method": extraction.method,
            });
            super::print_json(&output, input.compact)?;
        }
        Ok(())
    }
}
