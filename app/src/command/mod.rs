//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`.

use std::sync::Arc;

use memoir_config::Config;
use memoir_memory::{Extractor, RuleBasedTagger};
use memoir_providers::{AssistSettings, LlmAssistant, OpenAiProvider};
use memoir_service::MemoryService;
use tracing::info;

mod extract;
mod info;
mod init;
mod respond;
mod rewrite;
mod version;

pub use extract::{ExtractInput, ExtractStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use respond::{RespondInput, RespondStrategy};
pub use rewrite::{RewriteInput, RewriteStrategy};
pub use version::VersionStrategy;

/// Build the service from the configured detector tables, attaching the LLM
/// assist when a usable key exists.
fn build_service(config: &Config) -> anyhow::Result<MemoryService> {
    let extractor = Extractor::new(&config.extraction, RuleBasedTagger::new()?)?;
    let service = MemoryService::new(extractor);

    let Some(api_key) = config.api_key() else {
        info!("No API key configured, LLM assist disabled");
        return Ok(service);
    };

    info!("LLM assist enabled: model={}", config.llm.model);
    let provider = OpenAiProvider::new(api_key)
        .with_base_url(config.llm.base_url.clone())
        .with_model(config.llm.model.clone())
        .with_retry(config.llm.retry.clone());
    let assistant = LlmAssistant::new(provider).with_settings(AssistSettings {
        extract_temperature: config.llm.extract_temperature,
        rewrite_temperature: config.llm.rewrite_temperature,
        rewrite_max_tokens: config.llm.rewrite_max_tokens,
    });

    Ok(service.with_assist(Arc::new(assistant)))
}

/// Print a JSON value, pretty unless `compact`.
fn print_json(value: &serde_json::Value, compact: bool) -> anyhow::Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{rendered}");
    Ok(())
}

/// Core trait defining the contract for all command strategies.
///
/// Each strategy defines its own input type via the associated type, so
/// parameters are passed without runtime casting or boxing.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}
