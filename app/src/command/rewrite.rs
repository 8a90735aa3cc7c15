use memoir_config::Config;
use serde_json::json;

/// Input for the rewrite command.
pub struct RewriteInput {
    pub config: Config,
    pub text: String,
    pub personality: String,
    pub use_llm: bool,
}

/// Strategy for rewriting text in a personality.
#[derive(Debug, Clone, Copy)]
pub struct RewriteStrategy;

impl super::CommandStrategy for RewriteStrategy {
    type Input = RewriteInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let use_llm = input.use_llm || input.config.llm.enabled;
        let service = super::build_service(&input.config)?;

        let rewrite = service
            .rewrite(&input.text, &input.personality, use_llm)
            .await?;

        let output = json!({
            "success": true,
            "original": rewrite.original,
            "rewritten": rewrite.rewritten,
            "personality": rewrite.personality,
            "method": rewrite.method,
        });
        super::print_json(&output, false)
    }
}
