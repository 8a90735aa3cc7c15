use memoir_config::Config;

/// Strategy for initializing the configuration.
///
/// Creates the default configuration file at `~/memoir/config.json`.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config_path = Config::create_config()?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Add your OpenAI API key (or export OPENAI_API_KEY)");
        println!("   2. Set llm.enabled to true to use the LLM by default");
        println!("   3. Run 'memoir extract <FILE>' on a message batch");
        println!();
        println!("🔧 Configuration options:");
        println!("   - llm.base_url: any OpenAI-compatible endpoint");
        println!("   - llm.retry: backoff schedule for failed requests");
        println!("   - logging.level: default log filter (RUST_LOG overrides)");
        println!();
        Ok(())
    }
}
