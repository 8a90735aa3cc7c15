use memoir_config::{API_KEY_ENV, Config};

/// Strategy for displaying configuration and component health.
///
/// The API key is masked; the source of the key (environment or file) is
/// shown so an override is easy to spot.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = Config;

    async fn execute(&self, config: Self::Input) -> anyhow::Result<()> {
        println!("=== memoir Configuration ===\n");

        match Config::config_path() {
            Ok(path) if path.exists() => println!("Config File: {}", path.display()),
            Ok(path) => println!("Config File: {} (not found, using defaults)", path.display()),
            Err(e) => println!("Config File: unavailable ({e})"),
        }
        println!();

        println!("LLM:");
        println!("  Enabled by default: {}", config.llm.enabled);
        let source = if std::env::var(API_KEY_ENV).is_ok_and(|v| !v.trim().is_empty()) {
            API_KEY_ENV
        } else {
            "config"
        };
        match config.api_key() {
            Some(key) => println!("  API Key: {} (from {source})", mask(&key)),
            None => println!("  API Key: (not set)"),
        }
        println!("  Base URL: {}", config.llm.base_url);
        println!("  Model: {}", config.llm.model);
        println!("  Extract Temperature: {}", config.llm.extract_temperature);
        println!("  Rewrite Temperature: {}", config.llm.rewrite_temperature);
        println!("  Rewrite Max Tokens: {}", config.llm.rewrite_max_tokens);
        println!(
            "  Retry: delays {:?}s, then {} x {}s",
            config.llm.retry.base_delays_secs,
            config.llm.retry.final_retries,
            config.llm.retry.final_delay_secs
        );
        println!();

        println!("Extraction:");
        println!("  Preference Detectors: {}", config.extraction.detectors.len());
        println!("  Emotion Patterns: {}", config.extraction.emotions.len());
        println!();

        println!("Logging:");
        println!("  Level: {}", config.logging.level);
        println!();

        let health = super::build_service(&config)?.health();
        println!("Components:");
        for (component, status) in &health.components {
            println!("  {component}: {status}");
        }

        Ok(())
    }
}

fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}
