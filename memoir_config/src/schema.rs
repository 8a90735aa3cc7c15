use memoir_memory::ExtractionConfig;
use memoir_providers::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable that overrides `llm.api_key`.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Key written by `memoir init`; treated as no key at all.
pub const API_KEY_PLACEHOLDER: &str = "your-openai-api-key-here";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    /// Detector tables of the deterministic extractor.
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "LlmConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "LlmConfig::default_model")]
    pub model: String,
    #[serde(default = "LlmConfig::default_extract_temperature")]
    pub extract_temperature: f32,
    #[serde(default = "LlmConfig::default_rewrite_temperature")]
    pub rewrite_temperature: f32,
    #[serde(default = "LlmConfig::default_rewrite_max_tokens")]
    pub rewrite_max_tokens: u32,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            base_url: Self::default_base_url(),
            model: Self::default_model(),
            extract_temperature: Self::default_extract_temperature(),
            rewrite_temperature: Self::default_rewrite_temperature(),
            rewrite_max_tokens: Self::default_rewrite_max_tokens(),
            retry: RetryPolicy::default(),
        }
    }
}

impl LlmConfig {
    fn default_base_url() -> String {
        "https://api.openai.com/v1".to_string()
    }

    fn default_model() -> String {
        "gpt-3.5-turbo".to_string()
    }

    const fn default_extract_temperature() -> f32 {
        0.3
    }

    const fn default_rewrite_temperature() -> f32 {
        0.7
    }

    const fn default_rewrite_max_tokens() -> u32 {
        200
    }

    /// The usable key: `env_key` wins over the file; blank and placeholder
    /// keys count as missing.
    #[must_use]
    pub fn resolve_api_key(&self, env_key: Option<String>) -> Option<String> {
        env_key
            .into_iter()
            .chain(std::iter::once(self.api_key.clone()))
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty() && key != API_KEY_PLACEHOLDER)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Config {
    fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("memoir"))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn load() -> anyhow::Result<Self> {
        Self::load_in(&Self::config_dir()?)
    }

    /// Load `config.json` from `dir`, which must exist.
    pub fn load_in(dir: &Path) -> anyhow::Result<Self> {
        let config_path = dir.join("config.json");

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'memoir init' to create config.",
                config_path.display()
            );
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config at {}: {e}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the config file if there is one, defaults otherwise.
    ///
    /// The deterministic engines need no configuration, so a missing file is
    /// not an error. A file that exists but does not parse still is.
    pub fn load_or_default() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config at {}, using defaults", config_path.display());
            Ok(Self::default())
        }
    }

    /// API key from `OPENAI_API_KEY` or the config file.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        self.llm.resolve_api_key(std::env::var(API_KEY_ENV).ok())
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<PathBuf> {
        let config_dir = Self::ensure_config_dir()?;
        Self::create_config_in(&config_dir)
    }

    /// Write the template config into `dir`, refusing to overwrite.
    pub fn create_config_in(dir: &Path) -> anyhow::Result<PathBuf> {
        let config_path = dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let template = Self {
            llm: LlmConfig {
                api_key: API_KEY_PLACEHOLDER.to_string(),
                ..LlmConfig::default()
            },
            extraction: ExtractionConfig::default(),
            logging: LoggingConfig::default(),
        };
        std::fs::write(&config_path, serde_json::to_string_pretty(&template)?)?;

        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoir_core::{Message, PreferenceCategory};
    use memoir_memory::{Extractor, RuleBasedTagger, default_detectors, default_emotions};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("memoir-config-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap_or_else(|e| panic!("scratch dir: {e}"));
        dir
    }

    #[test]
    fn empty_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap_or_else(|e| panic!("{e}"));
        assert!(!config.llm.enabled);
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.llm.rewrite_max_tokens, 200);
        assert_eq!(config.llm.retry.base_delays_secs, vec![1, 2]);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.extraction.detectors.len(), default_detectors().len());
        assert_eq!(config.extraction.emotions.len(), default_emotions().len());
    }

    #[test]
    fn extraction_section_replaces_the_detector_table() {
        let config: Config = serde_json::from_str(
            r#"{"extraction": {"detectors": [
                {"name": "jazz", "pattern": "\\bjazz\\b", "category": "music"},
                {"name": "allergy", "pattern": "allergic to (\\w+)", "shape": "allergy"}
            ]}}"#,
        )
        .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(config.extraction.detectors.len(), 2);
        assert_eq!(config.extraction.emotions.len(), default_emotions().len());

        let tagger = RuleBasedTagger::new().unwrap_or_else(|e| panic!("{e}"));
        let extractor =
            Extractor::new(&config.extraction, tagger).unwrap_or_else(|e| panic!("{e}"));
        let record = extractor
            .extract(&[Message::user(0, "I love Jazz but I'm allergic to Kiwi, and I use Linux")])
            .unwrap_or_else(|e| panic!("{e}"));
        let values: Vec<_> = record.preferences.iter().map(|p| p.value.as_str()).collect();
        assert_eq!(values, vec!["jazz", "allergic to kiwi"]);
        assert_eq!(record.preferences[0].category, PreferenceCategory::Music);
    }

    #[test]
    fn invalid_detector_in_config_fails_to_build() {
        let config: Config = serde_json::from_str(
            r#"{"extraction": {"detectors": [{"name": "broken", "pattern": "("}]}}"#,
        )
        .unwrap_or_else(|e| panic!("{e}"));
        let tagger = RuleBasedTagger::new().unwrap_or_else(|e| panic!("{e}"));
        assert!(Extractor::new(&config.extraction, tagger).is_err());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"llm": {"enabled": true, "retry": {"final_retries": 3}}}"#)
                .unwrap_or_else(|e| panic!("{e}"));
        assert!(config.llm.enabled);
        assert_eq!(config.llm.retry.final_retries, 3);
        assert_eq!(config.llm.retry.final_delay_secs, 2);
    }

    #[test]
    fn env_key_wins_and_placeholders_do_not_count() {
        let llm = LlmConfig {
            api_key: "file-key".to_string(),
            ..LlmConfig::default()
        };
        assert_eq!(llm.resolve_api_key(Some("env-key".to_string())).as_deref(), Some("env-key"));
        assert_eq!(llm.resolve_api_key(None).as_deref(), Some("file-key"));
        assert_eq!(llm.resolve_api_key(Some("  ".to_string())).as_deref(), Some("file-key"));

        let placeholder = LlmConfig {
            api_key: API_KEY_PLACEHOLDER.to_string(),
            ..LlmConfig::default()
        };
        assert_eq!(placeholder.resolve_api_key(None), None);
        assert_eq!(
            placeholder.resolve_api_key(Some(API_KEY_PLACEHOLDER.to_string())),
            None
        );
    }

    #[test]
    fn template_round_trips_and_is_not_overwritten() {
        let dir = scratch_dir("template");
        let path = Config::create_config_in(&dir).unwrap_or_else(|e| panic!("{e}"));

        let config = Config::load_from(&path).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(config.llm.api_key, API_KEY_PLACEHOLDER);
        assert_eq!(config.llm.resolve_api_key(None), None);

        assert!(Config::create_config_in(&dir).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_suggests_init() {
        let dir = scratch_dir("missing");
        let err = Config::load_in(&dir).err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("memoir init"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn invalid_file_names_its_path() {
        let dir = scratch_dir("invalid");
        let path = dir.join("config.json");
        std::fs::write(&path, "{ not json").unwrap_or_else(|e| panic!("{e}"));

        let err = Config::load_from(&path).err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("config.json"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
