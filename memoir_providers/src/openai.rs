use async_trait::async_trait;
use memoir_core::{ChatMessage, CompletionOptions, LLMProvider, LLMResponse, Usage};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::info;

use crate::retry::{RetryPolicy, retry_with_backoff};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Chat completions against any OpenAI-compatible endpoint.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl OpenAiProvider {
    pub fn new(api_key: String) -> Self {
        info!("Creating OpenAiProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn request_body(&self, messages: &[ChatMessage], options: &CompletionOptions) -> Value {
        let model = options.model.as_deref().unwrap_or(&self.model);
        let mut request = json!({
            "model": model,
            "messages": messages,
        });
        if let Some(temperature) = options.temperature {
            request["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = options.max_tokens {
            request["max_tokens"] = json!(max_tokens);
        }
        if options.json_response {
            request["response_format"] = json!({ "type": "json_object" });
        }
        request
    }

    /// Helper method to send a single request
    async fn try_send(&self, request: &Value) -> anyhow::Result<LLMResponse> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        parse_completion(&response)
    }
}

fn parse_completion(response: &Value) -> anyhow::Result<LLMResponse> {
    let content = response["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing content"))?
        .to_string();

    let count = |u: &serde_json::Map<String, Value>, key: &str| {
        u32::try_from(u.get(key).and_then(Value::as_u64).unwrap_or(0)).unwrap_or(0)
    };
    let usage = response["usage"].as_object().map(|u| Usage {
        prompt_tokens: count(u, "prompt_tokens"),
        completion_tokens: count(u, "completion_tokens"),
        total_tokens: count(u, "total_tokens"),
    });

    Ok(LLMResponse { content, usage })
}

#[async_trait]
impl LLMProvider for OpenAiProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> anyhow::Result<LLMResponse> {
        let request = self.request_body(messages, options);

        info!("Sending request to chat completions API: model={}", request["model"]);

        let response = retry_with_backoff(|| self.try_send(&request), &self.retry).await?;

        info!("Received response from chat completions API");
        Ok(response)
    }

    fn get_default_model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_options() {
        let provider = OpenAiProvider::new("key".to_string());
        let options = CompletionOptions {
            model: None,
            temperature: Some(0.5),
            max_tokens: Some(200),
            json_response: true,
        };
        let body = provider.request_body(&[ChatMessage::user("hi")], &options);

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["max_tokens"], 200);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hi");
    }

    #[test]
    fn request_body_omits_unset_options() {
        let provider = OpenAiProvider::new("key".to_string()).with_model("gpt-4o-mini".to_string());
        let body = provider.request_body(&[], &CompletionOptions::default());

        assert_eq!(body["model"], "gpt-4o-mini");
        assert!(body.get("temperature").is_none());
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let provider = OpenAiProvider::new("key".to_string())
            .with_base_url("http://localhost:8080/v1/".to_string());
        assert_eq!(provider.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn parses_content_and_usage() {
        let response = json!({
            "choices": [{ "message": { "role": "assistant", "content": "hello" } }],
            "usage": { "prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7 }
        });
        let parsed = parse_completion(&response).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(parsed.content, "hello");
        assert_eq!(parsed.usage.map(|u| u.total_tokens), Some(7));
    }

    #[test]
    fn missing_content_is_an_error() {
        assert!(parse_completion(&json!({ "choices": [] })).is_err());
    }
}
