use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::capability::{
    AiHost, Availability, CapabilityResult, LanguageModel, LanguageModelOptions,
    ModelCapabilities, RewriteOptions, Rewriter,
};
use crate::errors::CapabilityError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const REWRITER_INSTRUCTIONS: &str = "You rewrite the user's message following the instructions below. \
**ONLY** respond with the rewritten message, without quotes, explanations or any other text.";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub default_temperature: f32,
    pub max_temperature: f32,
    pub default_top_k: u32,
    pub max_top_k: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            default_temperature: 0.3,
            max_temperature: 2.0,
            default_top_k: 3,
            max_top_k: 8,
        }
    }
}

impl OpenAiConfig {
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// [`AiHost`] backed by an OpenAI-compatible chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenAiHost {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiHost {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.config.api_key.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.config.api_key)
        }
    }

    async fn chat_completion(
        &self,
        system: &str,
        user: &str,
        temperature: Option<f32>,
    ) -> CapabilityResult<String> {
        let payload = chat_payload(&self.config.model, system, user, temperature);

        let response = self
            .authorized(self.client.post(self.config.endpoint("chat/completions")))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CapabilityError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let result: Value = response.json().await?;
        extract_content(&result)
    }
}

pub(crate) fn chat_payload(
    model: &str,
    system: &str,
    user: &str,
    temperature: Option<f32>,
) -> Value {
    let mut payload = json!({
        "model": model,
        "messages": [
            {
                "role": "system",
                "content": system
            },
            {
                "role": "user",
                "content": user
            }
        ]
    });
    if let Some(temperature) = temperature {
        payload["temperature"] = json!(temperature);
    }
    payload
}

pub(crate) fn extract_content(result: &Value) -> CapabilityResult<String> {
    result["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(CapabilityError::EmptyCompletion)
}

fn rewriter_system_prompt(context: &str) -> String {
    format!("{REWRITER_INSTRUCTIONS}\n\n{context}")
}

struct OpenAiRewriter {
    host: OpenAiHost,
}

#[async_trait]
impl Rewriter for OpenAiRewriter {
    async fn rewrite(&self, text: &str, options: &RewriteOptions) -> CapabilityResult<String> {
        self.host
            .chat_completion(&rewriter_system_prompt(&options.context), text, None)
            .await
    }

    fn destroy(self: Box<Self>) {
        tracing::debug!("rewriter released");
    }
}

struct OpenAiLanguageModel {
    host: OpenAiHost,
    options: LanguageModelOptions,
}

#[async_trait]
impl LanguageModel for OpenAiLanguageModel {
    async fn prompt(&self, text: &str) -> CapabilityResult<String> {
        let system = self.options.system_prompt.as_deref().unwrap_or_default();
        self.host
            .chat_completion(system, text, Some(self.options.temperature))
            .await
    }

    fn destroy(self: Box<Self>) {
        tracing::debug!("language model released");
    }
}

#[async_trait]
impl AiHost for OpenAiHost {
    async fn create_rewriter(&self) -> CapabilityResult<Box<dyn Rewriter>> {
        Ok(Box::new(OpenAiRewriter { host: self.clone() }))
    }

    async fn capabilities(&self) -> CapabilityResult<ModelCapabilities> {
        let response = self
            .authorized(self.client.get(self.config.endpoint("models")))
            .send()
            .await?;

        let available = match response.status() {
            s if s.is_success() => Availability::Readily,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                Availability::No
            }
            s => {
                let body = response.text().await.unwrap_or_default();
                return Err(CapabilityError::Api {
                    status: s.as_u16(),
                    body,
                });
            }
        };
        tracing::debug!(?available, base_url = %self.config.base_url, "probed AI host");

        Ok(ModelCapabilities {
            available,
            default_top_k: self.config.default_top_k,
            max_top_k: self.config.max_top_k,
            default_temperature: self.config.default_temperature,
            max_temperature: self.config.max_temperature,
        })
    }

    async fn create_language_model(
        &self,
        options: LanguageModelOptions,
    ) -> CapabilityResult<Box<dyn LanguageModel>> {
        Ok(Box::new(OpenAiLanguageModel {
            host: self.clone(),
            options,
        }))
    }
}
