//! Seams for the host AI capability: a rewriter, a prompting language model
//! and the host that creates them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::CapabilityError;

pub type CapabilityResult<T> = Result<T, CapabilityError>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteOptions {
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    Readily,
    AfterDownload,
    No,
}

/// Sampling parameters the host advertises for its language model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCapabilities {
    pub available: Availability,
    pub default_top_k: u32,
    pub max_top_k: u32,
    pub default_temperature: f32,
    pub max_temperature: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageModelOptions {
    pub system_prompt: Option<String>,
    pub temperature: f32,
    pub top_k: u32,
}

#[async_trait]
pub trait Rewriter: Send + Sync {
    async fn rewrite(&self, text: &str, options: &RewriteOptions) -> CapabilityResult<String>;

    /// Releases the handle.
    fn destroy(self: Box<Self>);
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn prompt(&self, text: &str) -> CapabilityResult<String>;

    fn destroy(self: Box<Self>);
}

#[async_trait]
pub trait AiHost: Send + Sync {
    async fn create_rewriter(&self) -> CapabilityResult<Box<dyn Rewriter>>;

    async fn capabilities(&self) -> CapabilityResult<ModelCapabilities>;

    async fn create_language_model(
        &self,
        options: LanguageModelOptions,
    ) -> CapabilityResult<Box<dyn LanguageModel>>;
}
