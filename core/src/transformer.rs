use std::sync::Arc;

use tracing::instrument;

use crate::analysis::{ANALYSIS_SYSTEM_PROMPT, analysis_prompt, parse_improvements};
use crate::capability::{
    AiHost, Availability, CapabilityResult, LanguageModel, LanguageModelOptions,
    ModelCapabilities, RewriteOptions, Rewriter,
};
use crate::context::build_context;
use crate::errors::{CapabilityError, TransformError};
use crate::model::{TransformOptions, TransformResponse};

/// Owns one rewriter and one language model handle obtained from an
/// [`AiHost`]. Both handles are released on [`ToneTransformer::destroy`] or
/// when the transformer is dropped.
pub struct ToneTransformer {
    host: Arc<dyn AiHost>,
    rewriter: Option<Box<dyn Rewriter>>,
    language_model: Option<Box<dyn LanguageModel>>,
}

impl ToneTransformer {
    pub fn new(host: Arc<dyn AiHost>) -> Self {
        Self {
            host,
            rewriter: None,
            language_model: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.rewriter.is_some() && self.language_model.is_some()
    }

    /// Acquires both handles. Returns `false` when the host reports the
    /// model as unavailable or any host call fails; the transformer is then
    /// left without handles.
    #[instrument(skip(self))]
    pub async fn initialize(&mut self, temperature: Option<f32>) -> bool {
        self.destroy();

        match self.acquire(temperature).await {
            Ok(Some((rewriter, language_model))) => {
                self.rewriter = Some(rewriter);
                self.language_model = Some(language_model);
                tracing::info!("AI capability initialized");
                true
            }
            Ok(None) => {
                tracing::warn!("AI capability reported as unavailable");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "AI capability initialization failed");
                false
            }
        }
    }

    async fn acquire(
        &self,
        temperature: Option<f32>,
    ) -> CapabilityResult<Option<(Box<dyn Rewriter>, Box<dyn LanguageModel>)>> {
        let capabilities = self.host.capabilities().await?;
        if capabilities.available == Availability::No {
            return Ok(None);
        }
        check_temperature_bounds(&capabilities)?;

        let rewriter = self.host.create_rewriter().await?;
        let options = LanguageModelOptions {
            system_prompt: Some(ANALYSIS_SYSTEM_PROMPT.to_string()),
            temperature: effective_temperature(&capabilities, temperature),
            top_k: capabilities.default_top_k,
        };

        match self.host.create_language_model(options).await {
            Ok(language_model) => Ok(Some((rewriter, language_model))),
            Err(e) => {
                rewriter.destroy();
                Err(e)
            }
        }
    }

    /// Rewrites `text` for the requested audience and asks the language model
    /// which improvements the rewrite made.
    #[instrument(skip(self, text), fields(situation = %options.situation, formality = %options.formality))]
    pub async fn transform_text(
        &self,
        text: &str,
        options: &TransformOptions,
    ) -> Result<TransformResponse, TransformError> {
        let (Some(rewriter), Some(language_model)) = (&self.rewriter, &self.language_model) else {
            return Err(TransformError::NotInitialized);
        };
        if text.trim().is_empty() {
            return Err(TransformError::EmptyInput);
        }

        let context = build_context(options);
        let transformed_text = rewriter
            .rewrite(text, &RewriteOptions { context })
            .await
            .inspect_err(|e| tracing::error!(error = %e, "rewrite failed"))?;

        let raw_analysis = language_model
            .prompt(&analysis_prompt(text, &transformed_text))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "analysis prompt failed"))?;
        let improvements = parse_improvements(&raw_analysis);

        tracing::debug!(improvements = improvements.len(), "transform complete");

        Ok(TransformResponse {
            original_text: text.to_string(),
            transformed_text,
            improvements,
        })
    }

    /// Releases both handles. Safe to call any number of times.
    pub fn destroy(&mut self) {
        if let Some(rewriter) = self.rewriter.take() {
            rewriter.destroy();
        }
        if let Some(language_model) = self.language_model.take() {
            language_model.destroy();
        }
    }
}

impl Drop for ToneTransformer {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn check_temperature_bounds(capabilities: &ModelCapabilities) -> CapabilityResult<()> {
    let (default, max) = (capabilities.default_temperature, capabilities.max_temperature);
    if max.is_finite() && max >= 0.0 && default.is_finite() {
        Ok(())
    } else {
        Err(CapabilityError::InvalidCapabilities(format!(
            "temperature default {default}, max {max}"
        )))
    }
}

// bounds are checked before this runs, so the clamp range is valid
fn effective_temperature(capabilities: &ModelCapabilities, requested: Option<f32>) -> f32 {
    match requested {
        Some(t) if t.is_finite() => t.clamp(0.0, capabilities.max_temperature),
        _ => capabilities.default_temperature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Formality, Situation};
    use crate::testing::{Call, Script, ScriptedHost};

    fn client_formal() -> TransformOptions {
        TransformOptions {
            situation: Situation::Client,
            formality: Formality::Formal,
            additional_context: None,
        }
    }

    async fn ready(host: &ScriptedHost) -> ToneTransformer {
        let mut transformer = ToneTransformer::new(Arc::new(host.clone()));
        assert!(transformer.initialize(None).await);
        transformer
    }

    #[tokio::test]
    async fn test_initialize_uses_default_sampling() {
        let host = ScriptedHost::default();
        let transformer = ready(&host).await;
        assert!(transformer.is_ready());

        let created = host.calls().into_iter().find_map(|c| match c {
            Call::CreateLanguageModel(opts) => Some(opts),
            _ => None,
        });
        assert_eq!(
            created,
            Some(LanguageModelOptions {
                system_prompt: Some(ANALYSIS_SYSTEM_PROMPT.to_string()),
                temperature: 1.0,
                top_k: 3,
            })
        );
    }

    #[tokio::test]
    async fn test_initialize_clamps_temperature() {
        let host = ScriptedHost::default();
        let mut transformer = ToneTransformer::new(Arc::new(host.clone()));
        assert!(transformer.initialize(Some(9.0)).await);
        assert!(host.calls().iter().any(|c| matches!(
            c,
            Call::CreateLanguageModel(opts) if opts.temperature == 2.0
        )));
    }

    #[tokio::test]
    async fn test_initialize_fails_closed_when_unavailable() {
        let host = ScriptedHost::new(Script {
            available: Availability::No,
            ..Default::default()
        });
        let mut transformer = ToneTransformer::new(Arc::new(host.clone()));
        assert!(!transformer.initialize(None).await);
        assert!(!transformer.is_ready());
        assert_eq!(host.count(|c| matches!(c, Call::CreateRewriter)), 0);
    }

    #[tokio::test]
    async fn test_initialize_rejects_invalid_temperature_bounds() {
        for max_temperature in [-1.0, f32::NAN, f32::INFINITY] {
            let host = ScriptedHost::new(Script {
                max_temperature,
                ..Default::default()
            });
            let mut transformer = ToneTransformer::new(Arc::new(host.clone()));
            assert!(!transformer.initialize(Some(0.5)).await);
            assert!(!transformer.is_ready());
            assert_eq!(host.count(|c| matches!(c, Call::CreateRewriter)), 0);
            assert_eq!(host.count(|c| matches!(c, Call::CreateLanguageModel(_))), 0);
        }
    }

    #[tokio::test]
    async fn test_initialize_accepts_zero_max_temperature() {
        let host = ScriptedHost::new(Script {
            max_temperature: 0.0,
            ..Default::default()
        });
        let mut transformer = ToneTransformer::new(Arc::new(host.clone()));
        assert!(transformer.initialize(Some(0.5)).await);
        assert!(host.calls().iter().any(|c| matches!(
            c,
            Call::CreateLanguageModel(opts) if opts.temperature == 0.0
        )));
    }

    #[tokio::test]
    async fn test_initialize_fails_closed_when_host_errors() {
        let host = ScriptedHost::new(Script {
            fail_create: true,
            ..Default::default()
        });
        let mut transformer = ToneTransformer::new(Arc::new(host));
        assert!(!transformer.initialize(None).await);
        let err = transformer
            .transform_text("hello", &client_formal())
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::NotInitialized));
        assert_eq!(err.to_string(), "AI service not initialized");
    }

    #[tokio::test]
    async fn test_client_formal_scenario() {
        let host = ScriptedHost::default();
        let transformer = ready(&host).await;

        let resp = transformer
            .transform_text("we cant do that", &client_formal())
            .await
            .unwrap();

        assert_eq!(resp.original_text, "we cant do that");
        assert_eq!(resp.transformed_text, "We are unable to accommodate that request.");
        assert_eq!(
            resp.improvements.as_slice(),
            ["Softened refusal", "Added politeness", "Clearer wording"]
        );

        let calls = host.calls();
        let rewrite_at = calls
            .iter()
            .position(|c| matches!(c, Call::Rewrite { .. }))
            .expect("rewrite called");
        let prompt_at = calls
            .iter()
            .position(|c| matches!(c, Call::Prompt(_)))
            .expect("prompt called");
        assert!(rewrite_at < prompt_at);

        let Call::Rewrite { text, context } = &calls[rewrite_at] else {
            unreachable!()
        };
        assert_eq!(text, "we cant do that");
        assert!(context.contains(Situation::Client.template()));
        assert!(context.contains("professional and polite"));

        let Call::Prompt(prompt) = &calls[prompt_at] else {
            unreachable!()
        };
        assert!(prompt.contains("we cant do that"));
        assert!(prompt.contains("We are unable to accommodate that request."));
        assert!(prompt.contains("JSON array"));
    }

    #[tokio::test]
    async fn test_malformed_analysis_uses_fallback() {
        let host = ScriptedHost::new(Script {
            analysis: Ok("I improved the tone and made it clearer.".into()),
            ..Default::default()
        });
        let transformer = ready(&host).await;
        let resp = transformer
            .transform_text("fix this now", &TransformOptions::default())
            .await
            .unwrap();
        assert_eq!(
            resp.improvements.as_slice(),
            crate::analysis::FALLBACK_IMPROVEMENTS
        );
    }

    #[tokio::test]
    async fn test_capability_error_surfaces_verbatim() {
        let host = ScriptedHost::new(Script {
            rewrite: Err("model crashed".into()),
            ..Default::default()
        });
        let transformer = ready(&host).await;
        let err = transformer
            .transform_text("hello", &client_formal())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransformError::Capability(CapabilityError::Api { status: 500, ref body }) if body == "model crashed"
        ));
        assert_eq!(err.to_string(), "AI host returned 500: model crashed");
        assert_eq!(host.count(|c| matches!(c, Call::Prompt(_))), 0);
    }

    #[tokio::test]
    async fn test_blank_text_never_reaches_host() {
        let host = ScriptedHost::default();
        let transformer = ready(&host).await;
        let err = transformer
            .transform_text(" \t\n", &client_formal())
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::EmptyInput));
        assert_eq!(host.count(|c| matches!(c, Call::Rewrite { .. })), 0);
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        let host = ScriptedHost::default();
        let mut transformer = ready(&host).await;
        transformer.destroy();
        transformer.destroy();
        drop(transformer);
        assert_eq!(host.count(|c| matches!(c, Call::DestroyRewriter)), 1);
        assert_eq!(host.count(|c| matches!(c, Call::DestroyLanguageModel)), 1);
    }

    #[tokio::test]
    async fn test_reinitialize_releases_previous_handles() {
        let host = ScriptedHost::default();
        let mut transformer = ready(&host).await;
        assert!(transformer.initialize(None).await);
        assert_eq!(host.count(|c| matches!(c, Call::DestroyRewriter)), 1);
        assert_eq!(host.count(|c| matches!(c, Call::CreateRewriter)), 2);
    }

    #[tokio::test]
    async fn test_drop_releases_handles() {
        let host = ScriptedHost::default();
        {
            let _transformer = ready(&host).await;
        }
        assert_eq!(host.count(|c| matches!(c, Call::DestroyLanguageModel)), 1);
    }
}
