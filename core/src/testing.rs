//! In-memory [`AiHost`] that replays scripted responses and records every
//! call, for tests in this crate and its dependents.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::capability::{
    AiHost, Availability, CapabilityResult, LanguageModel, LanguageModelOptions,
    ModelCapabilities, RewriteOptions, Rewriter,
};
use crate::errors::CapabilityError;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateRewriter,
    Capabilities,
    CreateLanguageModel(LanguageModelOptions),
    Rewrite { text: String, context: String },
    Prompt(String),
    DestroyRewriter,
    DestroyLanguageModel,
}

#[derive(Debug, Clone)]
pub struct Script {
    pub available: Availability,
    pub rewrite: Result<String, String>,
    pub analysis: Result<String, String>,
    pub fail_create: bool,
    pub max_temperature: f32,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            available: Availability::Readily,
            rewrite: Ok("We are unable to accommodate that request.".into()),
            analysis: Ok(r#"["Softened refusal","Added politeness","Clearer wording"]"#.into()),
            fail_create: false,
            max_temperature: 2.0,
        }
    }
}

#[derive(Clone, Default)]
pub struct ScriptedHost {
    script: Arc<Mutex<Script>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedHost {
    pub fn new(script: Script) -> Self {
        Self {
            script: Arc::new(Mutex::new(script)),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().expect("calls lock").iter().filter(|c| pred(c)).count()
    }

    pub fn set_script(&self, script: Script) {
        *self.script.lock().expect("script lock") = script;
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn script(&self) -> Script {
        self.script.lock().expect("script lock").clone()
    }
}

fn failure(body: String) -> CapabilityError {
    CapabilityError::Api { status: 500, body }
}

struct ScriptedRewriter(ScriptedHost);

#[async_trait]
impl Rewriter for ScriptedRewriter {
    async fn rewrite(&self, text: &str, options: &RewriteOptions) -> CapabilityResult<String> {
        self.0.record(Call::Rewrite {
            text: text.to_string(),
            context: options.context.clone(),
        });
        self.0.script().rewrite.map_err(failure)
    }

    fn destroy(self: Box<Self>) {
        self.0.record(Call::DestroyRewriter);
    }
}

struct ScriptedModel(ScriptedHost);

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn prompt(&self, text: &str) -> CapabilityResult<String> {
        self.0.record(Call::Prompt(text.to_string()));
        self.0.script().analysis.map_err(failure)
    }

    fn destroy(self: Box<Self>) {
        self.0.record(Call::DestroyLanguageModel);
    }
}

#[async_trait]
impl AiHost for ScriptedHost {
    async fn create_rewriter(&self) -> CapabilityResult<Box<dyn Rewriter>> {
        self.record(Call::CreateRewriter);
        if self.script().fail_create {
            return Err(CapabilityError::Unavailable("rewriter missing".into()));
        }
        Ok(Box::new(ScriptedRewriter(self.clone())))
    }

    async fn capabilities(&self) -> CapabilityResult<ModelCapabilities> {
        self.record(Call::Capabilities);
        let script = self.script();
        Ok(ModelCapabilities {
            available: script.available,
            default_top_k: 3,
            max_top_k: 8,
            default_temperature: 1.0,
            max_temperature: script.max_temperature,
        })
    }

    async fn create_language_model(
        &self,
        options: LanguageModelOptions,
    ) -> CapabilityResult<Box<dyn LanguageModel>> {
        self.record(Call::CreateLanguageModel(options));
        Ok(Box::new(ScriptedModel(self.clone())))
    }
}
