use atb_cli_utils::clap::{self, Parser};
use axum_client_ip::ClientIpSource;
use tonelift_core::llm::{OpenAiConfig, openai};
use tonelift_core::{Formality, Situation};

#[derive(Debug, Clone, Parser)]
pub struct HttpOpts {
    /// Address/port for the HTTP listener
    #[arg(long, env = "TONELIFT_HOST", default_value = "0.0.0.0:8000")]
    pub host: String,

    #[arg(
        long,
        value_delimiter = ';',
        default_value = "http://localhost:3000;http://127.0.0.1:3000;http://frontend:3000",
        env = "TONELIFT_CORS_ORIGINS"
    )]
    pub origins: Vec<String>,

    // Client IP extraction source (default: raw socket via ConnectInfo).
    #[arg(long, default_value = "ConnectInfo", env = "TONELIFT_CLIENT_IP_SOURCE")]
    pub client_ip_source: ClientIpSource,
}

#[derive(Clone, Debug, Parser)]
pub struct AiOpts {
    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "TONELIFT_AI_BASE_URL", default_value = openai::DEFAULT_BASE_URL)]
    pub ai_base_url: String,

    /// API key; may be empty for local servers
    #[arg(long, env = "OPENAI_API_KEY", default_value = "", hide_env_values = true)]
    pub openai_api_key: String,

    #[arg(long, env = "TONELIFT_AI_MODEL", default_value = openai::DEFAULT_MODEL)]
    pub ai_model: String,

    /// Sampling temperature for the analysis model (clamped to the host maximum)
    #[arg(long, env = "TONELIFT_AI_TEMPERATURE")]
    pub temperature: Option<f32>,
}

impl AiOpts {
    pub fn host_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            base_url: self.ai_base_url.clone(),
            api_key: self.openai_api_key.clone(),
            model: self.ai_model.clone(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Parser)]
pub struct TransformArgs {
    /// Message to transform
    pub text: String,

    #[arg(long, default_value = "other")]
    pub situation: Situation,

    #[arg(long, default_value = "formal")]
    pub formality: Formality,

    /// Optional free-text context for the rewrite
    #[arg(long)]
    pub context: Option<String>,

    /// Print the result as JSON
    #[arg(long, default_value = "false")]
    pub json: bool,
}
