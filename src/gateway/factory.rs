use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::claude::ClaudeGateway;
use super::gemini::GeminiGateway;
use super::interface::ModelGateway;
use super::ollama::OllamaGateway;
use super::openai_compatible::OpenAICompatibleGateway;
use crate::config::{LlmConfig, ProviderConfig};

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Factory for creating model gateways
pub struct GatewayFactory;

impl GatewayFactory {
    /// Create the gateway named by `llm_config.llm_provider`.
    ///
    /// A missing provider block falls back to defaults; API keys may also come
    /// from the provider's conventional environment variable.
    pub fn create_gateway(llm_config: &LlmConfig) -> Result<Arc<dyn ModelGateway>> {
        let provider = llm_config.llm_provider.as_str();
        info!("Initializing model gateway: {}", provider);

        match provider {
            "openai_compatible_llm" | "openai_llm" => {
                let cfg = llm_config.openai_compatible_llm.clone().unwrap_or_default();
                Ok(Arc::new(OpenAICompatibleGateway::new(
                    Self::http_client(&cfg)?,
                    cfg.base_url.clone().unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
                    Self::api_key(&cfg, &["OPENAI_API_KEY"]).unwrap_or_default(),
                    cfg.model.clone().unwrap_or_else(|| "gpt-4o-mini".to_string()),
                    cfg.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                    cfg.max_tokens,
                )))
            }
            "ollama_llm" => {
                let cfg = llm_config.ollama_llm.clone().unwrap_or_default();
                Ok(Arc::new(OllamaGateway::new(
                    Self::http_client(&cfg)?,
                    cfg.base_url.clone().unwrap_or_else(|| "http://localhost:11434/v1".to_string()),
                    cfg.model.clone().unwrap_or_else(|| "llama3.2-vision".to_string()),
                    cfg.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                    cfg.max_tokens,
                )))
            }
            "gemini_llm" => {
                let cfg = llm_config.gemini_llm.clone().unwrap_or_default();
                let api_key = Self::api_key(&cfg, &["GEMINI_API_KEY", "GOOGLE_API_KEY"])
                    .ok_or_else(|| anyhow::anyhow!("Gemini API key not provided"))?;
                Ok(Arc::new(GeminiGateway::new(
                    Self::http_client(&cfg)?,
                    cfg.base_url.clone().unwrap_or_else(|| {
                        "https://generativelanguage.googleapis.com/v1beta".to_string()
                    }),
                    api_key,
                    cfg.model.clone().unwrap_or_else(|| "gemini-2.0-flash".to_string()),
                    cfg.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                    cfg.max_tokens,
                )))
            }
            "claude_llm" => {
                let cfg = llm_config.claude_llm.clone().unwrap_or_default();
                let api_key = Self::api_key(&cfg, &["ANTHROPIC_API_KEY"])
                    .ok_or_else(|| anyhow::anyhow!("Claude API key not provided"))?;
                Ok(Arc::new(ClaudeGateway::new(
                    Self::http_client(&cfg)?,
                    cfg.base_url.clone().unwrap_or_else(|| "https://api.anthropic.com".to_string()),
                    api_key,
                    cfg.model.clone().unwrap_or_else(|| "claude-3-5-haiku-latest".to_string()),
                    cfg.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                    cfg.max_tokens.unwrap_or(2048),
                )))
            }
            _ => Err(anyhow::anyhow!("Unsupported LLM provider: {}", provider)),
        }
    }

    /// Timeouts live on the transport; flows never impose their own.
    fn http_client(cfg: &ProviderConfig) -> Result<reqwest::Client> {
        let timeout = Duration::from_secs(cfg.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        Ok(reqwest::Client::builder()
            .user_agent(concat!("natiq-backend/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?)
    }

    /// Configured key if set (and not an unexpanded `${VAR}`), else the first env var found.
    fn api_key(cfg: &ProviderConfig, env_vars: &[&str]) -> Option<String> {
        cfg.llm_api_key
            .clone()
            .filter(|key| !key.trim().is_empty() && !key.starts_with("${"))
            .or_else(|| {
                env_vars
                    .iter()
                    .filter_map(|name| std::env::var(name).ok())
                    .find(|key| !key.trim().is_empty())
            })
    }
}
