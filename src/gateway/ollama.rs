use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use super::interface::{GatewayError, GatewayRequest, ModelGateway};
use super::openai_compatible::OpenAICompatibleGateway;

/// Ollama gateway.
/// Extends OpenAICompatibleGateway since Ollama serves an OpenAI-compatible API under /v1
pub struct OllamaGateway {
    inner: OpenAICompatibleGateway,
}

impl OllamaGateway {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        model: String,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Self {
        info!("Initialized OllamaGateway: model={}, base_url={}", model, base_url);

        // Ollama ignores the key but some proxies in front of it expect one
        let inner = OpenAICompatibleGateway::new(
            client,
            base_url,
            "ollama".to_string(),
            model,
            temperature,
            max_tokens,
        )
        .with_label("ollama_llm");

        Self { inner }
    }
}

#[async_trait]
impl ModelGateway for OllamaGateway {
    async fn invoke(&self, request: GatewayRequest<'_>) -> Result<Option<Value>, GatewayError> {
        self.inner.invoke(request).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
