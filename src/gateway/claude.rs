use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::interface::{GatewayError, GatewayRequest, ModelGateway};
use super::reply::parse_reply;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude messages API gateway
pub struct ClaudeGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl ClaudeGateway {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_key: String,
        model: String,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        info!("Initialized ClaudeGateway: model={}, base_url={}", model, base_url);
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            temperature,
            max_tokens,
        }
    }

    fn request_body(&self, request: &GatewayRequest<'_>) -> Value {
        let mut content = Vec::new();
        if let Some(media) = request.media {
            content.push(json!({
                "type": "image",
                "source": {
                    "type": "base64",
                    "media_type": media.mime_type,
                    "data": media.data_base64
                }
            }));
        }
        content.push(json!({
            "type": "text",
            "text": format!("{}\n\n{}", request.prompt, request.schema.instruction())
        }));

        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "messages": [{ "role": "user", "content": content }]
        })
    }
}

#[async_trait]
impl ModelGateway for ClaudeGateway {
    async fn invoke(&self, request: GatewayRequest<'_>) -> Result<Option<Value>, GatewayError> {
        let url = format!("{}/v1/messages", self.base_url);
        debug!("POST {} (schema={})", url, request.schema.name);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request_body(&request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Provider { status, message });
        }

        let reply: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedReply(e.to_string()))?;

        let text: String = reply.content.into_iter().filter_map(|b| b.text).collect();
        parse_reply(&text)
    }

    fn name(&self) -> &str {
        "claude_llm"
    }
}
