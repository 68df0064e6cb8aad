use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::interface::{GatewayError, GatewayRequest, ModelGateway};
use super::reply::parse_reply;

/// Google Gemini `generateContent` gateway
pub struct GeminiGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiGateway {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_key: String,
        model: String,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Self {
        info!("Initialized GeminiGateway: model={}, base_url={}", model, base_url);
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
        let mut parts = vec![json!({
            "text": format!("{}\n\n{}", request.prompt, request.schema.instruction())
        })];
        if let Some(media) = request.media {
            parts.push(json!({
                "inlineData": { "mimeType": media.mime_type, "data": media.data_base64 }
            }));
        }

        let mut generation_config = json!({
            "temperature": self.temperature,
            "responseMimeType": "application/json",
            "responseSchema": request.schema.schema.clone()
        });
        if let Some(max_tokens) = self.max_tokens {
            generation_config["maxOutputTokens"] = json!(max_tokens);
        }

        json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": generation_config
        })
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn invoke(&self, request: GatewayRequest<'_>) -> Result<Option<Value>, GatewayError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!("POST {} (schema={})", url, request.schema.name);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(&request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Provider { status, message });
        }

        let reply: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedReply(e.to_string()))?;

        if let Some(reason) = reply.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GatewayError::Provider {
                status: 200,
                message: format!("prompt blocked: {}", reason),
            });
        }

        let text: String = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        parse_reply(&text)
    }

    fn name(&self) -> &str {
        "gemini_llm"
    }
}
