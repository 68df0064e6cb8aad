use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::interface::{GatewayError, GatewayRequest, ModelGateway};
use super::reply::parse_reply;

/// OpenAI compatible chat-completions gateway.
/// Also fronts any server speaking the same API (Ollama, vLLM, LM Studio...).
pub struct OpenAICompatibleGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    label: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    response_format: Value,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAICompatibleGateway {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_key: String,
        model: String,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Self {
        info!(
            "Initialized OpenAICompatibleGateway: model={}, base_url={}",
            model, base_url
        );
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            temperature,
            max_tokens,
            label: "openai_compatible_llm".to_string(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    fn user_content(request: &GatewayRequest<'_>) -> Value {
        let text = format!("{}\n\n{}", request.prompt, request.schema.instruction());
        match request.media {
            Some(media) => json!([
                { "type": "text", "text": text },
                { "type": "image_url", "image_url": { "url": media.data_uri() } }
            ]),
            None => Value::String(text),
        }
    }
}

#[async_trait]
impl ModelGateway for OpenAICompatibleGateway {
    async fn invoke(&self, request: GatewayRequest<'_>) -> Result<Option<Value>, GatewayError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: Self::user_content(&request),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: json!({ "type": "json_object" }),
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!("POST {} (schema={})", url, request.schema.name);

        let mut builder = self.client.post(&url).json(&body);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Provider { status, message });
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedReply(e.to_string()))?;

        match completion.choices.into_iter().next().and_then(|c| c.message.content) {
            Some(content) => parse_reply(&content),
            None => Ok(None),
        }
    }

    fn name(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MediaPart, OutputSchema};

    #[test]
    fn test_user_content_with_image_uses_parts() {
        let schema = OutputSchema::new("X", json!({"type": "object"}));
        let media = MediaPart {
            mime_type: "image/jpeg".to_string(),
            data_base64: "AAAA".to_string(),
        };
        let content = OpenAICompatibleGateway::user_content(&GatewayRequest {
            prompt: "Extract",
            schema: &schema,
            media: Some(&media),
        });
        assert_eq!(content[1]["image_url"]["url"], "data:image/jpeg;base64,AAAA");
        assert!(content[0]["text"].as_str().unwrap().starts_with("Extract\n\n"));
    }

    #[test]
    fn test_user_content_without_image_is_string() {
        let schema = OutputSchema::new("X", json!({"type": "object"}));
        let content = OpenAICompatibleGateway::user_content(&GatewayRequest {
            prompt: "Translate",
            schema: &schema,
            media: None,
        });
        assert!(content.as_str().unwrap().contains("JSON schema"));
    }
}
