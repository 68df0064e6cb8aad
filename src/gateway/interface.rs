use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::schema::OutputSchema;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),

    #[error("model provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("model reply could not be parsed: {0}")]
    MalformedReply(String),

    #[error("model reply does not match the '{schema}' schema: {reason}")]
    SchemaMismatch { schema: String, reason: String },
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Network(err.to_string())
    }
}

/// Binary attachment sent alongside the prompt, e.g. an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPart {
    pub mime_type: String,
    /// Standard base64, no `data:` prefix.
    pub data_base64: String,
}

impl MediaPart {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data_base64)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GatewayRequest<'a> {
    pub prompt: &'a str,
    pub schema: &'a OutputSchema,
    pub media: Option<&'a MediaPart>,
}

/// Boundary to a hosted model.
///
/// Implementations send the rendered prompt, parse the raw reply as JSON and hand
/// back the value, or `None` when the model produced an empty / null payload.
/// Shape checking against `request.schema` happens in [`generate`].
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn invoke(&self, request: GatewayRequest<'_>) -> Result<Option<Value>, GatewayError>;

    /// Provider label for logs and the health endpoint.
    fn name(&self) -> &str;
}

/// Invoke the gateway and return a value guaranteed to satisfy `request.schema`.
pub async fn generate<T: DeserializeOwned>(
    gateway: &dyn ModelGateway,
    request: GatewayRequest<'_>,
) -> Result<Option<T>, GatewayError> {
    let schema = request.schema;
    let Some(value) = gateway.invoke(request).await? else {
        return Ok(None);
    };

    let value = schema.normalize(value);
    schema.validate(&value).map_err(|reason| GatewayError::SchemaMismatch {
        schema: schema.name.to_string(),
        reason,
    })?;

    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| GatewayError::SchemaMismatch {
            schema: schema.name.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::RecordingGateway;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Out {
        translated_text: String,
    }

    fn schema() -> OutputSchema {
        OutputSchema::new(
            "TranslateOutput",
            json!({
                "type": "object",
                "properties": { "translatedText": { "type": "string" } },
                "required": ["translatedText"]
            }),
        )
    }

    #[tokio::test]
    async fn test_generate_returns_typed_value() {
        let gateway = RecordingGateway::replying(json!({"translatedText": "مرحبا"}));
        let schema = schema();
        let out: Option<Out> = generate(
            &gateway,
            GatewayRequest { prompt: "p", schema: &schema, media: None },
        )
        .await
        .unwrap();
        assert_eq!(out, Some(Out { translated_text: "مرحبا".to_string() }));
    }

    #[tokio::test]
    async fn test_generate_rejects_wrong_shape() {
        let gateway = RecordingGateway::replying(json!({"text": "hello"}));
        let schema = schema();
        let err = generate::<Out>(
            &gateway,
            GatewayRequest { prompt: "p", schema: &schema, media: None },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GatewayError::SchemaMismatch { .. }));
    }

    #[tokio::test]
    async fn test_generate_passes_through_empty() {
        let gateway = RecordingGateway::empty();
        let schema = schema();
        let out = generate::<Out>(
            &gateway,
            GatewayRequest { prompt: "p", schema: &schema, media: None },
        )
        .await
        .unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn test_media_data_uri() {
        let media = MediaPart {
            mime_type: "image/png".to_string(),
            data_base64: "aGk=".to_string(),
        };
        assert_eq!(media.data_uri(), "data:image/png;base64,aGk=");
    }
}
