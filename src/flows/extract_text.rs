use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::OnceLock;
use tracing::info;

use super::context::FlowContext;
use super::error::FlowError;
use super::validation::parse_image_data_uri;
use crate::gateway::OutputSchema;
use crate::prompts::{Capability, TemplateVars};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRequest {
    /// `data:image/...;base64,...`
    #[serde(rename = "imageData", alias = "imageDataUri")]
    pub image_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Empty when the image holds no readable text.
    pub extracted_text: String,
}

fn output_schema() -> &'static OutputSchema {
    static SCHEMA: OnceLock<OutputSchema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        OutputSchema::new(
            "ExtractTextFromImageOutput",
            json!({
                "type": "object",
                "properties": {
                    "extractedText": {
                        "type": "string",
                        "description": "All text found in the image, or an empty string if there is none."
                    }
                },
                "required": ["extractedText"]
            }),
        )
    })
}

pub async fn extract_text(
    ctx: &FlowContext,
    request: ExtractionRequest,
) -> Result<ExtractionResult, FlowError> {
    let media = parse_image_data_uri(&request.image_data, ctx.limits.max_image_bytes)?;
    info!(
        "Extracting text from {} image ({} base64 chars)",
        media.mime_type,
        media.data_base64.len()
    );

    ctx.run(
        Capability::ExtractText,
        &TemplateVars::new(),
        output_schema(),
        Some(&media),
    )
    .await?
    .ok_or(FlowError::EmptyResult("extracted text"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::validation::to_data_uri;
    use crate::flows::Limits;
    use crate::gateway::mock::RecordingGateway;
    use crate::prompts::PromptLibrary;
    use std::sync::Arc;

    fn context(gateway: Arc<RecordingGateway>) -> FlowContext {
        FlowContext::new(gateway, Arc::new(PromptLibrary::builtin()), Limits::default())
    }

    #[tokio::test]
    async fn test_image_is_attached() {
        let gateway = Arc::new(RecordingGateway::replying(
            json!({"extractedText": "مرحبا بالعالم"}),
        ));
        let result = extract_text(
            &context(gateway.clone()),
            ExtractionRequest {
                image_data: to_data_uri("image/png", b"png-bytes"),
            },
        )
        .await
        .unwrap();

        assert_eq!(result.extracted_text, "مرحبا بالعالم");
        let call = &gateway.calls()[0];
        assert_eq!(call.media.as_ref().unwrap().mime_type, "image/png");
        assert!(call.prompt.contains("extract all of the text"));
    }

    #[tokio::test]
    async fn test_empty_text_is_success() {
        let gateway = Arc::new(RecordingGateway::replying(json!({"extractedText": ""})));
        let result = extract_text(
            &context(gateway),
            ExtractionRequest {
                image_data: to_data_uri("image/jpeg", b"jpeg-bytes"),
            },
        )
        .await
        .unwrap();
        assert_eq!(result.extracted_text, "");
    }

    #[tokio::test]
    async fn test_null_payload_is_error() {
        let gateway = Arc::new(RecordingGateway::empty());
        let err = extract_text(
            &context(gateway),
            ExtractionRequest {
                image_data: to_data_uri("image/jpeg", b"jpeg-bytes"),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, FlowError::EmptyResult("extracted text"));
    }

    #[tokio::test]
    async fn test_invalid_image_not_sent() {
        let gateway = Arc::new(RecordingGateway::empty());
        let err = extract_text(
            &context(gateway.clone()),
            ExtractionRequest {
                image_data: "not an image".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(gateway.call_count(), 0);
    }

    #[test]
    fn test_request_accepts_both_field_names() {
        let a: ExtractionRequest = serde_json::from_value(json!({"imageData": "x"})).unwrap();
        let b: ExtractionRequest = serde_json::from_value(json!({"imageDataUri": "y"})).unwrap();
        assert_eq!(a.image_data, "x");
        assert_eq!(b.image_data, "y");
    }
}
