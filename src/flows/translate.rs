use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::OnceLock;
use tracing::info;

use super::context::FlowContext;
use super::error::FlowError;
use super::language::Language;
use super::validation::{require_text, word_count};
use crate::gateway::OutputSchema;
use crate::prompts::{Capability, TemplateVars};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    pub text: String,
    pub target_language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub translated_text: String,
}

fn output_schema() -> &'static OutputSchema {
    static SCHEMA: OnceLock<OutputSchema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        OutputSchema::new(
            "TranslateUserMessageOutput",
            json!({
                "type": "object",
                "properties": {
                    "translatedText": { "type": "string", "description": "The translated text." }
                },
                "required": ["translatedText"]
            }),
        )
    })
}

/// Translate `request.text` into the target language.
pub async fn translate(
    ctx: &FlowContext,
    request: TranslationRequest,
) -> Result<TranslationResult, FlowError> {
    let text = require_text(&request.text, ctx.limits.max_words)?;
    info!(
        "Translating {} words to {}",
        word_count(text),
        request.target_language
    );

    let vars = TemplateVars::new()
        .set("targetLanguage", request.target_language.english_name())
        .set("text", text);

    ctx.run(Capability::Translate, &vars, output_schema(), None)
        .await?
        .ok_or(FlowError::EmptyResult("translation"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::Limits;
    use crate::gateway::mock::RecordingGateway;
    use crate::gateway::GatewayError;
    use crate::prompts::PromptLibrary;
    use std::sync::Arc;

    fn context(gateway: Arc<RecordingGateway>) -> FlowContext {
        FlowContext::new(gateway, Arc::new(PromptLibrary::builtin()), Limits::default())
    }

    fn request(text: &str, target_language: Language) -> TranslationRequest {
        TranslationRequest {
            text: text.to_string(),
            target_language,
        }
    }

    #[tokio::test]
    async fn test_translate_renders_prompt() {
        let gateway = Arc::new(RecordingGateway::replying(
            json!({"translatedText": "صباح الخير"}),
        ));
        let result = translate(&context(gateway.clone()), request("Good morning", Language::Ar))
            .await
            .unwrap();

        assert_eq!(result.translated_text, "صباح الخير");
        assert_eq!(
            gateway.last_prompt().unwrap(),
            "Translate the following text to Arabic:\n\nGood morning"
        );
        assert_eq!(gateway.calls()[0].schema, "TranslateUserMessageOutput");
    }

    #[tokio::test]
    async fn test_blank_text_never_reaches_gateway() {
        let gateway = Arc::new(RecordingGateway::replying(json!({"translatedText": "x"})));
        let err = translate(&context(gateway.clone()), request("   \n", Language::En))
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_word_limit_enforced() {
        let gateway = Arc::new(RecordingGateway::replying(json!({"translatedText": "x"})));
        let long_text = vec!["word"; 51].join(" ");
        let err = translate(&context(gateway.clone()), request(&long_text, Language::Ar))
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_gateway_failure_propagates() {
        let gateway = Arc::new(RecordingGateway::failing(GatewayError::Network(
            "connection refused".to_string(),
        )));
        let err = translate(&context(gateway), request("hello", Language::Ar))
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Gateway(GatewayError::Network(_))));
    }

    #[tokio::test]
    async fn test_empty_result_is_an_error() {
        let gateway = Arc::new(RecordingGateway::empty());
        let err = translate(&context(gateway), request("hello", Language::Ar))
            .await
            .unwrap_err();
        assert_eq!(err, FlowError::EmptyResult("translation"));
    }

    #[test]
    fn test_request_wire_format() {
        let request: TranslationRequest =
            serde_json::from_value(json!({"text": "hi", "targetLanguage": "ar"})).unwrap();
        assert_eq!(request.target_language, Language::Ar);
        let result = serde_json::to_value(TranslationResult {
            translated_text: "مرحبا".to_string(),
        })
        .unwrap();
        assert_eq!(result, json!({"translatedText": "مرحبا"}));
    }
}
