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
pub struct TransliterationRequest {
    pub text: String,
    pub source_language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransliterationResult {
    pub transliterated_text: String,
}

fn output_schema() -> &'static OutputSchema {
    static SCHEMA: OnceLock<OutputSchema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        OutputSchema::new(
            "TransliterateUserMessageOutput",
            json!({
                "type": "object",
                "properties": {
                    "transliteratedText": {
                        "type": "string",
                        "description": "The transliterated text."
                    }
                },
                "required": ["transliteratedText"]
            }),
        )
    })
}

/// Render the sound of `request.text` in the other script.
/// English goes to Arabic letters, Arabic goes to Latin letters.
pub async fn transliterate(
    ctx: &FlowContext,
    request: TransliterationRequest,
) -> Result<TransliterationResult, FlowError> {
    let text = require_text(&request.text, ctx.limits.max_words)?;
    info!(
        "Transliterating {} words from {}",
        word_count(text),
        request.source_language
    );

    let vars = TemplateVars::new()
        .set("sourceLanguage", request.source_language.english_name())
        .set("text", text);

    ctx.run(Capability::Transliterate, &vars, output_schema(), None)
        .await?
        .ok_or(FlowError::EmptyResult("transliteration"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::translate::{translate, TranslationRequest};
    use crate::flows::Limits;
    use crate::gateway::mock::RecordingGateway;
    use crate::prompts::PromptLibrary;
    use std::sync::Arc;

    fn context(gateway: Arc<RecordingGateway>) -> FlowContext {
        FlowContext::new(gateway, Arc::new(PromptLibrary::builtin()), Limits::default())
    }

    #[tokio::test]
    async fn test_prompt_asks_for_qaf_on_hard_g() {
        let gateway = Arc::new(RecordingGateway::replying(
            json!({"transliteratedText": "قود مورنينج"}),
        ));
        let result = transliterate(
            &context(gateway.clone()),
            TransliterationRequest {
                text: "Good morning".to_string(),
                source_language: Language::En,
            },
        )
        .await
        .unwrap();

        assert_eq!(result.transliterated_text, "قود مورنينج");
        let prompt = gateway.last_prompt().unwrap();
        assert!(prompt.contains("preferentially use the Arabic letter 'ق' (Qaf)"));
        assert!(prompt.contains("Source Language: English\nText: Good morning"));
    }

    #[tokio::test]
    async fn test_whitespace_only_text_rejected() {
        let gateway = Arc::new(RecordingGateway::replying(json!({"transliteratedText": "x"})));
        let err = transliterate(
            &context(gateway.clone()),
            TransliterationRequest {
                text: "\t  ".to_string(),
                source_language: Language::Ar,
            },
        )
        .await
        .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_translate_then_transliterate_round_trip() {
        let translator = Arc::new(RecordingGateway::replying(
            json!({"translatedText": "صباح الخير"}),
        ));
        let translated = translate(
            &context(translator),
            TranslationRequest {
                text: "Good morning".to_string(),
                target_language: Language::Ar,
            },
        )
        .await
        .unwrap();

        let transliterator = Arc::new(RecordingGateway::replying(
            json!({"transliteratedText": "sabah al-khair"}),
        ));
        let result = transliterate(
            &context(transliterator.clone()),
            TransliterationRequest {
                text: translated.translated_text,
                source_language: Language::Ar,
            },
        )
        .await;

        assert!(result.is_ok());
        assert!(transliterator
            .last_prompt()
            .unwrap()
            .contains("Source Language: Arabic\nText: صباح الخير"));
    }

    #[tokio::test]
    async fn test_malformed_shape_is_gateway_error() {
        let gateway = Arc::new(RecordingGateway::replying(json!({"text": 42})));
        let err = transliterate(
            &context(gateway),
            TransliterationRequest {
                text: "hello".to_string(),
                source_language: Language::En,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FlowError::Gateway(_)));
    }
}
