use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{error, info, warn};

use super::context::{FlowContext, Limits};
use super::error::FlowError;
use crate::gateway::OutputSchema;
use crate::prompts::{Capability, TemplateVars};

pub const SENTINEL_ENGLISH: &str = "Error";
pub const SENTINEL_TRANSLATION: &str = "خطأ";
pub const SENTINEL_TRANSLITERATION: &str = "إيرور - لم يتمكن من جلب المفردات";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyRequest {
    /// Omitted means the configured default (3).
    #[serde(default)]
    pub num_words: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyEntry {
    pub english: String,
    pub arabic_translation: String,
    /// How the English sounds, written in Arabic letters.
    pub arabic_transliteration: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyResult {
    pub words: Vec<VocabularyEntry>,
}

impl VocabularyResult {
    /// Single placeholder entry returned when generation fails.
    pub fn sentinel() -> Self {
        Self {
            words: vec![VocabularyEntry {
                english: SENTINEL_ENGLISH.to_string(),
                arabic_translation: SENTINEL_TRANSLATION.to_string(),
                arabic_transliteration: SENTINEL_TRANSLITERATION.to_string(),
            }],
        }
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Self::sentinel()
    }
}

fn output_schema() -> &'static OutputSchema {
    static SCHEMA: OnceLock<OutputSchema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        OutputSchema::new(
            "GenerateDailyVocabularyOutput",
            json!({
                "type": "object",
                "properties": {
                    "words": {
                        "type": "array",
                        "description": "English words or short phrases with their Arabic translations and transliterations of the original English.",
                        "items": {
                            "type": "object",
                            "properties": {
                                "english": {
                                    "type": "string",
                                    "description": "The English word or phrase."
                                },
                                "arabicTranslation": {
                                    "type": "string",
                                    "description": "The Arabic translation of the English word/phrase."
                                },
                                "arabicTransliteration": {
                                    "type": "string",
                                    "description": "Arabic script rendering of how the original English sounds, not a transliteration of the Arabic translation. Use 'ق' (Qaf) for the hard 'G' sound and no diacritics."
                                }
                            },
                            "required": ["english", "arabicTranslation", "arabicTransliteration"]
                        }
                    }
                },
                "required": ["words"]
            }),
        )
    })
}

/// Requested word count after defaulting. Zero and anything above the
/// configured maximum are rejected.
pub fn resolve_count(request: &VocabularyRequest, limits: &Limits) -> Result<u32, FlowError> {
    let n = request.num_words.unwrap_or(limits.default_vocabulary_size);
    if n == 0 {
        return Err(FlowError::validation("numWords must be at least 1"));
    }
    if n > limits.max_vocabulary_size {
        return Err(FlowError::validation(format!(
            "numWords must be at most {}, got {}",
            limits.max_vocabulary_size, n
        )));
    }
    Ok(n)
}

/// Keep the first `n` complete, distinct entries. `None` if fewer than `n` remain.
fn select_entries(words: Vec<VocabularyEntry>, n: usize) -> Option<Vec<VocabularyEntry>> {
    let mut seen = HashSet::new();
    let selected: Vec<VocabularyEntry> = words
        .into_iter()
        .map(|entry| VocabularyEntry {
            english: entry.english.trim().to_string(),
            arabic_translation: entry.arabic_translation.trim().to_string(),
            arabic_transliteration: entry.arabic_transliteration.trim().to_string(),
        })
        .filter(|entry| {
            !entry.english.is_empty()
                && !entry.arabic_translation.is_empty()
                && !entry.arabic_transliteration.is_empty()
        })
        .filter(|entry| seen.insert(entry.english.to_lowercase()))
        .take(n)
        .collect();

    (selected.len() == n).then_some(selected)
}

/// Generate `numWords` vocabulary entries.
///
/// Only validation errors are returned as `Err`. A failed or empty generation
/// yields [`VocabularyResult::sentinel`].
pub async fn generate_vocabulary(
    ctx: &FlowContext,
    request: VocabularyRequest,
) -> Result<VocabularyResult, FlowError> {
    let n = resolve_count(&request, &ctx.limits)?;
    info!("Generating {} vocabulary words", n);

    let vars = TemplateVars::new().set("numWords", n.to_string());
    let reply: VocabularyResult = match ctx
        .run(Capability::Vocabulary, &vars, output_schema(), None)
        .await
    {
        Ok(Some(reply)) => reply,
        Ok(None) => {
            warn!("Vocabulary generation returned no payload, using fallback entry");
            return Ok(VocabularyResult::sentinel());
        }
        Err(FlowError::Gateway(e)) => {
            error!("Failed to generate daily vocabulary: {}", e);
            return Ok(VocabularyResult::sentinel());
        }
        Err(e) => return Err(e),
    };

    let returned = reply.words.len();
    match select_entries(reply.words, n as usize) {
        Some(words) => Ok(VocabularyResult { words }),
        None => {
            warn!(
                "Vocabulary reply had {} entries but {} usable ones were needed, using fallback entry",
                returned, n
            );
            Ok(VocabularyResult::sentinel())
        }
    }
}
