//! Built-in instruction templates, one per capability.
//!
//! The rendering rules inside these texts (the Qaf rule for a hard "G", phonetic
//! rendering of the source text, vowel letters instead of diacritics) are only
//! enforced by the model reading them, so edits here change output behaviour.

use std::collections::HashMap;
use std::fmt;

use super::template::{PromptError, PromptTemplate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Translate,
    Transliterate,
    Vocabulary,
    ExtractText,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Translate,
        Capability::Transliterate,
        Capability::Vocabulary,
        Capability::ExtractText,
    ];

    /// Key used in `prompt_overrides`.
    pub fn key(self) -> &'static str {
        match self {
            Capability::Translate => "translate",
            Capability::Transliterate => "transliterate",
            Capability::Vocabulary => "vocabulary",
            Capability::ExtractText => "extract_text",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

const TRANSLATE_PROMPT: &str = "Translate the following text to {{targetLanguage}}:\n\n{{text}}";

const TRANSLITERATE_PROMPT: &str = r#"You are a helpful assistant that transliterates text between Arabic and English.

If the source language is English, convert the English text to Arabic script, focusing on phonetic accuracy. Render how the source text sounds, not its meaning, and never transliterate a translation of it.
**When transliterating English text to Arabic script, if the English text contains the letter 'G' (especially the hard 'G' sound as in 'go', 'good', 'game'), preferentially use the Arabic letter 'ق' (Qaf) to represent it. For example, 'game' should be transliterated as 'قيم', and 'good' as 'قود'. Avoid using 'ج' or 'غ' for 'G' unless phonetically more appropriate for specific edge cases or names.**
Do not use Arabic diacritical marks (harakat such as fatha, damma, kasra, shadda or sukun). Represent vowel sounds with the Arabic vowel letters instead: 'ا' for 'a', 'ي' for 'i' and 'و' for 'u'. For example, 'Good morning' should be 'قود مورنينج' and 'Thank you' should be 'ثانك يو'.
If the source language is Arabic, convert the Arabic text to English script (Latin characters), maintaining the original pronunciation as closely as possible.

Source Language: {{{sourceLanguage}}}
Text: {{{text}}}

Transliterated Text: "#;

const VOCABULARY_PROMPT: &str = r#"You are an English-Arabic vocabulary assistant.
Generate a list of {{numWords}} common, varied, and **strictly non-repetitive** English words or short phrases. Aim for maximum diversity in the selection. **It is crucial that the generated words are not simple repetitions of common examples and are distinct from each other in the current list. Avoid re-generating words that might have been provided in recent requests.**

For each English word/phrase, you MUST provide:
1.  'english': The original English word or phrase.
2.  'arabicTranslation': The most common and natural Arabic translation for the English word/phrase.
3.  'arabicTransliteration': An Arabic script representation of how the *original English word or phrase* sounds phonetically. This is NOT a transliteration of the Arabic translation. It should accurately reflect the English pronunciation using Arabic letters.
    **Important note for transliterating the letter 'G': In most cases, use the Arabic letter 'ق' (Qaf) to represent the English 'G' sound, especially for the hard 'G' sound (as in 'go', 'good', 'game'). For example, if English is "Good morning", the arabicTransliteration should be "قود مورنينج", not "جود مورنينج".**
    Do not use Arabic diacritical marks. Represent vowel sounds with the Arabic vowel letters 'ا', 'و' and 'ي' instead.
    For "Thank you", the arabicTransliteration should be "ثانك يو". For "hello", it should be "هالو".

Format the response as a JSON object with a "words" array of objects, where each object has the "english", "arabicTranslation", and "arabicTransliteration" keys.

Example for "Good morning" (with preferred 'G' transliteration):
{
  "english": "Good morning",
  "arabicTranslation": "صباح الخير",
  "arabicTransliteration": "قود مورنينج"
}

Ensure the words provided are common enough for a language learner but try to avoid overly simple or frequently suggested words if possible, to provide a richer learning experience. **Prioritize novelty and uniqueness in each generated list.**
"#;

const EXTRACT_TEXT_PROMPT: &str = r#"You are a text extraction assistant. Read the attached image and extract all of the text it contains.

Keep the text exactly as written, in its original language (Arabic, English or both), preserving line breaks and reading order. Do not translate, correct, summarize or describe the image.
If the image contains no readable text, return an empty string."#;

/// The four capability templates, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    templates: HashMap<Capability, PromptTemplate>,
}

impl PromptLibrary {
    pub fn builtin() -> Self {
        let templates = Capability::ALL
            .into_iter()
            .map(|capability| (capability, Self::builtin_template(capability)))
            .collect();
        Self { templates }
    }

    fn builtin_template(capability: Capability) -> PromptTemplate {
        let text = match capability {
            Capability::Translate => TRANSLATE_PROMPT,
            Capability::Transliterate => TRANSLITERATE_PROMPT,
            Capability::Vocabulary => VOCABULARY_PROMPT,
            Capability::ExtractText => EXTRACT_TEXT_PROMPT,
        };
        PromptTemplate::new(format!("{}Prompt", capability.key()), 1, text)
    }

    /// Built-in templates with operator overrides applied.
    ///
    /// An override must interpolate exactly the fields the built-in one does.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Result<Self, PromptError> {
        let mut library = Self::builtin();
        for (key, text) in overrides {
            let capability = Capability::from_key(key)
                .ok_or_else(|| PromptError::UnknownCapability(key.clone()))?;
            let builtin = library.get(capability);
            let replacement =
                PromptTemplate::new(builtin.name.clone(), builtin.version + 1, text.clone());

            let expected = builtin.placeholders();
            let found = replacement.placeholders();
            if expected != found {
                return Err(PromptError::OverrideMismatch {
                    template: key.clone(),
                    expected,
                    found,
                });
            }
            library.templates.insert(capability, replacement);
        }
        Ok(library)
    }

    pub fn get(&self, capability: Capability) -> &PromptTemplate {
        // builtin() and with_overrides() populate every capability
        &self.templates[&capability]
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}
