pub mod context;
pub mod error;
pub mod language;
pub mod validation;

pub mod extract_text;
pub mod translate;
pub mod transliterate;
pub mod vocabulary;

pub use context::*;
pub use error::*;

pub use extract_text::{extract_text, ExtractionRequest, ExtractionResult};
pub use translate::{translate, TranslationRequest, TranslationResult};
pub use transliterate::{transliterate, TransliterationRequest, TransliterationResult};
pub use vocabulary::{generate_vocabulary, VocabularyRequest, VocabularyResult};
