use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::error::FlowError;
use crate::gateway::MediaPart;

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Trimmed `text`, provided it is non-blank and within `max_words`.
pub fn require_text(text: &str, max_words: usize) -> Result<&str, FlowError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FlowError::validation("text must not be empty"));
    }

    let words = word_count(trimmed);
    if words > max_words {
        return Err(FlowError::validation(format!(
            "text is limited to {} words, got {}",
            max_words, words
        )));
    }
    Ok(trimmed)
}

/// Parse a `data:image/<type>;base64,<payload>` URI into a media attachment.
pub fn parse_image_data_uri(uri: &str, max_bytes: usize) -> Result<MediaPart, FlowError> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| FlowError::validation("image data must be a data: URI"))?;

    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| FlowError::validation("image data URI has no payload"))?;

    let mime_type = meta
        .strip_suffix(";base64")
        .ok_or_else(|| FlowError::validation("image data URI must be base64 encoded"))?
        .to_ascii_lowercase();
    if !mime_type.starts_with("image/") || mime_type.len() == "image/".len() {
        return Err(FlowError::validation(format!(
            "unsupported media type '{}', expected an image",
            mime_type
        )));
    }

    let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let decoded = STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| FlowError::validation(format!("image data is not valid base64: {}", e)))?;

    if decoded.is_empty() {
        return Err(FlowError::validation("image data is empty"));
    }
    if decoded.len() > max_bytes {
        return Err(FlowError::validation(format!(
            "image is {} bytes, the limit is {} bytes",
            decoded.len(),
            max_bytes
        )));
    }

    Ok(MediaPart {
        mime_type,
        data_base64: payload,
    })
}

/// Build a data URI from raw upload bytes.
pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text_trims() {
        assert_eq!(require_text("  Good morning \n", 50).unwrap(), "Good morning");
    }

    #[test]
    fn test_require_text_rejects_blank() {
        assert!(require_text("", 50).unwrap_err().is_validation());
        assert!(require_text(" \t\n ", 50).unwrap_err().is_validation());
    }

    #[test]
    fn test_require_text_word_limit() {
        assert!(require_text("one two three", 3).is_ok());
        let err = require_text("one two three four", 3).unwrap_err();
        assert_eq!(err.to_string(), "text is limited to 3 words, got 4");
    }

    #[test]
    fn test_parse_image_data_uri() {
        let uri = to_data_uri("image/PNG", b"\x89PNG fake");
        let media = parse_image_data_uri(&uri, 1024).unwrap();
        assert_eq!(media.mime_type, "image/png");
        assert_eq!(STANDARD.decode(&media.data_base64).unwrap(), b"\x89PNG fake");
    }

    #[test]
    fn test_parse_image_data_uri_rejections() {
        let cases = [
            "https://example.com/a.png",
            "data:image/png;base64",
            "data:image/png,abcd",
            "data:text/plain;base64,aGVsbG8=",
            "data:image/png;base64,***",
            "data:image/png;base64,",
        ];
        for case in cases {
            assert!(
                parse_image_data_uri(case, 1024).unwrap_err().is_validation(),
                "{} should be rejected",
                case
            );
        }
    }

    #[test]
    fn test_parse_image_data_uri_size_limit() {
        let uri = to_data_uri("image/jpeg", &[0u8; 64]);
        assert!(parse_image_data_uri(&uri, 64).is_ok());
        assert!(parse_image_data_uri(&uri, 63).is_err());
    }
}
