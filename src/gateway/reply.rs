use serde_json::Value;

use super::interface::GatewayError;

/// Turn raw model text into JSON.
///
/// Models often wrap JSON in Markdown fences; those are stripped. An empty reply
/// or a literal `null` is an empty result, not an error.
pub fn parse_reply(raw: &str) -> Result<Option<Value>, GatewayError> {
    let body = strip_code_fence(raw.trim());
    if body.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Null) => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(GatewayError::MalformedReply(format!(
            "{} (reply starts with {:?})",
            e,
            body.chars().take(80).collect::<String>()
        ))),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop a language tag on the opening fence, with or without a newline after it
    let tag_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let tag = &rest[..tag_end];
    let rest = if tag.chars().all(|c| c.is_ascii_alphanumeric()) {
        &rest[tag_end..]
    } else {
        rest
    };
    let rest = rest.trim();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
