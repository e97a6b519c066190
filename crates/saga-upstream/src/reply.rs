//! Helpers that pull results out of upstream replies.
//!
//! Agents do not agree on a reply shape, so each helper tries the known
//! locations in order and takes the first that is present.

use saga_core::error::DomainError;
use serde_json::Value;

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_owned)
}

/// Finds the URL of an edited image in `url`, `image_url` (a string or an
/// object with `url`), `data[0].url` or `output.url`.
#[must_use]
pub fn image_url(reply: &Value) -> Option<String> {
    non_empty(reply.get("url"))
        .or_else(|| non_empty(reply.get("image_url")))
        .or_else(|| non_empty(reply.pointer("/image_url/url")))
        .or_else(|| non_empty(reply.pointer("/data/0/url")))
        .or_else(|| non_empty(reply.pointer("/output/url")))
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        // Content given as typed parts: join the text parts.
        Value::Array(parts) => {
            let joined: String = parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect();
            (!joined.trim().is_empty()).then_some(joined)
        }
        _ => None,
    }
}

/// Finds the text of a chat reply in `choices[0].message.content`,
/// `content`, `text` or `output`.
#[must_use]
pub fn reply_text(reply: &Value) -> Option<String> {
    ["/choices/0/message/content", "/content", "/text", "/output"]
        .iter()
        .find_map(|pointer| reply.pointer(pointer).and_then(text_of))
}

/// Strips a surrounding Markdown code fence (with or without a language
/// tag) from `text`.
fn unfence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after = &trimmed[start + 3..];
    // Skip the language tag line.
    let body = after.find('\n').map_or(after, |nl| &after[nl + 1..]);
    body.find("```").map_or(body, |end| &body[..end]).trim()
}

/// Parses a question set out of an agent's reply text. The array may be
/// wrapped in a code fence or surrounded by prose.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` when no JSON array can be found.
pub fn question_array(text: &str) -> Result<Vec<Value>, DomainError> {
    let body = unfence(text);
    let candidate = match (body.find('['), body.rfind(']')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => body,
    };
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Err(DomainError::Infrastructure(
            "agent reply is not a JSON array".into(),
        )),
        Err(e) => Err(DomainError::Infrastructure(format!(
            "agent reply is not valid JSON: {e}"
        ))),
    }
}
