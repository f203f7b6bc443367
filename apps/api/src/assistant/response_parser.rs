//! Tolerant parsing of raw model output.
//!
//! Models are asked for a bare JSON object but regularly wrap it in code
//! fences or surround it with prose. Each step below runs only if the
//! previous one did not yield a JSON object; the last step never fails.

use serde_json::{Map, Value};

/// What could be recovered from a model reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedReply {
    pub message: Option<String>,
    /// Unvalidated; checked by `CvPatch::from_untrusted` before use.
    pub proposed_changes: Option<Value>,
}

impl ParsedReply {
    fn from_object(mut object: Map<String, Value>) -> Self {
        let message = match object.remove("message") {
            Some(Value::String(text)) => Some(text),
            _ => None,
        };
        let proposed_changes = object
            .remove("proposedChanges")
            .filter(|value| !value.is_null());
        Self {
            message,
            proposed_changes,
        }
    }
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(text) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

/// Interior of the first fenced block, with an optional `json` tag stripped.
fn fenced_block(raw: &str) -> Option<&str> {
    let start = raw.find("```")? + 3;
    let rest = &raw[start..];
    let end = rest.find("```")?;
    let inner = &rest[..end];
    Some(inner.strip_prefix("json").unwrap_or(inner).trim())
}

/// Span from the first `{` to the last `}`.
fn brace_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

pub fn parse_model_response(raw: &str) -> ParsedReply {
    parse_object(raw)
        .or_else(|| fenced_block(raw).and_then(parse_object))
        .or_else(|| brace_span(raw).and_then(parse_object))
        .map(ParsedReply::from_object)
        .unwrap_or_else(|| ParsedReply {
            message: Some(raw.to_string()),
            proposed_changes: None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_object() {
        let parsed = parse_model_response(r#"{"message":"Hi","proposedChanges":{"summary":"X"}}"#);
        assert_eq!(parsed.message.as_deref(), Some("Hi"));
        assert_eq!(parsed.proposed_changes, Some(json!({ "summary": "X" })));
    }

    #[test]
    fn test_fenced_json_block() {
        let raw = "```json\n{\"message\":\"Hi\"}\n```";
        let parsed = parse_model_response(raw);
        assert_eq!(parsed.message.as_deref(), Some("Hi"));
        assert_eq!(parsed.proposed_changes, None);
    }

    #[test]
    fn test_untagged_fence() {
        let raw = "Here you go:\n```\n{\"message\":\"Done\",\"proposedChanges\":{\"skills\":[\"Go\"]}}\n```\nBye";
        let parsed = parse_model_response(raw);
        assert_eq!(parsed.message.as_deref(), Some("Done"));
        assert_eq!(parsed.proposed_changes, Some(json!({ "skills": ["Go"] })));
    }

    #[test]
    fn test_object_embedded_in_prose() {
        let raw = "Sure! {\"message\":\"Ok\"} hope that helps";
        assert_eq!(parse_model_response(raw).message.as_deref(), Some("Ok"));
    }

    #[test]
    fn test_plain_text_fallback() {
        let parsed = parse_model_response("Just text");
        assert_eq!(parsed.message.as_deref(), Some("Just text"));
        assert_eq!(parsed.proposed_changes, None);
    }

    #[test]
    fn test_unparseable_braces_fall_back_to_text() {
        let raw = "use {braces} freely";
        assert_eq!(parse_model_response(raw).message.as_deref(), Some(raw));
    }

    #[test]
    fn test_non_object_json_is_treated_as_text() {
        let parsed = parse_model_response("[1, 2, 3]");
        assert_eq!(parsed.message.as_deref(), Some("[1, 2, 3]"));
    }

    #[test]
    fn test_null_changes_and_non_string_message_are_absent() {
        let parsed = parse_model_response(r#"{"message": 42, "proposedChanges": null}"#);
        assert_eq!(parsed, ParsedReply::default());
    }

    #[test]
    fn test_empty_object_has_nothing() {
        assert_eq!(parse_model_response("{}"), ParsedReply::default());
    }
}
