//! Parse raw model text into a structured reply

use crate::extraction::ErrorInfo;
use serde_json::{Map, Value};

/// Mapping from feature name to raw JSON value, as returned by the model
pub type StructuredReply = Map<String, Value>;

/// Parse model output into a JSON object
///
/// Models sometimes wrap the object in a markdown code block or surround it with
/// prose; both are tolerated. Anything that does not yield a JSON object is an
/// `invalid_response` error.
///
/// # Examples
///
/// ```
/// use featx_domain::parse_structured_reply;
///
/// let reply = parse_structured_reply("```json\n{\"weight_kg\": 1.2}\n```").unwrap();
/// assert_eq!(reply["weight_kg"], 1.2);
/// ```
pub fn parse_structured_reply(response: &str) -> Result<StructuredReply, ErrorInfo> {
    let trimmed = response.trim();
    let body = strip_code_fence(trimmed).unwrap_or(trimmed).trim();

    let json: Value = match serde_json::from_str(body) {
        Ok(json) => json,
        Err(_) => {
            let embedded = embedded_object(body)
                .ok_or_else(|| ErrorInfo::invalid_response("No JSON object found in reply"))?;
            serde_json::from_str(embedded)
                .map_err(|e| ErrorInfo::invalid_response(format!("JSON parse error: {}", e)))?
        }
    };

    match json {
        Value::Object(map) => Ok(map),
        other => Err(ErrorInfo::invalid_response(format!(
            "Expected JSON object, got {}",
            json_type(&other)
        ))),
    }
}

/// Outermost `{...}` span inside surrounding prose
fn embedded_object(body: &str) -> Option<&str> {
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (end > start).then(|| &body[start..=end])
}

/// Contents of the first fenced code block, if any
fn strip_code_fence(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    // skip the language tag line (```json)
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
