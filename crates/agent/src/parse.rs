//! Cleaning and validating raw model output.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::error::AiFailure;

/// A fenced block: three backticks, an optional language tag, the body, three backticks.
const FENCE_PATTERN: &str = r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```";

static FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(FENCE_PATTERN).expect("invalid code fence pattern"));

/// Strip markdown code fences around a model response.
///
/// Returns the body of the first fenced block when there is one, otherwise
/// the trimmed input.
pub fn strip_code_fences(raw: &str) -> &str {
    match FENCE_REGEX.captures(raw).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim(),
        None => raw.trim(),
    }
}

/// The outermost `{...}` span, for answers wrapped in prose.
fn outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse a model response into `T` and run `check` on it.
///
/// Fences are stripped first; if the remainder is not JSON, the outermost
/// object inside it is tried. Every failure is an invalid shape.
pub fn parse_response<T, F>(raw: &str, check: F) -> Result<T, AiFailure>
where
    T: DeserializeOwned,
    F: FnOnce(&T) -> Result<(), String>,
{
    let text = strip_code_fences(raw);
    let parsed: T = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(first) => {
            let inner = outer_object(text).ok_or_else(|| AiFailure::invalid_shape(first.to_string()))?;
            serde_json::from_str(inner).map_err(|e| AiFailure::invalid_shape(e.to_string()))?
        }
    };
    check(&parsed).map_err(AiFailure::invalid_shape)?;
    Ok(parsed)
}
