//! Lenient extraction of a JSON value embedded in model output.
//!
//! Model output is loosely structured: the JSON may be wrapped in prose,
//! fenced in markdown, or cut short by a truncated stream. [`extract_json`]
//! tries progressively looser strategies and reports a failure instead of
//! panicking when none of them yield a value.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::ExtractError;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```\w*").expect("code fence pattern is valid"));

/// The shape of value the caller expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Object,
    Array,
    /// Whichever delimiter appears first
    Any,
}

impl Shape {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Shape::Object => value.is_object(),
            Shape::Array => value.is_array(),
            Shape::Any => value.is_object() || value.is_array(),
        }
    }
}

/// Remove markdown code fences, including any language tag
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}

pub fn extract_json(text: &str, shape: Shape) -> Result<Value, ExtractError> {
    let clean = strip_code_fences(text);
    if clean.is_empty() {
        return Err(ExtractError::NotFound);
    }

    if let Ok(value) = serde_json::from_str::<Value>(&clean) {
        if shape.accepts(&value) {
            return Ok(value);
        }
    }

    let (start, open, close) = locate_opening(&clean, shape).ok_or(ExtractError::NotFound)?;
    let mut last_error = None;

    if let Some(end) = matching_close(&clean, start, open, close) {
        match serde_json::from_str::<Value>(&clean[start..=end]) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    // Balanced scan failed; pair the first opener with the last closer.
    if let Some(end) = clean.rfind(close as char).filter(|&end| end > start) {
        match serde_json::from_str::<Value>(&clean[start..=end]) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    tracing::debug!("JSON extraction failed for {} bytes of text", text.len());
    Err(ExtractError::Malformed(
        last_error.unwrap_or_else(|| "unterminated JSON value".to_string()),
    ))
}

fn locate_opening(text: &str, shape: Shape) -> Option<(usize, u8, u8)> {
    let object = text.find('{').map(|i| (i, b'{', b'}'));
    let array = text.find('[').map(|i| (i, b'[', b']'));
    match shape {
        Shape::Object => object,
        Shape::Array => array,
        Shape::Any => match (object, array) {
            (Some(o), Some(a)) => Some(if o.0 < a.0 { o } else { a }),
            (o, a) => o.or(a),
        },
    }
}

/// Byte index of the delimiter closing the one at `start`, skipping string
/// literals and their escapes.
fn matching_close(text: &str, start: usize, open: u8, close: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        if byte == b'"' {
            in_string = true;
        } else if byte == open {
            depth += 1;
        } else if byte == close {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some(start + offset);
            }
        }
    }

    None
}
