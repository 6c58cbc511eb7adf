//! Defensive extraction of a `MoatEvaluation` from free model text.
//!
//! Even in JSON mode models sometimes wrap the object in prose or markdown fences, so
//! three strategies are tried in order: the whole text, the first balanced `{...}` span,
//! and the text with fence markers stripped.

use moat_core::{MoatEvaluation, MoatFactor};
use serde_json::Value;

use crate::error::ParseError;

/// Which extraction strategy produced the evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    Direct,
    EmbeddedObject,
    StrippedFences,
}

pub fn parse_moat_evaluation(text: &str) -> Result<MoatEvaluation, ParseError> {
    parse_with_strategy(text).map(|(evaluation, _)| evaluation)
}

pub fn parse_with_strategy(text: &str) -> Result<(MoatEvaluation, ParseStrategy), ParseError> {
    if let Some(evaluation) = try_parse(text) {
        return Ok((evaluation, ParseStrategy::Direct));
    }

    if let Some(evaluation) = extract_first_object(text).and_then(try_parse) {
        return Ok((evaluation, ParseStrategy::EmbeddedObject));
    }

    let stripped = strip_code_fences(text);
    if let Some(evaluation) =
        try_parse(&stripped).or_else(|| extract_first_object(&stripped).and_then(try_parse))
    {
        return Ok((evaluation, ParseStrategy::StrippedFences));
    }

    Err(ParseError(preview(text)))
}

/// Parse `candidate` as a JSON object carrying at least one moat field.
fn try_parse(candidate: &str) -> Option<MoatEvaluation> {
    let value: Value = serde_json::from_str(candidate.trim()).ok()?;
    let object = value.as_object()?;

    let has_known_field = MoatFactor::ALL
        .iter()
        .map(|f| f.json_key())
        .chain(std::iter::once("description"))
        .any(|key| object.contains_key(key));
    if !has_known_field {
        return None;
    }

    serde_json::from_value(value).ok()
}

/// First balanced `{...}` span in `text`, ignoring braces inside JSON strings.
pub fn extract_first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Remove ```` ```json ```` and ```` ``` ```` markers wherever they occur.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

fn preview(text: &str) -> String {
    const MAX: usize = 120;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "empty response".to_string();
    }
    match trimmed.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
