use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{text_sample, ExtractionStrategy};

const SCALE_VALUES_MARKER: &str = "\"scaleValues\"";

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("fenced block pattern"));
static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([}\]])").expect("trailing comma pattern"));
static SCALE_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\{"scaleId":\s*"([^"]+)",\s*"scaleName":\s*"([^"]+)",\s*"value":\s*(\d+)\}"#)
        .expect("scale entry pattern")
});
static SLEEP_HOURS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""sleepHours":\s*(\d+\.?\d*)"#).expect("sleep hours pattern"));
static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""comment":\s*"([^"]+)""#).expect("comment pattern"));
static MEDICATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""medication":\s*"([^"]+)""#).expect("medication pattern"));

/// Parses the body of the first ```` ```json ```` fenced block.
pub struct FencedBlock;

impl ExtractionStrategy for FencedBlock {
    fn name(&self) -> &'static str {
        "fenced_block"
    }

    fn extract(&self, text: &str) -> Option<Value> {
        let body = FENCED_JSON.captures(text)?.get(1)?.as_str().trim();
        debug!(json = %text_sample(body, 200), "found json inside fenced block");

        match serde_json::from_str::<Value>(body) {
            Ok(value) if value.is_object() => Some(value),
            Ok(_) => None,
            Err(err) => {
                debug!(error = %err, "fenced block is not valid json");
                None
            }
        }
    }
}

/// Parses the smallest balanced `{...}` span around `"scaleValues"`, after
/// flattening newlines and dropping trailing commas.
pub struct LooseObject;

impl ExtractionStrategy for LooseObject {
    fn name(&self) -> &'static str {
        "loose_object"
    }

    fn extract(&self, text: &str) -> Option<Value> {
        let span = enclosing_object(text, SCALE_VALUES_MARKER)?;
        let flattened = span.replace(['\r', '\n'], " ");
        let cleaned = TRAILING_COMMA.replace_all(&flattened, "$1");
        debug!(json = %text_sample(&cleaned, 200), "found loose json object");

        match serde_json::from_str::<Value>(&cleaned) {
            Ok(value) if value.is_object() => Some(value),
            Ok(_) => None,
            Err(err) => {
                debug!(error = %err, "loose json object did not parse");
                None
            }
        }
    }
}

/// Rebuilds an assessment from individual field patterns when the JSON is
/// too damaged to parse. Requires at least one complete scale entry.
pub struct ManualFields;

impl ExtractionStrategy for ManualFields {
    fn name(&self) -> &'static str {
        "manual_fields"
    }

    fn extract(&self, text: &str) -> Option<Value> {
        if !(text.contains("scaleValues") && text.contains("scaleId")) {
            return None;
        }

        let entries: Vec<Value> = SCALE_ENTRY
            .captures_iter(text)
            .filter_map(|captures| {
                let value = captures[3].parse::<i64>().ok()?;
                Some(json!({
                    "scaleId": &captures[1],
                    "scaleName": &captures[2],
                    "value": value,
                }))
            })
            .collect();

        if entries.is_empty() {
            return None;
        }
        debug!(entries = entries.len(), "manually extracted scale values");

        let mut assessment = Map::new();
        assessment.insert("scaleValues".to_string(), Value::Array(entries));

        if let Some(hours) = SLEEP_HOURS
            .captures(text)
            .and_then(|captures| captures[1].parse::<f64>().ok())
        {
            assessment.insert("sleepHours".to_string(), json!(hours));
        }
        for (field, pattern) in [("comment", &*COMMENT), ("medication", &*MEDICATION)] {
            let captured = pattern
                .captures(text)
                .map(|captures| captures[1].to_string())
                .unwrap_or_default();
            assessment.insert(field.to_string(), Value::String(captured));
        }

        Some(Value::Object(assessment))
    }
}

/// Returns the innermost brace-balanced span around the first occurrence of
/// `marker` that has one. Mentions of the marker in prose are skipped.
fn enclosing_object<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let bytes = text.as_bytes();

    text.match_indices(marker).find_map(|(marker_at, _)| {
        text[..marker_at]
            .rmatch_indices('{')
            .filter_map(|(open, _)| matching_brace(bytes, open).map(|close| (open, close)))
            .find(|&(_, close)| close > marker_at)
            .map(|(open, close)| &text[open..=close])
    })
}

fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[open..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }

    None
}
