use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::debug;

use crate::workflows::stability::domain::{AssessedScaleValue, AssessmentResult, Scale};

/// Turns whatever a strategy recovered into a complete assessment.
///
/// Entries for unknown scales are dropped, values are clamped into their
/// scale's bounds, and every scale left uncovered receives its neutral value,
/// so the result always holds exactly one value per supplied scale.
pub fn validate_and_fix_assessment(parsed: &Value, scales: &[Scale]) -> AssessmentResult {
    let lookup: HashMap<&str, &Scale> = scales
        .iter()
        .map(|scale| (scale.id.as_str(), scale))
        .collect();
    let entries = parsed
        .get("scaleValues")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    debug!(entries = entries.len(), "validating assessment");

    let mut covered: HashSet<&str> = HashSet::new();
    let mut scale_values = Vec::with_capacity(scales.len());

    for entry in entries {
        let Some(scale) = entry
            .get("scaleId")
            .and_then(Value::as_str)
            .and_then(|id| lookup.get(id))
        else {
            continue;
        };
        // First entry for a scale wins.
        if covered.contains(scale.id.as_str()) {
            continue;
        }
        let Some(raw) = entry.get("value").and_then(coerce_number) else {
            continue;
        };

        let scale_name = entry
            .get("scaleName")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map_or_else(|| scale.name.clone(), str::to_string);

        covered.insert(scale.id.as_str());
        scale_values.push(AssessedScaleValue {
            scale_id: scale.id.clone(),
            scale_name,
            value: clamp_to_scale(raw, scale),
        });
    }

    for scale in scales {
        if covered.insert(scale.id.as_str()) {
            let neutral = scale.neutral_value();
            debug!(scale_id = %scale.id, neutral, "adding missing scale with neutral value");
            scale_values.push(AssessedScaleValue {
                scale_id: scale.id.clone(),
                scale_name: scale.name.clone(),
                value: neutral,
            });
        }
    }

    let sleep_hours = parsed
        .get("sleepHours")
        .and_then(coerce_number)
        .filter(|hours| (0.0..=24.0).contains(hours));

    AssessmentResult {
        scale_values,
        sleep_hours,
        comment: text_field(parsed, "comment"),
        medication: text_field(parsed, "medication"),
    }
}

/// Reads numbers the way a loosely typed producer writes them: JSON numbers,
/// numeric strings, and booleans. Anything else is not a number.
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn clamp_to_scale(value: f64, scale: &Scale) -> i32 {
    let clamped = value
        .round()
        .clamp(f64::from(scale.min_value), f64::from(scale.max_value));
    clamped as i32
}

fn text_field(parsed: &Value, field: &str) -> String {
    parsed
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
