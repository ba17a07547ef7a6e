//! Stability formula parsing and serialization.
//!
//! A formula is stored either as a JSON array of weight objects or as the
//! compact text form `scaleId:weight[:true]` joined by commas, for example
//! `humeur:1,irritabilite:1:true,confiance:0.8`.

use std::borrow::Borrow;
use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use super::domain::{ScaleId, ScaleWeight};

/// Reason a formula was rejected. Messages always name the offending item.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormulaError {
    #[error("JSON formula must be an array")]
    NotAnArray,
    #[error("formula item {index} must have a valid `{field}`")]
    MissingField { index: usize, field: &'static str },
    #[error("formula item {index} has a non-boolean `isInverted`")]
    InvalidInversion { index: usize },
    #[error("invalid format for part \"{segment}\"")]
    InvalidSegment { segment: String },
    #[error("invalid weight in \"{segment}\"")]
    InvalidWeight { segment: String },
    #[error("scale {scale_id} not found")]
    UnknownScale { scale_id: String },
    #[error("at least one scale weight is required")]
    Empty,
    #[error("invalid scale ids: {}", .scale_ids.join(", "))]
    UnknownScales { scale_ids: Vec<String> },
    #[error("duplicate weight for scale {scale_id}")]
    DuplicateScale { scale_id: String },
    #[error("weight must be positive for scale {scale_id}")]
    NonPositiveWeight { scale_id: String },
}

/// Serializable view of a parse attempt for API and CLI responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaParsingResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_weights: Option<Vec<ScaleWeight>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<Result<Vec<ScaleWeight>, FormulaError>> for FormulaParsingResult {
    fn from(result: Result<Vec<ScaleWeight>, FormulaError>) -> Self {
        match result {
            Ok(weights) => Self {
                is_valid: true,
                scale_weights: Some(weights),
                error_message: None,
            },
            Err(err) => Self {
                is_valid: false,
                scale_weights: None,
                error_message: Some(err.to_string()),
            },
        }
    }
}

/// Parses a stored formula against the scale ids currently available.
///
/// Text that is valid JSON is read as the array form; anything else is read
/// as the compact text form. Any invalid entry rejects the whole formula.
pub fn parse_formula<S: Borrow<str>>(
    text: &str,
    available_scale_ids: &[S],
) -> Result<Vec<ScaleWeight>, FormulaError> {
    match serde_json::from_str::<Value>(text) {
        Ok(json) => parse_json_formula(&json, available_scale_ids),
        Err(_) => parse_text_formula(text, available_scale_ids),
    }
}

fn parse_json_formula<S: Borrow<str>>(
    json: &Value,
    available_scale_ids: &[S],
) -> Result<Vec<ScaleWeight>, FormulaError> {
    let items = json.as_array().ok_or(FormulaError::NotAnArray)?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let scale_id = item
                .get("scaleId")
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty())
                .ok_or(FormulaError::MissingField {
                    index,
                    field: "scaleId",
                })?;
            let weight = item
                .get("weight")
                .and_then(Value::as_f64)
                .ok_or(FormulaError::MissingField {
                    index,
                    field: "weight",
                })?;
            let is_inverted = match item.get("isInverted") {
                None | Some(Value::Null) => false,
                Some(Value::Bool(flag)) => *flag,
                Some(_) => return Err(FormulaError::InvalidInversion { index }),
            };

            ensure_known(scale_id, available_scale_ids)?;
            Ok(ScaleWeight::new(scale_id, weight, is_inverted))
        })
        .collect()
}

fn parse_text_formula<S: Borrow<str>>(
    text: &str,
    available_scale_ids: &[S],
) -> Result<Vec<ScaleWeight>, FormulaError> {
    text.split(',')
        .map(|segment| parse_segment(segment, available_scale_ids))
        .collect()
}

fn parse_segment<S: Borrow<str>>(
    segment: &str,
    available_scale_ids: &[S],
) -> Result<ScaleWeight, FormulaError> {
    let fields: Vec<&str> = segment.split(':').collect();
    if !(2..=3).contains(&fields.len()) {
        return Err(FormulaError::InvalidSegment {
            segment: segment.to_string(),
        });
    }

    let scale_id = fields[0].trim();
    let weight = fields[1]
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|weight| weight.is_finite())
        .ok_or_else(|| FormulaError::InvalidWeight {
            segment: segment.to_string(),
        })?;
    // Only the exact literal marks a scale as inverted.
    let is_inverted = fields.get(2).is_some_and(|flag| flag.trim() == "true");

    ensure_known(scale_id, available_scale_ids)?;
    Ok(ScaleWeight::new(scale_id, weight, is_inverted))
}

fn ensure_known<S: Borrow<str>>(scale_id: &str, available_scale_ids: &[S]) -> Result<(), FormulaError> {
    if available_scale_ids.iter().any(|id| id.borrow() == scale_id) {
        Ok(())
    } else {
        Err(FormulaError::UnknownScale {
            scale_id: scale_id.to_string(),
        })
    }
}

/// Serializes weights to the compact text form, preserving order.
pub fn generate_formula_string(weights: &[ScaleWeight]) -> String {
    weights
        .iter()
        .map(|weight| {
            if weight.is_inverted {
                format!("{}:{}:true", weight.scale_id, weight.weight)
            } else {
                format!("{}:{}", weight.scale_id, weight.weight)
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Checks a new formula definition before it is stored: at least one weight,
/// every scale known, no scale repeated, every weight positive.
pub fn validate_formula_definition<S: Borrow<str>>(
    weights: &[ScaleWeight],
    known_scale_ids: &[S],
) -> Result<(), FormulaError> {
    if weights.is_empty() {
        return Err(FormulaError::Empty);
    }

    let unknown: Vec<String> = weights
        .iter()
        .filter(|weight| {
            !known_scale_ids
                .iter()
                .any(|id| id.borrow() == weight.scale_id.as_str())
        })
        .map(|weight| weight.scale_id.to_string())
        .collect();
    if !unknown.is_empty() {
        return Err(FormulaError::UnknownScales { scale_ids: unknown });
    }

    let mut seen: HashSet<&ScaleId> = HashSet::new();
    for weight in weights {
        if !seen.insert(&weight.scale_id) {
            return Err(FormulaError::DuplicateScale {
                scale_id: weight.scale_id.to_string(),
            });
        }
    }

    if let Some(weight) = weights.iter().find(|weight| weight.weight <= 0.0) {
        return Err(FormulaError::NonPositiveWeight {
            scale_id: weight.scale_id.to_string(),
        });
    }

    Ok(())
}
