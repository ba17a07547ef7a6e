use std::borrow::Borrow;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of a mood scale, shared by weights, values, and assessments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScaleId(pub String);

impl ScaleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ScaleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ScaleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ScaleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of the user whose scales and formulas are being resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bounded integer axis such as mood or irritability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scale {
    pub id: ScaleId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub min_value: i32,
    pub max_value: i32,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub levels: Vec<ScaleLevel>,
}

fn active_by_default() -> bool {
    true
}

impl Scale {
    pub fn new(id: impl Into<ScaleId>, name: impl Into<String>, min_value: i32, max_value: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            min_value,
            max_value,
            is_active: true,
            levels: Vec::new(),
        }
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.min_value..=self.max_value).contains(&value)
    }

    /// Midpoint used when an assessment says nothing about this scale.
    pub fn neutral_value(&self) -> i32 {
        let midpoint = (i64::from(self.min_value) + i64::from(self.max_value)).div_euclid(2);
        // Lies between two i32 values, so it always fits.
        midpoint as i32
    }

    pub fn level_description(&self, value: i32) -> Option<&str> {
        self.levels
            .iter()
            .find(|level| level.level == value)
            .map(|level| level.description.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleLevel {
    pub level: i32,
    pub description: String,
}

/// A scale's factor and inversion flag inside a stability formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleWeight {
    pub scale_id: ScaleId,
    pub weight: f64,
    #[serde(default)]
    pub is_inverted: bool,
}

impl ScaleWeight {
    pub fn new(scale_id: impl Into<ScaleId>, weight: f64, is_inverted: bool) -> Self {
        Self {
            scale_id: scale_id.into(),
            weight,
            is_inverted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleValue {
    pub scale_id: ScaleId,
    pub value: i32,
}

impl ScaleValue {
    pub fn new(scale_id: impl Into<ScaleId>, value: i32) -> Self {
        Self {
            scale_id: scale_id.into(),
            value,
        }
    }
}

/// Stored stability formula with its raw text and, when available, its
/// already-resolved weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StabilityFormula {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub formula: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub scale_weights: Vec<ScaleWeight>,
}

/// Scale value as reported by an assessment, carrying the display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessedScaleValue {
    pub scale_id: ScaleId,
    pub scale_name: String,
    pub value: i32,
}

/// Complete set of scale values plus auxiliary fields for one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub scale_values: Vec<AssessedScaleValue>,
    pub sleep_hours: Option<f64>,
    pub comment: String,
    pub medication: String,
}

impl AssessmentResult {
    pub fn scale_values(&self) -> Vec<ScaleValue> {
        self.scale_values
            .iter()
            .map(|assessed| ScaleValue::new(assessed.scale_id.clone(), assessed.value))
            .collect()
    }

    pub fn value_for(&self, scale_id: &str) -> Option<i32> {
        self.scale_values
            .iter()
            .find(|assessed| assessed.scale_id.as_str() == scale_id)
            .map(|assessed| assessed.value)
    }
}

/// Discrete contribution of one scale to a stability score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleContribution {
    pub scale_id: ScaleId,
    pub scale_name: String,
    pub value: i32,
    pub weight: f64,
    pub is_inverted: bool,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StabilityCalculationResult {
    pub raw_score: f64,
    pub normalized_score: f64,
    pub breakdown: Vec<ScaleContribution>,
}

impl StabilityCalculationResult {
    pub fn empty() -> Self {
        Self {
            raw_score: 0.0,
            normalized_score: 0.0,
            breakdown: Vec::new(),
        }
    }
}

/// Values submitted for a new mood entry, either typed in or extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntrySubmission {
    pub scale_values: Vec<ScaleValue>,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub medication: String,
}

impl From<AssessmentResult> for MoodEntrySubmission {
    fn from(assessment: AssessmentResult) -> Self {
        Self {
            scale_values: assessment.scale_values(),
            sleep_hours: assessment.sleep_hours,
            comment: assessment.comment,
            medication: assessment.medication,
        }
    }
}

/// Value recorded on an entry, with the level description it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryScaleValue {
    pub scale_id: ScaleId,
    pub scale_name: String,
    pub value: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EntryScaleValue {
    pub fn describe(scale: &Scale, value: i32) -> Self {
        Self {
            scale_id: scale.id.clone(),
            scale_name: scale.name.clone(),
            value,
            description: scale.level_description(value).map(str::to_string),
        }
    }
}

/// Scored mood entry ready to be handed to persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntryDraft {
    pub user_id: UserId,
    pub entry_date: NaiveDate,
    pub scale_values: Vec<EntryScaleValue>,
    pub sleep_hours: Option<f64>,
    pub comment: String,
    pub medication: String,
    pub stability_score: f64,
    pub stability_description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Assistant reply to a chat message, with any assessment it carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub message: String,
    pub is_assessment: bool,
    pub assessment: Option<AssessmentResult>,
}
