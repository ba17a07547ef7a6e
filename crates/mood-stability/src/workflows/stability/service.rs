use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::calculator::{calculate_stability, get_stability_description};
use super::domain::{
    EntryScaleValue, MoodEntryDraft, MoodEntrySubmission, ScaleId, ScaleValue, ScaleWeight,
    StabilityCalculationResult, StabilityFormula, UserId,
};
use super::formula::{
    generate_formula_string, parse_formula, validate_formula_definition, FormulaError,
};
use super::registry::{FormulaRegistry, RegistryError, ScaleRegistry};

const COMMENT_LIMIT: usize = 1000;
const MEDICATION_LIMIT: usize = 255;

/// Service wiring the registries, the formula parser, and the calculator.
pub struct StabilityService<S, F> {
    scales: Arc<S>,
    formulas: Arc<F>,
}

impl<S, F> StabilityService<S, F>
where
    S: ScaleRegistry + 'static,
    F: FormulaRegistry + 'static,
{
    pub fn new(scales: Arc<S>, formulas: Arc<F>) -> Self {
        Self { scales, formulas }
    }

    /// The user's active formula, falling back to the system default.
    pub fn resolve_formula(&self, user: &UserId) -> Result<StabilityFormula, StabilityServiceError> {
        if let Some(formula) = self.formulas.active_formula(user)? {
            return Ok(formula);
        }

        debug!(%user, "no active formula, using system default");
        self.formulas
            .default_formula()?
            .ok_or(StabilityServiceError::NoFormula)
    }

    /// Stored weights when the formula carries them, otherwise the parsed
    /// formula text checked against the user's active scales.
    pub fn resolve_weights(
        &self,
        user: &UserId,
        formula: &StabilityFormula,
    ) -> Result<Vec<ScaleWeight>, StabilityServiceError> {
        if !formula.scale_weights.is_empty() {
            return Ok(formula.scale_weights.clone());
        }

        let available: Vec<ScaleId> = self
            .scales
            .active_scales(user)?
            .into_iter()
            .map(|scale| scale.id)
            .collect();

        parse_formula(&formula.formula, &available).map_err(|err| {
            warn!(formula_id = %formula.id, error = %err, "stored formula is invalid");
            StabilityServiceError::Formula(err)
        })
    }

    pub fn calculate_stability(
        &self,
        user: &UserId,
        values: &[ScaleValue],
    ) -> Result<StabilityCalculationResult, StabilityServiceError> {
        let formula = self.resolve_formula(user)?;
        let weights = self.resolve_weights(user, &formula)?;

        let mut seen = HashSet::new();
        let scale_ids: Vec<ScaleId> = values
            .iter()
            .map(|value| &value.scale_id)
            .chain(weights.iter().map(|weight| &weight.scale_id))
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect();
        let scales = self.scales.scales_by_ids(&scale_ids)?;

        let result = calculate_stability(values, &scales, &weights);
        debug!(
            formula_id = %formula.id,
            raw_score = result.raw_score,
            normalized_score = result.normalized_score,
            "stability calculated"
        );
        Ok(result)
    }

    /// Validate a submission against the user's active scales and score it.
    pub fn prepare_entry(
        &self,
        user: &UserId,
        submission: MoodEntrySubmission,
        entry_date: NaiveDate,
    ) -> Result<MoodEntryDraft, StabilityServiceError> {
        validate_submission(&submission)?;

        let active = self.scales.active_scales(user)?;
        let mut described = Vec::with_capacity(submission.scale_values.len());
        for scale_value in &submission.scale_values {
            let scale = active
                .iter()
                .find(|scale| scale.id == scale_value.scale_id)
                .ok_or_else(|| StabilityServiceError::UnknownScale {
                    scale_id: scale_value.scale_id.clone(),
                })?;

            if !scale.contains(scale_value.value) {
                return Err(StabilityServiceError::OutOfRange {
                    scale_name: scale.name.clone(),
                    value: scale_value.value,
                    min: scale.min_value,
                    max: scale.max_value,
                });
            }
            described.push(EntryScaleValue::describe(scale, scale_value.value));
        }

        let result = self.calculate_stability(user, &submission.scale_values)?;
        let description = get_stability_description(result.normalized_score);
        info!(
            %user,
            %entry_date,
            stability_score = result.normalized_score,
            description,
            "mood entry scored"
        );

        Ok(MoodEntryDraft {
            user_id: user.clone(),
            entry_date,
            scale_values: described,
            sleep_hours: submission.sleep_hours,
            comment: submission.comment,
            medication: submission.medication,
            stability_score: result.normalized_score,
            stability_description: description.to_string(),
        })
    }

    /// Validate a new formula definition and return its stored text form.
    pub fn compose_formula(&self, weights: &[ScaleWeight]) -> Result<String, StabilityServiceError> {
        let requested: Vec<ScaleId> = weights.iter().map(|weight| weight.scale_id.clone()).collect();
        let known: Vec<ScaleId> = self
            .scales
            .scales_by_ids(&requested)?
            .into_iter()
            .map(|scale| scale.id)
            .collect();

        validate_formula_definition(weights, &known)?;
        Ok(generate_formula_string(weights))
    }
}

fn validate_submission(submission: &MoodEntrySubmission) -> Result<(), EntryViolation> {
    if submission.scale_values.is_empty() {
        return Err(EntryViolation::NoScaleValues);
    }
    if let Some(hours) = submission.sleep_hours {
        if !(0.0..=24.0).contains(&hours) {
            return Err(EntryViolation::SleepHoursOutOfRange(hours));
        }
    }
    if submission.comment.chars().count() > COMMENT_LIMIT {
        return Err(EntryViolation::CommentTooLong {
            limit: COMMENT_LIMIT,
        });
    }
    if submission.medication.chars().count() > MEDICATION_LIMIT {
        return Err(EntryViolation::MedicationTooLong {
            limit: MEDICATION_LIMIT,
        });
    }
    Ok(())
}

/// Shape problems with a mood entry submission.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EntryViolation {
    #[error("at least one scale value is required")]
    NoScaleValues,
    #[error("sleep hours must be between 0 and 24, got {0}")]
    SleepHoursOutOfRange(f64),
    #[error("comment cannot exceed {limit} characters")]
    CommentTooLong { limit: usize },
    #[error("medication cannot exceed {limit} characters")]
    MedicationTooLong { limit: usize },
}

/// Error raised by the stability service.
#[derive(Debug, thiserror::Error)]
pub enum StabilityServiceError {
    #[error("no stability formula found")]
    NoFormula,
    #[error("scale {scale_id} not found or not active")]
    UnknownScale { scale_id: ScaleId },
    #[error("value {value} is out of range for scale {scale_name} ({min}-{max})")]
    OutOfRange {
        scale_name: String,
        value: i32,
        min: i32,
        max: i32,
    },
    #[error(transparent)]
    Entry(#[from] EntryViolation),
    #[error(transparent)]
    Formula(#[from] FormulaError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
