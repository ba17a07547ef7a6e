use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    Scale, ScaleContribution, ScaleValue, ScaleWeight, StabilityCalculationResult,
};

/// Combines scale values with formula weights into a raw weighted mean and a
/// 0-100 score normalized against the formula's theoretical extremes.
///
/// Values without a matching scale or weight are skipped. When nothing
/// matches, the result is all zeros with an empty breakdown.
pub fn calculate_stability(
    values: &[ScaleValue],
    scales: &[Scale],
    weights: &[ScaleWeight],
) -> StabilityCalculationResult {
    let scales_by_id: HashMap<&str, &Scale> = scales
        .iter()
        .map(|scale| (scale.id.as_str(), scale))
        .collect();
    let weights_by_id: HashMap<&str, &ScaleWeight> = weights
        .iter()
        .map(|weight| (weight.scale_id.as_str(), weight))
        .collect();

    let mut total_contribution = 0.0;
    let mut total_weight = 0.0;
    let mut breakdown = Vec::new();

    for scale_value in values {
        let key = scale_value.scale_id.as_str();
        let (Some(scale), Some(weight)) = (scales_by_id.get(key), weights_by_id.get(key)) else {
            continue;
        };

        let adjusted = adjusted_value(scale, scale_value.value, weight.is_inverted);
        let contribution = adjusted * weight.weight;
        total_contribution += contribution;
        total_weight += weight.weight;

        breakdown.push(ScaleContribution {
            scale_id: scale.id.clone(),
            scale_name: scale.name.clone(),
            value: scale_value.value,
            weight: weight.weight,
            is_inverted: weight.is_inverted,
            contribution,
        });
    }

    if total_weight == 0.0 {
        return StabilityCalculationResult::empty();
    }

    let raw_score = total_contribution / total_weight;

    let (min_possible, max_possible) = weights
        .iter()
        .filter_map(|weight| {
            scales_by_id
                .get(weight.scale_id.as_str())
                .map(|scale| extremes(scale, weight))
        })
        .fold((0.0, 0.0), |(min_acc, max_acc), (min, max)| {
            (min_acc + min, max_acc + max)
        });

    let score_range = max_possible - min_possible;
    // Higher raw scores map to lower normalized scores.
    let normalized_score = if score_range > 0.0 {
        100.0 - ((raw_score - min_possible) / score_range) * 100.0
    } else {
        0.0
    };

    StabilityCalculationResult {
        raw_score,
        normalized_score,
        breakdown,
    }
}

fn adjusted_value(scale: &Scale, value: i32, is_inverted: bool) -> f64 {
    if is_inverted {
        f64::from(scale.max_value) - f64::from(value) + f64::from(scale.min_value)
    } else {
        f64::from(value)
    }
}

/// Weighted (min, max) contribution a single weight can reach.
fn extremes(scale: &Scale, weight: &ScaleWeight) -> (f64, f64) {
    let low = f64::from(scale.min_value) * weight.weight;
    let high = f64::from(scale.max_value) * weight.weight;
    if weight.is_inverted {
        (high, low)
    } else {
        (low, high)
    }
}

/// Qualitative band for a normalized stability score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityBand {
    SevereCrisis,
    MajorInstability,
    ModeratelyUnstable,
    SlightlyUnstable,
    AverageStability,
    GoodStability,
}

impl StabilityBand {
    pub fn from_score(normalized_score: f64) -> Self {
        if normalized_score < 20.0 {
            Self::SevereCrisis
        } else if normalized_score < 35.0 {
            Self::MajorInstability
        } else if normalized_score < 50.0 {
            Self::ModeratelyUnstable
        } else if normalized_score < 65.0 {
            Self::SlightlyUnstable
        } else if normalized_score < 80.0 {
            Self::AverageStability
        } else {
            Self::GoodStability
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StabilityBand::SevereCrisis => "Crise sévère",
            StabilityBand::MajorInstability => "Instabilité importante",
            StabilityBand::ModeratelyUnstable => "Modérément instable",
            StabilityBand::SlightlyUnstable => "Légèrement instable",
            StabilityBand::AverageStability => "Stabilité moyenne",
            StabilityBand::GoodStability => "Bonne stabilité",
        }
    }
}

pub fn get_stability_description(normalized_score: f64) -> &'static str {
    StabilityBand::from_score(normalized_score).label()
}
