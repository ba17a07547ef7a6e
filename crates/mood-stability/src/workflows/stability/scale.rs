use std::collections::HashSet;

use super::domain::Scale;

/// Problems found in a scale definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScaleDefinitionError {
    #[error("scale name is required")]
    MissingName,
    #[error("max value must be greater than min value")]
    InvalidBounds,
    #[error("expected {expected} levels, got {actual}")]
    LevelCount { expected: u64, actual: usize },
    #[error("description is required for level {level}")]
    MissingLevelDescription { level: i32 },
    #[error("duplicate level values found")]
    DuplicateLevels,
}

/// Collects every problem with `scale` rather than stopping at the first.
/// Levels are only checked when the scale declares some.
pub fn validate_scale(scale: &Scale) -> Vec<ScaleDefinitionError> {
    let mut errors = Vec::new();

    if scale.name.trim().is_empty() {
        errors.push(ScaleDefinitionError::MissingName);
    }

    let bounds_valid = scale.min_value < scale.max_value;
    if !bounds_valid {
        errors.push(ScaleDefinitionError::InvalidBounds);
    }

    if scale.levels.is_empty() {
        return errors;
    }

    if bounds_valid {
        // Positive once the bounds are ordered.
        let expected = (i64::from(scale.max_value) - i64::from(scale.min_value) + 1) as u64;
        if scale.levels.len() as u64 != expected {
            errors.push(ScaleDefinitionError::LevelCount {
                expected,
                actual: scale.levels.len(),
            });
        }
    }

    errors.extend(
        scale
            .levels
            .iter()
            .filter(|level| level.description.trim().is_empty())
            .map(|level| ScaleDefinitionError::MissingLevelDescription { level: level.level }),
    );

    let unique: HashSet<i32> = scale.levels.iter().map(|level| level.level).collect();
    if unique.len() != scale.levels.len() {
        errors.push(ScaleDefinitionError::DuplicateLevels);
    }

    errors
}
