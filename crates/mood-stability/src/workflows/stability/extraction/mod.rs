//! Recovery of structured assessments from free-form assistant replies.
//!
//! Replies are unreliable: the JSON may sit in a fenced block, float loose in
//! prose with trailing commas, or be damaged beyond parsing. Each recovery
//! approach is an [`ExtractionStrategy`]; the extractor tries them in order
//! and cleans up the first object recovered.

mod sanitize;
mod strategies;

pub use sanitize::validate_and_fix_assessment;
pub use strategies::{FencedBlock, LooseObject, ManualFields};

use serde_json::Value;
use tracing::{debug, warn};

use super::domain::{AssessmentResult, Scale};

/// One independent way of pulling an assessment object out of raw text.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, text: &str) -> Option<Value>;
}

/// Ordered list of strategies; the first one to recover an object wins.
pub struct AssessmentExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Default for AssessmentExtractor {
    fn default() -> Self {
        Self::with_strategies(vec![
            Box::new(FencedBlock),
            Box::new(LooseObject),
            Box::new(ManualFields),
        ])
    }
}

impl AssessmentExtractor {
    pub fn with_strategies(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|strategy| strategy.name()).collect()
    }

    /// Returns a complete assessment covering every supplied scale, or `None`
    /// when no strategy recovers an object.
    pub fn extract(&self, text: &str, scales: &[Scale]) -> Option<AssessmentResult> {
        debug!(text = %text_sample(text, 200), "attempting to extract assessment");

        let parsed = self.strategies.iter().find_map(|strategy| {
            let recovered = strategy.extract(text);
            if recovered.is_some() {
                debug!(strategy = strategy.name(), "assessment recovered");
            }
            recovered
        });

        match parsed {
            Some(parsed) => Some(validate_and_fix_assessment(&parsed, scales)),
            None => {
                warn!("could not extract valid assessment data from text");
                None
            }
        }
    }
}

/// Cheap pre-filter deciding whether a reply looks like it carries an
/// assessment. Extraction does not depend on it.
pub fn contains_assessment(text: &str) -> bool {
    let json_shaped = text.contains("```json") || (text.contains('{') && text.contains('}'));
    json_shaped
        && text.contains("\"scaleValues\"")
        && (text.contains("\"scaleName\"") || text.contains("\"value\""))
}

pub fn extract_assessment(text: &str, scales: &[Scale]) -> Option<AssessmentResult> {
    AssessmentExtractor::default().extract(text, scales)
}

/// Leading characters of `text`, for log events.
pub(crate) fn text_sample(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
