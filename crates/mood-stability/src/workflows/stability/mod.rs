//! Mood stability scoring.
//!
//! The core is three pure pieces: the formula parser, the stability
//! calculator, and the assessment extractor. The services wire them to the
//! registry and assistant ports.

pub mod assessment;
pub mod calculator;
pub mod catalog;
pub mod domain;
pub mod extraction;
pub mod formula;
pub mod prompt;
pub mod registry;
pub mod scale;
pub mod service;

pub use assessment::{AssessmentService, AssessmentServiceError};
pub use calculator::{calculate_stability, get_stability_description, StabilityBand};
pub use catalog::{CatalogError, ScaleCatalog, DEFAULT_FORMULA};
pub use domain::{
    AssessedScaleValue, AssessmentResult, ChatReply, EntryScaleValue, Message, MessageRole,
    MoodEntryDraft, MoodEntrySubmission, Scale, ScaleContribution, ScaleId, ScaleLevel, ScaleValue,
    ScaleWeight, StabilityCalculationResult, StabilityFormula, UserId,
};
pub use extraction::{
    contains_assessment, extract_assessment, validate_and_fix_assessment, AssessmentExtractor,
    ExtractionStrategy,
};
pub use formula::{
    generate_formula_string, parse_formula, validate_formula_definition, FormulaError,
    FormulaParsingResult,
};
pub use registry::{
    AssistantClient, ClientError, CompletionRequest, FormulaRegistry, RegistryError,
    ScaleRegistry,
};
pub use scale::{validate_scale, ScaleDefinitionError};
pub use service::{EntryViolation, StabilityService, StabilityServiceError};
