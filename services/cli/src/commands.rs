use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::Args;
use mood_stability::config::AssistantConfig;
use mood_stability::error::AppError;
use mood_stability::workflows::stability::{
    get_stability_description, parse_formula, AssessmentResult, AssessmentService,
    FormulaParsingResult, Message, MoodEntryDraft, MoodEntrySubmission, ScaleCatalog,
    ScaleRegistry, ScaleWeight, StabilityCalculationResult, StabilityService, UserId,
};
use serde::Serialize;
use tracing::warn;

use crate::infra::{read_json, CatalogRegistry, ReplayAssistant};

#[derive(Args, Debug)]
pub(crate) struct ParseArgs {
    /// Formula text, either `id:weight[:true],...` or a JSON array of weights
    pub(crate) formula: String,
}

#[derive(Args, Debug)]
pub(crate) struct ComposeArgs {
    /// JSON array of `{scaleId, weight, isInverted}` objects
    #[arg(long)]
    pub(crate) weights: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Mood entry JSON (`scaleValues`, `sleepHours`, `comment`, `medication`)
    #[arg(long)]
    pub(crate) values: PathBuf,
    /// Entry date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) entry_date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ExtractArgs {
    /// Recorded assistant reply text
    #[arg(long)]
    pub(crate) reply: PathBuf,
    /// Optional JSON array of prior `{role, content}` messages
    #[arg(long)]
    pub(crate) conversation: Option<PathBuf>,
    /// Also score the recovered assessment
    #[arg(long)]
    pub(crate) score: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComposedFormula {
    formula: String,
    scale_weights: Vec<ScaleWeight>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractionReport {
    assessment: AssessmentResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    stability: Option<StabilityCalculationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stability_description: Option<&'static str>,
}

pub(crate) fn run_formula_parse(
    args: ParseArgs,
    catalog: ScaleCatalog,
    user: &UserId,
) -> Result<(), AppError> {
    let registry = CatalogRegistry::new(catalog);
    let available: Vec<_> = registry
        .active_scales(user)
        .map_err(|err| AppError::Input(err.to_string()))?
        .into_iter()
        .map(|scale| scale.id)
        .collect();

    let parsed = parse_formula(&args.formula, &available);
    let failure = parsed.as_ref().err().map(ToString::to_string);
    print_json(&FormulaParsingResult::from(parsed))?;

    match failure {
        Some(message) => Err(AppError::Input(message)),
        None => Ok(()),
    }
}

pub(crate) fn run_formula_compose(args: ComposeArgs, catalog: ScaleCatalog) -> Result<(), AppError> {
    let weights: Vec<ScaleWeight> = read_json(&args.weights)?;
    let formula = compose(catalog, &weights)?;
    print_json(&ComposedFormula {
        formula,
        scale_weights: weights,
    })
}

pub(crate) fn run_score(
    args: ScoreArgs,
    catalog: ScaleCatalog,
    user: &UserId,
) -> Result<(), AppError> {
    let submission: MoodEntrySubmission = read_json(&args.values)?;
    let entry_date = args.entry_date.unwrap_or_else(|| Local::now().date_naive());
    let draft = score_entry(catalog, user, submission, entry_date)?;
    print_json(&draft)
}

pub(crate) fn run_extract(
    args: ExtractArgs,
    catalog: ScaleCatalog,
    user: &UserId,
    assistant: AssistantConfig,
) -> Result<(), AppError> {
    let reply = fs::read_to_string(&args.reply)?;
    let conversation: Vec<Message> = match &args.conversation {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    let report = extract_reply(catalog, user, reply, &conversation, assistant, args.score)?;
    print_json(&report)
}

fn compose(catalog: ScaleCatalog, weights: &[ScaleWeight]) -> Result<String, AppError> {
    let registry = Arc::new(CatalogRegistry::new(catalog));
    let service = StabilityService::new(Arc::clone(&registry), registry);
    Ok(service.compose_formula(weights)?)
}

fn score_entry(
    catalog: ScaleCatalog,
    user: &UserId,
    submission: MoodEntrySubmission,
    entry_date: NaiveDate,
) -> Result<MoodEntryDraft, AppError> {
    let registry = Arc::new(CatalogRegistry::new(catalog));
    let service = StabilityService::new(Arc::clone(&registry), registry);
    Ok(service.prepare_entry(user, submission, entry_date)?)
}

fn extract_reply(
    catalog: ScaleCatalog,
    user: &UserId,
    reply: String,
    conversation: &[Message],
    assistant: AssistantConfig,
    score: bool,
) -> Result<ExtractionReport, AppError> {
    let registry = Arc::new(CatalogRegistry::new(catalog));
    let assessments = AssessmentService::new(
        Arc::new(ReplayAssistant::new(reply)),
        Arc::clone(&registry),
        assistant,
    );
    let assessment = assessments.generate_mood_assessment(user, conversation)?;

    let stability = if score {
        let service = StabilityService::new(Arc::clone(&registry), registry);
        Some(service.calculate_stability(user, &assessment.scale_values())?)
    } else {
        None
    };
    if stability.as_ref().is_some_and(|result| result.breakdown.is_empty()) {
        warn!(%user, "assessment matched no formula weights");
    }

    Ok(ExtractionReport {
        stability_description: stability
            .as_ref()
            .map(|result| get_stability_description(result.normalized_score)),
        stability,
        assessment,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mood_stability::workflows::stability::ScaleValue;

    fn user() -> UserId {
        UserId("cli-user".to_string())
    }

    #[test]
    fn score_entry_produces_a_described_draft() {
        let submission = MoodEntrySubmission {
            scale_values: vec![
                ScaleValue::new("humeur", 6),
                ScaleValue::new("irritabilite", 7),
            ],
            sleep_hours: Some(8.0),
            comment: String::new(),
            medication: String::new(),
        };
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).expect("valid date");

        let draft = score_entry(ScaleCatalog::standard(), &user(), submission, date)
            .expect("entry scored");
        assert_eq!(draft.entry_date, date);
        assert_eq!(
            draft.stability_description,
            get_stability_description(draft.stability_score)
        );
    }

    #[test]
    fn compose_reports_unknown_scales_as_stability_errors() {
        let error = compose(
            ScaleCatalog::standard(),
            &[ScaleWeight::new("sommeil", 1.0, false)],
        )
        .expect_err("unknown scale");
        assert!(matches!(error, AppError::Stability(_)));
    }

    #[test]
    fn extract_reply_scores_on_request() {
        let reply = "```json\n{\"scaleValues\": [{\"scaleId\": \"humeur\", \"value\": 4}], \"sleepHours\": 6}\n```";

        let report = extract_reply(
            ScaleCatalog::standard(),
            &user(),
            reply.to_string(),
            &[],
            AssistantConfig::default(),
            true,
        )
        .expect("assessment extracted");

        assert_eq!(report.assessment.scale_values.len(), 5);
        assert_eq!(report.assessment.value_for("humeur"), Some(4));
        let stability = report.stability.expect("stability calculated");
        assert_eq!(stability.breakdown.len(), 5);
        assert!(report.stability_description.is_some());
    }

    #[test]
    fn extract_reply_without_json_is_an_assessment_error() {
        let error = extract_reply(
            ScaleCatalog::standard(),
            &user(),
            "no idea".to_string(),
            &[],
            AssistantConfig::default(),
            false,
        )
        .expect_err("nothing to extract");
        assert!(matches!(error, AppError::Assessment(_)));
    }
}
