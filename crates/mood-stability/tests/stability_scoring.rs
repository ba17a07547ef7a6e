//! Integration tests for formula resolution and stability scoring.
//!
//! Scenarios go through the public service facade with in-memory registries so
//! formula fallback, weight resolution, and entry validation are exercised end
//! to end.

mod common {
    use std::sync::Mutex;

    use mood_stability::workflows::stability::{
        FormulaRegistry, RegistryError, Scale, ScaleCatalog, ScaleId, ScaleRegistry,
        StabilityFormula, UserId,
    };

    #[derive(Default)]
    pub(super) struct MemoryScales {
        pub(super) scales: Vec<Scale>,
    }

    impl ScaleRegistry for MemoryScales {
        fn active_scales(&self, _user: &UserId) -> Result<Vec<Scale>, RegistryError> {
            Ok(self
                .scales
                .iter()
                .filter(|scale| scale.is_active)
                .cloned()
                .collect())
        }

        fn scales_by_ids(&self, ids: &[ScaleId]) -> Result<Vec<Scale>, RegistryError> {
            Ok(self
                .scales
                .iter()
                .filter(|scale| ids.contains(&scale.id))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    pub(super) struct MemoryFormulas {
        pub(super) active: Mutex<Option<StabilityFormula>>,
        pub(super) default: Option<StabilityFormula>,
    }

    impl FormulaRegistry for MemoryFormulas {
        fn active_formula(&self, _user: &UserId) -> Result<Option<StabilityFormula>, RegistryError> {
            Ok(self.active.lock().expect("formula mutex poisoned").clone())
        }

        fn default_formula(&self) -> Result<Option<StabilityFormula>, RegistryError> {
            Ok(self.default.clone())
        }
    }

    /// Registry whose backing store is down.
    pub(super) struct UnreachableScales;

    impl ScaleRegistry for UnreachableScales {
        fn active_scales(&self, _user: &UserId) -> Result<Vec<Scale>, RegistryError> {
            Err(RegistryError::Unavailable("scale store offline".to_string()))
        }

        fn scales_by_ids(&self, _ids: &[ScaleId]) -> Result<Vec<Scale>, RegistryError> {
            Err(RegistryError::Unavailable("scale store offline".to_string()))
        }
    }

    pub(super) fn standard_scales() -> MemoryScales {
        MemoryScales {
            scales: ScaleCatalog::standard().scales,
        }
    }

    pub(super) fn standard_formulas() -> MemoryFormulas {
        MemoryFormulas {
            active: Mutex::new(None),
            default: ScaleCatalog::standard().formulas.into_iter().next(),
        }
    }

    pub(super) fn user_formula(formula: &str) -> StabilityFormula {
        StabilityFormula {
            id: "user-formula".to_string(),
            user_id: Some(user()),
            formula: formula.to_string(),
            description: "custom".to_string(),
            is_default: false,
            is_active: true,
            scale_weights: Vec::new(),
        }
    }

    pub(super) fn user() -> UserId {
        UserId("user-1".to_string())
    }
}

use std::sync::Arc;

use chrono::NaiveDate;
use common::*;
use mood_stability::workflows::stability::{
    extract_assessment, EntryViolation, FormulaError, MoodEntrySubmission, ScaleValue,
    ScaleWeight, StabilityBand, StabilityService, StabilityServiceError,
};

fn standard_values(value: i32) -> Vec<ScaleValue> {
    ["humeur", "irritabilite", "confiance", "extraversion", "bien_etre"]
        .into_iter()
        .map(|id| ScaleValue::new(id, value))
        .collect()
}

fn entry_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 17).expect("valid date")
}

#[test]
fn default_formula_applies_when_user_has_none() {
    let service = StabilityService::new(Arc::new(standard_scales()), Arc::new(standard_formulas()));

    let result = service
        .calculate_stability(&user(), &standard_values(13))
        .expect("score calculated");

    // Four scales at 13 plus the inverted irritability scale mirrored to 0.
    assert!((result.raw_score - 52.0 / 5.0).abs() < 1e-9);
    assert_eq!(result.breakdown.len(), 5);
    // Range: max 4*13 + 0 = 52, min 0 + 13 = 13.
    let expected = 100.0 - ((52.0 / 5.0 - 13.0) / 39.0) * 100.0;
    assert!((result.normalized_score - expected).abs() < 1e-9);
}

#[test]
fn active_user_formula_takes_precedence() {
    let formulas = standard_formulas();
    *formulas.active.lock().expect("formula mutex") = Some(user_formula("humeur:1"));
    let service = StabilityService::new(Arc::new(standard_scales()), Arc::new(formulas));

    let result = service
        .calculate_stability(&user(), &standard_values(8))
        .expect("score calculated");

    assert_eq!(result.breakdown.len(), 1);
    assert!((result.raw_score - 8.0).abs() < 1e-9);
    assert!((result.normalized_score - 38.4615).abs() < 1e-3);
}

#[test]
fn stored_weights_are_preferred_over_formula_text() {
    let formulas = standard_formulas();
    let mut formula = user_formula("not even parseable");
    formula.scale_weights = vec![ScaleWeight::new("confiance", 2.0, true)];
    *formulas.active.lock().expect("formula mutex") = Some(formula);
    let service = StabilityService::new(Arc::new(standard_scales()), Arc::new(formulas));

    let result = service
        .calculate_stability(&user(), &[ScaleValue::new("confiance", 3)])
        .expect("score calculated");

    assert!((result.raw_score - 10.0).abs() < 1e-9);
    assert!(result.breakdown[0].is_inverted);
}

#[test]
fn invalid_stored_formula_surfaces_the_parse_error() {
    let formulas = standard_formulas();
    *formulas.active.lock().expect("formula mutex") = Some(user_formula("humeur:1,ghost:1"));
    let service = StabilityService::new(Arc::new(standard_scales()), Arc::new(formulas));

    match service.calculate_stability(&user(), &standard_values(5)) {
        Err(StabilityServiceError::Formula(FormulaError::UnknownScale { scale_id })) => {
            assert_eq!(scale_id, "ghost")
        }
        other => panic!("expected unknown scale error, got {other:?}"),
    }
}

#[test]
fn missing_formulas_are_reported() {
    let service = StabilityService::new(
        Arc::new(standard_scales()),
        Arc::new(MemoryFormulas::default()),
    );

    assert!(matches!(
        service.calculate_stability(&user(), &standard_values(5)),
        Err(StabilityServiceError::NoFormula)
    ));
}

#[test]
fn prepare_entry_scores_and_describes_valid_submissions() {
    let service = StabilityService::new(Arc::new(standard_scales()), Arc::new(standard_formulas()));
    let submission = MoodEntrySubmission {
        scale_values: standard_values(6),
        sleep_hours: Some(7.5),
        comment: "steady week".to_string(),
        medication: String::new(),
    };

    let draft = service
        .prepare_entry(&user(), submission, entry_date())
        .expect("entry prepared");

    assert_eq!(draft.entry_date, entry_date());
    assert_eq!(draft.scale_values.len(), 5);
    assert_eq!(draft.sleep_hours, Some(7.5));

    let mood = &draft.scale_values[0];
    assert_eq!(mood.scale_name, "humeur");
    assert_eq!(mood.value, 6);
    assert!(mood
        .description
        .as_deref()
        .is_some_and(|text| text.starts_with("Humeur légèrement basse")));
    assert_eq!(
        draft.stability_description,
        StabilityBand::from_score(draft.stability_score).label()
    );
}

#[test]
fn entry_values_without_a_matching_level_have_no_description() {
    let mut scales = standard_scales();
    scales.scales[0].levels.clear();
    let service = StabilityService::new(Arc::new(scales), Arc::new(standard_formulas()));
    let submission = MoodEntrySubmission {
        scale_values: vec![ScaleValue::new("humeur", 3), ScaleValue::new("confiance", 3)],
        sleep_hours: None,
        comment: String::new(),
        medication: String::new(),
    };

    let draft = service
        .prepare_entry(&user(), submission, entry_date())
        .expect("entry prepared");

    assert_eq!(draft.scale_values[0].description, None);
    assert!(draft.scale_values[1].description.is_some());
}

#[test]
fn prepare_entry_rejects_out_of_range_and_unknown_scales() {
    let service = StabilityService::new(Arc::new(standard_scales()), Arc::new(standard_formulas()));

    let out_of_range = MoodEntrySubmission {
        scale_values: vec![ScaleValue::new("humeur", 14)],
        sleep_hours: None,
        comment: String::new(),
        medication: String::new(),
    };
    let error = service
        .prepare_entry(&user(), out_of_range, entry_date())
        .expect_err("value above max");
    assert_eq!(
        error.to_string(),
        "value 14 is out of range for scale humeur (0-13)"
    );

    let unknown = MoodEntrySubmission {
        scale_values: vec![ScaleValue::new("anxiete", 3)],
        sleep_hours: None,
        comment: String::new(),
        medication: String::new(),
    };
    match service.prepare_entry(&user(), unknown, entry_date()) {
        Err(StabilityServiceError::UnknownScale { scale_id }) => assert_eq!(scale_id.as_str(), "anxiete"),
        other => panic!("expected unknown scale, got {other:?}"),
    }
}

#[test]
fn prepare_entry_enforces_submission_shape() {
    let service = StabilityService::new(Arc::new(standard_scales()), Arc::new(standard_formulas()));

    let empty = MoodEntrySubmission {
        scale_values: Vec::new(),
        sleep_hours: None,
        comment: String::new(),
        medication: String::new(),
    };
    assert!(matches!(
        service.prepare_entry(&user(), empty, entry_date()),
        Err(StabilityServiceError::Entry(EntryViolation::NoScaleValues))
    ));

    let oversleep = MoodEntrySubmission {
        scale_values: standard_values(5),
        sleep_hours: Some(25.0),
        comment: String::new(),
        medication: String::new(),
    };
    assert!(matches!(
        service.prepare_entry(&user(), oversleep, entry_date()),
        Err(StabilityServiceError::Entry(EntryViolation::SleepHoursOutOfRange(_)))
    ));
}

#[test]
fn compose_formula_validates_and_serializes() {
    let service = StabilityService::new(Arc::new(standard_scales()), Arc::new(standard_formulas()));

    let text = service
        .compose_formula(&[
            ScaleWeight::new("humeur", 1.5, false),
            ScaleWeight::new("irritabilite", 1.0, true),
        ])
        .expect("formula composed");
    assert_eq!(text, "humeur:1.5,irritabilite:1:true");

    match service.compose_formula(&[ScaleWeight::new("humeur", 1.0, false), ScaleWeight::new("nope", 1.0, false)]) {
        Err(StabilityServiceError::Formula(FormulaError::UnknownScales { scale_ids })) => {
            assert_eq!(scale_ids, vec!["nope".to_string()])
        }
        other => panic!("expected unknown scales, got {other:?}"),
    }
}

#[test]
fn extracted_assessment_becomes_a_scored_entry() {
    let service = StabilityService::new(Arc::new(standard_scales()), Arc::new(standard_formulas()));
    let reply = "```json\n{\"scaleValues\": [{\"scaleId\": \"humeur\", \"value\": 11}, {\"scaleId\": \"irritabilite\", \"value\": 12}], \"sleepHours\": 4, \"medication\": \"lithium\"}\n```";
    let scales = standard_scales().scales;

    let assessment = extract_assessment(reply, &scales).expect("assessment recovered");
    let draft = service
        .prepare_entry(&user(), MoodEntrySubmission::from(assessment), entry_date())
        .expect("entry prepared");

    assert_eq!(draft.scale_values.len(), 5);
    assert_eq!(draft.scale_values[0].scale_id.as_str(), "humeur");
    assert_eq!(draft.scale_values[0].value, 11);
    assert_eq!(draft.sleep_hours, Some(4.0));
    assert_eq!(draft.medication, "lithium");
}

#[test]
fn registry_outages_surface_as_registry_errors() {
    let service = StabilityService::new(Arc::new(UnreachableScales), Arc::new(standard_formulas()));

    let error = service
        .calculate_stability(&user(), &standard_values(5))
        .expect_err("scale store is down");
    assert!(matches!(error, StabilityServiceError::Registry(_)));
    assert_eq!(error.to_string(), "registry unavailable: scale store offline");

    assert!(matches!(
        service.compose_formula(&[ScaleWeight::new("humeur", 1.0, false)]),
        Err(StabilityServiceError::Registry(_))
    ));
}
