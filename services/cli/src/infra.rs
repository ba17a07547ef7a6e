use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use mood_stability::error::AppError;
use mood_stability::workflows::stability::{
    AssistantClient, ClientError, CompletionRequest, FormulaRegistry, RegistryError, Scale,
    ScaleCatalog, ScaleId, ScaleRegistry, StabilityFormula, UserId,
};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Registry backed by a catalog file loaded once at startup.
#[derive(Debug, Clone)]
pub(crate) struct CatalogRegistry {
    catalog: ScaleCatalog,
}

impl CatalogRegistry {
    pub(crate) fn new(catalog: ScaleCatalog) -> Self {
        Self { catalog }
    }
}

impl ScaleRegistry for CatalogRegistry {
    fn active_scales(&self, _user: &UserId) -> Result<Vec<Scale>, RegistryError> {
        Ok(self
            .catalog
            .scales
            .iter()
            .filter(|scale| scale.is_active)
            .cloned()
            .collect())
    }

    fn scales_by_ids(&self, ids: &[ScaleId]) -> Result<Vec<Scale>, RegistryError> {
        Ok(self
            .catalog
            .scales
            .iter()
            .filter(|scale| ids.contains(&scale.id))
            .cloned()
            .collect())
    }
}

impl FormulaRegistry for CatalogRegistry {
    fn active_formula(&self, user: &UserId) -> Result<Option<StabilityFormula>, RegistryError> {
        Ok(self
            .catalog
            .formulas
            .iter()
            .find(|formula| formula.is_active && formula.user_id.as_ref() == Some(user))
            .cloned())
    }

    fn default_formula(&self) -> Result<Option<StabilityFormula>, RegistryError> {
        Ok(self
            .catalog
            .formulas
            .iter()
            .find(|formula| formula.is_active && formula.is_default)
            .cloned())
    }
}

/// Assistant stand-in that answers every request with a recorded reply.
pub(crate) struct ReplayAssistant {
    reply: String,
}

impl ReplayAssistant {
    pub(crate) fn new(reply: String) -> Self {
        Self { reply }
    }
}

impl AssistantClient for ReplayAssistant {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ClientError> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            temperature = request.temperature,
            "replaying recorded assistant reply"
        );
        if self.reply.trim().is_empty() {
            return Err(ClientError::NoResponse);
        }
        Ok(self.reply.clone())
    }
}

/// Loads and validates a catalog file, or the standard catalog when no path is given.
pub(crate) fn load_catalog(path: Option<&Path>) -> Result<ScaleCatalog, AppError> {
    let catalog = match path {
        Some(path) => read_json::<ScaleCatalog>(path)?,
        None => ScaleCatalog::standard(),
    };
    catalog
        .validate()
        .map_err(|err| AppError::Input(err.to_string()))?;
    Ok(catalog)
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mood_stability::workflows::stability::{Message, ScaleWeight};

    fn user_formula(user: &str, is_active: bool) -> StabilityFormula {
        StabilityFormula {
            id: format!("{user}-formula"),
            user_id: Some(UserId(user.to_string())),
            formula: "humeur:2".to_string(),
            description: String::new(),
            is_default: false,
            is_active,
            scale_weights: vec![ScaleWeight::new("humeur", 2.0, false)],
        }
    }

    #[test]
    fn catalog_registry_resolves_user_and_default_formulas() {
        let mut catalog = ScaleCatalog::standard();
        catalog.formulas.push(user_formula("ana", true));
        catalog.formulas.push(user_formula("bo", false));
        let registry = CatalogRegistry::new(catalog);

        let ana = registry
            .active_formula(&UserId("ana".to_string()))
            .expect("lookup succeeds")
            .expect("ana has a formula");
        assert_eq!(ana.id, "ana-formula");

        let bo = registry
            .active_formula(&UserId("bo".to_string()))
            .expect("lookup succeeds");
        assert!(bo.is_none());

        let default = registry
            .default_formula()
            .expect("lookup succeeds")
            .expect("standard default present");
        assert!(default.is_default);
    }

    #[test]
    fn inactive_scales_are_hidden_from_users() {
        let mut catalog = ScaleCatalog::standard();
        catalog.scales[0].is_active = false;
        let registry = CatalogRegistry::new(catalog);

        let active = registry
            .active_scales(&UserId("ana".to_string()))
            .expect("lookup succeeds");
        assert_eq!(active.len(), 4);

        let by_id = registry
            .scales_by_ids(&[ScaleId::from("humeur")])
            .expect("lookup succeeds");
        assert_eq!(by_id.len(), 1);
    }

    #[test]
    fn replay_assistant_rejects_blank_recordings() {
        let request = CompletionRequest {
            model: "mistral-large-latest".to_string(),
            messages: vec![Message::user("hi")],
            temperature: 0.3,
            max_tokens: 10,
            top_p: 0.95,
        };

        assert!(matches!(
            ReplayAssistant::new("  \n".to_string()).complete(&request),
            Err(ClientError::NoResponse)
        ));
        assert_eq!(
            ReplayAssistant::new("hello".to_string())
                .complete(&request)
                .expect("reply replayed"),
            "hello"
        );
    }

    #[test]
    fn parse_date_reports_the_raw_value() {
        assert_eq!(
            parse_date(" 2025-04-17 ").expect("valid date"),
            NaiveDate::from_ymd_opt(2025, 4, 17).expect("valid date")
        );
        let error = parse_date("17/04/2025").expect_err("wrong format");
        assert!(error.contains("'17/04/2025'"));
    }

    #[test]
    fn standard_catalog_loads_without_a_path() {
        let catalog = load_catalog(None).expect("standard catalog");
        assert_eq!(catalog.scales.len(), 5);
    }
}
