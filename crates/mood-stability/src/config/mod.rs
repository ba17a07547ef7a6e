use std::env;
use std::fmt;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub assistant: AssistantConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = AssistantConfig::default();
        let assistant = AssistantConfig {
            model: env::var("ASSISTANT_MODEL").unwrap_or(defaults.model),
            chat_temperature: parse_var("ASSISTANT_CHAT_TEMPERATURE", defaults.chat_temperature)?,
            assessment_temperature: parse_var(
                "ASSISTANT_ASSESSMENT_TEMPERATURE",
                defaults.assessment_temperature,
            )?,
            chat_max_tokens: parse_var("ASSISTANT_CHAT_MAX_TOKENS", defaults.chat_max_tokens)?,
            assessment_max_tokens: parse_var(
                "ASSISTANT_ASSESSMENT_MAX_TOKENS",
                defaults.assessment_max_tokens,
            )?,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            assistant,
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Sampling parameters forwarded to the text-generation provider.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantConfig {
    pub model: String,
    pub chat_temperature: f32,
    pub assessment_temperature: f32,
    pub chat_max_tokens: u32,
    pub assessment_max_tokens: u32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: "mistral-large-latest".to_string(),
            chat_temperature: 0.7,
            assessment_temperature: 0.3,
            chat_max_tokens: 1000,
            assessment_max_tokens: 2000,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { key } => write!(f, "{key} must be a valid number"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("ASSISTANT_MODEL");
        env::remove_var("ASSISTANT_CHAT_TEMPERATURE");
        env::remove_var("ASSISTANT_ASSESSMENT_TEMPERATURE");
        env::remove_var("ASSISTANT_CHAT_MAX_TOKENS");
        env::remove_var("ASSISTANT_ASSESSMENT_MAX_TOKENS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.assistant, AssistantConfig::default());
    }

    #[test]
    fn reads_assistant_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "prod");
        env::set_var("ASSISTANT_MODEL", "mistral-small-latest");
        env::set_var("ASSISTANT_ASSESSMENT_TEMPERATURE", "0.1");
        env::set_var("ASSISTANT_CHAT_MAX_TOKENS", "512");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.assistant.model, "mistral-small-latest");
        assert!((config.assistant.assessment_temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.assistant.chat_max_tokens, 512);
        assert_eq!(config.assistant.assessment_max_tokens, 2000);
    }

    #[test]
    fn rejects_unparseable_numbers() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ASSISTANT_CHAT_MAX_TOKENS", "lots");
        let error = AppConfig::load().expect_err("invalid token budget");
        reset_env();

        match error {
            ConfigError::InvalidNumber { key } => assert_eq!(key, "ASSISTANT_CHAT_MAX_TOKENS"),
        }
    }
}
