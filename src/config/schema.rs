use crate::error::ConfigError;
use crate::suggest::GoalDirection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const MIN_GENERATE_COUNT: u8 = 1;
pub const MAX_GENERATE_COUNT: u8 = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_judge_service")]
    pub judge: ServiceConfig,

    #[serde(default = "default_combiner_service")]
    pub combiner: ServiceConfig,

    #[serde(default = "default_generator_service")]
    pub generator: ServiceConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            api_key: None,
            base_url: default_base_url(),
            judge: default_judge_service(),
            combiner: default_combiner_service(),
            generator: default_generator_service(),
            session: SessionConfig::default(),
        }
    }
}

/// Model and call budget for one backing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    pub timeout_secs: u64,
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self, label: &str) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{label}.model must not be empty")));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(format!(
                "{label}.timeout_secs must be greater than zero"
            )));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Validation(format!(
                "{label}.temperature must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

fn default_temperature() -> f64 {
    0.7
}

fn default_judge_service() -> ServiceConfig {
    ServiceConfig {
        model: "openai/gpt-4o-mini".into(),
        temperature: default_temperature(),
        timeout_secs: 30,
    }
}

fn default_combiner_service() -> ServiceConfig {
    ServiceConfig {
        model: "openai/gpt-4o-mini".into(),
        temperature: default_temperature(),
        timeout_secs: 30,
    }
}

fn default_generator_service() -> ServiceConfig {
    ServiceConfig {
        model: "google/gemini-3-pro-image-preview".into(),
        temperature: default_temperature(),
        timeout_secs: 60,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_generate_count")]
    pub default_generate_count: u8,
    #[serde(default)]
    pub goal: GoalDirection,
    #[serde(default = "default_true")]
    pub shuffle_feedback: bool,
    /// Legacy fallback: treat a judge reply containing "yes" or "swipe right"
    /// as a right swipe when the structured swipe field is missing.
    #[serde(default)]
    pub infer_swipe_from_text: bool,
    #[serde(default = "default_max_evaluation_concurrency")]
    pub max_evaluation_concurrency: usize,
}

fn default_generate_count() -> u8 {
    2
}

fn default_true() -> bool {
    true
}

fn default_max_evaluation_concurrency() -> usize {
    8
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_generate_count: default_generate_count(),
            goal: GoalDirection::default(),
            shuffle_feedback: true,
            infer_swipe_from_text: false,
            max_evaluation_concurrency: default_max_evaluation_concurrency(),
        }
    }
}

impl Config {
    /// Longest per-call deadline across the three services.
    pub fn longest_timeout(&self) -> Duration {
        [&self.judge, &self.combiner, &self.generator]
            .into_iter()
            .map(ServiceConfig::timeout)
            .max()
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.judge.validate("judge")?;
        self.combiner.validate("combiner")?;
        self.generator.validate("generator")?;

        let count = self.session.default_generate_count;
        if !(MIN_GENERATE_COUNT..=MAX_GENERATE_COUNT).contains(&count) {
            return Err(ConfigError::Validation(format!(
                "session.default_generate_count must be within {MIN_GENERATE_COUNT}..={MAX_GENERATE_COUNT}, got {count}"
            )));
        }
        if self.session.max_evaluation_concurrency == 0 {
            return Err(ConfigError::Validation(
                "session.max_evaluation_concurrency must be at least 1".into(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("base_url must not be empty".into()));
        }
        Ok(())
    }
}
