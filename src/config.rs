use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::glucose::day::{DEFAULT_BASE_FASTING_GLUCOSE, DEFAULT_BEDTIME_OFFSET};

pub const BASE_FASTING_ENV_VAR: &str = "GLUCOSE_BASE_FASTING";
pub const BEDTIME_OFFSET_ENV_VAR: &str = "GLUCOSE_BEDTIME_OFFSET";
pub const RECIPE_API_BASE_URL_ENV_VAR: &str = "RECIPE_API_BASE_URL";
pub const RECIPE_API_KEY_ENV_ENV_VAR: &str = "RECIPE_API_KEY_ENV";
pub const RECIPE_API_MAX_RETRIES_ENV_VAR: &str = "RECIPE_API_MAX_RETRIES";
pub const RECIPE_API_RETRY_DELAY_ENV_VAR: &str = "RECIPE_API_RETRY_DELAY_MS";
pub const RECIPE_API_TIMEOUT_ENV_VAR: &str = "RECIPE_API_TIMEOUT_SECS";

const DEFAULT_RECIPE_API_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_RECIPE_API_KEY_ENV: &str = "RECIPE_API_KEY";

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeApiConfig {
    pub base_url: String,
    /// Name of the environment variable holding the API key, not the key itself.
    pub api_key_env_var: String,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
}

impl Default for RecipeApiConfig {
    fn default() -> Self {
        RecipeApiConfig {
            base_url: DEFAULT_RECIPE_API_BASE_URL.to_string(),
            api_key_env_var: DEFAULT_RECIPE_API_KEY_ENV.to_string(),
            max_retries: 2,
            retry_delay: Duration::from_millis(250),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Starting glucose (mg/dL) for the first meal of a day.
    pub base_fasting_glucose: f64,
    pub bedtime_offset: f64,
    pub recipe_api: RecipeApiConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            base_fasting_glucose: DEFAULT_BASE_FASTING_GLUCOSE,
            bedtime_offset: DEFAULT_BEDTIME_OFFSET,
            recipe_api: RecipeApiConfig::default(),
        }
    }
}

fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value '{}' for {}", raw, name)),
        Err(_) => Ok(default),
    }
}

impl SimulatorConfig {
    /// Loads `.env` if present, then reads every setting from the environment,
    /// falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let defaults = SimulatorConfig::default();

        let recipe_api = RecipeApiConfig {
            base_url: env::var(RECIPE_API_BASE_URL_ENV_VAR)
                .unwrap_or(defaults.recipe_api.base_url),
            api_key_env_var: env::var(RECIPE_API_KEY_ENV_ENV_VAR)
                .unwrap_or(defaults.recipe_api.api_key_env_var),
            max_retries: env_or(RECIPE_API_MAX_RETRIES_ENV_VAR, defaults.recipe_api.max_retries)?,
            retry_delay: Duration::from_millis(env_or(
                RECIPE_API_RETRY_DELAY_ENV_VAR,
                defaults.recipe_api.retry_delay.as_millis() as u64,
            )?),
            timeout: Duration::from_secs(env_or(
                RECIPE_API_TIMEOUT_ENV_VAR,
                defaults.recipe_api.timeout.as_secs(),
            )?),
        };

        Ok(SimulatorConfig {
            base_fasting_glucose: env_or(BASE_FASTING_ENV_VAR, defaults.base_fasting_glucose)?,
            bedtime_offset: env_or(BEDTIME_OFFSET_ENV_VAR, defaults.bedtime_offset)?,
            recipe_api,
        })
    }
}
