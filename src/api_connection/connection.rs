use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::endpoints::{nutrition_from_body, recipe_nutrition_url};
use crate::config::RecipeApiConfig;

#[derive(Debug, Error)]
pub enum RecipeSourceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("Recipe not found: {0}")]
    NotFound(String),
    #[error("Unreadable nutrition payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RecipeSourceError {
    /// Transport failures, server errors and rate limiting are worth another attempt;
    /// anything the server deliberately rejected is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            RecipeSourceError::Network(_) => true,
            RecipeSourceError::Api { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            RecipeSourceError::NotFound(_) | RecipeSourceError::Decode(_) => false,
        }
    }
}

/// Anything that can hand back raw nutrition data for a recipe id.
#[async_trait]
pub trait NutritionSource: Send + Sync {
    async fn fetch_nutrition(&self, recipe_id: &str) -> Result<Value, RecipeSourceError>;
}

/// HTTP client for the recipe nutrition service.
#[derive(Debug, Clone)]
pub struct RecipeClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    max_retries: u32,
    retry_delay: Duration,
}

impl RecipeClient {
    pub fn new(config: &RecipeApiConfig) -> Result<Self, RecipeSourceError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let api_key = env::var(&config.api_key_env_var).ok().filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            debug!(
                "No API key found in {}; calling the recipe service unauthenticated",
                config.api_key_env_var
            );
        }
        Ok(RecipeClient {
            client,
            base_url: config.base_url.clone(),
            api_key,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_once(&self, recipe_id: &str) -> Result<Value, RecipeSourceError> {
        let url = recipe_nutrition_url(&self.base_url, recipe_id);
        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RecipeSourceError::NotFound(recipe_id.to_string()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(RecipeSourceError::Api { status, body });
        }

        let body = response.text().await?;
        let parsed: Value = serde_json::from_str(&body)?;
        Ok(nutrition_from_body(parsed))
    }

    /// Fetches a recipe's nutrition records, retrying retryable failures up to
    /// `max_retries` times with a fixed delay between attempts.
    pub async fn fetch_recipe_nutrition(
        &self,
        recipe_id: &str,
    ) -> Result<Value, RecipeSourceError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(recipe_id).await {
                Ok(nutrition) => return Ok(nutrition),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        recipe_id,
                        attempt,
                        max_retries = self.max_retries,
                        "Recipe nutrition lookup failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl NutritionSource for RecipeClient {
    async fn fetch_nutrition(&self, recipe_id: &str) -> Result<Value, RecipeSourceError> {
        self.fetch_recipe_nutrition(recipe_id).await
    }
}
