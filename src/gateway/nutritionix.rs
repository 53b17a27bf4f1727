//! Nutritionix lookup gateway
//!
//! Natural-language food and exercise search.

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use super::{check_response, http_client, LookupGateway};
use crate::config::NutritionixConfig;
use crate::error::{FitzyError, FitzyResult};
use crate::models::{
    ExerciseItem, ExerciseSearchResponse, FoodItem, FoodSearchResponse, Profile,
};

const MISSING_INPUT: &str = "Missing query or API credentials";

#[derive(Clone)]
pub struct NutritionixClient {
    http: reqwest::Client,
    base_url: String,
    app_id: Option<String>,
    app_key: Option<String>,
}

impl NutritionixClient {
    pub fn new(config: &NutritionixConfig) -> FitzyResult<Self> {
        Ok(Self {
            http: http_client()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_id: config.app_id.clone(),
            app_key: config.app_key.clone(),
        })
    }

    /// Credentials and a non-blank query, or a validation error
    fn prepare<'a>(&'a self, query: &'a str) -> FitzyResult<(&'a str, &'a str, &'a str)> {
        let query = query.trim();
        match (query.is_empty(), self.app_id.as_deref(), self.app_key.as_deref()) {
            (false, Some(id), Some(key)) if !id.is_empty() && !key.is_empty() => {
                Ok((query, id, key))
            }
            _ => Err(FitzyError::validation(MISSING_INPUT)),
        }
    }

    async fn post(&self, endpoint: &str, app_id: &str, app_key: &str, body: serde_json::Value) -> FitzyResult<reqwest::Response> {
        let response = self
            .http
            .post(format!("{}/v2/natural/{}", self.base_url, endpoint))
            .header("x-app-id", app_id)
            .header("x-app-key", app_key)
            .json(&body)
            .send()
            .await?;

        check_response(response).await
    }
}

#[async_trait]
impl LookupGateway for NutritionixClient {
    async fn search_foods(&self, query: &str) -> FitzyResult<Vec<FoodItem>> {
        let (query, app_id, app_key) = self.prepare(query)?;

        let response = self
            .post("nutrients", app_id, app_key, json!({ "query": query }))
            .await?;
        let parsed: FoodSearchResponse = response.json().await?;

        info!(query, results = parsed.foods.len(), "food lookup");
        Ok(parsed.foods)
    }

    async fn search_exercises(&self, query: &str, profile: &Profile) -> FitzyResult<Vec<ExerciseItem>> {
        let (query, app_id, app_key) = self.prepare(query)?;

        let body = json!({
            "query": query,
            "gender": profile.gender.as_str(),
            "weight_kg": profile.weight_kg,
            "height_cm": profile.height_cm,
            "age": profile.age,
        });
        let response = self.post("exercise", app_id, app_key, body).await?;
        let parsed: ExerciseSearchResponse = response.json().await?;

        info!(query, results = parsed.exercises.len(), "exercise lookup");
        Ok(parsed.exercises)
    }
}
