//! Lookup results
//!
//! Item shapes returned by the natural-language nutrition and exercise
//! search API. Every numeric field is optional upstream.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub food_name: String,
    #[serde(default)]
    pub nf_calories: Option<f64>,
    #[serde(default)]
    pub nf_protein: Option<f64>,
    #[serde(default)]
    pub nf_total_fat: Option<f64>,
    #[serde(default)]
    pub nf_total_carbohydrate: Option<f64>,
    #[serde(default)]
    pub serving_qty: Option<f64>,
    #[serde(default)]
    pub serving_unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseItem {
    pub name: String,
    #[serde(default)]
    pub nf_calories: Option<f64>,
    #[serde(default)]
    pub duration_min: Option<f64>,
    #[serde(default)]
    pub met: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct FoodSearchResponse {
    #[serde(default)]
    pub foods: Vec<FoodItem>,
}

#[derive(Debug, Deserialize)]
pub struct ExerciseSearchResponse {
    #[serde(default)]
    pub exercises: Vec<ExerciseItem>,
}

/// A lookup result tagged by the endpoint that produced it
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    Food(FoodItem),
    Exercise(ExerciseItem),
}
