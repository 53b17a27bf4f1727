//! Configuration
//!
//! Read from environment variables at startup.

use std::path::PathBuf;

use crate::error::{FitzyError, FitzyResult};

pub const DEFAULT_NUTRITIONIX_URL: &str = "https://trackapi.nutritionix.com";
pub const DEFAULT_LOCAL_USER: &str = "local";

#[derive(Debug, Clone, PartialEq)]
pub struct NutritionixConfig {
    pub base_url: String,
    pub app_id: Option<String>,
    pub app_key: Option<String>,
}

/// Where the calorie log and profiles live
#[derive(Debug, Clone, PartialEq)]
pub enum BackendConfig {
    /// Local SQLite store with an implicit session for one user
    Local { user_id: String },
    /// Hosted auth and database API
    Hosted { base_url: String, api_key: String },
}

impl BackendConfig {
    pub fn name(&self) -> &'static str {
        match self {
            BackendConfig::Local { .. } => "local",
            BackendConfig::Hosted { .. } => "hosted",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitzyConfig {
    pub database_path: PathBuf,
    pub backend: BackendConfig,
    pub nutritionix: NutritionixConfig,
}

impl FitzyConfig {
    pub fn from_env() -> FitzyResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> FitzyResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_path = get("FITZY_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let backend = match get("FITZY_BACKEND").as_deref().unwrap_or("local") {
            "local" => BackendConfig::Local {
                user_id: get("FITZY_LOCAL_USER").unwrap_or_else(|| DEFAULT_LOCAL_USER.to_string()),
            },
            "hosted" => BackendConfig::Hosted {
                base_url: get("SUPABASE_URL").ok_or_else(|| {
                    FitzyError::validation("SUPABASE_URL is required for the hosted backend")
                })?,
                api_key: get("SUPABASE_ANON_KEY").ok_or_else(|| {
                    FitzyError::validation("SUPABASE_ANON_KEY is required for the hosted backend")
                })?,
            },
            other => {
                return Err(FitzyError::validation(format!(
                    "Unknown FITZY_BACKEND '{}'. Valid backends: local, hosted",
                    other
                )))
            }
        };

        let nutritionix = NutritionixConfig {
            base_url: get("NUTRITIONIX_BASE_URL").unwrap_or_else(|| DEFAULT_NUTRITIONIX_URL.to_string()),
            app_id: get("NUTRITIONIX_APP_ID"),
            app_key: get("NUTRITIONIX_APP_KEY"),
        };

        Ok(Self {
            database_path,
            backend,
            nutritionix,
        })
    }
}

/// `data/fitzy.db` under the project root when run from `target/`, else beside the binary
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }

    path.push("data");
    path.push("fitzy.db");
    path
}
