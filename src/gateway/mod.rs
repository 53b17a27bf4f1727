//! Gateways
//!
//! Stateless request/response wrappers around the persisted log, the
//! profile store and the lookup API. One outbound call per operation; no
//! retries, caching or batching.

mod hosted;
mod nutritionix;
mod sqlite;

pub use hosted::HostedStore;
pub use nutritionix::NutritionixClient;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use tracing::debug;

use crate::auth::Session;
use crate::error::{FitzyError, FitzyResult};
use crate::models::{ExerciseItem, FoodItem, LogRow, NewLogRow, Profile};

/// Persisted calorie log
#[async_trait]
pub trait LogGateway: Send + Sync {
    /// All rows for the session's user, newest first
    async fn list(&self, session: &Session) -> FitzyResult<Vec<LogRow>>;

    /// Append one row for the session's user
    async fn append(&self, session: &Session, row: &NewLogRow) -> FitzyResult<()>;
}

/// Physical profile storage
#[async_trait]
pub trait ProfileGateway: Send + Sync {
    async fn fetch_profile(&self, session: &Session) -> FitzyResult<Profile>;

    async fn save_profile(&self, session: &Session, profile: &Profile) -> FitzyResult<()>;
}

/// Natural-language nutrition and exercise search
#[async_trait]
pub trait LookupGateway: Send + Sync {
    async fn search_foods(&self, query: &str) -> FitzyResult<Vec<FoodItem>>;

    async fn search_exercises(&self, query: &str, profile: &Profile) -> FitzyResult<Vec<ExerciseItem>>;
}

/// Pass a success response through; map anything else to its error variant
pub(crate) async fn check_response(response: reqwest::Response) -> FitzyResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), body_len = body.len(), "upstream returned failure");
    Err(FitzyError::from_status(status.as_u16(), body))
}

/// Build the shared HTTP client
pub(crate) fn http_client() -> FitzyResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .user_agent(concat!("fitzy/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(FitzyError::from)
}
