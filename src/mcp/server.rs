//! Fitzy MCP Server Implementation
//!
//! Exposes the tracker session as MCP tools. Tracker failures come back as
//! tool results flagged `is_error`, never as protocol errors.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::account::Accounts;
use crate::error::{FitzyError, FitzyResult};
use crate::ledger::TREND_DAYS;
use crate::models::{EntryKind, Gender, Profile};
use crate::tools::reports;
use crate::tools::status::StatusTracker;
use crate::tracker::Tracker;
use crate::view::Tab;

const MAX_TREND_DAYS: usize = 90;

/// Fitzy MCP Service
#[derive(Clone)]
pub struct FitzyService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    tracker: Arc<Tracker>,
    accounts: Arc<Accounts>,
    tool_router: ToolRouter<FitzyService>,
}

impl FitzyService {
    pub fn new(database_path: PathBuf, backend: &'static str, tracker: Arc<Tracker>, accounts: Arc<Accounts>) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path, backend))),
            tracker,
            accounts,
            tool_router: Self::tool_router(),
        }
    }
}

/// Serialize a success as pretty JSON; report a failure inline
fn respond<T: Serialize, E: std::fmt::Display>(result: Result<T, E>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => {
            let json = serde_json::to_string_pretty(&value)
                .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
            Ok(CallToolResult::success(vec![Content::text(json)]))
        }
        Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
    }
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RegisterParams {
    pub email: String,
    pub password: String,
    /// "male" or "female"; give all four physical attributes or none
    pub gender: Option<String>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub age: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SignInParams {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetProfileParams {
    /// "male" or "female"
    pub gender: String,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SubmitParams {
    /// Free-text description, e.g. "2 eggs and toast" or "ran 30 minutes"
    pub query: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DashboardParams {
    /// "food", "exercise" or "trend"
    #[serde(default)]
    pub tab: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TrendParams {
    #[serde(default = "default_trend_days")]
    pub days: usize,
}

fn default_trend_days() -> usize { TREND_DAYS }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExportChartParams {
    /// Where to write the PNG
    pub output_path: String,
    #[serde(default = "default_trend_days")]
    pub days: usize,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WeeklyReportParams {
    /// Where to write the PDF
    pub output_path: String,
}

fn parse_gender(value: &str) -> FitzyResult<Gender> {
    Gender::from_str(value)
        .ok_or_else(|| FitzyError::validation(format!("Unknown gender '{}'. Valid values: male, female", value)))
}

fn trend_days(days: usize) -> FitzyResult<usize> {
    if days == 0 || days > MAX_TREND_DAYS {
        return Err(FitzyError::validation(format!(
            "days must be between 1 and {}, got {}",
            MAX_TREND_DAYS, days
        )));
    }
    Ok(days)
}

impl RegisterParams {
    /// All four attributes, or none
    fn profile(&self) -> FitzyResult<Option<Profile>> {
        match (&self.gender, self.weight_kg, self.height_cm, self.age) {
            (None, None, None, None) => Ok(None),
            (Some(gender), Some(weight_kg), Some(height_cm), Some(age)) => Ok(Some(Profile {
                gender: parse_gender(gender)?,
                weight_kg,
                height_cm,
                age,
            })),
            _ => Err(FitzyError::validation(
                "Provide gender, weight_kg, height_cm and age together, or none of them",
            )),
        }
    }
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    success: bool,
    message: String,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl FitzyService {
    // --- Status ---

    #[tool(description = "Get the current status of the Fitzy service including build info, backend, signed-in user, ledger size, database status, and process information")]
    async fn fitzy_status(&self) -> Result<CallToolResult, McpError> {
        let user = self.tracker.session().await.map(|s| s.user_id);
        let entries = self.tracker.ledger_len().await;
        let status = self.status_tracker.lock().await.get_status(user, entries);
        respond(Ok::<_, FitzyError>(status))
    }

    #[tool(description = "Get instructions for logging food and exercise and reading the energy balance. Call this when starting a tracking session or when unsure how to use the tools.")]
    fn tracker_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::TRACKER_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(TRACKER_INSTRUCTIONS)]))
    }

    // --- Accounts ---

    #[tool(description = "Register a new account (hosted backend). Optionally include gender, weight_kg, height_cm and age; they become the profile on first sign-in.")]
    async fn register(&self, Parameters(p): Parameters<RegisterParams>) -> Result<CallToolResult, McpError> {
        let result = match p.profile() {
            Ok(profile) => self.accounts.register(&p.email, &p.password, profile).await,
            Err(e) => Err(e),
        };
        respond(result)
    }

    #[tool(description = "Sign in with email and password (hosted backend) and load the ledger")]
    async fn sign_in(&self, Parameters(p): Parameters<SignInParams>) -> Result<CallToolResult, McpError> {
        respond(self.accounts.sign_in(&self.tracker, &p.email, &p.password).await)
    }

    #[tool(description = "Sign out and clear the in-memory ledger (hosted backend)")]
    async fn sign_out(&self) -> Result<CallToolResult, McpError> {
        let result = self.accounts.sign_out(&self.tracker).await.map(|()| MessageResponse {
            success: true,
            message: "Signed out".to_string(),
        });
        respond(result)
    }

    // --- Profile ---

    #[tool(description = "Get the physical profile (gender, weight, height, age) used for exercise estimates")]
    async fn get_profile(&self) -> Result<CallToolResult, McpError> {
        respond(self.tracker.profile().await)
    }

    #[tool(description = "Set the physical profile used for exercise estimates")]
    async fn set_profile(&self, Parameters(p): Parameters<SetProfileParams>) -> Result<CallToolResult, McpError> {
        let result = match parse_gender(&p.gender) {
            Ok(gender) => {
                let profile = Profile {
                    gender,
                    weight_kg: p.weight_kg,
                    height_cm: p.height_cm,
                    age: p.age,
                };
                self.tracker.set_profile(&profile).await.map(|()| profile)
            }
            Err(e) => Err(e),
        };
        respond(result)
    }

    // --- Ledger ---

    #[tool(description = "Reload the ledger from storage, replacing the in-memory entries")]
    async fn load_ledger(&self) -> Result<CallToolResult, McpError> {
        respond(self.tracker.load().await)
    }

    #[tool(description = "Log food from a plain-language description; every matched item is logged for today")]
    async fn add_food(&self, Parameters(p): Parameters<SubmitParams>) -> Result<CallToolResult, McpError> {
        respond(self.tracker.submit(EntryKind::Food, &p.query).await)
    }

    #[tool(description = "Log exercise from a plain-language description; requires a profile. Every matched activity is logged for today")]
    async fn add_exercise(&self, Parameters(p): Parameters<SubmitParams>) -> Result<CallToolResult, McpError> {
        respond(self.tracker.submit(EntryKind::Exercise, &p.query).await)
    }

    // --- Views ---

    #[tool(description = "Get the dashboard for a tab (food, exercise, trend): summary bars, entry cards, and the weekly trend")]
    async fn get_dashboard(&self, Parameters(p): Parameters<DashboardParams>) -> Result<CallToolResult, McpError> {
        let tab = match p.tab.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            None => Ok(Tab::Food),
            Some(name) => Tab::from_str(name).ok_or_else(|| {
                FitzyError::validation(format!("Unknown tab '{}'. Valid tabs: food, exercise, trend", name))
            }),
        };
        let result = match tab {
            Ok(tab) => Ok(self.tracker.dashboard(tab).await),
            Err(e) => Err(e),
        };
        respond(result)
    }

    #[tool(description = "Get total calories consumed, burned, and the net balance over the whole ledger")]
    async fn get_summary(&self) -> Result<CallToolResult, McpError> {
        respond(Ok::<_, FitzyError>(self.tracker.summary().await))
    }

    #[tool(description = "Get the net calories per day for the trailing days ending today (default 7), oldest first")]
    async fn get_weekly_trend(&self, Parameters(p): Parameters<TrendParams>) -> Result<CallToolResult, McpError> {
        let result = match trend_days(p.days) {
            Ok(days) => Ok(self.tracker.trend(days).await),
            Err(e) => Err(e),
        };
        respond(result)
    }

    // --- Reports ---

    #[tool(description = "Export the daily intake, burned and net trend as a PNG chart")]
    async fn export_trend_chart(&self, Parameters(p): Parameters<ExportChartParams>) -> Result<CallToolResult, McpError> {
        let days = match trend_days(p.days) {
            Ok(days) => days,
            Err(e) => return respond(Err::<(), _>(e)),
        };
        let points = self.tracker.trend(days).await;
        respond(reports::export_trend_chart(&points, &p.output_path))
    }

    #[tool(description = "Generate a PDF weekly energy balance report with daily table, trend chart, and entry listing")]
    async fn generate_weekly_report(&self, Parameters(p): Parameters<WeeklyReportParams>) -> Result<CallToolResult, McpError> {
        let entries = self.tracker.entries().await;
        let today = self.tracker.today();
        respond(reports::generate_weekly_report(&entries, today, TREND_DAYS, &p.output_path))
    }
}

#[tool_handler]
impl ServerHandler for FitzyService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "fitzy".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Fitzy Energy Balance Tracker".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Fitzy - calorie intake and exercise tracking. \
                 IMPORTANT: Call tracker_instructions before logging. \
                 Accounts (hosted backend only): register, sign_in, sign_out. \
                 Profile: get_profile, set_profile (needed before add_exercise). \
                 Logging: add_food, add_exercise (plain-language descriptions, logged for today). \
                 Views: load_ledger, get_dashboard, get_summary, get_weekly_trend. \
                 Reports: export_trend_chart, generate_weekly_report."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(gender: Option<&str>, weight: Option<f64>, height: Option<f64>, age: Option<u32>) -> RegisterParams {
        RegisterParams {
            email: "a@b.c".into(),
            password: "pw".into(),
            gender: gender.map(String::from),
            weight_kg: weight,
            height_cm: height,
            age,
        }
    }

    #[test]
    fn test_register_profile_all_or_nothing() {
        assert_eq!(register(None, None, None, None).profile().unwrap(), None);

        let profile = register(Some("female"), Some(60.0), Some(165.0), Some(25)).profile().unwrap();
        assert_eq!(profile.map(|p| p.gender), Some(Gender::Female));

        assert!(register(Some("female"), Some(60.0), None, None).profile().is_err());
        assert!(register(Some("robot"), Some(60.0), Some(165.0), Some(25)).profile().is_err());
    }

    #[test]
    fn test_trend_days_bounds() {
        assert_eq!(trend_days(7).unwrap(), 7);
        assert!(trend_days(0).is_err());
        assert!(trend_days(MAX_TREND_DAYS + 1).is_err());
    }

    #[test]
    fn test_respond_flags_errors() {
        let ok = respond(Ok::<_, FitzyError>(MessageResponse { success: true, message: "hi".into() })).unwrap();
        assert_eq!(ok.is_error, Some(false));

        let err = respond(Err::<(), _>(FitzyError::Unauthorized)).unwrap();
        assert_eq!(err.is_error, Some(true));
    }
}
