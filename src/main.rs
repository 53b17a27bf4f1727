//! Fitzy
//!
//! An MCP server for calorie intake and exercise tracking.

use std::sync::Arc;

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use fitzy::account::Accounts;
use fitzy::auth::{AuthClient, Session};
use fitzy::build_info;
use fitzy::clock::SystemClock;
use fitzy::config::{BackendConfig, FitzyConfig};
use fitzy::db::{self, Database};
use fitzy::gateway::{HostedStore, LogGateway, NutritionixClient, ProfileGateway, SqliteStore};
use fitzy::mcp::FitzyService;
use fitzy::tracker::Tracker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging goes to stderr so it does not interfere with MCP stdio
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fitzy=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = FitzyConfig::from_env()?;
    eprintln!("Backend: {}", config.backend.name());
    eprintln!("Database path: {}", config.database_path.display());

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    eprintln!("Initializing database...");
    let database = Database::open_migrated(&config.database_path)?;
    let version = database.with_conn(db::migrations::get_schema_version)?;
    eprintln!("Database schema version: {}", version);

    let lookup = Arc::new(NutritionixClient::new(&config.nutritionix)?);

    let log: Arc<dyn LogGateway>;
    let profiles: Arc<dyn ProfileGateway>;
    let auth = match &config.backend {
        BackendConfig::Local { .. } => {
            let store = Arc::new(SqliteStore::new(database.clone()));
            log = store.clone();
            profiles = store;
            None
        }
        BackendConfig::Hosted { base_url, api_key } => {
            let store = Arc::new(HostedStore::new(base_url, api_key)?);
            log = store.clone();
            profiles = store;
            Some(AuthClient::new(base_url, api_key)?)
        }
    };

    let tracker = Arc::new(Tracker::new(log, profiles, lookup, Arc::new(SystemClock)));

    if let BackendConfig::Local { user_id } = &config.backend {
        tracker.set_session(Some(Session::local(user_id.clone()))).await;
        match tracker.load().await {
            Ok(loaded) => eprintln!("Loaded {} entries for '{}'", loaded.entries_loaded, user_id),
            Err(e) => warn!(error = %e, "initial ledger load failed"),
        }
    }

    let accounts = Arc::new(Accounts::new(auth, database));
    let service = FitzyService::new(config.database_path.clone(), config.backend.name(), tracker, accounts);

    let server = service.serve((stdin(), stdout())).await?;
    server.waiting().await?;

    Ok(())
}
