//! Print the seven-day energy balance for a local user
//! Usage: cargo run --bin weekly_report -- [user] [output.pdf]

use std::path::PathBuf;
use std::sync::Arc;

use fitzy::auth::Session;
use fitzy::clock::{Clock, SystemClock};
use fitzy::config::{default_database_path, DEFAULT_LOCAL_USER};
use fitzy::db::Database;
use fitzy::gateway::SqliteStore;
use fitzy::ledger::{aggregate, LedgerStore, TREND_DAYS};
use fitzy::tools::reports;
use fitzy::view;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let user_id = args.first().map(String::as_str).unwrap_or(DEFAULT_LOCAL_USER);
    let output = args.get(1);

    let db_path = std::env::var("FITZY_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_database_path());
    println!("Database: {}", db_path.display());

    let database = Database::open_migrated(&db_path)?;
    let mut ledger = LedgerStore::new(Arc::new(SqliteStore::new(database)));
    let loaded = ledger.load(&Session::local(user_id)).await?;
    println!("Loaded {} entries for '{}'", loaded, user_id);

    let today = SystemClock.today();
    for point in view::trend(ledger.entries(), today, TREND_DAYS) {
        println!(
            "  {:<12} intake {:>7.0}  burned {:>7.0}  net {:>+7.0}  {}",
            point.label, point.intake, point.burned, point.net, point.caption
        );
    }

    let totals = aggregate::totals(ledger.entries());
    println!(
        "All time: {:.0} kcal in, {:.0} kcal out, net {:+.0} kcal",
        totals.total_intake, totals.total_burned, totals.net_calories
    );

    if let Some(path) = output {
        let report = reports::generate_weekly_report(ledger.entries(), today, TREND_DAYS, path)?;
        println!("{}", report.message);
    }

    Ok(())
}
