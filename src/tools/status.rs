//! Fitzy Status Tool
//!
//! Provides runtime status information about the Fitzy service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Usage instructions for AI assistants
pub const TRACKER_INSTRUCTIONS: &str = r#"
# Fitzy Calorie Tracking Instructions

Fitzy keeps a ledger of food eaten and exercise performed, and reports the
energy balance: calories consumed minus calories burned.

## Signing In

- **Local backend:** the local user is signed in automatically. Skip
  `register` and `sign_in`.
- **Hosted backend:** call `sign_in(email, password)` first. New users call
  `register(email, password, gender, weight_kg, height_cm, age)`, confirm the
  email they receive, then sign in. The profile given at registration is
  applied on the first sign-in.

If sign-in answers "Please verify your email before signing in.", the user
has not clicked the confirmation link yet.

## Logging

Describe what happened in plain language. Every matched item is logged for
today's date.

```
add_food(query: "2 eggs and a slice of toast")
add_exercise(query: "ran 30 minutes")
```

- `add_exercise` needs a physical profile (gender, weight, height, age).
  Set it once with `set_profile`.
- Only one submission runs at a time. A second call while one is pending is
  refused; retry after the first returns.
- The response lists `appended` and `failed` entries. Failed entries were
  not saved and are not in the ledger; submit them again if needed.

## Reading the Ledger

| Task | Tool |
|------|------|
| Reload from storage | `load_ledger` |
| Dashboard (tab: food, exercise, trend) | `get_dashboard` |
| Totals and net balance | `get_summary` |
| Net per day, last 7 days | `get_weekly_trend` |
| Trend chart PNG | `export_trend_chart` |
| Weekly PDF report | `generate_weekly_report` |

## Reading the Numbers

- Food intake = calories per serving x servings.
- Net = intake - burned. Positive means a surplus ("You gained N kcal"),
  negative a deficit ("You burned N kcal").
- A trend day with no entries shows "No data".
"#;

/// Runtime status of the Fitzy service
#[derive(Debug, Clone, Serialize)]
pub struct FitzyStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Session information
    pub backend: &'static str,
    pub signed_in_user: Option<String>,
    pub ledger_entries: usize,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Collects runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    backend: &'static str,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, backend: &'static str) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            backend,
        }
    }

    /// Snapshot the process; session fields come from the caller
    pub fn get_status(&self, signed_in_user: Option<String>, ledger_entries: usize) -> FitzyStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));
        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        FitzyStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            backend: self.backend,
            signed_in_user,
            ledger_entries,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
