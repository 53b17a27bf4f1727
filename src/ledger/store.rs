//! Ledger store
//!
//! In-memory entries for one view session, kept in step with the persisted
//! log by a full reload on `load` and persist-then-insert on `append`.
//!
//! Appends are independent: each entry is persisted in input order, one
//! call at a time. An entry joins the in-memory ledger only after its own
//! persist call succeeds. A failure is recorded and the batch continues;
//! entries already persisted are never rolled back.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::normalizer;
use crate::auth::Session;
use crate::error::FitzyResult;
use crate::gateway::LogGateway;
use crate::models::Entry;

/// An entry whose persist call failed
#[derive(Debug, Serialize)]
pub struct AppendFailure {
    pub entry: Entry,
    pub error: String,
}

/// Outcome of an append batch
#[derive(Debug, Default, Serialize)]
pub struct AppendReport {
    pub appended: Vec<Entry>,
    pub failed: Vec<AppendFailure>,
}

impl AppendReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct LedgerStore {
    gateway: Arc<dyn LogGateway>,
    entries: Vec<Entry>,
}

impl LedgerStore {
    pub fn new(gateway: Arc<dyn LogGateway>) -> Self {
        Self {
            gateway,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace the ledger with the caller's persisted rows.
    ///
    /// On failure the ledger is left empty and the error is returned.
    /// Rows with an unknown type or date are skipped.
    pub async fn load(&mut self, session: &Session) -> FitzyResult<usize> {
        self.entries.clear();

        let rows = self.gateway.list(session).await?;
        let total = rows.len();

        let mut entries = Vec::with_capacity(total);
        for row in &rows {
            match normalizer::from_row(row) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(description = %row.description, error = %e, "skipping log row"),
            }
        }

        sort_newest_first(&mut entries);
        self.entries = entries;

        info!(loaded = self.entries.len(), skipped = total - self.entries.len(), "ledger loaded");
        Ok(self.entries.len())
    }

    /// Persist each entry in order, inserting the ones that were stored
    pub async fn append(&mut self, session: &Session, entries: Vec<Entry>) -> AppendReport {
        let mut report = AppendReport::default();

        for entry in entries {
            let row = normalizer::to_new_row(&entry);
            match self.gateway.append(session, &row).await {
                Ok(()) => {
                    self.entries.push(entry.clone());
                    report.appended.push(entry);
                }
                Err(e) => {
                    warn!(kind = entry.kind().as_str(), name = entry.name(), error = %e, "persist failed");
                    report.failed.push(AppendFailure {
                        entry,
                        error: e.to_string(),
                    });
                }
            }
        }

        sort_newest_first(&mut self.entries);
        report
    }
}

/// Date descending; stable, so same-day entries keep insertion order
fn sort_newest_first(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.date().cmp(&a.date()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FitzyError;
    use crate::gateway::fakes::MemoryLog;
    use crate::ledger::aggregate;
    use crate::models::{ExerciseEntry, FoodEntry};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn food(name: &str, calories: f64, qty: f64, date: NaiveDate) -> Entry {
        Entry::Food(FoodEntry {
            name: name.into(),
            calories,
            protein: 4.0,
            fat: 2.0,
            carbs: 30.0,
            serving_qty: qty,
            serving_unit: "unit".into(),
            date,
        })
    }

    fn exercise(name: &str, calories: f64, date: NaiveDate) -> Entry {
        Entry::Exercise(ExerciseEntry {
            name: name.into(),
            calories_burned: calories,
            duration_min: 40.0,
            met: 8.0,
            date,
        })
    }

    #[tokio::test]
    async fn test_append_persists_in_order_and_sorts_by_date() {
        let log = Arc::new(MemoryLog::default());
        let mut store = LedgerStore::new(log.clone());
        let session = Session::local("u1");

        let report = store
            .append(&session, vec![food("oats", 150.0, 1.0, d(8)), food("apple", 95.0, 1.0, d(10))])
            .await;
        assert!(report.is_complete());

        store.append(&session, vec![exercise("run", 300.0, d(9))]).await;

        assert_eq!(log.appended(), vec!["oats", "apple", "run"]);
        let names: Vec<&str> = store.entries().iter().map(Entry::name).collect();
        assert_eq!(names, vec!["apple", "run", "oats"]);
    }

    #[tokio::test]
    async fn test_same_day_entries_keep_insertion_order() {
        let log = Arc::new(MemoryLog::default());
        let mut store = LedgerStore::new(log);
        let session = Session::local("u1");

        store.append(&session, vec![food("a", 1.0, 1.0, d(10)), food("b", 1.0, 1.0, d(10))]).await;
        store.append(&session, vec![food("c", 1.0, 1.0, d(10))]).await;

        let names: Vec<&str> = store.entries().iter().map(Entry::name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_going_without_rollback() {
        let log = Arc::new(MemoryLog::failing_on("toast"));
        let mut store = LedgerStore::new(log.clone());
        let session = Session::local("u1");

        let report = store
            .append(
                &session,
                vec![
                    food("eggs", 70.0, 2.0, d(10)),
                    food("toast", 75.0, 1.0, d(10)),
                    food("juice", 110.0, 1.0, d(10)),
                ],
            )
            .await;

        assert!(!report.is_complete());
        assert_eq!(report.appended.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].entry.name(), "toast");
        assert_eq!(log.appended(), vec!["eggs", "juice"]);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_reload_reproduces_totals() {
        let log = Arc::new(MemoryLog::default());
        let session = Session::local("u1");

        let mut store = LedgerStore::new(log.clone());
        store
            .append(
                &session,
                vec![food("bagel", 250.0, 2.0, d(10)), exercise("run", 300.0, d(10))],
            )
            .await;
        let before = aggregate::totals(store.entries());

        let mut reloaded = LedgerStore::new(log);
        assert_eq!(reloaded.load(&session).await.unwrap(), 2);
        let after = aggregate::totals(reloaded.entries());

        assert_eq!(before, after);
        assert_eq!(after.total_intake, 500.0);
        assert_eq!(after.net_calories, 200.0);
        assert_eq!(
            aggregate::weekly_trend(store.entries(), d(10), 7),
            aggregate::weekly_trend(reloaded.entries(), d(10), 7)
        );
    }

    #[tokio::test]
    async fn test_unauthorized_load_fails_and_empties_ledger() {
        let mut store = LedgerStore::new(Arc::new(MemoryLog::rejecting_all()));
        let session = Session::local("u1");

        let err = store.load(&session).await.unwrap_err();
        assert!(matches!(err, FitzyError::Unauthorized));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_load_skips_unknown_rows() {
        let log = Arc::new(MemoryLog::default());
        let session = Session::local("u1");
        {
            let mut store = LedgerStore::new(log.clone());
            store.append(&session, vec![food("rice", 200.0, 1.0, d(9))]).await;
        }
        log.rows.lock().unwrap()[0].1.kind = "snack".into();
        log.rows.lock().unwrap().push((
            "u1".into(),
            crate::models::LogRow {
                date: "2024-01-10".into(),
                kind: "exercise".into(),
                description: "walk".into(),
                calories: 120.0,
                protein: None,
                fat: None,
                carbs: None,
                duration: None,
                met: None,
                quantity: None,
                created_at: None,
            },
        ));

        let mut store = LedgerStore::new(log);
        assert_eq!(store.load(&session).await.unwrap(), 1);
        assert_eq!(store.entries()[0].name(), "walk");
    }
}
