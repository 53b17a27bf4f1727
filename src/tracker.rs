//! Tracker session
//!
//! One view session: the signed-in caller, their ledger, and the gateways
//! the dashboard actions go through. Lookup, normalize, persist, append,
//! then the aggregates are recomputed on the next read.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::auth::Session;
use crate::clock::Clock;
use crate::error::{FitzyError, FitzyResult};
use crate::gateway::{LogGateway, LookupGateway, ProfileGateway};
use crate::ledger::{normalizer, AppendReport, LedgerStore};
use crate::models::{Entry, EntryKind, LookupResult, Profile};
use crate::view::{self, Dashboard, Summary, Tab, TrendPoint};

pub const SUBMISSION_PENDING: &str = "A submission is already in progress";

#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub user_id: String,
    pub entries_loaded: usize,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub kind: EntryKind,
    pub query: String,
    pub matched: usize,
    #[serde(flatten)]
    pub report: AppendReport,
}

pub struct Tracker {
    session: RwLock<Option<Session>>,
    ledger: Mutex<LedgerStore>,
    /// Held for the whole of a submission
    submitting: Mutex<()>,
    profiles: Arc<dyn ProfileGateway>,
    lookup: Arc<dyn LookupGateway>,
    clock: Arc<dyn Clock>,
}

impl Tracker {
    pub fn new(
        log: Arc<dyn LogGateway>,
        profiles: Arc<dyn ProfileGateway>,
        lookup: Arc<dyn LookupGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            session: RwLock::new(None),
            ledger: Mutex::new(LedgerStore::new(log)),
            submitting: Mutex::new(()),
            profiles,
            lookup,
            clock,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Replace the session; the ledger of the previous caller is dropped
    pub async fn set_session(&self, session: Option<Session>) {
        let mut ledger = self.ledger.lock().await;
        ledger.clear();
        *self.session.write().await = session;
    }

    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    async fn require_session(&self) -> FitzyResult<Session> {
        self.session().await.ok_or(FitzyError::Unauthorized)
    }

    /// Reload the ledger from the persisted log
    pub async fn load(&self) -> FitzyResult<LoadResponse> {
        let mut ledger = self.ledger.lock().await;
        let session = match self.require_session().await {
            Ok(session) => session,
            Err(e) => {
                ledger.clear();
                return Err(e);
            }
        };

        let entries_loaded = ledger.load(&session).await?;
        Ok(LoadResponse {
            user_id: session.user_id,
            entries_loaded,
        })
    }

    /// Look up a free-text description and log every match for today.
    ///
    /// Fails fast while another submission is pending.
    pub async fn submit(&self, kind: EntryKind, query: &str) -> FitzyResult<SubmitResponse> {
        let _pending = self
            .submitting
            .try_lock()
            .map_err(|_| FitzyError::validation(SUBMISSION_PENDING))?;
        let session = self.require_session().await?;

        let query = query.trim();
        if query.is_empty() {
            return Err(FitzyError::validation("Describe what you ate or did, e.g. '2 eggs and toast'"));
        }

        let results: Vec<LookupResult> = match kind {
            EntryKind::Food => self
                .lookup
                .search_foods(query)
                .await?
                .into_iter()
                .map(LookupResult::Food)
                .collect(),
            EntryKind::Exercise => {
                let profile = self.profiles.fetch_profile(&session).await?;
                self.lookup
                    .search_exercises(query, &profile)
                    .await?
                    .into_iter()
                    .map(LookupResult::Exercise)
                    .collect()
            }
        };

        let today = self.clock.today();
        let entries: Vec<Entry> = results
            .into_iter()
            .map(|r| normalizer::from_lookup(r, today))
            .collect();
        let matched = entries.len();

        let report = self.ledger.lock().await.append(&session, entries).await;
        info!(
            kind = kind.as_str(),
            matched,
            appended = report.appended.len(),
            failed = report.failed.len(),
            "submission finished"
        );

        Ok(SubmitResponse {
            kind,
            query: query.to_string(),
            matched,
            report,
        })
    }

    pub async fn entries(&self) -> Vec<Entry> {
        self.ledger.lock().await.entries().to_vec()
    }

    pub async fn ledger_len(&self) -> usize {
        self.ledger.lock().await.len()
    }

    pub async fn dashboard(&self, tab: Tab) -> Dashboard {
        let ledger = self.ledger.lock().await;
        view::dashboard(ledger.entries(), tab, self.clock.today())
    }

    pub async fn summary(&self) -> Summary {
        let ledger = self.ledger.lock().await;
        view::summary(ledger.entries())
    }

    pub async fn trend(&self, days: usize) -> Vec<TrendPoint> {
        let ledger = self.ledger.lock().await;
        view::trend(ledger.entries(), self.clock.today(), days)
    }

    pub async fn profile(&self) -> FitzyResult<Profile> {
        let session = self.require_session().await?;
        self.profiles.fetch_profile(&session).await
    }

    pub async fn set_profile(&self, profile: &Profile) -> FitzyResult<()> {
        profile.validate().map_err(FitzyError::Validation)?;
        let session = self.require_session().await?;
        self.profiles.save_profile(&session, profile).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::clock::FixedClock;
    use crate::gateway::fakes::{MemoryLog, MemoryProfiles};
    use crate::models::{ExerciseItem, FoodItem, Gender};

    #[derive(Default)]
    pub struct FakeLookup {
        pub foods: Vec<FoodItem>,
        pub exercises: Vec<ExerciseItem>,
        pub calls: AtomicUsize,
        pub seen_profile: StdMutex<Option<Profile>>,
        /// (entered, release) pair that holds a food search open
        pub gate: Option<(Arc<Notify>, Arc<Notify>)>,
    }

    #[async_trait]
    impl LookupGateway for FakeLookup {
        async fn search_foods(&self, _query: &str) -> FitzyResult<Vec<FoodItem>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some((entered, release)) = &self.gate {
                entered.notify_one();
                release.notified().await;
            }
            Ok(self.foods.clone())
        }

        async fn search_exercises(&self, _query: &str, profile: &Profile) -> FitzyResult<Vec<ExerciseItem>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_profile.lock().unwrap() = Some(profile.clone());
            Ok(self.exercises.clone())
        }
    }

    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    pub fn bagel() -> FoodItem {
        FoodItem {
            food_name: "bagel".into(),
            nf_calories: Some(250.0),
            nf_protein: Some(10.0),
            nf_total_fat: Some(1.5),
            nf_total_carbohydrate: Some(48.0),
            serving_qty: Some(2.0),
            serving_unit: Some("bagel".into()),
        }
    }

    pub fn running() -> ExerciseItem {
        ExerciseItem {
            name: "running".into(),
            nf_calories: Some(300.0),
            duration_min: Some(30.0),
            met: Some(9.8),
        }
    }

    pub fn tracker_with(lookup: Arc<FakeLookup>, log: Arc<MemoryLog>, profiles: Arc<MemoryProfiles>) -> Tracker {
        Tracker::new(log, profiles, lookup, Arc::new(FixedClock(today())))
    }

    fn default_tracker(lookup: FakeLookup) -> Tracker {
        tracker_with(
            Arc::new(lookup),
            Arc::new(MemoryLog::default()),
            Arc::new(MemoryProfiles::default()),
        )
    }

    #[tokio::test]
    async fn test_no_session_is_unauthorized() {
        let tracker = default_tracker(FakeLookup::default());

        assert!(matches!(tracker.load().await, Err(FitzyError::Unauthorized)));
        assert!(matches!(
            tracker.submit(EntryKind::Food, "apple").await,
            Err(FitzyError::Unauthorized)
        ));
        assert!(matches!(tracker.profile().await, Err(FitzyError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_food_submission_flows_to_aggregates() {
        let lookup = Arc::new(FakeLookup {
            foods: vec![bagel()],
            exercises: vec![running()],
            ..FakeLookup::default()
        });
        let log = Arc::new(MemoryLog::default());
        let profiles = Arc::new(MemoryProfiles::default());
        let tracker = tracker_with(lookup, log.clone(), profiles);
        tracker.set_session(Some(Session::local("u1"))).await;

        tracker
            .set_profile(&Profile {
                gender: Gender::Male,
                weight_kg: 80.0,
                height_cm: 180.0,
                age: 30,
            })
            .await
            .unwrap();

        let food = tracker.submit(EntryKind::Food, "2 bagels").await.unwrap();
        assert_eq!(food.matched, 1);
        assert_eq!(food.report.appended[0].date(), today());

        tracker.submit(EntryKind::Exercise, "30 min run").await.unwrap();

        let summary = tracker.summary().await;
        assert_eq!(summary.totals.total_intake, 500.0);
        assert_eq!(summary.totals.total_burned, 300.0);
        assert_eq!(summary.net_calories, 200.0);

        let trend = tracker.trend(7).await;
        assert_eq!(trend.iter().map(|p| p.net).collect::<Vec<_>>(), vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 200.0]);
        assert_eq!(log.appended(), vec!["bagel", "running"]);
    }

    #[tokio::test]
    async fn test_exercise_needs_profile() {
        let lookup = Arc::new(FakeLookup {
            exercises: vec![running()],
            ..FakeLookup::default()
        });
        let profiles = Arc::new(MemoryProfiles::default());
        let tracker = tracker_with(lookup.clone(), Arc::new(MemoryLog::default()), profiles.clone());
        tracker.set_session(Some(Session::local("u1"))).await;

        let err = tracker.submit(EntryKind::Exercise, "yoga").await.unwrap_err();
        assert!(matches!(err, FitzyError::Validation(_)));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);

        let profile = Profile {
            gender: Gender::Female,
            weight_kg: 60.0,
            height_cm: 165.0,
            age: 25,
        };
        tracker.set_profile(&profile).await.unwrap();
        tracker.submit(EntryKind::Exercise, "yoga").await.unwrap();
        assert_eq!(lookup.seen_profile.lock().unwrap().clone(), Some(profile));
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected_without_lookup() {
        let lookup = Arc::new(FakeLookup::default());
        let tracker = tracker_with(lookup.clone(), Arc::new(MemoryLog::default()), Arc::new(MemoryProfiles::default()));
        tracker.set_session(Some(Session::local("u1"))).await;

        let err = tracker.submit(EntryKind::Food, "   ").await.unwrap_err();
        assert!(matches!(err, FitzyError::Validation(_)));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_submission_while_pending_is_refused() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let lookup = Arc::new(FakeLookup {
            foods: vec![bagel()],
            gate: Some((entered.clone(), release.clone())),
            ..FakeLookup::default()
        });
        let tracker = Arc::new(tracker_with(
            lookup.clone(),
            Arc::new(MemoryLog::default()),
            Arc::new(MemoryProfiles::default()),
        ));
        tracker.set_session(Some(Session::local("u1"))).await;

        let first = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.submit(EntryKind::Food, "bagel").await })
        };
        entered.notified().await;

        let err = tracker.submit(EntryKind::Food, "bagel").await.unwrap_err();
        assert_eq!(err.to_string(), SUBMISSION_PENDING);

        release.notify_one();
        let report = first.await.unwrap().unwrap();
        assert_eq!(report.report.appended.len(), 1);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.ledger_len().await, 1);
    }

    #[tokio::test]
    async fn test_reader_holding_ledger_does_not_block_submission() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let lookup = Arc::new(FakeLookup {
            foods: vec![bagel()],
            gate: Some((entered.clone(), release.clone())),
            ..FakeLookup::default()
        });
        let tracker = Arc::new(tracker_with(
            lookup,
            Arc::new(MemoryLog::default()),
            Arc::new(MemoryProfiles::default()),
        ));
        tracker.set_session(Some(Session::local("u1"))).await;

        // Stands in for a summary or status read in flight
        let reading = tracker.ledger.lock().await;
        let submission = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.submit(EntryKind::Food, "bagel").await })
        };
        tokio::time::timeout(std::time::Duration::from_secs(5), entered.notified())
            .await
            .expect("submission should reach the lookup while the ledger is read");

        release.notify_one();
        drop(reading);

        let report = submission.await.unwrap().unwrap();
        assert_eq!(report.report.appended.len(), 1);
        assert_eq!(tracker.ledger_len().await, 1);
    }

    #[tokio::test]
    async fn test_sign_out_clears_ledger_and_reload_restores_it() {
        let lookup = Arc::new(FakeLookup {
            foods: vec![bagel()],
            ..FakeLookup::default()
        });
        let log = Arc::new(MemoryLog::default());
        let tracker = tracker_with(lookup, log, Arc::new(MemoryProfiles::default()));

        tracker.set_session(Some(Session::local("u1"))).await;
        tracker.submit(EntryKind::Food, "bagel").await.unwrap();
        let before = tracker.summary().await.totals;

        tracker.set_session(None).await;
        assert_eq!(tracker.ledger_len().await, 0);

        tracker.set_session(Some(Session::local("u1"))).await;
        let loaded = tracker.load().await.unwrap();
        assert_eq!(loaded.entries_loaded, 1);
        assert_eq!(tracker.summary().await.totals, before);
    }

    #[tokio::test]
    async fn test_invalid_profile_is_rejected() {
        let tracker = default_tracker(FakeLookup::default());
        tracker.set_session(Some(Session::local("u1"))).await;
        let err = tracker
            .set_profile(&Profile {
                gender: Gender::Male,
                weight_kg: -3.0,
                height_cm: 180.0,
                age: 30,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FitzyError::Validation(_)));
    }
}
