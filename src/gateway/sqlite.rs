//! Local SQLite store
//!
//! Persisted log and profiles kept in the local database, scoped by the
//! session's user id.

use async_trait::async_trait;
use tracing::info;

use super::{LogGateway, ProfileGateway};
use crate::auth::Session;
use crate::db::Database;
use crate::error::{FitzyError, FitzyResult};
use crate::models::{CalorieLog, LogRow, NewLogRow, Profile};

#[derive(Clone)]
pub struct SqliteStore {
    database: Database,
}

impl SqliteStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

fn require_user(session: &Session) -> FitzyResult<&str> {
    if session.user_id.trim().is_empty() {
        return Err(FitzyError::Unauthorized);
    }
    Ok(&session.user_id)
}

#[async_trait]
impl LogGateway for SqliteStore {
    async fn list(&self, session: &Session) -> FitzyResult<Vec<LogRow>> {
        let user_id = require_user(session)?;
        let rows = self
            .database
            .with_conn(|conn| CalorieLog::list_for_user(conn, user_id))?;
        Ok(rows)
    }

    async fn append(&self, session: &Session, row: &NewLogRow) -> FitzyResult<()> {
        let user_id = require_user(session)?;
        let id = self
            .database
            .with_conn(|conn| CalorieLog::insert(conn, user_id, row))?;
        info!(id, kind = row.kind.as_str(), "appended local log row");
        Ok(())
    }
}

#[async_trait]
impl ProfileGateway for SqliteStore {
    async fn fetch_profile(&self, session: &Session) -> FitzyResult<Profile> {
        let user_id = require_user(session)?;
        self.database
            .with_conn(|conn| Profile::get(conn, user_id))?
            .ok_or_else(|| {
                FitzyError::validation("No physical profile on record; set one with set_profile first")
            })
    }

    async fn save_profile(&self, session: &Session, profile: &Profile) -> FitzyResult<()> {
        let user_id = require_user(session)?;
        self.database
            .with_conn(|conn| Profile::set(conn, user_id, profile))?;
        Ok(())
    }
}
