//! Hosted database gateway
//!
//! Persisted log and profiles behind the hosted database's REST API. Each
//! call carries the project API key and the session's bearer token; row
//! filtering by user happens server-side.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use super::{check_response, http_client, LogGateway, ProfileGateway};
use crate::auth::Session;
use crate::error::{FitzyError, FitzyResult};
use crate::models::{LogRow, NewLogRow, Profile};

#[derive(Clone)]
pub struct HostedStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct OwnedRow<'a> {
    user_id: &'a str,
    #[serde(flatten)]
    row: &'a NewLogRow,
}

#[derive(Serialize)]
struct ProfileRow<'a> {
    id: &'a str,
    #[serde(flatten)]
    profile: &'a Profile,
}

impl HostedStore {
    pub fn new(base_url: &str, api_key: &str) -> FitzyResult<Self> {
        Ok(Self {
            http: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn table(&self, name: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, name)
    }

    fn authorized(&self, request: reqwest::RequestBuilder, session: &Session) -> FitzyResult<reqwest::RequestBuilder> {
        if session.access_token.is_empty() {
            return Err(FitzyError::Unauthorized);
        }
        Ok(request
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token))
    }
}

#[async_trait]
impl LogGateway for HostedStore {
    async fn list(&self, session: &Session) -> FitzyResult<Vec<LogRow>> {
        let user_filter = format!("eq.{}", session.user_id);
        let request = self.http.get(self.table("calories")).query(&[
            ("select", "*"),
            ("user_id", user_filter.as_str()),
            ("order", "created_at.desc"),
        ]);

        let response = self.authorized(request, session)?.send().await?;
        let rows: Vec<LogRow> = check_response(response).await?.json().await?;

        info!(rows = rows.len(), "listed hosted log");
        Ok(rows)
    }

    async fn append(&self, session: &Session, row: &NewLogRow) -> FitzyResult<()> {
        let body = [OwnedRow {
            user_id: &session.user_id,
            row,
        }];
        let request = self
            .http
            .post(self.table("calories"))
            .header("Prefer", "return=minimal")
            .json(&body);

        let response = self.authorized(request, session)?.send().await?;
        check_response(response).await?;

        info!(kind = row.kind.as_str(), "appended hosted log row");
        Ok(())
    }
}

#[async_trait]
impl ProfileGateway for HostedStore {
    async fn fetch_profile(&self, session: &Session) -> FitzyResult<Profile> {
        let id_filter = format!("eq.{}", session.user_id);
        let request = self.http.get(self.table("profiles")).query(&[
            ("select", "gender,weight_kg,height_cm,age"),
            ("id", id_filter.as_str()),
        ]);

        let response = self.authorized(request, session)?.send().await?;
        let profiles: Vec<Profile> = check_response(response).await?.json().await?;

        profiles.into_iter().next().ok_or_else(|| {
            FitzyError::validation("No physical profile on record; set one with set_profile first")
        })
    }

    async fn save_profile(&self, session: &Session, profile: &Profile) -> FitzyResult<()> {
        let body = [ProfileRow {
            id: &session.user_id,
            profile,
        }];
        let request = self
            .http
            .post(self.table("profiles"))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&body);

        let response = self.authorized(request, session)?.send().await?;
        check_response(response).await?;
        Ok(())
    }
}
