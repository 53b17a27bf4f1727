//! Account flow
//!
//! Registration and sign-in against the hosted auth API. A profile given
//! at registration is parked locally until the first successful sign-in,
//! when it is written through the profile gateway.

use serde::Serialize;
use tracing::{info, warn};

use crate::auth::{AuthClient, RegistrationOutcome};
use crate::db::Database;
use crate::error::{FitzyError, FitzyResult};
use crate::models::{PendingProfile, Profile};
use crate::tracker::Tracker;

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub user_id: String,
    pub email: Option<String>,
    pub profile_applied: bool,
    pub entries_loaded: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
}

pub struct Accounts {
    auth: Option<AuthClient>,
    database: Database,
}

impl Accounts {
    /// `auth` is `None` for the local backend, where the session is implicit
    pub fn new(auth: Option<AuthClient>, database: Database) -> Self {
        Self { auth, database }
    }

    fn auth(&self) -> FitzyResult<&AuthClient> {
        self.auth.as_ref().ok_or_else(|| {
            FitzyError::validation(
                "Accounts are not used with the local backend; the local user is always signed in",
            )
        })
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        profile: Option<Profile>,
    ) -> FitzyResult<RegistrationOutcome> {
        let auth = self.auth()?;
        if let Some(profile) = &profile {
            profile.validate().map_err(FitzyError::Validation)?;
        }

        let outcome = auth.sign_up(email, password).await?;

        if let Some(profile) = profile {
            self.database
                .with_conn(|conn| PendingProfile::save(conn, &outcome.email, &profile))?;
            info!("stored pending profile until first sign-in");
        }

        Ok(outcome)
    }

    /// Sign in, apply any pending profile, then load the ledger
    pub async fn sign_in(&self, tracker: &Tracker, email: &str, password: &str) -> FitzyResult<SignInResponse> {
        let session = self.auth()?.sign_in(email, password).await?;
        tracker.set_session(Some(session.clone())).await;

        let key = session.email.clone().unwrap_or_else(|| email.to_string());
        let pending = self.database.with_conn(|conn| PendingProfile::get(conn, &key))?;
        let mut profile_applied = false;
        if let Some(profile) = pending {
            match tracker.set_profile(&profile).await {
                Ok(()) => {
                    self.database.with_conn(|conn| PendingProfile::delete(conn, &key))?;
                    profile_applied = true;
                }
                // Kept for the next sign-in
                Err(e) => warn!(error = %e, "could not apply pending profile"),
            }
        }

        let (entries_loaded, load_error) = match tracker.load().await {
            Ok(loaded) => (loaded.entries_loaded, None),
            Err(e) => (0, Some(e.to_string())),
        };

        Ok(SignInResponse {
            user_id: session.user_id,
            email: session.email,
            profile_applied,
            entries_loaded,
            load_error,
        })
    }

    /// Drop the session and its ledger
    pub async fn sign_out(&self, tracker: &Tracker) -> FitzyResult<()> {
        self.auth()?;
        tracker.set_session(None).await;
        info!("signed out");
        Ok(())
    }
}
