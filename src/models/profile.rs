//! Profile model
//!
//! Physical attributes sent along with exercise lookups, plus the pending
//! copy held between registration and first sign-in.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Physical profile of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub gender: Gender,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
}

impl Profile {
    fn from_row(row: &Row) -> rusqlite::Result<(String, f64, f64, u32)> {
        Ok((
            row.get("gender")?,
            row.get("weight_kg")?,
            row.get("height_cm")?,
            row.get("age")?,
        ))
    }

    fn from_parts((gender, weight_kg, height_cm, age): (String, f64, f64, u32)) -> DbResult<Self> {
        let gender = Gender::from_str(&gender).ok_or(DbError::InvalidValue {
            column: "gender",
            value: gender,
        })?;
        Ok(Self {
            gender,
            weight_kg,
            height_cm,
            age,
        })
    }

    /// Reject values the lookup API cannot use
    pub fn validate(&self) -> Result<(), String> {
        if !(self.weight_kg > 0.0) {
            return Err(format!("weight_kg must be positive, got {}", self.weight_kg));
        }
        if !(self.height_cm > 0.0) {
            return Err(format!("height_cm must be positive, got {}", self.height_cm));
        }
        if self.age == 0 || self.age > 130 {
            return Err(format!("age must be between 1 and 130, got {}", self.age));
        }
        Ok(())
    }

    /// Get the profile stored for a user
    pub fn get(conn: &Connection, user_id: &str) -> DbResult<Option<Self>> {
        let parts = conn
            .query_row(
                "SELECT gender, weight_kg, height_cm, age FROM profiles WHERE user_id = ?1",
                [user_id],
                Self::from_row,
            )
            .optional()?;

        parts.map(Self::from_parts).transpose()
    }

    /// Set or update the profile for a user (upsert)
    pub fn set(conn: &Connection, user_id: &str, profile: &Profile) -> DbResult<()> {
        conn.execute(
            r#"
            INSERT INTO profiles (user_id, gender, weight_kg, height_cm, age)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(user_id) DO UPDATE SET
                gender = excluded.gender,
                weight_kg = excluded.weight_kg,
                height_cm = excluded.height_cm,
                age = excluded.age,
                updated_at = datetime('now')
            "#,
            params![
                user_id,
                profile.gender.as_str(),
                profile.weight_kg,
                profile.height_cm,
                profile.age,
            ],
        )?;
        Ok(())
    }
}

/// Profile captured at registration, keyed by email
pub struct PendingProfile;

impl PendingProfile {
    pub fn save(conn: &Connection, email: &str, profile: &Profile) -> DbResult<()> {
        conn.execute(
            r#"
            INSERT INTO pending_profiles (email, gender, weight_kg, height_cm, age)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(email) DO UPDATE SET
                gender = excluded.gender,
                weight_kg = excluded.weight_kg,
                height_cm = excluded.height_cm,
                age = excluded.age
            "#,
            params![
                normalize_email(email),
                profile.gender.as_str(),
                profile.weight_kg,
                profile.height_cm,
                profile.age,
            ],
        )?;
        Ok(())
    }

    pub fn get(conn: &Connection, email: &str) -> DbResult<Option<Profile>> {
        let parts = conn
            .query_row(
                "SELECT gender, weight_kg, height_cm, age FROM pending_profiles WHERE email = ?1",
                [normalize_email(email)],
                Profile::from_row,
            )
            .optional()?;

        parts.map(Profile::from_parts).transpose()
    }

    pub fn delete(conn: &Connection, email: &str) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM pending_profiles WHERE email = ?1",
            [normalize_email(email)],
        )?;
        Ok(rows > 0)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
