//! Calorie log rows
//!
//! The persisted shape of an entry, shared by the local SQLite store and
//! the hosted database API.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Deserializer, Serialize};

use crate::db::DbResult;
use super::EntryKind;

/// A stored log row as returned by a list call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRow {
    /// Calendar day or full timestamp, as stored
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub calories: f64,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub met: Option<f64>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A stored `null` reads the same as a missing column
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of an append call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLogRow {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub description: String,
    pub calories: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub met: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
}

/// Local table access for `calorie_logs`
pub struct CalorieLog;

impl CalorieLog {
    fn from_row(row: &Row) -> rusqlite::Result<LogRow> {
        Ok(LogRow {
            date: row.get("date")?,
            kind: row.get("type")?,
            description: row.get("description")?,
            calories: row.get("calories")?,
            protein: row.get("protein")?,
            fat: row.get("fat")?,
            carbs: row.get("carbs")?,
            duration: row.get("duration")?,
            met: row.get("met")?,
            quantity: row.get("quantity")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Append one row for a user, returning its id
    pub fn insert(conn: &Connection, user_id: &str, data: &NewLogRow) -> DbResult<i64> {
        conn.execute(
            r#"
            INSERT INTO calorie_logs (
                user_id, date, type, description, calories,
                protein, fat, carbs, duration, met, quantity
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                user_id,
                data.date.format("%Y-%m-%d").to_string(),
                data.kind.as_str(),
                data.description,
                data.calories,
                data.protein,
                data.fat,
                data.carbs,
                data.duration,
                data.met,
                data.quantity,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// All rows for a user, newest first
    pub fn list_for_user(conn: &Connection, user_id: &str) -> DbResult<Vec<LogRow>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM calorie_logs WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
        )?;

        let rows = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
