//! Entry normalizer
//!
//! Converts lookup results and persisted rows into [`Entry`] values, and
//! entries back into append bodies. Pure transforms.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{FitzyError, FitzyResult};
use crate::models::{
    Entry, EntryKind, ExerciseEntry, ExerciseItem, FoodEntry, FoodItem, LogRow, LookupResult,
    NewLogRow,
};

pub const DEFAULT_DURATION_MIN: f64 = 30.0;
pub const DEFAULT_MET: f64 = 6.0;
pub const DEFAULT_SERVING_QTY: f64 = 1.0;
pub const DEFAULT_SERVING_UNIT: &str = "unit";

pub fn from_food_item(item: FoodItem, date: NaiveDate) -> Entry {
    Entry::Food(FoodEntry {
        name: item.food_name,
        calories: item.nf_calories.unwrap_or(0.0),
        protein: item.nf_protein.unwrap_or(0.0),
        fat: item.nf_total_fat.unwrap_or(0.0),
        carbs: item.nf_total_carbohydrate.unwrap_or(0.0),
        serving_qty: item.serving_qty.unwrap_or(DEFAULT_SERVING_QTY),
        serving_unit: item
            .serving_unit
            .unwrap_or_else(|| DEFAULT_SERVING_UNIT.to_string()),
        date,
    })
}

pub fn from_exercise_item(item: ExerciseItem, date: NaiveDate) -> Entry {
    Entry::Exercise(ExerciseEntry {
        name: item.name,
        calories_burned: item.nf_calories.unwrap_or(0.0),
        duration_min: item.duration_min.unwrap_or(DEFAULT_DURATION_MIN),
        met: item.met.unwrap_or(DEFAULT_MET),
        date,
    })
}

/// Normalize a tagged lookup result, dating it to `date`
pub fn from_lookup(result: LookupResult, date: NaiveDate) -> Entry {
    match result {
        LookupResult::Food(item) => from_food_item(item, date),
        LookupResult::Exercise(item) => from_exercise_item(item, date),
    }
}

/// Normalize a persisted row, substituting defaults for absent optional fields
pub fn from_row(row: &LogRow) -> FitzyResult<Entry> {
    let kind = EntryKind::from_str(&row.kind).ok_or_else(|| {
        FitzyError::validation(format!("Unknown log type '{}'", row.kind))
    })?;
    let date = parse_day(&row.date)?;

    let entry = match kind {
        EntryKind::Food => Entry::Food(FoodEntry {
            name: row.description.clone(),
            calories: row.calories,
            protein: row.protein.unwrap_or(0.0),
            fat: row.fat.unwrap_or(0.0),
            carbs: row.carbs.unwrap_or(0.0),
            serving_qty: row.quantity.unwrap_or(DEFAULT_SERVING_QTY),
            serving_unit: DEFAULT_SERVING_UNIT.to_string(),
            date,
        }),
        EntryKind::Exercise => Entry::Exercise(ExerciseEntry {
            name: row.description.clone(),
            calories_burned: row.calories,
            duration_min: row.duration.unwrap_or(DEFAULT_DURATION_MIN),
            met: row.met.unwrap_or(DEFAULT_MET),
            date,
        }),
    };

    Ok(entry)
}

/// Build the append body for an entry
pub fn to_new_row(entry: &Entry) -> NewLogRow {
    match entry {
        Entry::Food(f) => NewLogRow {
            date: f.date,
            kind: EntryKind::Food,
            description: f.name.clone(),
            calories: f.calories,
            protein: Some(f.protein),
            fat: Some(f.fat),
            carbs: Some(f.carbs),
            duration: None,
            met: None,
            quantity: Some(f.serving_qty),
        },
        Entry::Exercise(e) => NewLogRow {
            date: e.date,
            kind: EntryKind::Exercise,
            description: e.name.clone(),
            calories: e.calories_burned,
            protein: None,
            fat: None,
            carbs: None,
            duration: Some(e.duration_min),
            met: Some(e.met),
            quantity: None,
        },
    }
}

/// Truncate a stored date or timestamp to its calendar day
pub fn parse_day(raw: &str) -> FitzyResult<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts.date());
        }
    }
    Err(FitzyError::validation(format!("Unrecognized log date '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    fn bare_row(kind: &str) -> LogRow {
        LogRow {
            date: "2024-01-10".into(),
            kind: kind.into(),
            description: "thing".into(),
            calories: 200.0,
            protein: None,
            fat: None,
            carbs: None,
            duration: None,
            met: None,
            quantity: None,
            created_at: None,
        }
    }

    #[test]
    fn test_food_row_defaults_missing_nutrients_to_zero() {
        let entry = from_row(&bare_row("food")).unwrap();
        let food = entry.as_food().unwrap();
        assert_eq!(food.protein, 0.0);
        assert_eq!(food.fat, 0.0);
        assert_eq!(food.carbs, 0.0);
        assert_eq!(food.serving_qty, 1.0);
        assert_eq!(food.serving_unit, "unit");
        assert_eq!(food.date, day());
    }

    #[test]
    fn test_exercise_row_defaults_duration_and_met() {
        let entry = from_row(&bare_row("exercise")).unwrap();
        let exercise = entry.as_exercise().unwrap();
        assert_eq!(exercise.duration_min, 30.0);
        assert_eq!(exercise.met, 6.0);
        assert_eq!(exercise.calories_burned, 200.0);
    }

    #[test]
    fn test_unknown_row_type_is_rejected() {
        assert!(matches!(from_row(&bare_row("snack")), Err(FitzyError::Validation(_))));
    }

    #[test]
    fn test_row_timestamp_is_truncated_to_day() {
        let mut row = bare_row("food");
        row.date = "2024-01-10T23:15:00+00:00".into();
        assert_eq!(from_row(&row).unwrap().date(), day());

        row.date = "2024-01-10 06:00:00".into();
        assert_eq!(from_row(&row).unwrap().date(), day());

        row.date = "last tuesday".into();
        assert!(from_row(&row).is_err());
    }

    #[test]
    fn test_lookup_food_defaults() {
        let item = FoodItem {
            food_name: "toast".into(),
            nf_calories: Some(75.0),
            nf_protein: None,
            nf_total_fat: Some(1.0),
            nf_total_carbohydrate: None,
            serving_qty: None,
            serving_unit: None,
        };
        let entry = from_lookup(LookupResult::Food(item), day());
        let food = entry.as_food().unwrap();
        assert_eq!(food.protein, 0.0);
        assert_eq!(food.serving_qty, 1.0);
        assert_eq!(food.intake(), 75.0);
    }

    #[test]
    fn test_row_round_trip_keeps_captured_fields() {
        let entry = from_exercise_item(
            ExerciseItem {
                name: "cycling".into(),
                nf_calories: Some(410.0),
                duration_min: Some(45.0),
                met: Some(7.5),
            },
            day(),
        );
        let new_row = to_new_row(&entry);
        assert_eq!(new_row.kind, EntryKind::Exercise);
        assert_eq!(new_row.protein, None);

        let stored = LogRow {
            date: new_row.date.to_string(),
            kind: new_row.kind.as_str().into(),
            description: new_row.description.clone(),
            calories: new_row.calories,
            protein: new_row.protein,
            fat: new_row.fat,
            carbs: new_row.carbs,
            duration: new_row.duration,
            met: new_row.met,
            quantity: new_row.quantity,
            created_at: None,
        };
        assert_eq!(from_row(&stored).unwrap(), entry);
    }
}
