//! Entry model
//!
//! One logged food or exercise record for a calendar day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stored discriminator for log rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Food,
    Exercise,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Food => "food",
            EntryKind::Exercise => "exercise",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "food" => Some(EntryKind::Food),
            "exercise" => Some(EntryKind::Exercise),
            _ => None,
        }
    }
}

/// A consumed food item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub name: String,
    /// Calories per serving
    pub calories: f64,
    pub protein: f64,  // grams
    pub fat: f64,      // grams
    pub carbs: f64,    // grams
    pub serving_qty: f64,
    pub serving_unit: String,
    pub date: NaiveDate,
}

impl FoodEntry {
    /// Calories contributed to the day: per-serving value times servings
    pub fn intake(&self) -> f64 {
        self.calories * self.serving_qty
    }
}

/// A performed exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub name: String,
    /// Calories burned as recorded; never recomputed from duration and MET
    pub calories_burned: f64,
    pub duration_min: f64,
    pub met: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entry {
    Food(FoodEntry),
    Exercise(ExerciseEntry),
}

impl Entry {
    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Food(_) => EntryKind::Food,
            Entry::Exercise(_) => EntryKind::Exercise,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entry::Food(f) => &f.name,
            Entry::Exercise(e) => &e.name,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            Entry::Food(f) => f.date,
            Entry::Exercise(e) => e.date,
        }
    }

    /// Calories taken in by this entry (0 for exercise)
    pub fn intake(&self) -> f64 {
        match self {
            Entry::Food(f) => f.intake(),
            Entry::Exercise(_) => 0.0,
        }
    }

    /// Calories burned by this entry (0 for food)
    pub fn burned(&self) -> f64 {
        match self {
            Entry::Food(_) => 0.0,
            Entry::Exercise(e) => e.calories_burned,
        }
    }

    pub fn as_food(&self) -> Option<&FoodEntry> {
        match self {
            Entry::Food(f) => Some(f),
            Entry::Exercise(_) => None,
        }
    }

    pub fn as_exercise(&self) -> Option<&ExerciseEntry> {
        match self {
            Entry::Food(_) => None,
            Entry::Exercise(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn test_food_intake_scales_by_servings() {
        let entry = Entry::Food(FoodEntry {
            name: "bagel".into(),
            calories: 250.0,
            protein: 10.0,
            fat: 1.5,
            carbs: 48.0,
            serving_qty: 2.0,
            serving_unit: "bagel".into(),
            date: day(),
        });
        assert_eq!(entry.intake(), 500.0);
        assert_eq!(entry.burned(), 0.0);
        assert_eq!(entry.kind(), EntryKind::Food);
    }

    #[test]
    fn test_exercise_burn_is_recorded_value() {
        let entry = Entry::Exercise(ExerciseEntry {
            name: "running".into(),
            calories_burned: 300.0,
            duration_min: 30.0,
            met: 9.8,
            date: day(),
        });
        assert_eq!(entry.burned(), 300.0);
        assert_eq!(entry.intake(), 0.0);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(EntryKind::from_str("food"), Some(EntryKind::Food));
        assert_eq!(EntryKind::from_str(" Exercise "), Some(EntryKind::Exercise));
        assert_eq!(EntryKind::from_str("snack"), None);
    }

    #[test]
    fn test_entry_serializes_with_type_tag() {
        let entry = Entry::Exercise(ExerciseEntry {
            name: "yoga".into(),
            calories_burned: 120.0,
            duration_min: 45.0,
            met: 2.5,
            date: day(),
        });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "exercise");
        assert_eq!(json["date"], "2024-01-10");
    }
}
