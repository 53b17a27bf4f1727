//! Aggregates over a ledger
//!
//! Pure functions: the same entries and the same `today` always give the
//! same output.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::models::Entry;

pub const TREND_DAYS: usize = 7;

/// Sum of calories × servings over food entries
pub fn total_intake(entries: &[Entry]) -> f64 {
    entries.iter().map(Entry::intake).sum()
}

/// Sum of recorded calories burned over exercise entries
pub fn total_burned(entries: &[Entry]) -> f64 {
    entries.iter().map(Entry::burned).sum()
}

pub fn net_calories(entries: &[Entry]) -> f64 {
    total_intake(entries) - total_burned(entries)
}

/// Intake, burn and net for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayBalance {
    pub date: NaiveDate,
    pub intake: f64,
    pub burned: f64,
    pub net: f64,
}

pub fn day_balance(entries: &[Entry], date: NaiveDate) -> DayBalance {
    let (intake, burned) = entries
        .iter()
        .filter(|e| e.date() == date)
        .fold((0.0, 0.0), |(intake, burned), e| {
            (intake + e.intake(), burned + e.burned())
        });

    DayBalance {
        date,
        intake,
        burned,
        net: intake - burned,
    }
}

/// The `days` calendar days ending with `today`, oldest first
pub fn trailing_days(today: NaiveDate, days: usize) -> Vec<NaiveDate> {
    (0..days)
        .rev()
        .map(|back| today - Duration::days(back as i64))
        .collect()
}

/// Per-day balances for the trailing window, oldest first
pub fn daily_balances(entries: &[Entry], today: NaiveDate, days: usize) -> Vec<DayBalance> {
    trailing_days(today, days)
        .into_iter()
        .map(|date| day_balance(entries, date))
        .collect()
}

/// Net calories for each of the last `days` days, oldest first; 0 for days without entries
pub fn weekly_trend(entries: &[Entry], today: NaiveDate, days: usize) -> Vec<f64> {
    daily_balances(entries, today, days)
        .into_iter()
        .map(|b| b.net)
        .collect()
}

/// Cumulative totals over the whole ledger
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub total_intake: f64,
    pub total_burned: f64,
    pub net_calories: f64,
    pub food_entries: usize,
    pub exercise_entries: usize,
}

pub fn totals(entries: &[Entry]) -> Totals {
    let total_intake = total_intake(entries);
    let total_burned = total_burned(entries);
    let food_entries = entries.iter().filter(|e| e.as_food().is_some()).count();

    Totals {
        total_intake,
        total_burned,
        net_calories: total_intake - total_burned,
        food_entries,
        exercise_entries: entries.len() - food_entries,
    }
}
