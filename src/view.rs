//! Dashboard view model
//!
//! What the tracker dashboard shows: tabs, summary bars, entry cards and
//! the weekly trend, derived from the ledger aggregates.

use chrono::NaiveDate;
use serde::Serialize;

use crate::ledger::{aggregate, DayBalance, Totals};
use crate::models::Entry;

pub const CONSUMED_BAR_MAX: f64 = 2000.0;
pub const BURNED_BAR_MAX: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Food,
    Exercise,
    Trend,
}

impl Tab {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "food" => Some(Tab::Food),
            "exercise" => Some(Tab::Exercise),
            "trend" => Some(Tab::Trend),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryBar {
    pub label: &'static str,
    pub value: f64,
    pub max: f64,
    /// Fill width, capped at 100
    pub fill_percent: f64,
}

impl SummaryBar {
    pub fn new(label: &'static str, value: f64, max: f64) -> Self {
        let fill_percent = if max > 0.0 {
            (value * 100.0 / max).clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            label,
            value,
            max,
            fill_percent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub consumed: SummaryBar,
    pub burned: SummaryBar,
    pub net_calories: f64,
    /// Signed display form, e.g. "+200 kcal"
    pub net_display: String,
    pub direction: Direction,
    pub totals: Totals,
}

pub fn summary(entries: &[Entry]) -> Summary {
    let totals = aggregate::totals(entries);
    let net = totals.net_calories;

    Summary {
        consumed: SummaryBar::new("Calories Consumed", totals.total_intake, CONSUMED_BAR_MAX),
        burned: SummaryBar::new("Calories Burned", totals.total_burned, BURNED_BAR_MAX),
        net_calories: net,
        net_display: format!("{}{} kcal", if net >= 0.0 { "+" } else { "" }, fmt_kcal(net)),
        direction: if net >= 0.0 { Direction::Up } else { Direction::Down },
        totals,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryCard {
    Food {
        name: String,
        date_label: String,
        detail: String,
        badges: Vec<String>,
    },
    Exercise {
        name: String,
        date_label: String,
        detail: String,
        intensity_percent: f64,
        burned_display: String,
    },
}

pub fn entry_card(entry: &Entry) -> EntryCard {
    match entry {
        Entry::Food(f) => EntryCard::Food {
            name: f.name.clone(),
            date_label: day_label(f.date),
            detail: format!(
                "{} {} • {} kcal",
                fmt_kcal(f.serving_qty),
                f.serving_unit,
                fmt_kcal(f.calories)
            ),
            badges: vec![
                format!("{}g protein", fmt_kcal(f.protein)),
                format!("{}g carbs", fmt_kcal(f.carbs)),
                format!("{}g fat", fmt_kcal(f.fat)),
            ],
        },
        Entry::Exercise(e) => EntryCard::Exercise {
            name: e.name.clone(),
            date_label: day_label(e.date),
            detail: format!(
                "{} min • {} kcal burned",
                fmt_kcal(e.duration_min),
                fmt_kcal(e.calories_burned)
            ),
            intensity_percent: (e.met * 10.0).clamp(0.0, 100.0),
            burned_display: format!("-{}", fmt_kcal(e.calories_burned)),
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub label: String,
    pub intake: f64,
    pub burned: f64,
    pub net: f64,
    pub caption: String,
}

impl From<DayBalance> for TrendPoint {
    fn from(b: DayBalance) -> Self {
        Self {
            date: b.date,
            label: day_label(b.date),
            intake: b.intake,
            burned: b.burned,
            net: b.net,
            caption: trend_caption(b.net),
        }
    }
}

pub fn trend(entries: &[Entry], today: NaiveDate, days: usize) -> Vec<TrendPoint> {
    aggregate::daily_balances(entries, today, days)
        .into_iter()
        .map(TrendPoint::from)
        .collect()
}

/// Tooltip text for one day of the trend
pub fn trend_caption(net: f64) -> String {
    if net > 0.0 {
        format!("You gained {} kcal", fmt_kcal(net))
    } else if net < 0.0 {
        format!("You burned {} kcal", fmt_kcal(net.abs()))
    } else {
        "No data".to_string()
    }
}

/// "Mon, Jan 8"
pub fn day_label(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

/// Whole numbers print without a fraction; others keep one decimal
fn fmt_kcal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub tab: Tab,
    pub summary: Summary,
    pub entries: Vec<EntryCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trend: Vec<TrendPoint>,
}

pub fn dashboard(entries: &[Entry], tab: Tab, today: NaiveDate) -> Dashboard {
    let summary = summary(entries);

    let (cards, empty_message, trend_points) = match tab {
        Tab::Trend => (Vec::new(), None, trend(entries, today, aggregate::TREND_DAYS)),
        Tab::Food | Tab::Exercise => {
            let cards: Vec<EntryCard> = entries
                .iter()
                .filter(|e| match tab {
                    Tab::Food => e.as_food().is_some(),
                    _ => e.as_exercise().is_some(),
                })
                .map(entry_card)
                .collect();
            let empty = match (cards.is_empty(), tab) {
                (true, Tab::Food) => Some("No food entries yet. Add your first meal!"),
                (true, _) => Some("No exercise entries yet. Log your first activity!"),
                (false, _) => None,
            };
            (cards, empty, Vec::new())
        }
    };

    Dashboard {
        tab,
        summary,
        entries: cards,
        empty_message,
        trend: trend_points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExerciseEntry, FoodEntry};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn ledger() -> Vec<Entry> {
        vec![
            Entry::Food(FoodEntry {
                name: "bagel".into(),
                calories: 250.0,
                protein: 10.0,
                fat: 1.5,
                carbs: 48.0,
                serving_qty: 2.0,
                serving_unit: "bagel".into(),
                date: d(8),
            }),
            Entry::Exercise(ExerciseEntry {
                name: "running".into(),
                calories_burned: 300.0,
                duration_min: 30.0,
                met: 12.5,
                date: d(8),
            }),
        ]
    }

    #[test]
    fn test_summary_bars_cap_at_full() {
        assert_eq!(SummaryBar::new("x", 500.0, 2000.0).fill_percent, 25.0);
        assert_eq!(SummaryBar::new("x", 5000.0, 2000.0).fill_percent, 100.0);
        assert_eq!(SummaryBar::new("x", -10.0, 1000.0).fill_percent, 0.0);
    }

    #[test]
    fn test_summary_net_display() {
        let s = summary(&ledger());
        assert_eq!(s.net_calories, 200.0);
        assert_eq!(s.net_display, "+200 kcal");
        assert_eq!(s.direction, Direction::Up);
        assert_eq!(s.burned.fill_percent, 30.0);

        let s = summary(&ledger()[1..]);
        assert_eq!(s.net_display, "-300 kcal");
        assert_eq!(s.direction, Direction::Down);
    }

    #[test]
    fn test_cards() {
        match entry_card(&ledger()[0]) {
            EntryCard::Food { detail, badges, date_label, .. } => {
                assert_eq!(detail, "2 bagel • 250 kcal");
                assert_eq!(badges, vec!["10g protein", "48g carbs", "1.5g fat"]);
                assert_eq!(date_label, "Mon, Jan 8");
            }
            other => panic!("unexpected card {:?}", other),
        }
        match entry_card(&ledger()[1]) {
            EntryCard::Exercise { detail, intensity_percent, burned_display, .. } => {
                assert_eq!(detail, "30 min • 300 kcal burned");
                assert_eq!(intensity_percent, 100.0);
                assert_eq!(burned_display, "-300");
            }
            other => panic!("unexpected card {:?}", other),
        }
    }

    #[test]
    fn test_trend_captions() {
        assert_eq!(trend_caption(120.0), "You gained 120 kcal");
        assert_eq!(trend_caption(-80.5), "You burned 80.5 kcal");
        assert_eq!(trend_caption(0.0), "No data");
    }

    #[test]
    fn test_dashboard_tabs() {
        let board = dashboard(&ledger(), Tab::Exercise, d(10));
        assert_eq!(board.entries.len(), 1);
        assert!(board.empty_message.is_none());
        assert!(board.trend.is_empty());

        let board = dashboard(&[], Tab::Food, d(10));
        assert_eq!(board.empty_message, Some("No food entries yet. Add your first meal!"));

        let board = dashboard(&ledger(), Tab::Trend, d(10));
        assert_eq!(board.trend.len(), 7);
        assert_eq!(board.trend[4].net, 200.0);
        assert_eq!(board.trend[6].caption, "No data");
    }
}
