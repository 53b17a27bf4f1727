//! Data models
//!
//! Entries, persisted log rows, profiles and lookup results.

mod entry;
mod log_row;
mod lookup;
mod profile;

pub use entry::{Entry, EntryKind, ExerciseEntry, FoodEntry};
pub use log_row::{CalorieLog, LogRow, NewLogRow};
pub use lookup::{
    ExerciseItem, ExerciseSearchResponse, FoodItem, FoodSearchResponse, LookupResult,
};
pub use profile::{Gender, PendingProfile, Profile};
