use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed palette a new medication's display color is drawn from.
pub const COLOR_PALETTE: &[&str] = &["#4CAF50", "#2196F3", "#FF9800", "#E91E63", "#9C27B0"];

/// A registered medication with its dosing schedule.
///
/// `frequency` and `duration` hold labels from the fixed enumerations in
/// [`super::enums`]; they are kept as entered so an out-of-enumeration
/// label surfaces as a configuration error at planning time instead of
/// being silently coerced. `times` is the source of truth for the daily
/// dose count — the frequency only supplies form defaults. Entries are
/// neither deduplicated nor sorted; stored order is meaningful for
/// editing, not chronology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub dosage: String,
    pub notes: Option<String>,
    pub frequency: String,
    pub times: Vec<NaiveTime>,
    pub start_date: NaiveDate,
    pub duration: String,
    pub reminder_enabled: bool,
    /// Assigned once at creation from [`COLOR_PALETTE`], stable thereafter.
    pub color: String,
    /// Per calendar day, the time slots already marked taken. Grows
    /// monotonically; never pruned here (retention is the store's concern).
    /// Entries reference the `times` values current when the dose was
    /// taken — later schedule edits do not rewrite history.
    pub taken_history: BTreeMap<NaiveDate, Vec<NaiveTime>>,
}

/// Input for registering a medication; the id, color and empty history
/// are assigned by the service at creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMedication {
    pub name: String,
    pub dosage: String,
    pub notes: Option<String>,
    pub frequency: String,
    pub times: Vec<NaiveTime>,
    pub start_date: NaiveDate,
    pub duration: String,
    pub reminder_enabled: bool,
}

impl Medication {
    /// Whether `time` has been marked taken on `date`.
    pub fn taken_at(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.taken_history
            .get(&date)
            .is_some_and(|taken| taken.contains(&time))
    }
}
