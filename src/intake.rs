//! Dose-taken tracking — per medication and calendar day, which of the
//! day's time slots have been marked taken.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::Medication;

/// Daily completion for the progress ring: doses taken out of the day's
/// scheduled slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseProgress {
    pub taken: usize,
    pub total: usize,
}

impl DoseProgress {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.taken as f32 / self.total as f32
        }
    }
}

/// Mark `time` taken on `date`. Returns whether the entry was new —
/// marking an already-taken pair a second time changes nothing.
///
/// `time` is not validated against the medication's current `times`:
/// history records what was taken under the schedule of that day, and a
/// later edit must not invalidate it.
pub fn mark_taken(med: &mut Medication, time: NaiveTime, date: NaiveDate) -> bool {
    let taken = med.taken_history.entry(date).or_default();
    if taken.contains(&time) {
        return false;
    }
    taken.push(time);
    true
}

/// Progress for one medication on one day. Duplicate `times` entries each
/// count toward the total and are both satisfied by a single taken mark.
pub fn daily_progress(med: &Medication, date: NaiveDate) -> DoseProgress {
    let taken = med
        .times
        .iter()
        .filter(|time| med.taken_at(date, **time))
        .count();
    DoseProgress {
        taken,
        total: med.times.len(),
    }
}
