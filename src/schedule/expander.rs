//! Expands a medication into the ordered dose instants it implies.

use std::str::FromStr;

use chrono::{Days, NaiveDate};

use super::types::DoseInstant;
use super::ScheduleError;
use crate::models::{DurationLabel, Frequency, Medication};

/// Parse the medication's frequency label, surfacing unknown labels as a
/// configuration error.
pub fn frequency_of(med: &Medication) -> Result<Frequency, ScheduleError> {
    Frequency::from_str(&med.frequency)
        .map_err(|_| ScheduleError::UnknownFrequency(med.frequency.clone()))
}

/// Parse the medication's duration label, surfacing unknown labels as a
/// configuration error.
pub fn duration_of(med: &Medication) -> Result<DurationLabel, ScheduleError> {
    DurationLabel::from_str(&med.duration)
        .map_err(|_| ScheduleError::UnknownDuration(med.duration.clone()))
}

/// The medication's active window: `(start, last_active_day)`.
/// `None` for the upper bound means unbounded ("Ongoing"); a bounded
/// duration of `n` days is active for `[start, start + n - 1]` inclusive.
pub fn active_window(med: &Medication) -> Result<(NaiveDate, Option<NaiveDate>), ScheduleError> {
    let duration = duration_of(med)?;
    let end = if duration.is_ongoing() {
        None
    } else {
        // days() > 0 for every bounded label
        med.start_date.checked_add_days(Days::new(duration.days() as u64 - 1))
    };
    Ok((med.start_date, end))
}

/// Whether the medication's schedule covers `date`.
///
/// This is the date-window test only; it ignores `reminder_enabled`, which
/// gates reminder scheduling but not display-side views of the schedule.
pub fn active_on(med: &Medication, date: NaiveDate) -> Result<bool, ScheduleError> {
    let (start, end) = active_window(med)?;
    Ok(date >= start && end.map_or(true, |last| date <= last))
}

/// Expand the medication into dose instants over `[from, to]` inclusive.
///
/// Empty when reminders are disabled or `times` is empty ("As needed"
/// medications have no times and thus never expand). Within each date,
/// instants follow the stored order of `times` — stored order is an edit
/// affordance, not a chronological sort.
pub fn expand(
    med: &Medication,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<DoseInstant>, ScheduleError> {
    if !med.reminder_enabled || med.times.is_empty() {
        return Ok(Vec::new());
    }
    if !frequency_of(med)?.is_scheduled() {
        return Ok(Vec::new());
    }

    let (start, end) = active_window(med)?;
    let first = from.max(start);
    let last = match end {
        Some(last_active) => to.min(last_active),
        None => to,
    };

    let mut instants = Vec::new();
    let mut day = first;
    while day <= last {
        for (slot, time) in med.times.iter().enumerate() {
            instants.push(DoseInstant::new(day, *time, slot));
        }
        match day.checked_add_days(Days::new(1)) {
            Some(next) => day = next,
            None => break,
        }
    }
    Ok(instants)
}
