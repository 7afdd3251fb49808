//! Decides which expanded instants still need a scheduled reminder.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

use super::expander::{duration_of, frequency_of};
use super::types::DoseInstant;
use super::ScheduleError;
use crate::config::DEFAULT_HORIZON_DAYS;
use crate::models::Medication;

/// Keep only instants strictly after `now`. Instants at or before `now`
/// have already passed and get no reminder.
pub fn plan(instants: Vec<DoseInstant>, now: NaiveDateTime) -> Vec<DoseInstant> {
    instants.into_iter().filter(|i| i.at() > now).collect()
}

/// Furthest date to materialize concrete instants for, counted from
/// `today`: the remaining duration for bounded schedules, capped at
/// [`DEFAULT_HORIZON_DAYS`] either way so "Ongoing" enumeration stays
/// finite.
pub fn enumeration_horizon(med: &Medication, today: NaiveDate) -> Result<NaiveDate, ScheduleError> {
    let duration = duration_of(med)?;
    let horizon = today
        .checked_add_days(Days::new(DEFAULT_HORIZON_DAYS as u64))
        .unwrap_or(today);

    if duration.is_ongoing() {
        return Ok(horizon);
    }
    let last_active = med
        .start_date
        .checked_add_days(Days::new(duration.days() as u64 - 1))
        .unwrap_or(med.start_date);
    Ok(horizon.min(last_active))
}

/// Repeating-rule mode for unbounded schedules: one daily firing rule per
/// `times` entry, in stored order. Returns `None` for bounded durations
/// (those enumerate concrete instants instead) and for medications that
/// never schedule (reminders off, no times, "As needed").
pub fn daily_rules(med: &Medication) -> Result<Option<Vec<(usize, NaiveTime)>>, ScheduleError> {
    if !med.reminder_enabled || med.times.is_empty() || !frequency_of(med)?.is_scheduled() {
        return Ok(None);
    }
    if !duration_of(med)?.is_ongoing() {
        return Ok(None);
    }
    Ok(Some(med.times.iter().copied().enumerate().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn med(duration: &str) -> Medication {
        Medication {
            id: Uuid::new_v4(),
            name: "Lisinopril".into(),
            dosage: "10mg".into(),
            notes: None,
            frequency: "Twice daily".into(),
            times: vec![t(9, 0), t(21, 0)],
            start_date: d(2024, 1, 1),
            duration: duration.into(),
            reminder_enabled: true,
            color: "#FF9800".into(),
            taken_history: BTreeMap::new(),
        }
    }

    #[test]
    fn plan_drops_past_and_present_instants() {
        let now = d(2024, 1, 3).and_hms_opt(10, 0, 0).unwrap();
        let instants = vec![
            DoseInstant::new(d(2024, 1, 3), t(9, 0), 0),  // past
            DoseInstant::new(d(2024, 1, 3), t(10, 0), 0), // exactly now
            DoseInstant::new(d(2024, 1, 3), t(21, 0), 1), // future
            DoseInstant::new(d(2024, 1, 4), t(9, 0), 0),  // future
        ];
        let future = plan(instants, now);
        assert_eq!(future.len(), 2);
        assert!(future.iter().all(|i| i.at() > now));
    }

    #[test]
    fn plan_of_empty_is_empty() {
        let now = d(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap();
        assert!(plan(Vec::new(), now).is_empty());
    }

    #[test]
    fn horizon_caps_ongoing_at_default() {
        let m = med("Ongoing");
        let today = d(2024, 6, 1);
        assert_eq!(enumeration_horizon(&m, today).unwrap(), d(2024, 7, 1));
    }

    #[test]
    fn horizon_stops_at_remaining_duration() {
        let m = med("7 days");
        // Mid-course: only 4 active days remain, well inside 30
        assert_eq!(enumeration_horizon(&m, d(2024, 1, 4)).unwrap(), d(2024, 1, 7));
    }

    #[test]
    fn horizon_caps_long_duration_at_default() {
        let m = med("90 days");
        let today = d(2024, 1, 2);
        assert_eq!(enumeration_horizon(&m, today).unwrap(), d(2024, 2, 1));
    }

    #[test]
    fn daily_rules_only_for_ongoing() {
        let rules = daily_rules(&med("Ongoing")).unwrap().unwrap();
        assert_eq!(rules, vec![(0, t(9, 0)), (1, t(21, 0))]);

        assert!(daily_rules(&med("7 days")).unwrap().is_none());
    }

    #[test]
    fn daily_rules_none_when_disabled() {
        let mut m = med("Ongoing");
        m.reminder_enabled = false;
        assert!(daily_rules(&m).unwrap().is_none());
    }

    #[test]
    fn daily_rules_propagate_configuration_errors() {
        let mut m = med("Ongoing");
        m.duration = "indefinite".into();
        assert!(daily_rules(&m).is_err());
    }
}
