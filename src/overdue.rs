//! Missed-dose evaluation for the in-app notification badge and list:
//! which of today's scheduled times are already past and not yet taken.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::Medication;
use crate::schedule::active_on;

/// A medication with at least one overdue dose today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverdueMedication {
    pub medication: Medication,
    /// Times at or before now's clock value and not in today's taken
    /// history, in stored `times` order.
    pub overdue_times: Vec<NaiveTime>,
}

/// Evaluate overdue doses for "today" across all medications.
///
/// Only medications whose date window covers today are considered;
/// medications with nothing overdue are excluded. A medication whose
/// duration label cannot be parsed is skipped with a warning — the badge
/// must stay computable even when one record is misconfigured (the same
/// record still fails loudly when reconciled).
pub fn missed(medications: &[Medication], now: NaiveDateTime) -> Vec<OverdueMedication> {
    let today = now.date();
    let clock = now.time();

    let mut result = Vec::new();
    for med in medications {
        let active = match active_on(med, today) {
            Ok(active) => active,
            Err(e) => {
                tracing::warn!(medication = %med.id, error = %e, "Skipping misconfigured medication");
                continue;
            }
        };
        if !active {
            continue;
        }

        let overdue_times: Vec<NaiveTime> = med
            .times
            .iter()
            .filter(|time| **time <= clock && !med.taken_at(today, **time))
            .copied()
            .collect();

        if !overdue_times.is_empty() {
            result.push(OverdueMedication {
                medication: med.clone(),
                overdue_times,
            });
        }
    }
    result
}

/// Aggregate overdue count across all medications — the badge number.
pub fn overdue_count(medications: &[Medication], now: NaiveDateTime) -> usize {
    missed(medications, now)
        .iter()
        .map(|entry| entry.overdue_times.len())
        .sum()
}
