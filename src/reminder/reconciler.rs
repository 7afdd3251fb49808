//! Cancel-then-reschedule reconciliation.
//!
//! Guarantees at most one live reminder set per medication: every pass
//! first cancels everything carrying the medication's tag prefix, then
//! schedules the currently planned instants. Scheduler failures on
//! individual instants are collected, not fatal — the caller can report
//! "N of M reminders scheduled".

use chrono::NaiveDateTime;
use uuid::Uuid;

use super::scheduler::{
    reminder_tag, reminder_tag_prefix, NotificationScheduler, ReminderPayload, ReminderRequest,
    ReminderTrigger,
};
use super::ReminderError;
use crate::models::Medication;
use crate::schedule::{daily_rules, enumeration_horizon, expand, plan};

/// One scheduling request the external scheduler refused.
#[derive(Debug, Clone)]
pub struct ReminderFailure {
    pub tag: String,
    pub reason: String,
}

/// Result of one reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    /// Previously pending entries cancelled in step 1.
    pub cancelled: usize,
    /// Tags successfully scheduled in step 2, in request order.
    pub scheduled: Vec<String>,
    /// Requests the scheduler failed; the batch continued past them.
    pub failures: Vec<ReminderFailure>,
}

impl ReconcileOutcome {
    /// Total scheduling requests attempted in step 2.
    pub fn attempted(&self) -> usize {
        self.scheduled.len() + self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Reconciles one medication's reminders against the external scheduler.
pub struct ReminderReconciler<'a, S: NotificationScheduler> {
    scheduler: &'a S,
}

impl<'a, S: NotificationScheduler> ReminderReconciler<'a, S> {
    pub fn new(scheduler: &'a S) -> Self {
        Self { scheduler }
    }

    /// Full reconciliation: cancel everything under this medication's tag
    /// prefix, then schedule the planned future reminders.
    ///
    /// Cancellation completes (or fails this call) before the first new
    /// request — an edit must never leave both the old and the new set
    /// pending. Unknown frequency/duration labels abort with a
    /// configuration error and schedule nothing.
    pub fn reconcile(
        &self,
        med: &Medication,
        now: NaiveDateTime,
    ) -> Result<ReconcileOutcome, ReminderError> {
        let cancelled = self.cancel_for(&med.id)?;
        let mut outcome = ReconcileOutcome {
            cancelled,
            ..ReconcileOutcome::default()
        };

        if !med.reminder_enabled || med.times.is_empty() {
            tracing::debug!(medication = %med.id, cancelled, "No reminders to schedule");
            return Ok(outcome);
        }

        let payload = ReminderPayload::for_medication(med);

        if let Some(rules) = daily_rules(med)? {
            // Unbounded schedule: one repeating daily rule per time slot.
            for (slot, time) in rules {
                self.try_schedule(
                    &mut outcome,
                    ReminderRequest {
                        tag: reminder_tag(&med.id, slot),
                        trigger: ReminderTrigger::Daily(time),
                        payload: payload.clone(),
                    },
                );
            }
        } else {
            let today = now.date();
            let horizon = enumeration_horizon(med, today)?;
            let future = plan(expand(med, today, horizon)?, now);
            for instant in future {
                self.try_schedule(
                    &mut outcome,
                    ReminderRequest {
                        tag: reminder_tag(&med.id, instant.slot),
                        trigger: ReminderTrigger::At(instant.at()),
                        payload: payload.clone(),
                    },
                );
            }
        }

        tracing::info!(
            medication = %med.id,
            cancelled = outcome.cancelled,
            scheduled = outcome.scheduled.len(),
            failed = outcome.failures.len(),
            "Reconciled reminders"
        );
        Ok(outcome)
    }

    /// Step 1 alone — also the whole procedure on deletion. Cancels every
    /// pending entry tagged with this medication's prefix and returns how
    /// many were cancelled. Entries of other medications are untouched.
    pub fn cancel_for(&self, medication_id: &Uuid) -> Result<usize, ReminderError> {
        let prefix = reminder_tag_prefix(medication_id);
        let mut cancelled = 0;
        for entry in self.scheduler.list_scheduled()? {
            if entry.tag.starts_with(&prefix) {
                self.scheduler.cancel(&entry.handle)?;
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            tracing::debug!(medication = %medication_id, cancelled, "Cancelled pending reminders");
        }
        Ok(cancelled)
    }

    fn try_schedule(&self, outcome: &mut ReconcileOutcome, request: ReminderRequest) {
        match self.scheduler.schedule(&request) {
            Ok(_) => outcome.scheduled.push(request.tag),
            Err(e) => {
                tracing::warn!(tag = %request.tag, error = %e, "Scheduling request failed");
                outcome.failures.push(ReminderFailure {
                    tag: request.tag,
                    reason: e.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::memory::MemoryScheduler;
    use crate::reminder::scheduler::{ReminderHandle, ScheduledEntry};
    use chrono::{NaiveDate, NaiveTime};
    use std::collections::BTreeMap;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn med(duration: &str, times: Vec<NaiveTime>) -> Medication {
        Medication {
            id: Uuid::new_v4(),
            name: "Metformin".into(),
            dosage: "500mg".into(),
            notes: None,
            frequency: "Twice daily".into(),
            times,
            start_date: d(2024, 1, 1),
            duration: duration.into(),
            reminder_enabled: true,
            color: "#9C27B0".into(),
            taken_history: BTreeMap::new(),
        }
    }

    #[test]
    fn seven_day_course_schedules_only_future_instants() {
        // Twice daily, 7 days from 2024-01-01, reconciled at
        // 2024-01-03T10:00.
        let scheduler = MemoryScheduler::new();
        let m = med("7 days", vec![t(9, 0), t(21, 0)]);
        let now = d(2024, 1, 3).and_hms_opt(10, 0, 0).unwrap();

        let outcome = ReminderReconciler::new(&scheduler).reconcile(&m, now).unwrap();

        // 21:00 on the 3rd, then both slots on the 4th..7th
        assert_eq!(outcome.scheduled.len(), 9);
        assert!(outcome.is_complete());

        let pending = scheduler.pending();
        assert_eq!(pending[0].trigger, ReminderTrigger::At(d(2024, 1, 3).and_time(t(21, 0))));
        assert!(pending.iter().all(|req| match req.trigger {
            ReminderTrigger::At(at) => at > now,
            ReminderTrigger::Daily(_) => false,
        }));
    }

    #[test]
    fn ongoing_uses_daily_rules_per_slot() {
        let scheduler = MemoryScheduler::new();
        let m = med("Ongoing", vec![t(9, 0), t(21, 0)]);
        let now = d(2024, 1, 3).and_hms_opt(10, 0, 0).unwrap();

        let outcome = ReminderReconciler::new(&scheduler).reconcile(&m, now).unwrap();
        assert_eq!(outcome.scheduled.len(), 2);

        let pending = scheduler.pending();
        assert_eq!(pending[0].trigger, ReminderTrigger::Daily(t(9, 0)));
        assert_eq!(pending[1].trigger, ReminderTrigger::Daily(t(21, 0)));
        assert_eq!(pending[0].tag, reminder_tag(&m.id, 0));
        assert_eq!(pending[1].tag, reminder_tag(&m.id, 1));
    }

    #[test]
    fn reconcile_is_idempotent() {
        let scheduler = MemoryScheduler::new();
        let m = med("7 days", vec![t(9, 0), t(21, 0)]);
        let now = d(2024, 1, 3).and_hms_opt(10, 0, 0).unwrap();
        let reconciler = ReminderReconciler::new(&scheduler);

        let first = reconciler.reconcile(&m, now).unwrap();
        let before: Vec<_> = scheduler.pending().iter().map(|r| r.tag.clone()).collect();

        let second = reconciler.reconcile(&m, now).unwrap();
        let after: Vec<_> = scheduler.pending().iter().map(|r| r.tag.clone()).collect();

        // Second pass cancels exactly what the first scheduled, then
        // produces the same set again — no duplicates accumulate.
        assert_eq!(second.cancelled, first.scheduled.len());
        assert_eq!(before, after);
    }

    #[test]
    fn reconcile_leaves_other_medications_alone() {
        let scheduler = MemoryScheduler::new();
        let ours = med("Ongoing", vec![t(9, 0)]);
        let theirs = med("Ongoing", vec![t(8, 0)]);
        let now = d(2024, 1, 3).and_hms_opt(10, 0, 0).unwrap();
        let reconciler = ReminderReconciler::new(&scheduler);

        reconciler.reconcile(&theirs, now).unwrap();
        let outcome = reconciler.reconcile(&ours, now).unwrap();
        assert_eq!(outcome.cancelled, 0);

        // Re-reconciling ours must not disturb theirs
        reconciler.reconcile(&ours, now).unwrap();
        let tags: Vec<_> = scheduler.pending().iter().map(|r| r.tag.clone()).collect();
        assert!(tags.contains(&reminder_tag(&theirs.id, 0)));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn disabled_reminders_cancel_and_schedule_nothing() {
        let scheduler = MemoryScheduler::new();
        let mut m = med("7 days", vec![t(9, 0)]);
        let now = d(2024, 1, 2).and_hms_opt(8, 0, 0).unwrap();
        let reconciler = ReminderReconciler::new(&scheduler);

        reconciler.reconcile(&m, now).unwrap();
        assert_eq!(scheduler.pending().len(), 6);

        // Toggling reminders off transitions the set back to unscheduled
        m.reminder_enabled = false;
        let outcome = reconciler.reconcile(&m, now).unwrap();
        assert_eq!(outcome.cancelled, 6);
        assert!(outcome.scheduled.is_empty());
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn unknown_duration_aborts_after_cancel() {
        let scheduler = MemoryScheduler::new();
        let mut m = med("7 days", vec![t(9, 0)]);
        let now = d(2024, 1, 2).and_hms_opt(8, 0, 0).unwrap();
        let reconciler = ReminderReconciler::new(&scheduler);
        reconciler.reconcile(&m, now).unwrap();

        m.duration = "six weeks".into();
        let err = reconciler.reconcile(&m, now).unwrap_err();
        assert!(matches!(err, ReminderError::Config(_)));
        // No partial schedule: the stale set was cancelled, nothing re-added
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn cancel_for_reports_count() {
        let scheduler = MemoryScheduler::new();
        let m = med("Ongoing", vec![t(9, 0), t(21, 0)]);
        let now = d(2024, 1, 3).and_hms_opt(10, 0, 0).unwrap();
        let reconciler = ReminderReconciler::new(&scheduler);

        reconciler.reconcile(&m, now).unwrap();
        assert_eq!(reconciler.cancel_for(&m.id).unwrap(), 2);
        assert_eq!(reconciler.cancel_for(&m.id).unwrap(), 0);
        assert!(scheduler.pending().is_empty());
    }

    /// Scheduler that refuses every request for one tag but lists and
    /// cancels normally.
    struct FlakyScheduler {
        inner: MemoryScheduler,
        failing_tag: String,
    }

    impl NotificationScheduler for FlakyScheduler {
        fn schedule(&self, request: &ReminderRequest) -> Result<ReminderHandle, ReminderError> {
            if request.tag == self.failing_tag {
                return Err(ReminderError::Unavailable("quota exceeded".into()));
            }
            self.inner.schedule(request)
        }

        fn list_scheduled(&self) -> Result<Vec<ScheduledEntry>, ReminderError> {
            self.inner.list_scheduled()
        }

        fn cancel(&self, handle: &ReminderHandle) -> Result<(), ReminderError> {
            self.inner.cancel(handle)
        }
    }

    #[test]
    fn individual_failures_do_not_abort_the_batch() {
        let m = med("Ongoing", vec![t(9, 0), t(15, 0), t(21, 0)]);
        let scheduler = FlakyScheduler {
            inner: MemoryScheduler::new(),
            failing_tag: reminder_tag(&m.id, 1),
        };
        let now = d(2024, 1, 3).and_hms_opt(10, 0, 0).unwrap();

        let outcome = ReminderReconciler::new(&scheduler).reconcile(&m, now).unwrap();
        assert_eq!(outcome.attempted(), 3);
        assert_eq!(outcome.scheduled.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert!(!outcome.is_complete());
        assert_eq!(outcome.failures[0].tag, reminder_tag(&m.id, 1));
        // Slots 0 and 2 went through despite slot 1 failing
        assert_eq!(scheduler.inner.pending().len(), 2);
    }
}
