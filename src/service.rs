//! Medication lifecycle orchestration: persistence and reminder
//! reconciliation sequenced the way the screens drive them — create,
//! edit, delete, mark taken, and the startup re-reconcile pass.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rand::seq::SliceRandom;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::db::StoreError;
use crate::intake;
use crate::models::{Medication, NewMedication, COLOR_PALETTE};
use crate::overdue::{self, OverdueMedication};
use crate::reminder::{NotificationScheduler, ReconcileOutcome, ReminderError, ReminderReconciler};
use crate::schedule::{active_on, frequency_of};
use crate::store::MedicationStore;

/// Injectable time source so planner/evaluator paths are deterministic
/// under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

#[derive(Error, Debug)]
pub enum ServiceError {
    /// The persistence call failed; the caller decides whether to retry
    /// or roll back its local state. Stale ids surface here as NotFound.
    #[error("Persistence failure: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Reminder(#[from] ReminderError),
}

/// One row of the "today" view.
#[derive(Debug, Clone, Serialize)]
pub struct TodayDose {
    pub medication_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub color: String,
    pub time: NaiveTime,
    pub slot: usize,
    pub taken: bool,
}

pub struct MedicationService<'a, S, N, C = SystemClock>
where
    S: MedicationStore,
    N: NotificationScheduler,
    C: Clock,
{
    store: &'a S,
    scheduler: &'a N,
    clock: C,
}

impl<'a, S, N> MedicationService<'a, S, N, SystemClock>
where
    S: MedicationStore,
    N: NotificationScheduler,
{
    pub fn new(store: &'a S, scheduler: &'a N) -> Self {
        Self::with_clock(store, scheduler, SystemClock)
    }
}

impl<'a, S, N, C> MedicationService<'a, S, N, C>
where
    S: MedicationStore,
    N: NotificationScheduler,
    C: Clock,
{
    pub fn with_clock(store: &'a S, scheduler: &'a N, clock: C) -> Self {
        Self {
            store,
            scheduler,
            clock,
        }
    }

    fn reconciler(&self) -> ReminderReconciler<'_, N> {
        ReminderReconciler::new(self.scheduler)
    }

    /// Register a medication: assign its id and display color, persist,
    /// then materialize its reminders.
    pub fn add_medication(
        &self,
        input: NewMedication,
    ) -> Result<(Medication, ReconcileOutcome), ServiceError> {
        let color = COLOR_PALETTE
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("#4CAF50")
            .to_string();

        let med = Medication {
            id: Uuid::new_v4(),
            name: input.name,
            dosage: input.dosage,
            notes: input.notes,
            frequency: input.frequency,
            times: input.times,
            start_date: input.start_date,
            duration: input.duration,
            reminder_enabled: input.reminder_enabled,
            color,
            taken_history: Default::default(),
        };

        self.store.create(&med)?;
        let outcome = self.reconciler().reconcile(&med, self.clock.now())?;
        tracing::info!(medication = %med.id, name = %med.name, "Medication added");
        Ok((med, outcome))
    }

    /// Save an edit. Any scheduling-relevant change requires the full
    /// cancel + reschedule pass; partial rescheduling is not supported.
    pub fn update_medication(
        &self,
        med: &Medication,
    ) -> Result<ReconcileOutcome, ServiceError> {
        self.store.update(med)?;
        let outcome = self.reconciler().reconcile(med, self.clock.now())?;
        Ok(outcome)
    }

    /// Delete a medication. Its pending reminders are cancelled first so a
    /// successful delete can never leave orphaned notifications; nothing
    /// is rescheduled. Returns the number of reminders cancelled.
    pub fn remove_medication(&self, id: &Uuid) -> Result<usize, ServiceError> {
        let cancelled = self.reconciler().cancel_for(id)?;
        self.store.delete(id)?;
        tracing::info!(medication = %id, cancelled, "Medication removed");
        Ok(cancelled)
    }

    /// Mark one dose taken and persist the history entry. Idempotent per
    /// (date, time); returns the updated record.
    pub fn mark_dose_taken(
        &self,
        id: &Uuid,
        time: NaiveTime,
        date: NaiveDate,
    ) -> Result<Medication, ServiceError> {
        let mut med = self
            .store
            .get(id)?
            .ok_or_else(|| StoreError::not_found("medication", id))?;

        if intake::mark_taken(&mut med, time, date) {
            self.store.record_taken(id, date, time)?;
        }
        Ok(med)
    }

    /// Today's scheduled doses across all medications, with taken flags,
    /// for the home screen. "As needed" medications carry no scheduled
    /// times; misconfigured records are skipped with a warning.
    pub fn today_schedule(&self) -> Result<Vec<TodayDose>, ServiceError> {
        let now = self.clock.now();
        let today = now.date();

        let mut doses = Vec::new();
        for med in self.store.list()? {
            let scheduled_today = match (active_on(&med, today), frequency_of(&med)) {
                (Ok(active), Ok(frequency)) => active && frequency.is_scheduled(),
                (Err(e), _) | (_, Err(e)) => {
                    tracing::warn!(medication = %med.id, error = %e, "Skipping misconfigured medication");
                    false
                }
            };
            if !scheduled_today {
                continue;
            }

            for (slot, time) in med.times.iter().enumerate() {
                doses.push(TodayDose {
                    medication_id: med.id,
                    name: med.name.clone(),
                    dosage: med.dosage.clone(),
                    color: med.color.clone(),
                    time: *time,
                    slot,
                    taken: med.taken_at(today, *time),
                });
            }
        }
        Ok(doses)
    }

    /// Overdue doses for the in-app notification list and badge.
    pub fn missed_doses(&self) -> Result<Vec<OverdueMedication>, ServiceError> {
        let meds = self.store.list()?;
        Ok(overdue::missed(&meds, self.clock.now()))
    }

    /// Re-reconcile every medication — the app-restart pass that makes
    /// scheduling idempotent across launches. One medication's failure
    /// (bad labels, scheduler refusing its batch) does not block the
    /// rest; failures are logged and skipped.
    pub fn reconcile_all(&self) -> Result<Vec<(Uuid, ReconcileOutcome)>, ServiceError> {
        let now = self.clock.now();
        let reconciler = self.reconciler();

        let mut outcomes = Vec::new();
        for med in self.store.list()? {
            match reconciler.reconcile(&med, now) {
                Ok(outcome) => outcomes.push((med.id, outcome)),
                Err(e) => {
                    tracing::warn!(medication = %med.id, error = %e, "Reconciliation skipped");
                }
            }
        }
        Ok(outcomes)
    }
}
