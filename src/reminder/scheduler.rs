//! The abstract notification scheduler the reconciler drives, plus the
//! reminder tag scheme.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ReminderError;
use crate::models::Medication;

/// Opaque handle returned by the scheduler for a scheduled reminder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReminderHandle(pub String);

impl std::fmt::Display for ReminderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// When a reminder fires: a single concrete instant, or a repeating daily
/// rule (the optimization path for unbounded schedules).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderTrigger {
    At(NaiveDateTime),
    Daily(NaiveTime),
}

/// What the notification shows when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub title: String,
    pub body: String,
}

impl ReminderPayload {
    /// The dose notification for a medication.
    pub fn for_medication(med: &Medication) -> Self {
        Self {
            title: "💊 Medication time!".into(),
            body: format!("Time to take your {} ({}).", med.name, med.dosage),
        }
    }
}

/// A single scheduling request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRequest {
    pub tag: String,
    pub trigger: ReminderTrigger,
    pub payload: ReminderPayload,
}

/// A currently scheduled entry, as reported by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEntry {
    pub tag: String,
    pub handle: ReminderHandle,
}

/// Platform notification scheduler boundary.
///
/// Implementations only need to fire a notification per request, report
/// what is pending, and cancel by handle; the tag format is owned by the
/// reconciler and is opaque here.
pub trait NotificationScheduler: Send + Sync {
    /// Schedule a notification; returns a handle usable with `cancel`.
    fn schedule(&self, request: &ReminderRequest) -> Result<ReminderHandle, ReminderError>;

    /// All currently pending entries.
    fn list_scheduled(&self) -> Result<Vec<ScheduledEntry>, ReminderError>;

    /// Cancel a pending entry. Cancelling an already-fired or unknown
    /// handle is a no-op.
    fn cancel(&self, handle: &ReminderHandle) -> Result<(), ReminderError>;
}

/// Tag for one medication's reminder slot: `med-reminder-{id}-{slot}`.
/// All instants of the same `times` entry share this tag.
pub fn reminder_tag(medication_id: &Uuid, slot: usize) -> String {
    format!("med-reminder-{medication_id}-{slot}")
}

/// Common prefix of every tag belonging to one medication. The trailing
/// separator keeps one id from matching another id's tags.
pub fn reminder_tag_prefix(medication_id: &Uuid) -> String {
    format!("med-reminder-{medication_id}-")
}
