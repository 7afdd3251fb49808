//! Reminder lifecycle — tagging, scheduling against an abstract
//! notification scheduler, and the cancel-then-reschedule reconciler that
//! keeps the scheduler's state consistent with a medication's schedule.

pub mod memory;
pub mod reconciler;
pub mod scheduler;

pub use memory::*;
pub use reconciler::*;
pub use scheduler::*;

use thiserror::Error;

use crate::schedule::ScheduleError;

#[derive(Error, Debug)]
pub enum ReminderError {
    /// Planning aborted: the medication's schedule fields are outside the
    /// fixed enumerations.
    #[error("Invalid schedule configuration: {0}")]
    Config(#[from] ScheduleError),

    /// The external scheduler refused or failed a call (permission denied,
    /// quota exceeded, transient failure).
    #[error("Scheduler unavailable: {0}")]
    Unavailable(String),
}
