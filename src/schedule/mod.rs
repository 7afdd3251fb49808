//! Schedule expansion — turning a medication's human-described schedule
//! (frequency, duration, time-of-day list, start date) into concrete dose
//! instants, and planning which of those still need a reminder.

pub mod expander;
pub mod planner;
pub mod types;

pub use expander::*;
pub use planner::*;
pub use types::*;

use thiserror::Error;

/// A medication references a label outside the fixed enumerations.
/// Raised synchronously; planning for that medication must abort rather
/// than guess a schedule.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Unknown frequency label: {0}")]
    UnknownFrequency(String),

    #[error("Unknown duration label: {0}")]
    UnknownDuration(String),
}
