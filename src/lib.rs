//! Medtrack core — medication schedules, dose tracking, and reminder
//! reconciliation for the mobile app.
//!
//! The crate is organized around the flow from a stored [`models::Medication`]
//! record to delivered reminders: [`schedule`] expands the record's
//! human-described schedule into concrete dose instants, [`reminder`]
//! reconciles those instants against the platform notification scheduler,
//! [`intake`] and [`overdue`] evaluate taken and missed doses, and
//! [`service`] ties those pieces to a [`store::MedicationStore`].

pub mod config;
pub mod db;
pub mod intake;
pub mod models;
pub mod overdue;
pub mod reminder;
pub mod schedule;
pub mod service;
pub mod store;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the host application. `RUST_LOG` overrides the
/// default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
