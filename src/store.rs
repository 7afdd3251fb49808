//! The narrow persistence interface the core consumes, with the SQLite
//! implementation and an in-memory one for tests.
//!
//! The core treats records as plain `Medication` values; it neither knows
//! nor cares whether the backing store is this crate's SQLite database or
//! a remote document store standing behind the same trait.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{self, StoreError};
use crate::models::Medication;

pub trait MedicationStore: Send + Sync {
    /// Persist a new record. The caller assigns the id.
    fn create(&self, med: &Medication) -> Result<(), StoreError>;

    /// All records, in creation order.
    fn list(&self) -> Result<Vec<Medication>, StoreError>;

    fn get(&self, id: &Uuid) -> Result<Option<Medication>, StoreError>;

    /// Replace a record's schedule fields and times. Fails with
    /// [`StoreError::NotFound`] when the id is stale (deleted elsewhere).
    fn update(&self, med: &Medication) -> Result<(), StoreError>;

    /// Delete a record. Fails with [`StoreError::NotFound`] on a stale id.
    fn delete(&self, id: &Uuid) -> Result<(), StoreError>;

    /// Append one taken dose to the record's history. Idempotent per
    /// (date, time).
    fn record_taken(
        &self,
        id: &Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<(), StoreError>;
}

/// SQLite-backed store over the schema in `resources/migrations`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&conn)
    }
}

impl MedicationStore for SqliteStore {
    fn create(&self, med: &Medication) -> Result<(), StoreError> {
        self.with_conn(|conn| db::insert_medication(conn, med))
    }

    fn list(&self) -> Result<Vec<Medication>, StoreError> {
        self.with_conn(db::list_medications)
    }

    fn get(&self, id: &Uuid) -> Result<Option<Medication>, StoreError> {
        self.with_conn(|conn| db::get_medication(conn, id))
    }

    fn update(&self, med: &Medication) -> Result<(), StoreError> {
        self.with_conn(|conn| db::update_medication(conn, med))
    }

    fn delete(&self, id: &Uuid) -> Result<(), StoreError> {
        self.with_conn(|conn| db::delete_medication(conn, id))
    }

    fn record_taken(
        &self,
        id: &Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<(), StoreError> {
        self.with_conn(|conn| db::record_taken_dose(conn, id, date, time))
    }
}

/// In-memory store for tests and ephemeral use.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<Uuid, Medication>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MedicationStore for MemoryStore {
    fn create(&self, med: &Medication) -> Result<(), StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        records.insert(med.id, med.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Medication>, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.values().cloned().collect())
    }

    fn get(&self, id: &Uuid) -> Result<Option<Medication>, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.get(id).cloned())
    }

    fn update(&self, med: &Medication) -> Result<(), StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        match records.get_mut(&med.id) {
            Some(existing) => {
                // History is append-only; keep what the stored record has
                let history = existing.taken_history.clone();
                *existing = med.clone();
                existing.taken_history = history;
                Ok(())
            }
            None => Err(StoreError::not_found("medication", med.id)),
        }
    }

    fn delete(&self, id: &Uuid) -> Result<(), StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("medication", id))
    }

    fn record_taken(
        &self,
        id: &Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<(), StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        let med = records
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("medication", id))?;
        let taken = med.taken_history.entry(date).or_default();
        if !taken.contains(&time) {
            taken.push(time);
        }
        Ok(())
    }
}
