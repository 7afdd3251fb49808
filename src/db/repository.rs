//! Repository functions for the medication registry.
//!
//! Plain functions over a `rusqlite::Connection`. Dates are stored as
//! `YYYY-MM-DD`, time-of-day slots as `HH:MM`; ordered slots live in
//! `medication_times` and taken doses in `taken_doses`, both assembled
//! back onto the `Medication` value on load.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::StoreError;
use crate::models::Medication;

pub const DATE_FMT: &str = "%Y-%m-%d";
pub const TIME_FMT: &str = "%H:%M";

pub fn insert_medication(conn: &Connection, med: &Medication) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO medications (id, name, dosage, notes, frequency, start_date,
         duration, reminder_enabled, color)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            med.id.to_string(),
            med.name,
            med.dosage,
            med.notes,
            med.frequency,
            med.start_date.format(DATE_FMT).to_string(),
            med.duration,
            med.reminder_enabled as i32,
            med.color,
        ],
    )?;
    replace_times(conn, &med.id, &med.times)?;
    for (date, times) in &med.taken_history {
        for time in times {
            record_taken_dose(conn, &med.id, *date, *time)?;
        }
    }
    Ok(())
}

pub fn get_medication(conn: &Connection, id: &Uuid) -> Result<Option<Medication>, StoreError> {
    let row = conn.query_row(
        "SELECT id, name, dosage, notes, frequency, start_date, duration,
         reminder_enabled, color
         FROM medications WHERE id = ?1",
        params![id.to_string()],
        medication_row,
    );

    match row {
        Ok(raw) => Ok(Some(medication_from_row(conn, raw)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(StoreError::from(e)),
    }
}

/// All medications, ordered by creation time.
pub fn list_medications(conn: &Connection) -> Result<Vec<Medication>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, dosage, notes, frequency, start_date, duration,
         reminder_enabled, color
         FROM medications ORDER BY created_at ASC, id ASC",
    )?;
    let raws = stmt
        .query_map([], medication_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut meds = Vec::with_capacity(raws.len());
    for raw in raws {
        meds.push(medication_from_row(conn, raw)?);
    }
    Ok(meds)
}

/// Replace a medication's scalar fields and time slots.
///
/// Taken history is append-only and deliberately untouched here — editing
/// the schedule never rewrites what was already taken.
pub fn update_medication(conn: &Connection, med: &Medication) -> Result<(), StoreError> {
    let changed = conn.execute(
        "UPDATE medications SET name = ?2, dosage = ?3, notes = ?4, frequency = ?5,
         start_date = ?6, duration = ?7, reminder_enabled = ?8
         WHERE id = ?1",
        params![
            med.id.to_string(),
            med.name,
            med.dosage,
            med.notes,
            med.frequency,
            med.start_date.format(DATE_FMT).to_string(),
            med.duration,
            med.reminder_enabled as i32,
        ],
    )?;
    if changed == 0 {
        return Err(StoreError::not_found("medication", med.id));
    }
    replace_times(conn, &med.id, &med.times)
}

pub fn delete_medication(conn: &Connection, id: &Uuid) -> Result<(), StoreError> {
    let changed = conn.execute(
        "DELETE FROM medications WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(StoreError::not_found("medication", id));
    }
    Ok(())
}

/// Record one taken dose. The table's primary key makes this idempotent.
pub fn record_taken_dose(
    conn: &Connection,
    id: &Uuid,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR IGNORE INTO taken_doses (medication_id, taken_on, time_of_day)
         VALUES (?1, ?2, ?3)",
        params![
            id.to_string(),
            date.format(DATE_FMT).to_string(),
            time.format(TIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

fn replace_times(conn: &Connection, id: &Uuid, times: &[NaiveTime]) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM medication_times WHERE medication_id = ?1",
        params![id.to_string()],
    )?;
    for (index, time) in times.iter().enumerate() {
        conn.execute(
            "INSERT INTO medication_times (medication_id, slot_index, time_of_day)
             VALUES (?1, ?2, ?3)",
            params![
                id.to_string(),
                index as i64,
                time.format(TIME_FMT).to_string()
            ],
        )?;
    }
    Ok(())
}

fn load_times(conn: &Connection, id: &Uuid) -> Result<Vec<NaiveTime>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT time_of_day FROM medication_times
         WHERE medication_id = ?1 ORDER BY slot_index ASC",
    )?;
    let raw = stmt
        .query_map(params![id.to_string()], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    raw.iter().map(|s| parse_time("time_of_day", s)).collect()
}

fn load_taken_history(
    conn: &Connection,
    id: &Uuid,
) -> Result<BTreeMap<NaiveDate, Vec<NaiveTime>>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT taken_on, time_of_day FROM taken_doses
         WHERE medication_id = ?1 ORDER BY taken_on ASC, time_of_day ASC",
    )?;
    let raw = stmt
        .query_map(params![id.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut history: BTreeMap<NaiveDate, Vec<NaiveTime>> = BTreeMap::new();
    for (date_str, time_str) in raw {
        let date = parse_date("taken_on", &date_str)?;
        let time = parse_time("time_of_day", &time_str)?;
        history.entry(date).or_default().push(time);
    }
    Ok(history)
}

type MedicationRow = (String, String, String, Option<String>, String, String, String, i32, String);

fn medication_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MedicationRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn medication_from_row(conn: &Connection, raw: MedicationRow) -> Result<Medication, StoreError> {
    let (id_str, name, dosage, notes, frequency, start_str, duration, reminder, color) = raw;
    let id: Uuid = id_str.parse().map_err(|_| StoreError::InvalidValue {
        field: "id".into(),
        value: id_str.clone(),
    })?;

    Ok(Medication {
        id,
        name,
        dosage,
        notes,
        frequency,
        times: load_times(conn, &id)?,
        start_date: parse_date("start_date", &start_str)?,
        duration,
        reminder_enabled: reminder != 0,
        color,
        taken_history: load_taken_history(conn, &id)?,
    })
}

fn parse_date(field: &str, s: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(s, DATE_FMT).map_err(|_| StoreError::InvalidValue {
        field: field.into(),
        value: s.into(),
    })
}

fn parse_time(field: &str, s: &str) -> Result<NaiveTime, StoreError> {
    NaiveTime::parse_from_str(s, TIME_FMT).map_err(|_| StoreError::InvalidValue {
        field: field.into(),
        value: s.into(),
    })
}
