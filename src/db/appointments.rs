use rusqlite::{params, OptionalExtension, Row};
use tracing::{info, warn};

use super::{format_date, format_time, parse_date, parse_time, Database};
use crate::error::{StoreError, StoreResult};
use crate::models::{Appointment, AppointmentFields, AppointmentRow, AppointmentStatus};

/// CRUD over the `appointments` table.
#[derive(Debug, Clone)]
pub struct AppointmentStore {
    db: Database,
}

impl AppointmentStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Every appointment with patient and doctor names, latest slot first.
    /// Appointments whose patient or doctor was deleted are still listed with
    /// the missing name left empty.
    pub fn list(&self) -> StoreResult<Vec<AppointmentRow>> {
        let conn = self.db.connect()?;
        let mut stmt = conn.prepare(
            "SELECT a.id,
                    p.first_name || ' ' || p.last_name,
                    d.first_name || ' ' || d.last_name,
                    a.appointment_date, a.appointment_time, a.status, a.notes
             FROM appointments a
             LEFT JOIN patients p ON a.patient_id = p.id
             LEFT JOIN doctors d ON a.doctor_id = d.id
             ORDER BY a.appointment_date DESC, a.appointment_time DESC, a.id DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(AppointmentRow {
                    id: row.get(0)?,
                    patient_name: row.get(1)?,
                    doctor_name: row.get(2)?,
                    date: parse_date(3, &row.get::<_, String>(3)?)?,
                    time: parse_time(4, &row.get::<_, String>(4)?)?,
                    status: status_column(row, 5)?,
                    notes: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get(&self, id: i64) -> StoreResult<Option<Appointment>> {
        let conn = self.db.connect()?;
        let appointment = conn
            .query_row(
                "SELECT id, patient_id, doctor_id, appointment_date, appointment_time,
                        status, notes
                 FROM appointments WHERE id = ?1",
                params![id],
                appointment_from_row,
            )
            .optional()?;
        Ok(appointment)
    }

    /// Insert an appointment. The store does not check that the referenced
    /// patient and doctor exist.
    pub fn create(&self, fields: &AppointmentFields) -> StoreResult<i64> {
        let conn = self.db.connect()?;
        conn.execute(
            "INSERT INTO appointments (patient_id, doctor_id, appointment_date,
                appointment_time, status, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                fields.patient_id,
                fields.doctor_id,
                format_date(fields.date),
                format_time(fields.time),
                fields.status.as_str(),
                fields.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        info!(id, patient_id = fields.patient_id, doctor_id = fields.doctor_id, "appointment created");
        Ok(id)
    }

    pub fn update(&self, id: i64, fields: &AppointmentFields) -> StoreResult<()> {
        let conn = self.db.connect()?;
        let updated = conn.execute(
            "UPDATE appointments SET
                patient_id = ?1, doctor_id = ?2, appointment_date = ?3,
                appointment_time = ?4, status = ?5, notes = ?6
             WHERE id = ?7",
            params![
                fields.patient_id,
                fields.doctor_id,
                format_date(fields.date),
                format_time(fields.time),
                fields.status.as_str(),
                fields.notes,
                id,
            ],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound {
                entity: "Appointment",
                id,
            });
        }
        info!(id, status = fields.status.as_str(), "appointment updated");
        Ok(())
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        let conn = self.db.connect()?;
        let deleted = conn.execute("DELETE FROM appointments WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound {
                entity: "Appointment",
                id,
            });
        }
        info!(id, "appointment deleted");
        Ok(())
    }
}

/// NULL, blank or unrecognised status falls back to the column default so one
/// odd row cannot hide the rest of the list.
fn status_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<AppointmentStatus> {
    let raw = match row.get::<_, Option<String>>(idx)? {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(AppointmentStatus::default()),
    };
    match raw.trim().parse() {
        Ok(status) => Ok(status),
        Err(err) => {
            warn!(error = %err, "unknown appointment status, using default");
            Ok(AppointmentStatus::default())
        }
    }
}

fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: row.get(0)?,
        fields: AppointmentFields {
            patient_id: row.get(1)?,
            doctor_id: row.get(2)?,
            date: parse_date(3, &row.get::<_, String>(3)?)?,
            time: parse_time(4, &row.get::<_, String>(4)?)?,
            status: status_column(row, 5)?,
            notes: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        },
    })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;

    fn test_store() -> (tempfile::TempDir, Database, AppointmentStore) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("hospital.db"));
        let store = AppointmentStore::new(db.clone());
        (dir, db, store)
    }

    fn fields(day: u32, hour: u32) -> AppointmentFields {
        AppointmentFields {
            patient_id: 1,
            doctor_id: 1,
            date: NaiveDate::from_ymd_opt(2030, 1, day).unwrap(),
            time: NaiveTime::from_hms_opt(hour, 30, 0).unwrap(),
            status: AppointmentStatus::Active,
            notes: String::new(),
        }
    }

    #[test]
    fn create_and_get_keep_date_time_and_status() {
        let (_dir, _db, store) = test_store();
        let mut input = fields(5, 9);
        input.status = AppointmentStatus::Postponed;
        input.notes = "Bring lab results".into();
        let id = store.create(&input).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().fields, input);
    }

    #[test]
    fn time_is_stored_without_seconds() {
        let (_dir, db, store) = test_store();
        let id = store.create(&fields(5, 14)).unwrap();
        let conn = db.connect().unwrap();
        let raw: String = conn
            .query_row(
                "SELECT appointment_time FROM appointments WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(raw, "14:30");
    }

    #[test]
    fn list_orders_by_date_then_time_descending() {
        let (_dir, _db, store) = test_store();
        let early = store.create(&fields(2, 8)).unwrap();
        let late_morning = store.create(&fields(3, 8)).unwrap();
        let late_afternoon = store.create(&fields(3, 16)).unwrap();
        let ids: Vec<i64> = store.list().unwrap().iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![late_afternoon, late_morning, early]);
    }

    #[test]
    fn legacy_and_unknown_statuses_do_not_break_the_list() {
        let (_dir, db, store) = test_store();
        let kept = store.create(&fields(1, 9)).unwrap();
        let conn = db.connect().unwrap();
        for status in ["انجام شده", "archived"] {
            conn.execute(
                "INSERT INTO appointments (patient_id, doctor_id, appointment_date, appointment_time, status)
                 VALUES (1, 1, '2030-01-02', '10:00', ?1)",
                [status],
            )
            .unwrap();
        }

        let rows = store.list().unwrap();
        assert_eq!(rows.len(), 3);
        let statuses: Vec<AppointmentStatus> = rows.iter().map(|row| row.status).collect();
        assert!(statuses.contains(&AppointmentStatus::Completed));
        assert_eq!(
            store.get(kept).unwrap().unwrap().fields.status,
            AppointmentStatus::Active
        );
        assert_eq!(
            statuses
                .iter()
                .filter(|status| **status == AppointmentStatus::Active)
                .count(),
            2
        );
    }

    #[test]
    fn rows_with_unknown_references_have_no_names() {
        let (_dir, _db, store) = test_store();
        store.create(&fields(2, 8)).unwrap();
        let rows = store.list().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].patient_name, None);
        assert_eq!(rows[0].doctor_name, None);
    }

    #[test]
    fn delete_unknown_appointment_is_not_found() {
        let (_dir, _db, store) = test_store();
        assert!(matches!(
            store.delete(99),
            Err(StoreError::NotFound {
                entity: "Appointment",
                ..
            })
        ));
    }
}
