use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use super::{map_unique_constraint, Database};
use crate::error::{StoreError, StoreResult};
use crate::models::{Doctor, DoctorFields};

const SELECT_COLUMNS: &str = "SELECT id, first_name, last_name, specialty, phone, email,
        license_number, office_number, consultation_fee
     FROM doctors";

/// CRUD over the `doctors` table.
#[derive(Debug, Clone)]
pub struct DoctorStore {
    db: Database,
}

impl DoctorStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn list(&self) -> StoreResult<Vec<Doctor>> {
        let conn = self.db.connect()?;
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id DESC"))?;
        let doctors = stmt
            .query_map([], doctor_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(doctors)
    }

    pub fn get(&self, id: i64) -> StoreResult<Option<Doctor>> {
        let conn = self.db.connect()?;
        let doctor = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                doctor_from_row,
            )
            .optional()?;
        Ok(doctor)
    }

    /// Insert a doctor. A license number already on file yields
    /// [`StoreError::Duplicate`].
    pub fn create(&self, fields: &DoctorFields) -> StoreResult<i64> {
        let conn = self.db.connect()?;
        conn.execute(
            "INSERT INTO doctors (first_name, last_name, specialty, phone, email,
                license_number, office_number, consultation_fee)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                fields.first_name,
                fields.last_name,
                fields.specialty,
                fields.phone,
                fields.email,
                fields.license_number,
                fields.office_number,
                fields.consultation_fee,
            ],
        )
        .map_err(|err| map_unique_constraint(err, "License number"))?;

        let id = conn.last_insert_rowid();
        info!(id, "doctor created");
        Ok(id)
    }

    pub fn update(&self, id: i64, fields: &DoctorFields) -> StoreResult<()> {
        let conn = self.db.connect()?;
        let updated = conn
            .execute(
                "UPDATE doctors SET
                    first_name = ?1, last_name = ?2, specialty = ?3, phone = ?4,
                    email = ?5, license_number = ?6, office_number = ?7,
                    consultation_fee = ?8
                 WHERE id = ?9",
                params![
                    fields.first_name,
                    fields.last_name,
                    fields.specialty,
                    fields.phone,
                    fields.email,
                    fields.license_number,
                    fields.office_number,
                    fields.consultation_fee,
                    id,
                ],
            )
            .map_err(|err| map_unique_constraint(err, "License number"))?;

        if updated == 0 {
            return Err(StoreError::NotFound {
                entity: "Doctor",
                id,
            });
        }
        info!(id, "doctor updated");
        Ok(())
    }

    /// Remove a doctor. Appointments that reference it are left untouched.
    pub fn delete(&self, id: i64) -> StoreResult<()> {
        let conn = self.db.connect()?;
        let deleted = conn.execute("DELETE FROM doctors WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound {
                entity: "Doctor",
                id,
            });
        }
        info!(id, "doctor deleted");
        Ok(())
    }
}

fn doctor_from_row(row: &Row<'_>) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: row.get(0)?,
        fields: DoctorFields {
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            specialty: row.get(3)?,
            phone: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            email: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            license_number: row
                .get::<_, Option<String>>(6)?
                .filter(|license| !license.trim().is_empty()),
            office_number: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
            consultation_fee: row.get::<_, Option<f64>>(8)?.unwrap_or_default(),
        },
    })
}
