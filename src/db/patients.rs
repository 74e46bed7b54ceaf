use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};

use super::{format_date, map_unique_constraint, parse_column, parse_date, Database};
use crate::error::{StoreError, StoreResult};
use crate::models::{Patient, PatientFields};

const SELECT_COLUMNS: &str = "SELECT id, first_name, last_name, national_id, birth_date, phone,
        address, emergency_contact, blood_type, allergies
     FROM patients";

/// CRUD and search over the `patients` table.
#[derive(Debug, Clone)]
pub struct PatientStore {
    db: Database,
}

impl PatientStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Every patient, newest first.
    pub fn list(&self) -> StoreResult<Vec<Patient>> {
        let conn = self.db.connect()?;
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id DESC"))?;
        let patients = stmt
            .query_map([], patient_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(patients)
    }

    pub fn get(&self, id: i64) -> StoreResult<Option<Patient>> {
        let conn = self.db.connect()?;
        let patient = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                patient_from_row,
            )
            .optional()?;
        Ok(patient)
    }

    /// Insert a patient and return the new row id. A national id that is
    /// already on file yields [`StoreError::Duplicate`].
    pub fn create(&self, fields: &PatientFields) -> StoreResult<i64> {
        let conn = self.db.connect()?;
        conn.execute(
            "INSERT INTO patients (first_name, last_name, national_id, birth_date,
                phone, address, emergency_contact, blood_type, allergies)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                fields.first_name,
                fields.last_name,
                fields.national_id,
                fields.birth_date.map(format_date),
                fields.phone,
                fields.address,
                fields.emergency_contact,
                fields.blood_type.map(|blood_type| blood_type.as_str()),
                fields.allergies,
            ],
        )
        .map_err(|err| map_unique_constraint(err, "National ID"))?;

        let id = conn.last_insert_rowid();
        info!(id, "patient created");
        Ok(id)
    }

    /// Overwrite every editable column of an existing patient.
    pub fn update(&self, id: i64, fields: &PatientFields) -> StoreResult<()> {
        let conn = self.db.connect()?;
        let updated = conn
            .execute(
                "UPDATE patients SET
                    first_name = ?1, last_name = ?2, national_id = ?3, birth_date = ?4,
                    phone = ?5, address = ?6, emergency_contact = ?7, blood_type = ?8,
                    allergies = ?9
                 WHERE id = ?10",
                params![
                    fields.first_name,
                    fields.last_name,
                    fields.national_id,
                    fields.birth_date.map(format_date),
                    fields.phone,
                    fields.address,
                    fields.emergency_contact,
                    fields.blood_type.map(|blood_type| blood_type.as_str()),
                    fields.allergies,
                    id,
                ],
            )
            .map_err(|err| map_unique_constraint(err, "National ID"))?;

        if updated == 0 {
            return Err(StoreError::NotFound {
                entity: "Patient",
                id,
            });
        }
        info!(id, "patient updated");
        Ok(())
    }

    /// Remove a patient. Appointments that reference it are left untouched.
    pub fn delete(&self, id: i64) -> StoreResult<()> {
        let conn = self.db.connect()?;
        let deleted = conn.execute("DELETE FROM patients WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound {
                entity: "Patient",
                id,
            });
        }
        info!(id, "patient deleted");
        Ok(())
    }

    /// Case-sensitive substring match on first name, last name or national
    /// id, newest first.
    pub fn search(&self, term: &str) -> StoreResult<Vec<Patient>> {
        let conn = self.db.connect()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE instr(first_name, ?1) > 0
                OR instr(last_name, ?1) > 0
                OR instr(national_id, ?1) > 0
             ORDER BY id DESC"
        ))?;
        let patients = stmt
            .query_map(params![term], patient_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(term, matches = patients.len(), "patient search");
        Ok(patients)
    }
}

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    let birth_date = match row.get::<_, Option<String>>(4)? {
        Some(raw) if !raw.trim().is_empty() => Some(parse_date(4, &raw)?),
        _ => None,
    };
    let blood_type = match row.get::<_, Option<String>>(8)? {
        Some(raw) if !raw.trim().is_empty() => Some(parse_column(8, &raw)?),
        _ => None,
    };

    Ok(Patient {
        id: row.get(0)?,
        fields: PatientFields {
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            national_id: row.get(3)?,
            birth_date,
            phone: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            address: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
            emergency_contact: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
            blood_type,
            allergies: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
        },
    })
}
