use crate::models::{AppointmentRow, Doctor, Patient, DATE_FORMAT, TIME_FORMAT};

use super::helpers::truncate_cell;

/// Widest a column may grow before its cells are truncated.
const MAX_COLUMN_WIDTH: usize = 32;

const PATIENT_HEADERS: &[&str] = &[
    "ID",
    "First Name",
    "Last Name",
    "National ID",
    "Birth Date",
    "Phone",
    "Address",
    "Emergency Contact",
    "Blood Type",
    "Allergies",
];

const DOCTOR_HEADERS: &[&str] = &[
    "ID",
    "First Name",
    "Last Name",
    "Specialty",
    "Phone",
    "Email",
    "License",
    "Office",
    "Fee",
];

const APPOINTMENT_HEADERS: &[&str] = &["ID", "Patient", "Doctor", "Date", "Time", "Status", "Notes"];

/// The entity the main window is currently working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum View {
    Patients,
    Doctors,
    Appointments,
}

impl View {
    pub(crate) const ALL: [View; 3] = [View::Patients, View::Doctors, View::Appointments];

    pub(crate) fn title(self) -> &'static str {
        match self {
            View::Patients => "Patients",
            View::Doctors => "Doctors",
            View::Appointments => "Appointments",
        }
    }

    pub(crate) fn entity(self) -> &'static str {
        match self {
            View::Patients => "Patient",
            View::Doctors => "Doctor",
            View::Appointments => "Appointment",
        }
    }

    /// Singular, lowercase name used in messages.
    pub(crate) fn noun(self) -> &'static str {
        match self {
            View::Patients => "patient",
            View::Doctors => "doctor",
            View::Appointments => "appointment",
        }
    }

    pub(crate) fn headers(self) -> &'static [&'static str] {
        match self {
            View::Patients => PATIENT_HEADERS,
            View::Doctors => DOCTOR_HEADERS,
            View::Appointments => APPOINTMENT_HEADERS,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            View::Patients => 0,
            View::Doctors => 1,
            View::Appointments => 2,
        }
    }

    pub(crate) fn next(self) -> Self {
        View::ALL[(self.index() + 1) % View::ALL.len()]
    }

    pub(crate) fn previous(self) -> Self {
        View::ALL[(self.index() + View::ALL.len() - 1) % View::ALL.len()]
    }
}

pub(crate) fn patient_rows(patients: &[Patient]) -> Vec<Vec<String>> {
    patients
        .iter()
        .map(|patient| {
            let fields = &patient.fields;
            vec![
                patient.id.to_string(),
                fields.first_name.clone(),
                fields.last_name.clone(),
                fields.national_id.clone(),
                fields
                    .birth_date
                    .map(|date| date.format(DATE_FORMAT).to_string())
                    .unwrap_or_default(),
                fields.phone.clone(),
                fields.address.clone(),
                fields.emergency_contact.clone(),
                fields
                    .blood_type
                    .map(|blood_type| blood_type.to_string())
                    .unwrap_or_default(),
                fields.allergies.clone(),
            ]
        })
        .collect()
}

pub(crate) fn doctor_rows(doctors: &[Doctor]) -> Vec<Vec<String>> {
    doctors
        .iter()
        .map(|doctor| {
            let fields = &doctor.fields;
            vec![
                doctor.id.to_string(),
                fields.first_name.clone(),
                fields.last_name.clone(),
                fields.specialty.clone(),
                fields.phone.clone(),
                fields.email.clone(),
                fields.license_number.clone().unwrap_or_default(),
                fields.office_number.clone(),
                format!("{:.2}", fields.consultation_fee),
            ]
        })
        .collect()
}

pub(crate) fn appointment_rows(appointments: &[AppointmentRow]) -> Vec<Vec<String>> {
    appointments
        .iter()
        .map(|row| {
            vec![
                row.id.to_string(),
                row.patient_name.clone().unwrap_or_default(),
                row.doctor_name.clone().unwrap_or_default(),
                row.date.format(DATE_FORMAT).to_string(),
                row.time.format(TIME_FORMAT).to_string(),
                row.status.to_string(),
                row.notes.clone(),
            ]
        })
        .collect()
}

/// Rows shown in the main table plus the highlighted row. The first column
/// always holds the record id.
pub(crate) struct RecordTable {
    pub(crate) view: View,
    pub(crate) rows: Vec<Vec<String>>,
    pub(crate) selected: usize,
}

impl RecordTable {
    pub(crate) fn new(view: View) -> Self {
        Self {
            view,
            rows: Vec::new(),
            selected: 0,
        }
    }

    pub(crate) fn set_rows(&mut self, rows: Vec<Vec<String>>) {
        self.rows = rows;
        self.ensure_in_bounds();
    }

    /// Id in the first column of the highlighted row.
    pub(crate) fn current_id(&self) -> Option<i64> {
        self.rows
            .get(self.selected)
            .and_then(|row| row.first())
            .and_then(|cell| cell.parse().ok())
    }

    pub(crate) fn current_row(&self) -> Option<&[String]> {
        self.rows.get(self.selected).map(Vec::as_slice)
    }

    /// Highlight the row holding `id`, if it is present.
    pub(crate) fn select_id(&mut self, id: i64) {
        let id = id.to_string();
        if let Some(idx) = self
            .rows
            .iter()
            .position(|row| row.first() == Some(&id))
        {
            self.selected = idx;
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.rows.is_empty() {
            return;
        }
        let len = self.rows.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column widths sized to the widest header or cell, capped at
    /// [`MAX_COLUMN_WIDTH`].
    pub(crate) fn column_widths(&self) -> Vec<u16> {
        self.view
            .headers()
            .iter()
            .enumerate()
            .map(|(col, header)| {
                let widest_cell = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0);
                widest_cell.max(header.chars().count()).min(MAX_COLUMN_WIDTH) as u16
            })
            .collect()
    }

    /// Cells clipped to their column width.
    pub(crate) fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| truncate_cell(cell, MAX_COLUMN_WIDTH))
                    .collect()
            })
            .collect()
    }

    fn ensure_in_bounds(&mut self) {
        if self.rows.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.rows.len() {
            self.selected = self.rows.len() - 1;
        }
    }
}
