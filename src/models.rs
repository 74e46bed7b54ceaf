//! Domain models that mirror the SQLite schema and get passed between the
//! stores, the validation layer and the TUI. Each entity pairs its row id with
//! a named field struct so create and update take the same shape and no call
//! site depends on column order.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// Storage format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Storage format for appointment times.
pub const TIME_FORMAT: &str = "%H:%M";

/// Raised when a stored enum column holds an unknown value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BloodType {
    APositive,
    ANegative,
    BPositive,
    BNegative,
    AbPositive,
    AbNegative,
    OPositive,
    ONegative,
}

impl BloodType {
    pub const ALL: [BloodType; 8] = [
        BloodType::APositive,
        BloodType::ANegative,
        BloodType::BPositive,
        BloodType::BNegative,
        BloodType::AbPositive,
        BloodType::AbNegative,
        BloodType::OPositive,
        BloodType::ONegative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BloodType::ALL
            .into_iter()
            .find(|blood_type| blood_type.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "blood type",
                value: s.to_string(),
            })
    }
}

/// Lifecycle of an appointment. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppointmentStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
    Postponed,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Active,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Postponed,
    ];

    /// Value persisted in the `status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Active => "active",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Postponed => "postponed",
        }
    }

    /// Label written by earlier releases that stored the display text.
    pub fn legacy_label(self) -> &'static str {
        match self {
            AppointmentStatus::Active => "فعال",
            AppointmentStatus::Completed => "انجام شده",
            AppointmentStatus::Cancelled => "لغو شده",
            AppointmentStatus::Postponed => "به تعویق افتاده",
        }
    }

    /// Label shown in tables and forms.
    pub fn label(self) -> &'static str {
        match self {
            AppointmentStatus::Active => "Active",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Postponed => "Postponed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s || status.legacy_label() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "appointment status",
                value: s.to_string(),
            })
    }
}

/// Editable patient columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatientFields {
    pub first_name: String,
    pub last_name: String,
    /// Exactly ten digits, unique across patients.
    pub national_id: String,
    pub birth_date: Option<NaiveDate>,
    pub phone: String,
    pub address: String,
    pub emergency_contact: String,
    pub blood_type: Option<BloodType>,
    pub allergies: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    pub id: i64,
    pub fields: PatientFields,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.fields.first_name, self.fields.last_name)
    }

    /// Label used by the appointment form's patient picker.
    pub fn picker_label(&self) -> String {
        format!("{} - {}", self.full_name(), self.fields.national_id)
    }
}

/// Editable doctor columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DoctorFields {
    pub first_name: String,
    pub last_name: String,
    pub specialty: String,
    pub phone: String,
    pub email: String,
    /// Unique when present. Blank licenses are stored as NULL.
    pub license_number: Option<String>,
    pub office_number: String,
    pub consultation_fee: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Doctor {
    pub id: i64,
    pub fields: DoctorFields,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.fields.first_name, self.fields.last_name)
    }

    pub fn picker_label(&self) -> String {
        format!("Dr. {} - {}", self.full_name(), self.fields.specialty)
    }
}

/// Editable appointment columns.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentFields {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: i64,
    pub fields: AppointmentFields,
}

/// Appointment listing row with patient and doctor names resolved. A name is
/// `None` when the referenced record has been deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentRow {
    pub id: i64,
    pub patient_name: Option<String>,
    pub doctor_name: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blood_type_parses_its_own_labels() {
        for blood_type in BloodType::ALL {
            assert_eq!(blood_type.as_str().parse::<BloodType>(), Ok(blood_type));
        }
        assert!("C+".parse::<BloodType>().is_err());
    }

    #[test]
    fn status_round_trips_through_storage_value() {
        assert_eq!(
            "postponed".parse::<AppointmentStatus>(),
            Ok(AppointmentStatus::Postponed)
        );
        let err = "Postponed".parse::<AppointmentStatus>().unwrap_err();
        assert_eq!(err.kind, "appointment status");
    }

    #[test]
    fn status_accepts_legacy_display_labels() {
        for status in AppointmentStatus::ALL {
            assert_eq!(status.legacy_label().parse::<AppointmentStatus>(), Ok(status));
        }
    }

    #[test]
    fn picker_labels_include_identifying_details() {
        let doctor = Doctor {
            id: 3,
            fields: DoctorFields {
                first_name: "Sara".into(),
                last_name: "Karimi".into(),
                specialty: "Cardiology".into(),
                ..DoctorFields::default()
            },
        };
        assert_eq!(doctor.picker_label(), "Dr. Sara Karimi - Cardiology");
    }
}
