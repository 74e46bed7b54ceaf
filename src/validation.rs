//! Form validation kept free of any terminal types. Each `validate_*` function
//! takes the raw text a form collected and either returns the typed field
//! struct the stores accept or the first problem found, tagged with the field
//! the user has to fix.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::models::{
    AppointmentFields, AppointmentStatus, BloodType, DoctorFields, PatientFields, DATE_FORMAT,
    TIME_FORMAT,
};

/// Length of a national id.
pub const NATIONAL_ID_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required.")]
    Required { field: &'static str },

    #[error("National ID must be exactly 10 digits.")]
    NationalIdFormat,

    #[error("{field} must be a valid date (YYYY-MM-DD).")]
    InvalidDate { field: &'static str },

    #[error("Time must be a valid time (HH:MM).")]
    InvalidTime,

    #[error("Appointment date cannot be in the past.")]
    DateInPast,

    #[error("Consultation fee must be a non-negative number.")]
    InvalidFee,

    #[error("Please select a {field}.")]
    NotSelected { field: &'static str },
}

/// A validation failure together with the field it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError<F> {
    pub field: F,
    pub error: ValidationError,
}

impl<F> FieldError<F> {
    fn new(field: F, error: ValidationError) -> Self {
        Self { field, error }
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatientField {
    #[default]
    FirstName,
    LastName,
    NationalId,
    BirthDate,
    Phone,
    Address,
    EmergencyContact,
    BloodType,
    Allergies,
}

impl PatientField {
    pub const ALL: [PatientField; 9] = [
        PatientField::FirstName,
        PatientField::LastName,
        PatientField::NationalId,
        PatientField::BirthDate,
        PatientField::Phone,
        PatientField::Address,
        PatientField::EmergencyContact,
        PatientField::BloodType,
        PatientField::Allergies,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PatientField::FirstName => "First name",
            PatientField::LastName => "Last name",
            PatientField::NationalId => "National ID",
            PatientField::BirthDate => "Birth date",
            PatientField::Phone => "Phone",
            PatientField::Address => "Address",
            PatientField::EmergencyContact => "Emergency contact",
            PatientField::BloodType => "Blood type",
            PatientField::Allergies => "Allergies",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DoctorField {
    #[default]
    FirstName,
    LastName,
    Specialty,
    Phone,
    Email,
    LicenseNumber,
    OfficeNumber,
    ConsultationFee,
}

impl DoctorField {
    pub const ALL: [DoctorField; 8] = [
        DoctorField::FirstName,
        DoctorField::LastName,
        DoctorField::Specialty,
        DoctorField::Phone,
        DoctorField::Email,
        DoctorField::LicenseNumber,
        DoctorField::OfficeNumber,
        DoctorField::ConsultationFee,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DoctorField::FirstName => "First name",
            DoctorField::LastName => "Last name",
            DoctorField::Specialty => "Specialty",
            DoctorField::Phone => "Phone",
            DoctorField::Email => "Email",
            DoctorField::LicenseNumber => "License number",
            DoctorField::OfficeNumber => "Office number",
            DoctorField::ConsultationFee => "Consultation fee",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppointmentField {
    #[default]
    Patient,
    Doctor,
    Date,
    Time,
    Status,
    Notes,
}

impl AppointmentField {
    pub const ALL: [AppointmentField; 6] = [
        AppointmentField::Patient,
        AppointmentField::Doctor,
        AppointmentField::Date,
        AppointmentField::Time,
        AppointmentField::Status,
        AppointmentField::Notes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AppointmentField::Patient => "Patient",
            AppointmentField::Doctor => "Doctor",
            AppointmentField::Date => "Date",
            AppointmentField::Time => "Time",
            AppointmentField::Status => "Status",
            AppointmentField::Notes => "Notes",
        }
    }
}

/// Raw patient form contents.
#[derive(Debug, Clone, Default)]
pub struct PatientInput {
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub birth_date: String,
    pub phone: String,
    pub address: String,
    pub emergency_contact: String,
    pub blood_type: Option<BloodType>,
    pub allergies: String,
}

/// Raw doctor form contents.
#[derive(Debug, Clone, Default)]
pub struct DoctorInput {
    pub first_name: String,
    pub last_name: String,
    pub specialty: String,
    pub phone: String,
    pub email: String,
    pub license_number: String,
    pub office_number: String,
    pub consultation_fee: String,
}

/// Raw appointment form contents. Patient and doctor are `None` until the
/// user picks one.
#[derive(Debug, Clone, Default)]
pub struct AppointmentInput {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub date: String,
    pub time: String,
    pub status: AppointmentStatus,
    pub notes: String,
}

/// Trimmed value, or [`ValidationError::Required`] when blank.
pub fn require(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required { field })
    } else {
        Ok(trimmed.to_string())
    }
}

/// A national id is exactly ten ASCII digits.
pub fn validate_national_id(value: &str) -> Result<(), ValidationError> {
    if value.len() == NATIONAL_ID_LEN && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::NationalIdFormat)
    }
}

pub fn parse_date(value: &str, field: &'static str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate { field })
}

pub fn parse_time(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|_| ValidationError::InvalidTime)
}

/// Blank means no fee. Anything else must be a finite, non-negative number.
pub fn parse_fee(value: &str) -> Result<f64, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    match trimmed.parse::<f64>() {
        Ok(fee) if fee.is_finite() && fee >= 0.0 => Ok(fee),
        _ => Err(ValidationError::InvalidFee),
    }
}

pub fn validate_patient(input: &PatientInput) -> Result<PatientFields, FieldError<PatientField>> {
    use PatientField as F;

    let first_name = require(&input.first_name, "First name")
        .map_err(|err| FieldError::new(F::FirstName, err))?;
    let last_name = require(&input.last_name, "Last name")
        .map_err(|err| FieldError::new(F::LastName, err))?;
    let national_id = require(&input.national_id, "National ID")
        .map_err(|err| FieldError::new(F::NationalId, err))?;
    validate_national_id(&national_id).map_err(|err| FieldError::new(F::NationalId, err))?;

    let birth_date = if input.birth_date.trim().is_empty() {
        None
    } else {
        Some(
            parse_date(&input.birth_date, "Birth date")
                .map_err(|err| FieldError::new(F::BirthDate, err))?,
        )
    };

    Ok(PatientFields {
        first_name,
        last_name,
        national_id,
        birth_date,
        phone: input.phone.trim().to_string(),
        address: input.address.trim().to_string(),
        emergency_contact: input.emergency_contact.trim().to_string(),
        blood_type: input.blood_type,
        allergies: input.allergies.trim().to_string(),
    })
}

pub fn validate_doctor(input: &DoctorInput) -> Result<DoctorFields, FieldError<DoctorField>> {
    use DoctorField as F;

    let first_name = require(&input.first_name, "First name")
        .map_err(|err| FieldError::new(F::FirstName, err))?;
    let last_name = require(&input.last_name, "Last name")
        .map_err(|err| FieldError::new(F::LastName, err))?;
    let specialty = require(&input.specialty, "Specialty")
        .map_err(|err| FieldError::new(F::Specialty, err))?;
    let consultation_fee = parse_fee(&input.consultation_fee)
        .map_err(|err| FieldError::new(F::ConsultationFee, err))?;

    let license = input.license_number.trim();
    Ok(DoctorFields {
        first_name,
        last_name,
        specialty,
        phone: input.phone.trim().to_string(),
        email: input.email.trim().to_string(),
        license_number: (!license.is_empty()).then(|| license.to_string()),
        office_number: input.office_number.trim().to_string(),
        consultation_fee,
    })
}

/// `earliest` is the first acceptable date. New appointments pass today;
/// edits pass `None` so past appointments can still be updated.
pub fn validate_appointment(
    input: &AppointmentInput,
    earliest: Option<NaiveDate>,
) -> Result<AppointmentFields, FieldError<AppointmentField>> {
    use AppointmentField as F;

    let patient_id = input.patient_id.ok_or(FieldError::new(
        F::Patient,
        ValidationError::NotSelected { field: "patient" },
    ))?;
    let doctor_id = input.doctor_id.ok_or(FieldError::new(
        F::Doctor,
        ValidationError::NotSelected { field: "doctor" },
    ))?;
    let date = parse_date(&input.date, "Date").map_err(|err| FieldError::new(F::Date, err))?;
    if let Some(earliest) = earliest {
        if date < earliest {
            return Err(FieldError::new(F::Date, ValidationError::DateInPast));
        }
    }
    let time = parse_time(&input.time).map_err(|err| FieldError::new(F::Time, err))?;

    Ok(AppointmentFields {
        patient_id,
        doctor_id,
        date,
        time,
        status: input.status,
        notes: input.notes.trim().to_string(),
    })
}
