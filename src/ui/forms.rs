//! Modal form state for the three entities. Forms only collect text and
//! choices; turning that into typed rows is left to `crate::validation`, and
//! the forms render whatever error it reports.

use chrono::{Months, NaiveDate, NaiveDateTime};
use crossterm::event::KeyCode;

use crate::models::{
    Appointment, AppointmentFields, AppointmentStatus, BloodType, Doctor, DoctorFields, Patient,
    PatientFields, DATE_FORMAT, TIME_FORMAT,
};
use crate::validation::{
    validate_appointment, validate_doctor, validate_patient, AppointmentField, AppointmentInput,
    DoctorField, DoctorInput, FieldError, PatientField, PatientInput, NATIONAL_ID_LEN,
};

use super::screens::View;

/// Age used to seed the birth date of a new patient.
const DEFAULT_PATIENT_AGE_MONTHS: u32 = 30 * 12;

/// Whether a form creates a record or edits the one with `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormMode {
    Create,
    Edit { id: i64 },
}

impl FormMode {
    fn verb(self) -> &'static str {
        match self {
            FormMode::Create => "Add",
            FormMode::Edit { .. } => "Edit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldKind {
    Text,
    /// Changed with Left/Right rather than typed.
    Choice,
}

/// One rendered row of a form.
pub(crate) struct FormLine {
    pub(crate) label: &'static str,
    pub(crate) value: String,
    pub(crate) placeholder: &'static str,
    pub(crate) kind: FieldKind,
}

/// Outcome of a key press inside a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormAction {
    Submit,
    Cancel,
    Continue,
}

/// Shared surface the app uses to drive and draw any entity form.
pub(crate) trait EntityForm {
    fn title(&self) -> String;
    fn lines(&self) -> Vec<FormLine>;
    fn active_index(&self) -> usize;
    fn error(&self) -> Option<&str>;
    fn set_error(&mut self, message: Option<String>);
    fn focus_next(&mut self);
    fn focus_previous(&mut self);
    /// Append a character to the active field, returning whether it was
    /// accepted.
    fn push_char(&mut self, ch: char) -> bool;
    fn backspace(&mut self);
    /// Step a choice field, returning whether anything changed.
    fn cycle(&mut self, forward: bool) -> bool;
}

/// Apply a key to a form. Editing clears the previous error.
pub(crate) fn handle_form_key<F: EntityForm + ?Sized>(form: &mut F, code: KeyCode) -> FormAction {
    match code {
        KeyCode::Esc => return FormAction::Cancel,
        KeyCode::Enter => return FormAction::Submit,
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_previous(),
        KeyCode::Left | KeyCode::Right => {
            if form.cycle(code == KeyCode::Right) {
                form.set_error(None);
            }
        }
        KeyCode::Backspace => {
            form.backspace();
            form.set_error(None);
        }
        KeyCode::Char(ch) => {
            if form.push_char(ch) {
                form.set_error(None);
            }
        }
        _ => {}
    }
    FormAction::Continue
}

fn position<F: Copy + PartialEq>(all: &[F], current: F) -> usize {
    all.iter().position(|field| *field == current).unwrap_or(0)
}

fn step<F: Copy + PartialEq>(all: &[F], current: F, forward: bool) -> F {
    let len = all.len();
    let idx = position(all, current);
    if forward {
        all[(idx + 1) % len]
    } else {
        all[(idx + len - 1) % len]
    }
}

/// Walk an optional selection through `len` options, passing through "none"
/// between the last and the first.
pub(crate) fn cycle_option(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match (current, forward) {
        (None, true) => Some(0),
        (None, false) => Some(len - 1),
        (Some(idx), true) if idx + 1 < len => Some(idx + 1),
        (Some(_), true) => None,
        (Some(0), false) => None,
        (Some(idx), false) => Some(idx - 1),
    }
}

fn accepts_date_char(value: &str, ch: char) -> bool {
    (ch.is_ascii_digit() || ch == '-') && value.len() < 10
}

fn accepts_time_char(value: &str, ch: char) -> bool {
    (ch.is_ascii_digit() || ch == ':') && value.len() < 5
}

fn push_filtered(target: &mut String, ch: char, allowed: bool) -> bool {
    if allowed {
        target.push(ch);
    }
    allowed
}

/// Patient create/edit form.
#[derive(Debug, Clone)]
pub(crate) struct PatientForm {
    pub(crate) mode: FormMode,
    pub(crate) input: PatientInput,
    pub(crate) active: PatientField,
    pub(crate) error: Option<String>,
}

impl PatientForm {
    /// Blank form with the birth date seeded thirty years back.
    pub(crate) fn create(today: NaiveDate) -> Self {
        let birth_date = today
            .checked_sub_months(Months::new(DEFAULT_PATIENT_AGE_MONTHS))
            .unwrap_or(today);
        Self {
            mode: FormMode::Create,
            input: PatientInput {
                birth_date: birth_date.format(DATE_FORMAT).to_string(),
                ..PatientInput::default()
            },
            active: PatientField::default(),
            error: None,
        }
    }

    pub(crate) fn edit(patient: &Patient) -> Self {
        let fields = &patient.fields;
        Self {
            mode: FormMode::Edit { id: patient.id },
            input: PatientInput {
                first_name: fields.first_name.clone(),
                last_name: fields.last_name.clone(),
                national_id: fields.national_id.clone(),
                birth_date: fields
                    .birth_date
                    .map(|date| date.format(DATE_FORMAT).to_string())
                    .unwrap_or_default(),
                phone: fields.phone.clone(),
                address: fields.address.clone(),
                emergency_contact: fields.emergency_contact.clone(),
                blood_type: fields.blood_type,
                allergies: fields.allergies.clone(),
            },
            active: PatientField::default(),
            error: None,
        }
    }

    pub(crate) fn focus(&mut self, field: PatientField) {
        self.active = field;
    }

    pub(crate) fn submit(&self) -> Result<PatientFields, FieldError<PatientField>> {
        validate_patient(&self.input)
    }

    fn text_mut(&mut self, field: PatientField) -> Option<&mut String> {
        let input = &mut self.input;
        match field {
            PatientField::FirstName => Some(&mut input.first_name),
            PatientField::LastName => Some(&mut input.last_name),
            PatientField::NationalId => Some(&mut input.national_id),
            PatientField::BirthDate => Some(&mut input.birth_date),
            PatientField::Phone => Some(&mut input.phone),
            PatientField::Address => Some(&mut input.address),
            PatientField::EmergencyContact => Some(&mut input.emergency_contact),
            PatientField::BloodType => None,
            PatientField::Allergies => Some(&mut input.allergies),
        }
    }

    fn value(&self, field: PatientField) -> String {
        let input = &self.input;
        match field {
            PatientField::FirstName => input.first_name.clone(),
            PatientField::LastName => input.last_name.clone(),
            PatientField::NationalId => input.national_id.clone(),
            PatientField::BirthDate => input.birth_date.clone(),
            PatientField::Phone => input.phone.clone(),
            PatientField::Address => input.address.clone(),
            PatientField::EmergencyContact => input.emergency_contact.clone(),
            PatientField::BloodType => input
                .blood_type
                .map(|blood_type| blood_type.to_string())
                .unwrap_or_default(),
            PatientField::Allergies => input.allergies.clone(),
        }
    }
}

impl EntityForm for PatientForm {
    fn title(&self) -> String {
        format!("{} Patient", self.mode.verb())
    }

    fn lines(&self) -> Vec<FormLine> {
        PatientField::ALL
            .into_iter()
            .map(|field| FormLine {
                label: field.label(),
                value: self.value(field),
                placeholder: match field {
                    PatientField::FirstName | PatientField::LastName => "<required>",
                    PatientField::NationalId => "<10 digits>",
                    PatientField::BirthDate => "<YYYY-MM-DD>",
                    PatientField::BloodType => "<not set>",
                    _ => "<optional>",
                },
                kind: if field == PatientField::BloodType {
                    FieldKind::Choice
                } else {
                    FieldKind::Text
                },
            })
            .collect()
    }

    fn active_index(&self) -> usize {
        position(&PatientField::ALL, self.active)
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn set_error(&mut self, message: Option<String>) {
        self.error = message;
    }

    fn focus_next(&mut self) {
        self.active = step(&PatientField::ALL, self.active, true);
    }

    fn focus_previous(&mut self) {
        self.active = step(&PatientField::ALL, self.active, false);
    }

    fn push_char(&mut self, ch: char) -> bool {
        let field = self.active;
        let Some(target) = self.text_mut(field) else {
            return false;
        };
        let allowed = match field {
            PatientField::NationalId => ch.is_ascii_digit() && target.len() < NATIONAL_ID_LEN,
            PatientField::BirthDate => accepts_date_char(target, ch),
            _ => !ch.is_control(),
        };
        push_filtered(target, ch, allowed)
    }

    fn backspace(&mut self) {
        let field = self.active;
        if let Some(target) = self.text_mut(field) {
            target.pop();
        }
    }

    fn cycle(&mut self, forward: bool) -> bool {
        if self.active != PatientField::BloodType {
            return false;
        }
        let current = self
            .input
            .blood_type
            .and_then(|blood_type| BloodType::ALL.iter().position(|b| *b == blood_type));
        self.input.blood_type =
            cycle_option(current, BloodType::ALL.len(), forward).map(|idx| BloodType::ALL[idx]);
        true
    }
}

/// Doctor create/edit form.
#[derive(Debug, Clone)]
pub(crate) struct DoctorForm {
    pub(crate) mode: FormMode,
    pub(crate) input: DoctorInput,
    pub(crate) active: DoctorField,
    pub(crate) error: Option<String>,
}

impl DoctorForm {
    pub(crate) fn create() -> Self {
        Self {
            mode: FormMode::Create,
            input: DoctorInput {
                consultation_fee: "0".into(),
                ..DoctorInput::default()
            },
            active: DoctorField::default(),
            error: None,
        }
    }

    pub(crate) fn edit(doctor: &Doctor) -> Self {
        let fields = &doctor.fields;
        Self {
            mode: FormMode::Edit { id: doctor.id },
            input: DoctorInput {
                first_name: fields.first_name.clone(),
                last_name: fields.last_name.clone(),
                specialty: fields.specialty.clone(),
                phone: fields.phone.clone(),
                email: fields.email.clone(),
                license_number: fields.license_number.clone().unwrap_or_default(),
                office_number: fields.office_number.clone(),
                consultation_fee: fields.consultation_fee.to_string(),
            },
            active: DoctorField::default(),
            error: None,
        }
    }

    pub(crate) fn focus(&mut self, field: DoctorField) {
        self.active = field;
    }

    pub(crate) fn submit(&self) -> Result<DoctorFields, FieldError<DoctorField>> {
        validate_doctor(&self.input)
    }

    fn text_mut(&mut self, field: DoctorField) -> &mut String {
        let input = &mut self.input;
        match field {
            DoctorField::FirstName => &mut input.first_name,
            DoctorField::LastName => &mut input.last_name,
            DoctorField::Specialty => &mut input.specialty,
            DoctorField::Phone => &mut input.phone,
            DoctorField::Email => &mut input.email,
            DoctorField::LicenseNumber => &mut input.license_number,
            DoctorField::OfficeNumber => &mut input.office_number,
            DoctorField::ConsultationFee => &mut input.consultation_fee,
        }
    }

    fn value(&self, field: DoctorField) -> &str {
        let input = &self.input;
        match field {
            DoctorField::FirstName => &input.first_name,
            DoctorField::LastName => &input.last_name,
            DoctorField::Specialty => &input.specialty,
            DoctorField::Phone => &input.phone,
            DoctorField::Email => &input.email,
            DoctorField::LicenseNumber => &input.license_number,
            DoctorField::OfficeNumber => &input.office_number,
            DoctorField::ConsultationFee => &input.consultation_fee,
        }
    }
}

impl EntityForm for DoctorForm {
    fn title(&self) -> String {
        format!("{} Doctor", self.mode.verb())
    }

    fn lines(&self) -> Vec<FormLine> {
        DoctorField::ALL
            .into_iter()
            .map(|field| FormLine {
                label: field.label(),
                value: self.value(field).to_string(),
                placeholder: match field {
                    DoctorField::FirstName | DoctorField::LastName | DoctorField::Specialty => {
                        "<required>"
                    }
                    DoctorField::ConsultationFee => "0",
                    _ => "<optional>",
                },
                kind: FieldKind::Text,
            })
            .collect()
    }

    fn active_index(&self) -> usize {
        position(&DoctorField::ALL, self.active)
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn set_error(&mut self, message: Option<String>) {
        self.error = message;
    }

    fn focus_next(&mut self) {
        self.active = step(&DoctorField::ALL, self.active, true);
    }

    fn focus_previous(&mut self) {
        self.active = step(&DoctorField::ALL, self.active, false);
    }

    fn push_char(&mut self, ch: char) -> bool {
        let field = self.active;
        let target = self.text_mut(field);
        let allowed = match field {
            DoctorField::ConsultationFee => ch.is_ascii_digit() || ch == '.',
            _ => !ch.is_control(),
        };
        push_filtered(target, ch, allowed)
    }

    fn backspace(&mut self) {
        let field = self.active;
        self.text_mut(field).pop();
    }

    fn cycle(&mut self, _forward: bool) -> bool {
        false
    }
}

/// An entry in the appointment form's patient or doctor picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PickerOption {
    pub(crate) id: i64,
    pub(crate) label: String,
}

impl PickerOption {
    pub(crate) fn patients(patients: &[Patient]) -> Vec<Self> {
        patients
            .iter()
            .map(|patient| Self {
                id: patient.id,
                label: patient.picker_label(),
            })
            .collect()
    }

    pub(crate) fn doctors(doctors: &[Doctor]) -> Vec<Self> {
        doctors
            .iter()
            .map(|doctor| Self {
                id: doctor.id,
                label: doctor.picker_label(),
            })
            .collect()
    }
}

fn cycle_picker(options: &[PickerOption], current: Option<i64>, forward: bool) -> Option<i64> {
    let idx = current.and_then(|id| options.iter().position(|option| option.id == id));
    cycle_option(idx, options.len(), forward).map(|idx| options[idx].id)
}

fn known_id(options: &[PickerOption], id: i64) -> Option<i64> {
    options.iter().any(|option| option.id == id).then_some(id)
}

fn picker_label(options: &[PickerOption], current: Option<i64>) -> String {
    current
        .and_then(|id| options.iter().find(|option| option.id == id))
        .map(|option| option.label.clone())
        .unwrap_or_default()
}

/// Appointment create/edit form. Patients and doctors can only be picked from
/// the records loaded when the form opened.
#[derive(Debug, Clone)]
pub(crate) struct AppointmentForm {
    pub(crate) mode: FormMode,
    pub(crate) input: AppointmentInput,
    pub(crate) patients: Vec<PickerOption>,
    pub(crate) doctors: Vec<PickerOption>,
    pub(crate) active: AppointmentField,
    pub(crate) error: Option<String>,
}

impl AppointmentForm {
    /// New appointment defaulting to the current date and minute.
    pub(crate) fn create(
        patients: Vec<PickerOption>,
        doctors: Vec<PickerOption>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            mode: FormMode::Create,
            input: AppointmentInput {
                date: now.date().format(DATE_FORMAT).to_string(),
                time: now.time().format(TIME_FORMAT).to_string(),
                ..AppointmentInput::default()
            },
            patients,
            doctors,
            active: AppointmentField::default(),
            error: None,
        }
    }

    /// References to records that no longer exist start unselected.
    pub(crate) fn edit(
        appointment: &Appointment,
        patients: Vec<PickerOption>,
        doctors: Vec<PickerOption>,
    ) -> Self {
        let fields = &appointment.fields;
        Self {
            mode: FormMode::Edit { id: appointment.id },
            input: AppointmentInput {
                patient_id: known_id(&patients, fields.patient_id),
                doctor_id: known_id(&doctors, fields.doctor_id),
                date: fields.date.format(DATE_FORMAT).to_string(),
                time: fields.time.format(TIME_FORMAT).to_string(),
                status: fields.status,
                notes: fields.notes.clone(),
            },
            patients,
            doctors,
            active: AppointmentField::default(),
            error: None,
        }
    }

    pub(crate) fn focus(&mut self, field: AppointmentField) {
        self.active = field;
    }

    /// Only new appointments are held to "not before today".
    pub(crate) fn submit(
        &self,
        today: NaiveDate,
    ) -> Result<AppointmentFields, FieldError<AppointmentField>> {
        let earliest = match self.mode {
            FormMode::Create => Some(today),
            FormMode::Edit { .. } => None,
        };
        validate_appointment(&self.input, earliest)
    }

    fn text_mut(&mut self, field: AppointmentField) -> Option<&mut String> {
        match field {
            AppointmentField::Date => Some(&mut self.input.date),
            AppointmentField::Time => Some(&mut self.input.time),
            AppointmentField::Notes => Some(&mut self.input.notes),
            AppointmentField::Patient | AppointmentField::Doctor | AppointmentField::Status => {
                None
            }
        }
    }

    fn value(&self, field: AppointmentField) -> String {
        match field {
            AppointmentField::Patient => picker_label(&self.patients, self.input.patient_id),
            AppointmentField::Doctor => picker_label(&self.doctors, self.input.doctor_id),
            AppointmentField::Date => self.input.date.clone(),
            AppointmentField::Time => self.input.time.clone(),
            AppointmentField::Status => self.input.status.to_string(),
            AppointmentField::Notes => self.input.notes.clone(),
        }
    }
}

impl EntityForm for AppointmentForm {
    fn title(&self) -> String {
        format!("{} Appointment", self.mode.verb())
    }

    fn lines(&self) -> Vec<FormLine> {
        AppointmentField::ALL
            .into_iter()
            .map(|field| FormLine {
                label: field.label(),
                value: self.value(field),
                placeholder: match field {
                    AppointmentField::Patient if self.patients.is_empty() => "<no patients on file>",
                    AppointmentField::Doctor if self.doctors.is_empty() => "<no doctors on file>",
                    AppointmentField::Patient | AppointmentField::Doctor => "<select with ←/→>",
                    AppointmentField::Date => "<YYYY-MM-DD>",
                    AppointmentField::Time => "<HH:MM>",
                    _ => "<optional>",
                },
                kind: match field {
                    AppointmentField::Patient
                    | AppointmentField::Doctor
                    | AppointmentField::Status => FieldKind::Choice,
                    _ => FieldKind::Text,
                },
            })
            .collect()
    }

    fn active_index(&self) -> usize {
        position(&AppointmentField::ALL, self.active)
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn set_error(&mut self, message: Option<String>) {
        self.error = message;
    }

    fn focus_next(&mut self) {
        self.active = step(&AppointmentField::ALL, self.active, true);
    }

    fn focus_previous(&mut self) {
        self.active = step(&AppointmentField::ALL, self.active, false);
    }

    fn push_char(&mut self, ch: char) -> bool {
        let field = self.active;
        let Some(target) = self.text_mut(field) else {
            return false;
        };
        let allowed = match field {
            AppointmentField::Date => accepts_date_char(target, ch),
            AppointmentField::Time => accepts_time_char(target, ch),
            _ => !ch.is_control(),
        };
        push_filtered(target, ch, allowed)
    }

    fn backspace(&mut self) {
        let field = self.active;
        if let Some(target) = self.text_mut(field) {
            target.pop();
        }
    }

    fn cycle(&mut self, forward: bool) -> bool {
        match self.active {
            AppointmentField::Patient => {
                self.input.patient_id = cycle_picker(&self.patients, self.input.patient_id, forward);
                true
            }
            AppointmentField::Doctor => {
                self.input.doctor_id = cycle_picker(&self.doctors, self.input.doctor_id, forward);
                true
            }
            AppointmentField::Status => {
                let statuses = AppointmentStatus::ALL;
                self.input.status = step(&statuses, self.input.status, forward);
                true
            }
            _ => false,
        }
    }
}

/// Pending delete awaiting confirmation.
#[derive(Debug, Clone)]
pub(crate) struct ConfirmDelete {
    pub(crate) view: View,
    pub(crate) id: i64,
    pub(crate) summary: String,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;
    use crate::validation::ValidationError;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn type_text<F: EntityForm>(form: &mut F, text: &str) {
        for ch in text.chars() {
            handle_form_key(form, KeyCode::Char(ch));
        }
    }

    fn options(ids: &[i64]) -> Vec<PickerOption> {
        ids.iter()
            .map(|id| PickerOption {
                id: *id,
                label: format!("Option {id}"),
            })
            .collect()
    }

    #[test]
    fn cycle_option_passes_through_none() {
        assert_eq!(cycle_option(None, 2, true), Some(0));
        assert_eq!(cycle_option(Some(1), 2, true), None);
        assert_eq!(cycle_option(Some(0), 2, false), None);
        assert_eq!(cycle_option(None, 2, false), Some(1));
        assert_eq!(cycle_option(None, 0, true), None);
    }

    #[test]
    fn new_patient_form_seeds_birth_date_thirty_years_back() {
        let form = PatientForm::create(day(2026, 10, 16));
        assert_eq!(form.input.birth_date, "1996-10-16");
        assert_eq!(form.title(), "Add Patient");
    }

    #[test]
    fn national_id_field_accepts_only_ten_digits() {
        let mut form = PatientForm::create(day(2026, 1, 1));
        form.focus(PatientField::NationalId);
        type_text(&mut form, "12ab345678901");
        assert_eq!(form.input.national_id, "1234567890");
    }

    #[test]
    fn tab_walks_fields_and_wraps() {
        let mut form = DoctorForm::create();
        handle_form_key(&mut form, KeyCode::BackTab);
        assert_eq!(form.active, DoctorField::ConsultationFee);
        handle_form_key(&mut form, KeyCode::Tab);
        assert_eq!(form.active, DoctorField::FirstName);
    }

    #[test]
    fn blood_type_is_a_choice_not_text() {
        let mut form = PatientForm::create(day(2026, 1, 1));
        form.focus(PatientField::BloodType);
        assert!(!form.push_char('A'));
        handle_form_key(&mut form, KeyCode::Right);
        assert_eq!(form.input.blood_type, Some(BloodType::APositive));
        handle_form_key(&mut form, KeyCode::Left);
        assert_eq!(form.input.blood_type, None);
    }

    #[test]
    fn editing_clears_a_previous_error() {
        let mut form = DoctorForm::create();
        form.error = Some("Specialty is required.".into());
        handle_form_key(&mut form, KeyCode::Char('x'));
        assert!(form.error.is_none());
    }

    #[test]
    fn enter_and_esc_are_reported_to_the_caller() {
        let mut form = DoctorForm::create();
        assert_eq!(handle_form_key(&mut form, KeyCode::Enter), FormAction::Submit);
        assert_eq!(handle_form_key(&mut form, KeyCode::Esc), FormAction::Cancel);
    }

    #[test]
    fn edit_form_prefills_every_doctor_field() {
        let doctor = Doctor {
            id: 8,
            fields: DoctorFields {
                first_name: "Sara".into(),
                last_name: "Karimi".into(),
                specialty: "Cardiology".into(),
                license_number: Some("MD-100".into()),
                consultation_fee: 120.0,
                ..DoctorFields::default()
            },
        };
        let form = DoctorForm::edit(&doctor);
        assert_eq!(form.mode, FormMode::Edit { id: 8 });
        assert_eq!(form.submit().unwrap(), doctor.fields);
    }

    #[test]
    fn appointment_pickers_cycle_through_loaded_records() {
        let now = day(2030, 1, 1).and_hms_opt(9, 41, 12).unwrap();
        let mut form = AppointmentForm::create(options(&[5, 3]), options(&[2]), now);
        assert_eq!(form.input.time, "09:41");
        handle_form_key(&mut form, KeyCode::Right);
        handle_form_key(&mut form, KeyCode::Right);
        assert_eq!(form.input.patient_id, Some(3));
        assert_eq!(form.lines()[0].value, "Option 3");

        let err = form.submit(day(2030, 1, 1)).unwrap_err();
        assert_eq!(err.field, AppointmentField::Doctor);
    }

    #[test]
    fn appointment_edit_leaves_deleted_references_unselected() {
        let appointment = Appointment {
            id: 4,
            fields: AppointmentFields {
                patient_id: 99,
                doctor_id: 2,
                date: day(2020, 5, 1),
                time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                status: AppointmentStatus::Completed,
                notes: "follow-up".into(),
            },
        };
        let form = AppointmentForm::edit(&appointment, options(&[1]), options(&[2]));
        assert_eq!(form.input.patient_id, None);
        assert_eq!(form.input.doctor_id, Some(2));
    }

    #[test]
    fn past_dates_block_creation_but_not_edits() {
        let today = day(2030, 1, 10);
        let now = today.and_hms_opt(8, 0, 0).unwrap();
        let mut form = AppointmentForm::create(options(&[1]), options(&[1]), now);
        form.input.patient_id = Some(1);
        form.input.doctor_id = Some(1);
        form.input.date = "2030-01-09".into();
        assert_eq!(
            form.submit(today).unwrap_err().error,
            ValidationError::DateInPast
        );

        form.mode = FormMode::Edit { id: 1 };
        assert!(form.submit(today).is_ok());
    }

    #[test]
    fn status_cycles_through_all_values() {
        let now = day(2030, 1, 1).and_hms_opt(8, 0, 0).unwrap();
        let mut form = AppointmentForm::create(Vec::new(), Vec::new(), now);
        form.focus(AppointmentField::Status);
        handle_form_key(&mut form, KeyCode::Left);
        assert_eq!(form.input.status, AppointmentStatus::Postponed);
    }
}
