use chrono::{NaiveDate, NaiveTime};
use hospital_manager::validation::{validate_national_id, ValidationError};
use hospital_manager::{
    AppointmentFields, AppointmentStatus, AppointmentStore, BloodType, Database, DoctorFields,
    DoctorStore, PatientFields, PatientStore, StoreError,
};
use tempfile::TempDir;

struct Stores {
    _dir: TempDir,
    patients: PatientStore,
    doctors: DoctorStore,
    appointments: AppointmentStore,
}

fn stores() -> Stores {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data").join("hospital.db"));
    Stores {
        patients: PatientStore::new(db.clone()),
        doctors: DoctorStore::new(db.clone()),
        appointments: AppointmentStore::new(db),
        _dir: dir,
    }
}

fn patient(first: &str, last: &str, national_id: &str) -> PatientFields {
    PatientFields {
        first_name: first.into(),
        last_name: last.into(),
        national_id: national_id.into(),
        ..PatientFields::default()
    }
}

fn doctor(first: &str, license: Option<&str>) -> DoctorFields {
    DoctorFields {
        first_name: first.into(),
        last_name: "Karimi".into(),
        specialty: "Cardiology".into(),
        license_number: license.map(str::to_string),
        ..DoctorFields::default()
    }
}

fn appointment(patient_id: i64, doctor_id: i64) -> AppointmentFields {
    AppointmentFields {
        patient_id,
        doctor_id,
        date: NaiveDate::from_ymd_opt(2031, 3, 14).unwrap(),
        time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
        status: AppointmentStatus::Active,
        notes: "first visit".into(),
    }
}

#[test]
fn created_patient_is_retrievable() {
    let s = stores();
    let mut fields = patient("Ali", "Rezaei", "1234567890");
    fields.birth_date = NaiveDate::from_ymd_opt(1990, 5, 17);
    fields.blood_type = Some(BloodType::ONegative);

    let id = s.patients.create(&fields).unwrap();
    let stored = s.patients.get(id).unwrap().unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.fields, fields);
}

#[test]
fn duplicate_national_id_leaves_table_unchanged() {
    let s = stores();
    s.patients
        .create(&patient("Ali", "Rezaei", "1234567890"))
        .unwrap();

    let err = s
        .patients
        .create(&patient("Sara", "Ahmadi", "1234567890"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate { field: "National ID" }));

    let all = s.patients.list().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].fields.first_name, "Ali");
}

#[test]
fn national_id_must_be_ten_digits() {
    assert!(validate_national_id("1234567890").is_ok());
    for bad in ["123456789", "12345678901", "12345abcde", "", "12345 7890"] {
        assert_eq!(
            validate_national_id(bad),
            Err(ValidationError::NationalIdFormat),
            "{bad:?}"
        );
    }
}

#[test]
fn update_keeps_id_and_unedited_fields() {
    let s = stores();
    let mut fields = patient("Ali", "Rezaei", "1234567890");
    fields.address = "12 Valiasr St".into();
    let id = s.patients.create(&fields).unwrap();

    fields.phone = "0912 000 0000".into();
    s.patients.update(id, &fields).unwrap();

    let stored = s.patients.get(id).unwrap().unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.fields.address, "12 Valiasr St");
    assert_eq!(stored.fields.phone, "0912 000 0000");
}

#[test]
fn deleted_records_disappear_from_lists() {
    let s = stores();
    let keep = s.doctors.create(&doctor("Sara", None)).unwrap();
    let drop = s.doctors.create(&doctor("Reza", None)).unwrap();

    s.doctors.delete(drop).unwrap();
    let ids: Vec<i64> = s.doctors.list().unwrap().iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![keep]);
    assert!(s.doctors.get(drop).unwrap().is_none());
}

#[test]
fn deleting_referenced_records_keeps_appointments() {
    let s = stores();
    let patient_id = s
        .patients
        .create(&patient("Ali", "Rezaei", "1234567890"))
        .unwrap();
    let doctor_id = s.doctors.create(&doctor("Sara", Some("MD-1"))).unwrap();
    let appointment_id = s
        .appointments
        .create(&appointment(patient_id, doctor_id))
        .unwrap();

    s.patients.delete(patient_id).unwrap();
    s.doctors.delete(doctor_id).unwrap();

    let rows = s.appointments.list().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, appointment_id);
    assert_eq!(rows[0].patient_name, None);
    assert_eq!(rows[0].doctor_name, None);

    let stored = s.appointments.get(appointment_id).unwrap().unwrap();
    assert_eq!(stored.fields.patient_id, patient_id);
}

#[test]
fn appointment_list_joins_names() {
    let s = stores();
    let patient_id = s
        .patients
        .create(&patient("Ali", "Rezaei", "1234567890"))
        .unwrap();
    let doctor_id = s.doctors.create(&doctor("Sara", None)).unwrap();
    s.appointments
        .create(&appointment(patient_id, doctor_id))
        .unwrap();

    let row = &s.appointments.list().unwrap()[0];
    assert_eq!(row.patient_name.as_deref(), Some("Ali Rezaei"));
    assert_eq!(row.doctor_name.as_deref(), Some("Sara Karimi"));
    assert_eq!(row.time, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
}

#[test]
fn search_is_case_sensitive_across_name_and_id() {
    let s = stores();
    s.patients
        .create(&patient("Ali", "Rezaei", "1234567890"))
        .unwrap();
    s.patients
        .create(&patient("Sara", "Alavi", "5550001111"))
        .unwrap();

    assert_eq!(s.patients.search("Ali").unwrap().len(), 1);
    assert_eq!(s.patients.search("Al").unwrap().len(), 2);
    assert_eq!(s.patients.search("555").unwrap().len(), 1);
    assert!(s.patients.search("ali").unwrap().is_empty());
    assert!(s.patients.search("Nobody").unwrap().is_empty());
}

#[test]
fn duplicate_license_is_rejected_once() {
    let s = stores();
    s.doctors.create(&doctor("Sara", Some("MD-100"))).unwrap();

    let err = s.doctors.create(&doctor("Reza", Some("MD-100"))).unwrap_err();
    assert!(err.is_duplicate());
    assert_eq!(
        err.to_string(),
        StoreError::Duplicate {
            field: "License number"
        }
        .to_string()
    );

    let listed: Vec<_> = s
        .doctors
        .list()
        .unwrap()
        .into_iter()
        .filter(|d| d.fields.license_number.as_deref() == Some("MD-100"))
        .collect();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].fields.first_name, "Sara");
}

#[test]
fn doctors_without_license_do_not_collide() {
    let s = stores();
    s.doctors.create(&doctor("Sara", None)).unwrap();
    s.doctors.create(&doctor("Reza", None)).unwrap();
    assert_eq!(s.doctors.list().unwrap().len(), 2);
}

#[test]
fn updating_a_missing_record_is_not_found() {
    let s = stores();
    let err = s
        .patients
        .update(404, &patient("Ali", "Rezaei", "1234567890"))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { id: 404, .. }));
    assert!(matches!(
        s.appointments.delete(7),
        Err(StoreError::NotFound { id: 7, .. })
    ));
}
