//! Patient registration, updates and deletion.

use super::shared::{require_patient, ATTENDING_PHYSICIAN, PATIENT_ADMITTED_BY};
use crate::constants::{MAX_CONTACT_LEN, MAX_INSURANCE_ID_LEN, MAX_NAME_LEN, MAX_ROOM_LEN};
use crate::models::{NewPatient, Patient, PatientUpdate, RowId};
use crate::store::Store;
use crate::validation::Validator;
use crate::{IcuError, IcuResult};
use chrono::Utc;
use icu_ids::IdPrefix;

#[derive(Clone)]
pub struct PatientService {
    store: Store,
}

impl PatientService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Register a patient.
    ///
    /// The `PAT` identifier is issued inside the same store write that inserts the row, and
    /// `admission_date` is set to now.
    pub fn create(&self, req: NewPatient) -> IcuResult<Patient> {
        let mut v = Validator::new();
        let name = v.required("name", &req.name, MAX_NAME_LEN);
        v.max_len("contact_number", &req.contact_number, MAX_CONTACT_LEN);
        v.max_len("emergency_contact", &req.emergency_contact, MAX_CONTACT_LEN);
        v.max_len("emergency_contact_name", &req.emergency_contact_name, MAX_NAME_LEN);
        v.max_len("room_number", &req.room_number, MAX_ROOM_LEN);
        v.max_len("bed_number", &req.bed_number, MAX_ROOM_LEN);
        v.max_len("insurance_id", &req.insurance_id, MAX_INSURANCE_ID_LEN);

        let patient = self.store.write(|t| {
            ATTENDING_PHYSICIAN.check_opt(&mut v, t, req.attending_physician);
            PATIENT_ADMITTED_BY.check_opt(&mut v, t, req.admitted_by);
            v.finish()?;

            let patient_id = t.issue_record_id(IdPrefix::Patient)?;
            let now = Utc::now();
            Ok(t.patients
                .insert_with(|id| Patient {
                    id,
                    patient_id,
                    name,
                    age: req.age,
                    gender: req.gender,
                    date_of_birth: req.date_of_birth,
                    contact_number: req.contact_number,
                    emergency_contact: req.emergency_contact,
                    emergency_contact_name: req.emergency_contact_name,
                    diagnosis: req.diagnosis,
                    medical_history: req.medical_history,
                    status: req.status.unwrap_or_default(),
                    room_number: req.room_number,
                    bed_number: req.bed_number,
                    admission_date: now,
                    discharge_date: req.discharge_date,
                    insurance_id: req.insurance_id,
                    insurance_verified: req.insurance_verified,
                    attending_physician: req.attending_physician,
                    admitted_by: req.admitted_by,
                    additional_notes: req.additional_notes,
                    created_at: now,
                    updated_at: now,
                })
                .clone())
        })?;

        tracing::info!("registered patient {}", patient.patient_id);
        Ok(patient)
    }

    /// All patients, most recently admitted first.
    pub fn list(&self) -> IcuResult<Vec<Patient>> {
        self.store.read(|t| {
            let mut patients: Vec<Patient> = t.patients.values().cloned().collect();
            patients.sort_by(|a, b| {
                b.admission_date
                    .cmp(&a.admission_date)
                    .then(b.id.cmp(&a.id))
            });
            Ok(patients)
        })
    }

    pub fn get(&self, id: RowId) -> IcuResult<Patient> {
        self.store.read(|t| require_patient(t, id).cloned())
    }

    /// Apply a partial update. The `PAT` identifier and admission date never change.
    pub fn update(&self, id: RowId, update: PatientUpdate) -> IcuResult<Patient> {
        self.store.write(|t| {
            require_patient(t, id)?;

            let mut v = Validator::new();
            let name = update
                .name
                .as_deref()
                .map(|name| v.required("name", name, MAX_NAME_LEN));
            for (field, value, max) in [
                ("contact_number", &update.contact_number, MAX_CONTACT_LEN),
                ("emergency_contact", &update.emergency_contact, MAX_CONTACT_LEN),
                ("emergency_contact_name", &update.emergency_contact_name, MAX_NAME_LEN),
                ("room_number", &update.room_number, MAX_ROOM_LEN),
                ("bed_number", &update.bed_number, MAX_ROOM_LEN),
                ("insurance_id", &update.insurance_id, MAX_INSURANCE_ID_LEN),
            ] {
                if let Some(value) = value {
                    v.max_len(field, value, max);
                }
            }
            if let Some(physician) = update.attending_physician {
                ATTENDING_PHYSICIAN.check_opt(&mut v, t, physician);
            }
            if let Some(admitted_by) = update.admitted_by {
                PATIENT_ADMITTED_BY.check_opt(&mut v, t, admitted_by);
            }
            v.finish()?;

            let patient = t
                .patients
                .get_mut(id)
                .ok_or_else(|| IcuError::not_found("Patient", id))?;
            if let Some(name) = name {
                patient.name = name;
            }
            if let Some(age) = update.age {
                patient.age = age;
            }
            if let Some(gender) = update.gender {
                patient.gender = gender;
            }
            if let Some(dob) = update.date_of_birth {
                patient.date_of_birth = dob;
            }
            if let Some(contact) = update.contact_number {
                patient.contact_number = contact;
            }
            if let Some(contact) = update.emergency_contact {
                patient.emergency_contact = contact;
            }
            if let Some(contact_name) = update.emergency_contact_name {
                patient.emergency_contact_name = contact_name;
            }
            if let Some(diagnosis) = update.diagnosis {
                patient.diagnosis = diagnosis;
            }
            if let Some(history) = update.medical_history {
                patient.medical_history = history;
            }
            if let Some(status) = update.status {
                patient.status = status;
            }
            if let Some(room) = update.room_number {
                patient.room_number = room;
            }
            if let Some(bed) = update.bed_number {
                patient.bed_number = bed;
            }
            if let Some(discharge) = update.discharge_date {
                patient.discharge_date = discharge;
            }
            if let Some(insurance_id) = update.insurance_id {
                patient.insurance_id = insurance_id;
            }
            if let Some(verified) = update.insurance_verified {
                patient.insurance_verified = verified;
            }
            if let Some(physician) = update.attending_physician {
                patient.attending_physician = physician;
            }
            if let Some(admitted_by) = update.admitted_by {
                patient.admitted_by = admitted_by;
            }
            if let Some(notes) = update.additional_notes {
                patient.additional_notes = notes;
            }
            patient.updated_at = Utc::now();
            Ok(patient.clone())
        })
    }

    /// Delete a patient and every record that belongs to it.
    pub fn delete(&self, id: RowId) -> IcuResult<Patient> {
        let patient = self.store.write(|t| {
            t.delete_patient(id)
                .ok_or_else(|| IcuError::not_found("Patient", id))
        })?;
        tracing::info!("deleted patient {}", patient.patient_id);
        Ok(patient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use crate::models::{Gender, NewUser, PatientStatus, Role, StaffView};
    use crate::repositories::StaffService;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn services() -> (PatientService, StaffService) {
        let store = Store::in_memory();
        (
            PatientService::new(store.clone()),
            StaffService::new(store, Arc::new(CoreConfig::in_memory())),
        )
    }

    fn user(staff: &StaffService, username: &str, role: Role) -> RowId {
        staff
            .create_user(NewUser {
                username: username.into(),
                password: "pw".into(),
                role: Some(role),
                ..Default::default()
            })
            .unwrap()
            .id
    }

    #[test]
    fn registration_defaults_and_identifier() {
        let (patients, _) = services();
        let created = patients
            .create(NewPatient::new("Jane Doe", 42, Gender::Female))
            .unwrap();
        assert_eq!(created.status, PatientStatus::Stable);
        assert!(created.patient_id.to_string().starts_with("PAT"));
        assert_eq!(created.patient_id.to_string().len(), 20);

        let fetched = patients.get(created.id).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn identifiers_are_unique_within_one_second() {
        let (patients, _) = services();
        let ids: HashSet<String> = (0..50)
            .map(|i| {
                patients
                    .create(NewPatient::new(format!("P{}", i), 30, Gender::Other))
                    .unwrap()
                    .patient_id
                    .to_string()
            })
            .collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn identifier_survives_updates() {
        let (patients, _) = services();
        let created = patients
            .create(NewPatient::new("Jane Doe", 42, Gender::Female))
            .unwrap();
        let updated = patients
            .update(
                created.id,
                PatientUpdate {
                    status: Some(PatientStatus::Critical),
                    room_number: Some("ICU-3".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.patient_id, created.patient_id);
        assert_eq!(updated.admission_date, created.admission_date);
        assert_eq!(updated.status, PatientStatus::Critical);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn attending_physician_must_be_a_doctor() {
        let (patients, staff) = services();
        let nurse = user(&staff, "nurse", Role::Nurse);
        let doctor = user(&staff, "doctor", Role::Doctor);

        let mut req = NewPatient::new("Jane Doe", 42, Gender::Female);
        req.attending_physician = Some(nurse);
        req.admitted_by = Some(nurse);
        let err = patients.create(req).unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.contains_key("attending_physician"));
        assert!(!fields.contains_key("admitted_by"));
        assert!(patients.list().unwrap().is_empty());

        let created = patients
            .create(NewPatient::new("John Roe", 50, Gender::Male))
            .unwrap();
        let updated = patients
            .update(
                created.id,
                PatientUpdate {
                    attending_physician: Some(Some(doctor)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.attending_physician, Some(doctor));

        let cleared = patients
            .update(
                created.id,
                PatientUpdate {
                    attending_physician: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(cleared.attending_physician, None);
    }

    #[test]
    fn deleting_doctor_clears_attending_physician() {
        let (patients, staff) = services();
        let doctor = staff
            .create_in_view(
                StaffView::Doctors,
                NewUser {
                    username: "dr".into(),
                    password: "pw".into(),
                    ..Default::default()
                },
            )
            .unwrap();
        let mut req = NewPatient::new("Jane Doe", 42, Gender::Female);
        req.attending_physician = Some(doctor.id);
        let patient = patients.create(req).unwrap();

        staff.delete_user(doctor.id).unwrap();
        assert_eq!(patients.get(patient.id).unwrap().attending_physician, None);
    }

    #[test]
    fn field_lengths_are_bounded() {
        let (patients, _) = services();
        let mut req = NewPatient::new(" ", 42, Gender::Female);
        req.room_number = "ROOM-123456".into();
        req.contact_number = "+44 0000 000 000 0".into();
        let err = patients.create(req).unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(
            fields.keys().map(String::as_str).collect::<Vec<_>>(),
            ["contact_number", "name", "room_number"]
        );
    }

    #[test]
    fn list_is_newest_first_and_missing_ids_are_not_found() {
        let (patients, _) = services();
        let first = patients.create(NewPatient::new("A", 1, Gender::Male)).unwrap();
        let second = patients.create(NewPatient::new("B", 2, Gender::Male)).unwrap();
        let listed: Vec<RowId> = patients.list().unwrap().iter().map(|p| p.id).collect();
        assert_eq!(listed, vec![second.id, first.id]);

        assert!(matches!(
            patients.get(999).unwrap_err(),
            IcuError::NotFound { entity: "Patient", .. }
        ));
        assert!(matches!(
            patients.delete(999).unwrap_err(),
            IcuError::NotFound { .. }
        ));
    }
}
