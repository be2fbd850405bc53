//! Clinical records attached to a patient.
//!
//! Vitals, admissions and history entries are append-only. Prescriptions and treatment plans
//! may be updated but are never deleted on their own; they go away only with their patient.

use super::shared::{require_patient, RoleGate, ADMISSION_ADMITTED_BY, PRESCRIBED_BY};
use crate::constants::{MAX_NAME_LEN, MAX_ROOM_LEN, MAX_SHORT_TEXT_LEN};
use crate::models::{
    Admission, NewAdmission, NewHistoryEntry, NewPrescription, NewTreatment, NewVitals,
    Prescription, PrescriptionUpdate, RowId, Treatment, TreatmentHistory, TreatmentUpdate, Vitals,
};
use crate::store::{Store, Tables};
use crate::validation::Validator;
use crate::{IcuError, IcuResult};
use chrono::Utc;
use icu_ids::IdPrefix;

const RECORDED_BY: RoleGate = RoleGate::any("recorded_by");
const PERFORMED_BY: RoleGate = RoleGate::any("performed_by");

#[derive(Clone)]
pub struct ClinicalService {
    store: Store,
}

impl ClinicalService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    // ========================================================================
    // VITALS
    // ========================================================================

    pub fn record_vitals(&self, patient: RowId, req: NewVitals) -> IcuResult<Vitals> {
        self.store.write(|t| {
            require_patient(t, patient)?;

            let mut v = Validator::new();
            check_vital_signs(
                &mut v,
                [
                    ("heart_rate", req.heart_rate),
                    ("blood_pressure_systolic", req.blood_pressure_systolic),
                    ("blood_pressure_diastolic", req.blood_pressure_diastolic),
                ],
            );
            if let Some(rate) = req.respiratory_rate {
                v.range("respiratory_rate", rate.into(), 0, i32::MAX.into());
            }
            v.range("oxygen_saturation", req.oxygen_saturation.into(), 0, 100);
            v.temperature("temperature", req.temperature);
            RECORDED_BY.check_opt(&mut v, t, req.recorded_by);
            v.finish()?;

            Ok(t.vitals
                .insert_with(|id| Vitals {
                    id,
                    patient,
                    heart_rate: req.heart_rate,
                    blood_pressure_systolic: req.blood_pressure_systolic,
                    blood_pressure_diastolic: req.blood_pressure_diastolic,
                    temperature: req.temperature,
                    oxygen_saturation: req.oxygen_saturation,
                    respiratory_rate: req.respiratory_rate,
                    recorded_at: Utc::now(),
                    recorded_by: req.recorded_by,
                    notes: req.notes,
                })
                .clone())
        })
    }

    /// Vitals for `patient`, most recent first.
    pub fn list_vitals(&self, patient: RowId) -> IcuResult<Vec<Vitals>> {
        self.store.read(|t| {
            require_patient(t, patient)?;
            let mut rows: Vec<Vitals> = t
                .vitals
                .values()
                .filter(|r| r.patient == patient)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then(b.id.cmp(&a.id)));
            Ok(rows)
        })
    }

    // ========================================================================
    // PRESCRIPTIONS
    // ========================================================================

    pub fn prescribe(&self, patient: RowId, req: NewPrescription) -> IcuResult<Prescription> {
        let prescription = self.store.write(|t| {
            require_patient(t, patient)?;

            let mut v = Validator::new();
            let medicine_name = v.required("medicine_name", &req.medicine_name, MAX_NAME_LEN);
            let dosage = v.required("dosage", &req.dosage, MAX_SHORT_TEXT_LEN);
            let frequency = v.required("frequency", &req.frequency, MAX_SHORT_TEXT_LEN);
            let duration = v.required("duration", &req.duration, MAX_SHORT_TEXT_LEN);
            let instructions = v.required("instructions", &req.instructions, usize::MAX);
            PRESCRIBED_BY.check_opt(&mut v, t, req.prescribed_by);
            v.finish()?;

            let prescription_id = t.issue_record_id(IdPrefix::Prescription)?;
            Ok(t.prescriptions
                .insert_with(|id| Prescription {
                    id,
                    prescription_id,
                    patient,
                    medicine_name,
                    dosage,
                    frequency,
                    duration,
                    route: req.route.unwrap_or_default(),
                    instructions,
                    notes: req.notes,
                    status: req.status.unwrap_or_default(),
                    prescribed_date: Utc::now(),
                    start_date: req.start_date,
                    end_date: req.end_date,
                    prescribed_by: req.prescribed_by,
                })
                .clone())
        })?;

        tracing::info!(
            "prescription {} for patient {}",
            prescription.prescription_id,
            patient
        );
        Ok(prescription)
    }

    /// Prescriptions for `patient`, most recent first.
    pub fn list_prescriptions(&self, patient: RowId) -> IcuResult<Vec<Prescription>> {
        self.store.read(|t| {
            require_patient(t, patient)?;
            let mut rows: Vec<Prescription> = t
                .prescriptions
                .values()
                .filter(|r| r.patient == patient)
                .cloned()
                .collect();
            rows.sort_by(|a, b| {
                b.prescribed_date
                    .cmp(&a.prescribed_date)
                    .then(b.id.cmp(&a.id))
            });
            Ok(rows)
        })
    }

    /// Partial update. Any status may follow any other.
    pub fn update_prescription(
        &self,
        id: RowId,
        update: PrescriptionUpdate,
    ) -> IcuResult<Prescription> {
        self.store.write(|t| {
            if !t.prescriptions.contains(id) {
                return Err(IcuError::not_found("Prescription", id));
            }

            let mut v = Validator::new();
            let medicine_name = update
                .medicine_name
                .as_deref()
                .map(|s| v.required("medicine_name", s, MAX_NAME_LEN));
            let dosage = update
                .dosage
                .as_deref()
                .map(|s| v.required("dosage", s, MAX_SHORT_TEXT_LEN));
            let frequency = update
                .frequency
                .as_deref()
                .map(|s| v.required("frequency", s, MAX_SHORT_TEXT_LEN));
            let duration = update
                .duration
                .as_deref()
                .map(|s| v.required("duration", s, MAX_SHORT_TEXT_LEN));
            let instructions = update
                .instructions
                .as_deref()
                .map(|s| v.required("instructions", s, usize::MAX));
            if let Some(prescriber) = update.prescribed_by {
                PRESCRIBED_BY.check_opt(&mut v, t, prescriber);
            }
            v.finish()?;

            let rx = t
                .prescriptions
                .get_mut(id)
                .ok_or_else(|| IcuError::not_found("Prescription", id))?;
            if let Some(value) = medicine_name {
                rx.medicine_name = value;
            }
            if let Some(value) = dosage {
                rx.dosage = value;
            }
            if let Some(value) = frequency {
                rx.frequency = value;
            }
            if let Some(value) = duration {
                rx.duration = value;
            }
            if let Some(route) = update.route {
                rx.route = route;
            }
            if let Some(value) = instructions {
                rx.instructions = value;
            }
            if let Some(notes) = update.notes {
                rx.notes = notes;
            }
            if let Some(status) = update.status {
                rx.status = status;
            }
            if let Some(start) = update.start_date {
                rx.start_date = start;
            }
            if let Some(end) = update.end_date {
                rx.end_date = end;
            }
            if let Some(prescriber) = update.prescribed_by {
                rx.prescribed_by = prescriber;
            }
            Ok(rx.clone())
        })
    }

    // ========================================================================
    // TREATMENT PLANS
    // ========================================================================

    pub fn create_treatment(&self, patient: RowId, req: NewTreatment) -> IcuResult<Treatment> {
        let treatment = self.store.write(|t| {
            require_patient(t, patient)?;

            let mut v = Validator::new();
            let treatment_type = v.required("treatment_type", &req.treatment_type, MAX_NAME_LEN);
            let description = v.required("description", &req.description, usize::MAX);
            let duration = v.required("duration", &req.duration, MAX_SHORT_TEXT_LEN);
            PRESCRIBED_BY.check_opt(&mut v, t, req.prescribed_by);
            v.finish()?;

            let treatment_id = t.issue_record_id(IdPrefix::Treatment)?;
            Ok(t.treatments
                .insert_with(|id| Treatment {
                    id,
                    treatment_id,
                    patient,
                    treatment_type,
                    description,
                    priority: req.priority.unwrap_or_default(),
                    duration,
                    status: req.status.unwrap_or_default(),
                    notes: req.notes,
                    follow_up_required: req.follow_up_required,
                    follow_up_date: req.follow_up_date,
                    prescribed_date: Utc::now(),
                    prescribed_by: req.prescribed_by,
                })
                .clone())
        })?;

        tracing::info!(
            "treatment {} for patient {}",
            treatment.treatment_id,
            patient
        );
        Ok(treatment)
    }

    pub fn list_treatments(&self, patient: RowId) -> IcuResult<Vec<Treatment>> {
        self.store.read(|t| {
            require_patient(t, patient)?;
            let mut rows: Vec<Treatment> = t
                .treatments
                .values()
                .filter(|r| r.patient == patient)
                .cloned()
                .collect();
            rows.sort_by(|a, b| {
                b.prescribed_date
                    .cmp(&a.prescribed_date)
                    .then(b.id.cmp(&a.id))
            });
            Ok(rows)
        })
    }

    pub fn update_treatment(&self, id: RowId, update: TreatmentUpdate) -> IcuResult<Treatment> {
        self.store.write(|t| {
            if !t.treatments.contains(id) {
                return Err(IcuError::not_found("Treatment", id));
            }

            let mut v = Validator::new();
            let treatment_type = update
                .treatment_type
                .as_deref()
                .map(|s| v.required("treatment_type", s, MAX_NAME_LEN));
            let description = update
                .description
                .as_deref()
                .map(|s| v.required("description", s, usize::MAX));
            let duration = update
                .duration
                .as_deref()
                .map(|s| v.required("duration", s, MAX_SHORT_TEXT_LEN));
            if let Some(prescriber) = update.prescribed_by {
                PRESCRIBED_BY.check_opt(&mut v, t, prescriber);
            }
            v.finish()?;

            let plan = t
                .treatments
                .get_mut(id)
                .ok_or_else(|| IcuError::not_found("Treatment", id))?;
            if let Some(value) = treatment_type {
                plan.treatment_type = value;
            }
            if let Some(value) = description {
                plan.description = value;
            }
            if let Some(priority) = update.priority {
                plan.priority = priority;
            }
            if let Some(value) = duration {
                plan.duration = value;
            }
            if let Some(status) = update.status {
                plan.status = status;
            }
            if let Some(notes) = update.notes {
                plan.notes = notes;
            }
            if let Some(required) = update.follow_up_required {
                plan.follow_up_required = required;
            }
            if let Some(date) = update.follow_up_date {
                plan.follow_up_date = date;
            }
            if let Some(prescriber) = update.prescribed_by {
                plan.prescribed_by = prescriber;
            }
            Ok(plan.clone())
        })
    }

    // ========================================================================
    // ADMISSIONS
    // ========================================================================

    pub fn record_admission(&self, patient: RowId, req: NewAdmission) -> IcuResult<Admission> {
        let admission = self.store.write(|t| {
            require_patient(t, patient)?;

            let mut v = Validator::new();
            let room_number = v.required("room_number", &req.room_number, MAX_ROOM_LEN);
            let chief_complaint = v.required("chief_complaint", &req.chief_complaint, usize::MAX);
            check_vital_signs(
                &mut v,
                [
                    ("initial_bp_systolic", req.initial_bp_systolic),
                    ("initial_bp_diastolic", req.initial_bp_diastolic),
                    ("initial_heart_rate", req.initial_heart_rate),
                ],
            );
            v.range("initial_oxygen", req.initial_oxygen.into(), 0, 100);
            v.temperature("initial_temperature", req.initial_temperature);
            ADMISSION_ADMITTED_BY.check_opt(&mut v, t, req.admitted_by);
            v.finish()?;

            let admission_id = t.issue_record_id(IdPrefix::Admission)?;
            Ok(t.admissions
                .insert_with(|id| Admission {
                    id,
                    admission_id,
                    patient,
                    admission_type: req.admission_type,
                    admission_datetime: req.admission_datetime,
                    room_number,
                    chief_complaint,
                    initial_bp_systolic: req.initial_bp_systolic,
                    initial_bp_diastolic: req.initial_bp_diastolic,
                    initial_heart_rate: req.initial_heart_rate,
                    initial_temperature: req.initial_temperature,
                    initial_oxygen: req.initial_oxygen,
                    emergency_contact_verified: req.emergency_contact_verified,
                    insurance_verified: req.insurance_verified,
                    notes: req.notes,
                    admitted_by: req.admitted_by,
                    created_at: Utc::now(),
                })
                .clone())
        })?;

        tracing::info!(
            "admission {} for patient {}",
            admission.admission_id,
            patient
        );
        Ok(admission)
    }

    /// Admissions for `patient`, latest admission time first.
    pub fn list_admissions(&self, patient: RowId) -> IcuResult<Vec<Admission>> {
        self.store.read(|t| {
            require_patient(t, patient)?;
            let mut rows: Vec<Admission> = t
                .admissions
                .values()
                .filter(|r| r.patient == patient)
                .cloned()
                .collect();
            rows.sort_by(|a, b| {
                b.admission_datetime
                    .cmp(&a.admission_datetime)
                    .then(b.id.cmp(&a.id))
            });
            Ok(rows)
        })
    }

    // ========================================================================
    // TREATMENT HISTORY
    // ========================================================================

    /// Append an audit entry. Related prescriptions and treatments must belong to `patient`.
    pub fn append_history(
        &self,
        patient: RowId,
        req: NewHistoryEntry,
    ) -> IcuResult<TreatmentHistory> {
        self.store.write(|t| {
            require_patient(t, patient)?;

            let mut v = Validator::new();
            let description = v.required("description", &req.description, usize::MAX);
            PERFORMED_BY.check_opt(&mut v, t, req.performed_by);
            check_related(
                &mut v,
                "related_prescription",
                req.related_prescription,
                |id| t.prescriptions.get(id).map(|r| r.patient),
                patient,
            );
            check_related(
                &mut v,
                "related_treatment",
                req.related_treatment,
                |id| t.treatments.get(id).map(|r| r.patient),
                patient,
            );
            v.finish()?;

            let history_id = t.issue_record_id(IdPrefix::History)?;
            Ok(t.history
                .insert_with(|id| TreatmentHistory {
                    id,
                    history_id,
                    patient,
                    action_type: req.action_type,
                    description,
                    timestamp: Utc::now(),
                    performed_by: req.performed_by,
                    related_prescription: req.related_prescription,
                    related_treatment: req.related_treatment,
                })
                .clone())
        })
    }

    pub fn list_history(&self, patient: RowId) -> IcuResult<Vec<TreatmentHistory>> {
        self.store.read(|t| history_for(t, patient))
    }
}

fn history_for(t: &Tables, patient: RowId) -> IcuResult<Vec<TreatmentHistory>> {
    require_patient(t, patient)?;
    let mut rows: Vec<TreatmentHistory> = t
        .history
        .values()
        .filter(|r| r.patient == patient)
        .cloned()
        .collect();
    rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
    Ok(rows)
}

fn check_vital_signs<const N: usize>(v: &mut Validator, readings: [(&str, i32); N]) {
    for (field, value) in readings {
        if value < 0 {
            v.push(field, "Ensure this value is greater than or equal to 0.");
        }
    }
}

fn check_related(
    v: &mut Validator,
    field: &str,
    related: Option<RowId>,
    owner_of: impl Fn(RowId) -> Option<RowId>,
    patient: RowId,
) {
    let Some(related) = related else {
        return;
    };
    match owner_of(related) {
        None => v.push(field, format!("Record {} does not exist.", related)),
        Some(owner) if owner != patient => v.push(
            field,
            format!("Record {} belongs to a different patient.", related),
        ),
        Some(_) => {}
    }
}
