//! Equipment registry.

use super::shared::check_patient_ref;
use crate::constants::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN};
use crate::models::{Equipment, EquipmentUpdate, NewEquipment, RowId};
use crate::store::{Store, Tables};
use crate::validation::Validator;
use crate::{IcuError, IcuResult};

const MAX_EQUIPMENT_ID_LEN: usize = 50;

#[derive(Clone)]
pub struct EquipmentService {
    store: Store,
}

impl EquipmentService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Register a piece of equipment under its caller-supplied asset tag.
    pub fn register(&self, req: NewEquipment) -> IcuResult<Equipment> {
        let equipment = self.store.write(|t| {
            let mut v = Validator::new();
            let equipment_id = v.required("equipment_id", &req.equipment_id, MAX_EQUIPMENT_ID_LEN);
            let name = v.required("name", &req.name, MAX_NAME_LEN);
            let equipment_type = v.required("equipment_type", &req.equipment_type, MAX_SHORT_TEXT_LEN);
            let location = v.required("location", &req.location, MAX_SHORT_TEXT_LEN);
            check_patient_ref(&mut v, t, "assigned_to_patient", req.assigned_to_patient);
            v.finish()?;

            ensure_tag_free(t, &equipment_id)?;

            Ok(t.equipment
                .insert_with(|id| Equipment {
                    id,
                    equipment_id,
                    name,
                    equipment_type,
                    status: req.status.unwrap_or_default(),
                    location,
                    last_maintenance_date: req.last_maintenance_date,
                    next_maintenance_date: req.next_maintenance_date,
                    assigned_to_patient: req.assigned_to_patient,
                    notes: req.notes,
                })
                .clone())
        })?;

        tracing::info!("registered equipment {}", equipment);
        Ok(equipment)
    }

    /// All equipment ordered by name.
    pub fn list(&self) -> IcuResult<Vec<Equipment>> {
        self.store.read(|t| {
            let mut rows: Vec<Equipment> = t.equipment.values().cloned().collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            Ok(rows)
        })
    }

    pub fn get(&self, id: RowId) -> IcuResult<Equipment> {
        self.store.read(|t| {
            t.equipment
                .get(id)
                .cloned()
                .ok_or_else(|| IcuError::not_found("Equipment", id))
        })
    }

    /// Partial update. Any status may follow any other.
    pub fn update(&self, id: RowId, update: EquipmentUpdate) -> IcuResult<Equipment> {
        self.store.write(|t| {
            if !t.equipment.contains(id) {
                return Err(IcuError::not_found("Equipment", id));
            }

            let mut v = Validator::new();
            let name = update
                .name
                .as_deref()
                .map(|s| v.required("name", s, MAX_NAME_LEN));
            let equipment_type = update
                .equipment_type
                .as_deref()
                .map(|s| v.required("equipment_type", s, MAX_SHORT_TEXT_LEN));
            let location = update
                .location
                .as_deref()
                .map(|s| v.required("location", s, MAX_SHORT_TEXT_LEN));
            if let Some(patient) = update.assigned_to_patient {
                check_patient_ref(&mut v, t, "assigned_to_patient", patient);
            }
            v.finish()?;

            let row = t
                .equipment
                .get_mut(id)
                .ok_or_else(|| IcuError::not_found("Equipment", id))?;
            if let Some(value) = name {
                row.name = value;
            }
            if let Some(value) = equipment_type {
                row.equipment_type = value;
            }
            if let Some(status) = update.status {
                row.status = status;
            }
            if let Some(value) = location {
                row.location = value;
            }
            if let Some(date) = update.last_maintenance_date {
                row.last_maintenance_date = date;
            }
            if let Some(date) = update.next_maintenance_date {
                row.next_maintenance_date = date;
            }
            if let Some(patient) = update.assigned_to_patient {
                row.assigned_to_patient = patient;
            }
            if let Some(notes) = update.notes {
                row.notes = notes;
            }
            Ok(row.clone())
        })
    }
}

fn ensure_tag_free(t: &Tables, equipment_id: &str) -> IcuResult<()> {
    if t.equipment.values().any(|e| e.equipment_id == equipment_id) {
        return Err(IcuError::Constraint(format!(
            "equipment id {} already exists",
            equipment_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EquipmentStatus, Gender, NewPatient};
    use crate::repositories::PatientService;

    fn ventilator(tag: &str, name: &str) -> NewEquipment {
        NewEquipment {
            equipment_id: tag.into(),
            name: name.into(),
            equipment_type: "Ventilator".into(),
            status: None,
            location: "ICU-1".into(),
            last_maintenance_date: None,
            next_maintenance_date: None,
            assigned_to_patient: None,
            notes: String::new(),
        }
    }

    #[test]
    fn asset_tags_are_unique_and_required() {
        let equipment = EquipmentService::new(Store::in_memory());
        let first = equipment.register(ventilator("VENT-1", "Hamilton C6")).unwrap();
        assert_eq!(first.status, EquipmentStatus::Available);

        assert!(matches!(
            equipment.register(ventilator("VENT-1", "Other")).unwrap_err(),
            IcuError::Constraint(_)
        ));
        let err = equipment.register(ventilator(" ", "Blank")).unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("equipment_id"));
    }

    #[test]
    fn listing_is_by_name() {
        let equipment = EquipmentService::new(Store::in_memory());
        equipment.register(ventilator("B", "Zoll pump")).unwrap();
        equipment.register(ventilator("A", "Alaris pump")).unwrap();
        let names: Vec<String> = equipment.list().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["Alaris pump", "Zoll pump"]);
    }

    #[test]
    fn assignment_requires_existing_patient_and_is_released_on_delete() {
        let store = Store::in_memory();
        let equipment = EquipmentService::new(store.clone());
        let patients = PatientService::new(store);
        let vent = equipment.register(ventilator("VENT-1", "Hamilton C6")).unwrap();

        let err = equipment
            .update(
                vent.id,
                EquipmentUpdate {
                    assigned_to_patient: Some(Some(42)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("assigned_to_patient"));

        let patient = patients
            .create(NewPatient::new("Jane Doe", 42, Gender::Female))
            .unwrap();
        let assigned = equipment
            .update(
                vent.id,
                EquipmentUpdate {
                    status: Some(EquipmentStatus::InUse),
                    assigned_to_patient: Some(Some(patient.id)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(assigned.assigned_to_patient, Some(patient.id));

        patients.delete(patient.id).unwrap();
        let released = equipment.get(vent.id).unwrap();
        assert_eq!(released.assigned_to_patient, None);
        assert_eq!(released.status, EquipmentStatus::InUse);
    }
}
