//! Staff shift schedules.
//!
//! A (staff, date, shift) triple is held by at most one row.

use super::shared::SCHEDULED_STAFF;
use crate::constants::MAX_SHORT_TEXT_LEN;
use crate::models::{NewSchedule, RowId, Schedule, ScheduleUpdate, Shift};
use crate::store::{Store, Tables};
use crate::validation::Validator;
use crate::{IcuError, IcuResult};
use chrono::NaiveDate;

#[derive(Clone)]
pub struct ScheduleService {
    store: Store,
}

impl ScheduleService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn create(&self, req: NewSchedule) -> IcuResult<Schedule> {
        self.store.write(|t| {
            let mut v = Validator::new();
            let department = v.required("department", &req.department, MAX_SHORT_TEXT_LEN);
            SCHEDULED_STAFF.check(&mut v, t, req.staff);
            v.finish()?;

            ensure_slot_free(t, (req.staff, req.date, req.shift), None)?;

            Ok(t.schedules
                .insert_with(|id| Schedule {
                    id,
                    staff: req.staff,
                    shift: req.shift,
                    date: req.date,
                    department,
                    notes: req.notes,
                })
                .clone())
        })
    }

    /// Schedules, latest date first and then by shift code.
    pub fn list(&self) -> IcuResult<Vec<Schedule>> {
        self.store.read(|t| {
            let mut rows: Vec<Schedule> = t.schedules.values().cloned().collect();
            rows.sort_by(|a, b| {
                b.date
                    .cmp(&a.date)
                    .then(a.shift.code().cmp(b.shift.code()))
                    .then(a.id.cmp(&b.id))
            });
            Ok(rows)
        })
    }

    pub fn update(&self, id: RowId, update: ScheduleUpdate) -> IcuResult<Schedule> {
        self.store.write(|t| {
            let current = t
                .schedules
                .get(id)
                .cloned()
                .ok_or_else(|| IcuError::not_found("Schedule", id))?;

            let mut v = Validator::new();
            let department = update
                .department
                .as_deref()
                .map(|s| v.required("department", s, MAX_SHORT_TEXT_LEN));
            if let Some(staff) = update.staff {
                SCHEDULED_STAFF.check(&mut v, t, staff);
            }
            v.finish()?;

            let slot = (
                update.staff.unwrap_or(current.staff),
                update.date.unwrap_or(current.date),
                update.shift.unwrap_or(current.shift),
            );
            ensure_slot_free(t, slot, Some(id))?;

            let row = t
                .schedules
                .get_mut(id)
                .ok_or_else(|| IcuError::not_found("Schedule", id))?;
            (row.staff, row.date, row.shift) = slot;
            if let Some(value) = department {
                row.department = value;
            }
            if let Some(notes) = update.notes {
                row.notes = notes;
            }
            Ok(row.clone())
        })
    }

    pub fn delete(&self, id: RowId) -> IcuResult<Schedule> {
        self.store.write(|t| {
            t.schedules
                .remove(id)
                .ok_or_else(|| IcuError::not_found("Schedule", id))
        })
    }
}

fn ensure_slot_free(
    t: &Tables,
    (staff, date, shift): (RowId, NaiveDate, Shift),
    except: Option<RowId>,
) -> IcuResult<()> {
    let taken = t
        .schedules
        .values()
        .any(|s| s.slot() == (staff, date, shift) && Some(s.id) != except);
    if taken {
        return Err(IcuError::Constraint(format!(
            "user {} already has the {} shift on {}",
            staff,
            shift.label(),
            date
        )));
    }
    Ok(())
}
