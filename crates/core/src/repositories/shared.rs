//! Reference checks shared by every service.
//!
//! References are checked when they are assigned (on create, or when an update supplies a
//! new value). A later role change of the referenced user does not invalidate them.

use crate::models::{Patient, Role, RowId, User};
use crate::store::Tables;
use crate::validation::Validator;
use crate::{IcuError, IcuResult};

/// A user reference whose target must hold one of `allowed`.
#[derive(Clone, Copy, Debug)]
pub struct RoleGate {
    pub field: &'static str,
    pub allowed: &'static [Role],
}

const ANY_ROLE: &[Role] = &[Role::Admin, Role::Doctor, Role::Nurse];

pub const ATTENDING_PHYSICIAN: RoleGate = RoleGate {
    field: "attending_physician",
    allowed: &[Role::Doctor],
};
pub const PATIENT_ADMITTED_BY: RoleGate = RoleGate {
    field: "admitted_by",
    allowed: ANY_ROLE,
};
pub const PRESCRIBED_BY: RoleGate = RoleGate {
    field: "prescribed_by",
    allowed: &[Role::Doctor],
};
pub const ADMISSION_ADMITTED_BY: RoleGate = RoleGate {
    field: "admitted_by",
    allowed: &[Role::Nurse, Role::Admin],
};
pub const SCHEDULED_STAFF: RoleGate = RoleGate {
    field: "staff",
    allowed: &[Role::Doctor, Role::Nurse],
};
pub const DOCTOR_DETAIL_USER: RoleGate = RoleGate {
    field: "user",
    allowed: &[Role::Doctor],
};
pub const NURSE_DETAIL_USER: RoleGate = RoleGate {
    field: "user",
    allowed: &[Role::Nurse],
};

impl RoleGate {
    /// A reference that only has to exist.
    pub const fn any(field: &'static str) -> Self {
        Self {
            field,
            allowed: ANY_ROLE,
        }
    }

    /// Record a problem in `v` if `user` is missing or holds a role outside the gate.
    pub fn check(&self, v: &mut Validator, tables: &Tables, user: RowId) {
        match tables.users.get(user) {
            None => v.push(self.field, format!("User {} does not exist.", user)),
            Some(found) if !self.allowed.contains(&found.role) => {
                v.push(self.field, self.rejection(found))
            }
            Some(_) => {}
        }
    }

    pub fn check_opt(&self, v: &mut Validator, tables: &Tables, user: Option<RowId>) {
        if let Some(user) = user {
            self.check(v, tables, user);
        }
    }

    /// Like [`RoleGate::check`], failing immediately.
    pub fn require(&self, tables: &Tables, user: RowId) -> IcuResult<()> {
        let mut v = Validator::new();
        self.check(&mut v, tables, user);
        v.finish()
    }

    fn rejection(&self, user: &User) -> String {
        let allowed = self
            .allowed
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(" or ");
        format!(
            "User {} has role {}; must be {}.",
            user.username, user.role, allowed
        )
    }
}

/// The patient addressed by a path; missing is NotFound.
pub fn require_patient(tables: &Tables, id: RowId) -> IcuResult<&Patient> {
    tables
        .patients
        .get(id)
        .ok_or_else(|| IcuError::not_found("Patient", id))
}

/// A patient referenced from a payload field; missing is a validation problem.
pub fn check_patient_ref(v: &mut Validator, tables: &Tables, field: &str, id: Option<RowId>) {
    if let Some(id) = id {
        if !tables.patients.contains(id) {
            v.push(field, format!("Patient {} does not exist.", id));
        }
    }
}
