//! Staff accounts and the doctor/nurse views.
//!
//! A view is a filter over the single user table: listing through it returns users of its
//! role, creating through it stamps that role before the first save, and updates through it
//! only reach users it can see.

use super::shared::{RoleGate, DOCTOR_DETAIL_USER, NURSE_DETAIL_USER};
use crate::auth::hash_password;
use crate::config::CoreConfig;
use crate::constants::{
    MAX_CONTACT_LEN, MAX_EMPLOYEE_ID_LEN, MAX_LICENSE_LEN, MAX_SHORT_TEXT_LEN, MAX_USERNAME_LEN,
};
use crate::models::{
    DoctorDetail, NewDoctorDetail, NewNurseDetail, NewUser, NurseDetail, Role, RowId, StaffView,
    User, UserUpdate,
};
use crate::store::{Store, Tables};
use crate::validation::Validator;
use crate::{IcuError, IcuResult};
use chrono::Utc;
use std::sync::Arc;

const MAX_PERSON_NAME_LEN: usize = 150;
const MAX_EMAIL_LEN: usize = 254;

#[derive(Clone)]
pub struct StaffService {
    store: Store,
    cfg: Arc<CoreConfig>,
}

impl StaffService {
    pub fn new(store: Store, cfg: Arc<CoreConfig>) -> Self {
        Self { store, cfg }
    }

    /// Create a user. The role defaults to `ADMIN` when not supplied.
    pub fn create_user(&self, req: NewUser) -> IcuResult<User> {
        let role = req.role.unwrap_or_default();
        self.insert_user(req, role)
    }

    /// Create a user through a view; the view's role replaces whatever the caller sent.
    pub fn create_in_view(&self, view: StaffView, req: NewUser) -> IcuResult<User> {
        self.insert_user(req, view.role())
    }

    fn insert_user(&self, req: NewUser, role: Role) -> IcuResult<User> {
        let mut v = Validator::new();
        let username = v.required("username", &req.username, MAX_USERNAME_LEN);
        if req.password.is_empty() {
            v.push("password", "This field may not be blank.");
        }
        v.max_len("first_name", &req.first_name, MAX_PERSON_NAME_LEN);
        v.max_len("last_name", &req.last_name, MAX_PERSON_NAME_LEN);
        check_email(&mut v, &req.email);
        v.max_len("contact_number", &req.contact_number, MAX_CONTACT_LEN);
        let employee_id = normalise_employee_id(&mut v, req.employee_id.as_deref());
        v.finish()?;

        // Hash before taking the write lock.
        let password_hash = hash_password(&req.password, self.cfg.password_params())?;

        let user = self.store.write(|t| {
            ensure_username_free(t, &username, None)?;
            ensure_employee_id_free(t, employee_id.as_deref(), None)?;

            let now = Utc::now();
            Ok(t.users
                .insert_with(|id| User {
                    id,
                    username,
                    password_hash,
                    first_name: req.first_name.trim().to_string(),
                    last_name: req.last_name.trim().to_string(),
                    email: req.email.trim().to_string(),
                    role,
                    employee_id,
                    contact_number: req.contact_number.trim().to_string(),
                    is_active: req.is_active.unwrap_or(true),
                    date_joined: now,
                    updated_at: now,
                })
                .clone())
        })?;

        tracing::info!("created user {} with role {}", user.username, user.role);
        Ok(user)
    }

    /// Users visible through `view`, newest first.
    pub fn list_view(&self, view: StaffView) -> IcuResult<Vec<User>> {
        self.store
            .read(|t| Ok(sorted_users(t, |u| u.role == view.role())))
    }

    pub fn get_in_view(&self, view: StaffView, id: RowId) -> IcuResult<User> {
        self.store.read(|t| {
            t.users
                .get(id)
                .filter(|u| u.role == view.role())
                .cloned()
                .ok_or_else(|| IcuError::not_found(view.entity_name(), id))
        })
    }

    pub fn update_user(&self, id: RowId, update: UserUpdate) -> IcuResult<User> {
        self.apply_update(id, update, None)
    }

    /// Update through a view: the role never changes and only users of the view's role are
    /// reachable.
    pub fn update_in_view(
        &self,
        view: StaffView,
        id: RowId,
        mut update: UserUpdate,
    ) -> IcuResult<User> {
        update.role = None;
        self.apply_update(id, update, Some(view))
    }

    fn apply_update(
        &self,
        id: RowId,
        update: UserUpdate,
        view: Option<StaffView>,
    ) -> IcuResult<User> {
        let mut v = Validator::new();
        if let Some(first_name) = &update.first_name {
            v.max_len("first_name", first_name, MAX_PERSON_NAME_LEN);
        }
        if let Some(last_name) = &update.last_name {
            v.max_len("last_name", last_name, MAX_PERSON_NAME_LEN);
        }
        if let Some(email) = &update.email {
            check_email(&mut v, email);
        }
        if let Some(contact) = &update.contact_number {
            v.max_len("contact_number", contact, MAX_CONTACT_LEN);
        }
        if matches!(&update.password, Some(p) if p.is_empty()) {
            v.push("password", "This field may not be blank.");
        }
        let employee_id = update
            .employee_id
            .as_ref()
            .map(|e| normalise_employee_id(&mut v, e.as_deref()));
        v.finish()?;

        let password_hash = update
            .password
            .as_deref()
            .map(|p| hash_password(p, self.cfg.password_params()))
            .transpose()?;

        self.store.write(|t| {
            let visible = t
                .users
                .get(id)
                .is_some_and(|u| view.map_or(true, |view| u.role == view.role()));
            if !visible {
                let entity = view.map_or("User", StaffView::entity_name);
                return Err(IcuError::not_found(entity, id));
            }
            if let Some(employee_id) = &employee_id {
                ensure_employee_id_free(t, employee_id.as_deref(), Some(id))?;
            }

            let user = t
                .users
                .get_mut(id)
                .ok_or_else(|| IcuError::not_found("User", id))?;
            if let Some(first_name) = update.first_name {
                user.first_name = first_name.trim().to_string();
            }
            if let Some(last_name) = update.last_name {
                user.last_name = last_name.trim().to_string();
            }
            if let Some(email) = update.email {
                user.email = email.trim().to_string();
            }
            let role_changed = update.role.is_some_and(|role| role != user.role);
            if let Some(role) = update.role {
                user.role = role;
            }
            if let Some(employee_id) = employee_id {
                user.employee_id = employee_id;
            }
            if let Some(contact) = update.contact_number {
                user.contact_number = contact.trim().to_string();
            }
            if let Some(active) = update.is_active {
                user.is_active = active;
            }
            if let Some(hash) = password_hash {
                user.password_hash = hash;
            }
            user.updated_at = Utc::now();
            let user = user.clone();

            // A detail only belongs to the role it describes.
            if role_changed {
                if user.role != Role::Doctor {
                    t.doctor_details.retain(|d| d.user != id);
                }
                if user.role != Role::Nurse {
                    t.nurse_details.retain(|d| d.user != id);
                }
            }
            Ok(user)
        })
    }

    pub fn set_active(&self, id: RowId, active: bool) -> IcuResult<User> {
        let user = self.update_user(
            id,
            UserUpdate {
                is_active: Some(active),
                ..Default::default()
            },
        )?;
        tracing::info!("user {} active={}", user.username, active);
        Ok(user)
    }

    /// Delete a user, clearing references to it and removing its detail and schedules.
    pub fn delete_user(&self, id: RowId) -> IcuResult<User> {
        let user = self.store.write(|t| {
            t.delete_user(id)
                .ok_or_else(|| IcuError::not_found("User", id))
        })?;
        tracing::info!("deleted user {}", user.username);
        Ok(user)
    }

    // ------------------------------------------------------------------------
    // Role details
    // ------------------------------------------------------------------------

    /// Attach or replace the doctor detail of a doctor-role user.
    pub fn set_doctor_detail(&self, user: RowId, req: NewDoctorDetail) -> IcuResult<DoctorDetail> {
        let mut v = Validator::new();
        let department = v.required("department", &req.department, MAX_SHORT_TEXT_LEN);
        let license_number = v.required("license_number", &req.license_number, MAX_LICENSE_LEN);
        v.finish()?;

        self.store.write(|t| {
            require_staff(t, DOCTOR_DETAIL_USER, user)?;
            if t
                .doctor_details
                .values()
                .any(|d| d.license_number == license_number && d.user != user)
            {
                return Err(IcuError::Constraint(format!(
                    "doctor license number {} already exists",
                    license_number
                )));
            }

            let existing = t.doctor_details.values().find(|d| d.user == user).map(|d| d.id);
            let detail = match existing.and_then(|id| t.doctor_details.get_mut(id)) {
                Some(detail) => {
                    detail.specialization = req.specialization;
                    detail.department = department;
                    detail.license_number = license_number;
                    detail.certifications = req.certifications;
                    detail.clone()
                }
                None => t
                    .doctor_details
                    .insert_with(|id| DoctorDetail {
                        id,
                        user,
                        specialization: req.specialization,
                        department,
                        license_number,
                        certifications: req.certifications,
                    })
                    .clone(),
            };
            Ok(detail)
        })
    }

    /// Attach or replace the nurse detail of a nurse-role user.
    pub fn set_nurse_detail(&self, user: RowId, req: NewNurseDetail) -> IcuResult<NurseDetail> {
        let mut v = Validator::new();
        let department = v.required("department", &req.department, MAX_SHORT_TEXT_LEN);
        let license_number = v.required("license_number", &req.license_number, MAX_LICENSE_LEN);
        v.finish()?;

        self.store.write(|t| {
            require_staff(t, NURSE_DETAIL_USER, user)?;
            if t
                .nurse_details
                .values()
                .any(|d| d.license_number == license_number && d.user != user)
            {
                return Err(IcuError::Constraint(format!(
                    "nurse license number {} already exists",
                    license_number
                )));
            }

            let existing = t.nurse_details.values().find(|d| d.user == user).map(|d| d.id);
            let detail = match existing.and_then(|id| t.nurse_details.get_mut(id)) {
                Some(detail) => {
                    detail.department = department;
                    detail.shift = req.shift;
                    detail.license_number = license_number;
                    detail.certifications = req.certifications;
                    detail.clone()
                }
                None => t
                    .nurse_details
                    .insert_with(|id| NurseDetail {
                        id,
                        user,
                        department,
                        shift: req.shift,
                        license_number,
                        certifications: req.certifications,
                    })
                    .clone(),
            };
            Ok(detail)
        })
    }

    /// The doctor detail of a doctor reached through the doctors view.
    pub fn doctor_detail(&self, user: RowId) -> IcuResult<DoctorDetail> {
        self.store.read(|t| {
            require_in_view(t, StaffView::Doctors, user)?;
            t.doctor_details
                .values()
                .find(|d| d.user == user)
                .cloned()
                .ok_or_else(|| IcuError::not_found("Doctor detail", user))
        })
    }

    /// The nurse detail of a nurse reached through the nurses view.
    pub fn nurse_detail(&self, user: RowId) -> IcuResult<NurseDetail> {
        self.store.read(|t| {
            require_in_view(t, StaffView::Nurses, user)?;
            t.nurse_details
                .values()
                .find(|d| d.user == user)
                .cloned()
                .ok_or_else(|| IcuError::not_found("Nurse detail", user))
        })
    }
}

fn require_in_view(t: &Tables, view: StaffView, user: RowId) -> IcuResult<()> {
    match t.users.get(user) {
        Some(u) if u.role == view.role() => Ok(()),
        _ => Err(IcuError::not_found(view.entity_name(), user)),
    }
}

/// The user a detail is being attached to: a missing user is NotFound (it is the record
/// being addressed), a wrong role is a validation failure.
fn require_staff(t: &Tables, gate: RoleGate, user: RowId) -> IcuResult<()> {
    if !t.users.contains(user) {
        return Err(IcuError::not_found("User", user));
    }
    gate.require(t, user)
}

fn sorted_users(t: &Tables, keep: impl Fn(&User) -> bool) -> Vec<User> {
    let mut users: Vec<User> = t.users.values().filter(|u| keep(u)).cloned().collect();
    users.sort_by(|a, b| b.date_joined.cmp(&a.date_joined).then(b.id.cmp(&a.id)));
    users
}

fn check_email(v: &mut Validator, email: &str) {
    let email = email.trim();
    v.max_len("email", email, MAX_EMAIL_LEN);
    if !email.is_empty() && !email.contains('@') {
        v.push("email", "Enter a valid email address.");
    }
}

/// Blank employee ids are stored as absent so that uniqueness only applies to real ids.
fn normalise_employee_id(v: &mut Validator, employee_id: Option<&str>) -> Option<String> {
    let employee_id = employee_id.map(str::trim).filter(|e| !e.is_empty())?;
    v.max_len("employee_id", employee_id, MAX_EMPLOYEE_ID_LEN);
    Some(employee_id.to_string())
}

fn ensure_username_free(t: &Tables, username: &str, except: Option<RowId>) -> IcuResult<()> {
    if t
        .users
        .values()
        .any(|u| u.username == username && Some(u.id) != except)
    {
        return Err(IcuError::Constraint(format!(
            "username {} already exists",
            username
        )));
    }
    Ok(())
}

fn ensure_employee_id_free(
    t: &Tables,
    employee_id: Option<&str>,
    except: Option<RowId>,
) -> IcuResult<()> {
    let Some(employee_id) = employee_id else {
        return Ok(());
    };
    if t
        .users
        .values()
        .any(|u| u.employee_id.as_deref() == Some(employee_id) && Some(u.id) != except)
    {
        return Err(IcuError::Constraint(format!(
            "employee id {} already exists",
            employee_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Shift, Specialization};

    fn service() -> StaffService {
        StaffService::new(Store::in_memory(), Arc::new(CoreConfig::in_memory()))
    }

    fn new_user(username: &str, role: Option<Role>) -> NewUser {
        NewUser {
            username: username.into(),
            password: "pw".into(),
            role,
            ..Default::default()
        }
    }

    #[test]
    fn role_defaults_to_admin() {
        let staff = service();
        let user = staff.create_user(new_user("root", None)).unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(user.is_active);
        assert_ne!(user.password_hash, "pw");
    }

    #[test]
    fn view_stamps_role_over_caller_value() {
        let staff = service();
        let user = staff
            .create_in_view(StaffView::Nurses, new_user("n1", Some(Role::Admin)))
            .unwrap();
        assert_eq!(user.role, Role::Nurse);

        staff.create_in_view(StaffView::Doctors, new_user("d1", None)).unwrap();
        let nurses = staff.list_view(StaffView::Nurses).unwrap();
        assert_eq!(nurses.len(), 1);
        assert_eq!(nurses[0].username, "n1");
    }

    #[test]
    fn update_through_view_keeps_role_and_hides_other_roles() {
        let staff = service();
        let doctor = staff
            .create_in_view(StaffView::Doctors, new_user("d1", None))
            .unwrap();

        let updated = staff
            .update_in_view(
                StaffView::Doctors,
                doctor.id,
                UserUpdate {
                    role: Some(Role::Admin),
                    first_name: Some("Gregory".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.role, Role::Doctor);
        assert_eq!(updated.first_name, "Gregory");

        let err = staff
            .update_in_view(StaffView::Nurses, doctor.id, UserUpdate::default())
            .unwrap_err();
        assert!(matches!(err, IcuError::NotFound { entity: "Nurse", .. }));
    }

    #[test]
    fn duplicate_username_and_employee_id_are_constraint_violations() {
        let staff = service();
        let mut first = new_user("a", None);
        first.employee_id = Some("E-1".into());
        staff.create_user(first).unwrap();

        let err = staff.create_user(new_user("a", None)).unwrap_err();
        assert!(matches!(err, IcuError::Constraint(_)));

        let mut second = new_user("b", None);
        second.employee_id = Some(" E-1 ".into());
        assert!(matches!(
            staff.create_user(second).unwrap_err(),
            IcuError::Constraint(_)
        ));

        // Blank employee ids never collide.
        let mut third = new_user("c", None);
        third.employee_id = Some("  ".into());
        let mut fourth = new_user("d", None);
        fourth.employee_id = Some(String::new());
        assert!(staff.create_user(third).unwrap().employee_id.is_none());
        assert!(staff.create_user(fourth).is_ok());
    }

    #[test]
    fn doctor_detail_requires_doctor_role_and_is_replaced_in_place() {
        let staff = service();
        let nurse = staff
            .create_in_view(StaffView::Nurses, new_user("n1", None))
            .unwrap();
        let doctor = staff
            .create_in_view(StaffView::Doctors, new_user("d1", None))
            .unwrap();
        let req = |license: &str| NewDoctorDetail {
            specialization: Specialization::CriticalCare,
            department: "ICU".into(),
            license_number: license.into(),
            certifications: String::new(),
        };

        let err = staff.set_doctor_detail(nurse.id, req("L-1")).unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("user"));

        let first = staff.set_doctor_detail(doctor.id, req("L-1")).unwrap();
        let second = staff.set_doctor_detail(doctor.id, req("L-2")).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.license_number, "L-2");

        assert_eq!(staff.doctor_detail(doctor.id).unwrap().license_number, "L-2");
        assert!(matches!(
            staff.doctor_detail(nurse.id).unwrap_err(),
            IcuError::NotFound { entity: "Doctor", .. }
        ));
        assert!(matches!(
            staff.nurse_detail(nurse.id).unwrap_err(),
            IcuError::NotFound { entity: "Nurse detail", .. }
        ));
    }

    #[test]
    fn role_change_drops_the_detail_of_the_old_role() {
        let staff = service();
        let user = staff
            .create_in_view(StaffView::Doctors, new_user("d1", None))
            .unwrap();
        staff
            .set_doctor_detail(
                user.id,
                NewDoctorDetail {
                    specialization: Specialization::Cardiology,
                    department: "ICU".into(),
                    license_number: "L-9".into(),
                    certifications: String::new(),
                },
            )
            .unwrap();

        let moved = staff
            .update_user(
                user.id,
                UserUpdate {
                    role: Some(Role::Nurse),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(moved.role, Role::Nurse);
        assert!(staff.doctor_detail(user.id).is_err());

        staff
            .set_nurse_detail(
                user.id,
                NewNurseDetail {
                    department: "ICU".into(),
                    shift: Shift::Afternoon,
                    license_number: "RN-9".into(),
                    certifications: String::new(),
                },
            )
            .unwrap();
        assert_eq!(staff.nurse_detail(user.id).unwrap().shift, Shift::Afternoon);

        // Re-sending the same role keeps the detail.
        staff
            .update_user(
                user.id,
                UserUpdate {
                    role: Some(Role::Nurse),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(staff.nurse_detail(user.id).is_ok());
    }

    #[test]
    fn employee_id_and_license_length_limits() {
        let staff = service();
        let mut ok = new_user("a", None);
        ok.employee_id = Some("E".repeat(MAX_EMPLOYEE_ID_LEN));
        staff.create_user(ok).unwrap();

        let mut long = new_user("b", None);
        long.employee_id = Some("E".repeat(MAX_EMPLOYEE_ID_LEN + 1));
        let err = staff.create_user(long).unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("employee_id"));

        let doctor = staff
            .create_in_view(StaffView::Doctors, new_user("d1", None))
            .unwrap();
        let req = |license: String| NewDoctorDetail {
            specialization: Specialization::General,
            department: "ICU".into(),
            license_number: license,
            certifications: String::new(),
        };
        staff
            .set_doctor_detail(doctor.id, req("L".repeat(MAX_LICENSE_LEN)))
            .unwrap();
        let err = staff
            .set_doctor_detail(doctor.id, req("L".repeat(MAX_LICENSE_LEN + 1)))
            .unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("license_number"));
    }

    #[test]
    fn username_is_unique_across_processes_sharing_a_directory() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let cfg = Arc::new(CoreConfig::with_data_dir(dir.path()));
        let console = StaffService::new(Store::open(&cfg).unwrap(), cfg.clone());
        let server = StaffService::new(Store::open(&cfg).unwrap(), cfg.clone());

        console.create_user(new_user("admin1", None)).unwrap();
        assert!(matches!(
            server.create_user(new_user("admin1", None)).unwrap_err(),
            IcuError::Constraint(_)
        ));
        server.create_user(new_user("admin2", None)).unwrap();

        let mut names = Store::open(&cfg)
            .unwrap()
            .read(|t| Ok(t.users.values().map(|u| u.username.clone()).collect::<Vec<_>>()))
            .unwrap();
        names.sort();
        assert_eq!(names, vec!["admin1".to_string(), "admin2".to_string()]);
    }

    #[test]
    fn nurse_license_numbers_are_unique() {
        let staff = service();
        let a = staff.create_in_view(StaffView::Nurses, new_user("a", None)).unwrap();
        let b = staff.create_in_view(StaffView::Nurses, new_user("b", None)).unwrap();
        let req = NewNurseDetail {
            department: "ICU".into(),
            shift: Shift::Night,
            license_number: "RN-7".into(),
            certifications: String::new(),
        };
        staff.set_nurse_detail(a.id, req.clone()).unwrap();
        assert!(matches!(
            staff.set_nurse_detail(b.id, req).unwrap_err(),
            IcuError::Constraint(_)
        ));
    }

    #[test]
    fn deleting_user_removes_detail() {
        let staff = service();
        let nurse = staff.create_in_view(StaffView::Nurses, new_user("n", None)).unwrap();
        staff
            .set_nurse_detail(
                nurse.id,
                NewNurseDetail {
                    department: "ICU".into(),
                    shift: Shift::Morning,
                    license_number: "RN-1".into(),
                    certifications: String::new(),
                },
            )
            .unwrap();
        staff.delete_user(nurse.id).unwrap();
        assert!(staff.nurse_detail(nurse.id).is_err());
        assert!(matches!(
            staff.delete_user(nurse.id).unwrap_err(),
            IcuError::NotFound { .. }
        ));
    }
}
