//! Password hashing and the login check.
//!
//! Session handling is out of scope: a successful login only returns the user record.

use crate::error::AuthFailure;
use crate::models::{Role, User};
use crate::store::Store;
use crate::validation::Validator;
use crate::{IcuError, IcuResult};
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Algorithm, Argon2, PasswordHash, PasswordVerifier, Version,
};
use rand_core::OsRng;
/// Hash `password` into an argon2id PHC string.
pub fn hash_password(password: &str, params: &argon2::Params) -> IcuResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| IcuError::PasswordHash(e.to_string()))
}

/// Check `password` against a stored PHC string. Parameters are read from the hash itself.
pub fn verify_password(password: &str, stored_hash: &str) -> IcuResult<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| IcuError::PasswordHash(format!("unreadable stored hash: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(IcuError::PasswordHash(e.to_string())),
    }
}

#[derive(Clone)]
pub struct AuthService {
    store: Store,
}

impl AuthService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Authenticate `username` with `password`, claiming `role`.
    ///
    /// Checks run in a fixed order and stop at the first failure: credentials, then the role
    /// claim (case-insensitive), then whether the account is active.
    pub fn login(&self, username: &str, password: &str, role: &str) -> IcuResult<User> {
        let mut v = Validator::new();
        for (field, value) in [("username", username), ("password", password), ("role", role)] {
            if value.trim().is_empty() {
                v.push(field, "This field is required.");
            }
        }
        v.finish()?;

        let user = self.store.read(|t| {
            Ok(t.users
                .values()
                .find(|u| u.username == username.trim())
                .cloned())
        })?;

        let Some(user) = user else {
            tracing::info!("login refused: unknown user");
            return Err(AuthFailure::InvalidCredentials.into());
        };
        if !verify_password(password, &user.password_hash)? {
            tracing::info!("login refused for {}: bad password", user.username);
            return Err(AuthFailure::InvalidCredentials.into());
        }

        let claimed = role.parse::<Role>().ok();
        if claimed != Some(user.role) {
            tracing::info!(
                "login refused for {}: role claim {:?} does not match {}",
                user.username,
                role,
                user.role
            );
            return Err(AuthFailure::RoleMismatch.into());
        }

        if !user.is_active {
            tracing::info!("login refused for {}: inactive", user.username);
            return Err(AuthFailure::Inactive.into());
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use crate::models::{NewUser, StaffView};
    use crate::repositories::StaffService;
    use std::sync::Arc;

    fn setup() -> (AuthService, StaffService) {
        let store = Store::in_memory();
        let cfg = Arc::new(CoreConfig::in_memory());
        (
            AuthService::new(store.clone()),
            StaffService::new(store, cfg),
        )
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.into(),
            password: "s3cret-pass".into(),
            ..Default::default()
        }
    }

    #[test]
    fn hash_round_trips_and_rejects_wrong_password() {
        let params = CoreConfig::in_memory().password_params().clone();
        let hash = hash_password("hunter2", &params).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn doctor_claiming_nurse_role_is_a_role_mismatch() {
        let (auth, staff) = setup();
        staff
            .create_in_view(StaffView::Doctors, new_user("dr.house"))
            .unwrap();

        let err = auth.login("dr.house", "s3cret-pass", "NURSE").unwrap_err();
        assert!(matches!(
            err,
            IcuError::Authentication(AuthFailure::RoleMismatch)
        ));
        assert_eq!(err.to_string(), "Role mismatch");

        let user = auth.login("dr.house", "s3cret-pass", "doctor").unwrap();
        assert_eq!(user.role, Role::Doctor);
    }

    #[test]
    fn credentials_are_checked_before_role_and_activity() {
        let (auth, staff) = setup();
        let nurse = staff
            .create_in_view(StaffView::Nurses, new_user("n.joy"))
            .unwrap();
        staff.set_active(nurse.id, false).unwrap();

        let err = auth.login("n.joy", "wrong", "DOCTOR").unwrap_err();
        assert!(matches!(
            err,
            IcuError::Authentication(AuthFailure::InvalidCredentials)
        ));

        let err = auth.login("n.joy", "s3cret-pass", "DOCTOR").unwrap_err();
        assert!(matches!(
            err,
            IcuError::Authentication(AuthFailure::RoleMismatch)
        ));

        let err = auth.login("n.joy", "s3cret-pass", "NURSE").unwrap_err();
        assert!(matches!(err, IcuError::Authentication(AuthFailure::Inactive)));
    }

    #[test]
    fn missing_fields_are_validation_errors() {
        let (auth, _) = setup();
        let err = auth.login("", "x", " ").unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("role"));
        assert!(!fields.contains_key("password"));

        let err = auth.login("nobody", "x", "ADMIN").unwrap_err();
        assert!(matches!(
            err,
            IcuError::Authentication(AuthFailure::InvalidCredentials)
        ));
    }
}
