//! Staff accounts, role-specific details and the doctor/nurse views over them.
//!
//! There is one user table. "Doctors" and "nurses" are not separate entities: they are
//! users whose `role` is `DOCTOR` or `NURSE`, optionally carrying a one-to-one
//! [`DoctorDetail`] or [`NurseDetail`] attachment.

use super::RowId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

/// Staff role.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    Admin,
    Doctor,
    Nurse,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Doctor => "DOCTOR",
            Role::Nurse => "NURSE",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Doctor => "Doctor",
            Role::Nurse => "Nurse",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    /// Case-insensitive, so that `"nurse"` and `"NURSE"` name the same role.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "DOCTOR" => Ok(Role::Doctor),
            "NURSE" => Ok(Role::Nurse),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Doctor specialisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Specialization {
    Pulmonology,
    CriticalCare,
    Cardiology,
    Emergency,
    Neurology,
    Surgery,
    Anesthesiology,
    General,
}

impl Specialization {
    pub const fn label(self) -> &'static str {
        match self {
            Specialization::Pulmonology => "Pulmonology",
            Specialization::CriticalCare => "Critical Care",
            Specialization::Cardiology => "Cardiology",
            Specialization::Emergency => "Emergency Medicine",
            Specialization::Neurology => "Neurology",
            Specialization::Surgery => "Surgery",
            Specialization::Anesthesiology => "Anesthesiology",
            Specialization::General => "General Medicine",
        }
    }
}

impl FromStr for Specialization {
    type Err = String;

    /// Accepts the stored code in any case, with `-` or `_` between words.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "PULMONOLOGY" => Ok(Specialization::Pulmonology),
            "CRITICAL_CARE" => Ok(Specialization::CriticalCare),
            "CARDIOLOGY" => Ok(Specialization::Cardiology),
            "EMERGENCY" => Ok(Specialization::Emergency),
            "NEUROLOGY" => Ok(Specialization::Neurology),
            "SURGERY" => Ok(Specialization::Surgery),
            "ANESTHESIOLOGY" => Ok(Specialization::Anesthesiology),
            "GENERAL" => Ok(Specialization::General),
            other => Err(format!("unknown specialization '{}'", other)),
        }
    }
}

/// Working shift, used by nurse details and staff schedules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shift {
    Morning,
    Afternoon,
    Night,
}

impl Shift {
    /// The stored code. Schedules sort by this text, so `AFTERNOON` comes first.
    pub const fn code(self) -> &'static str {
        match self {
            Shift::Morning => "MORNING",
            Shift::Afternoon => "AFTERNOON",
            Shift::Night => "NIGHT",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Shift::Morning => "Morning (6AM - 2PM)",
            Shift::Afternoon => "Afternoon (2PM - 10PM)",
            Shift::Night => "Night (10PM - 6AM)",
        }
    }
}

impl FromStr for Shift {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MORNING" => Ok(Shift::Morning),
            "AFTERNOON" => Ok(Shift::Afternoon),
            "NIGHT" => Ok(Shift::Night),
            other => Err(format!("unknown shift '{}'", other)),
        }
    }
}

/// A stored staff account.
///
/// `password_hash` is an argon2 PHC string. API layers must not expose it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: RowId,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub employee_id: Option<String>,
    pub contact_number: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.username, self.role.label())
    }
}

/// Payload for creating a user.
///
/// `role` is optional: the general path defaults to `ADMIN`, and the doctor/nurse views
/// overwrite it regardless of what is supplied.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Partial update of a user.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "super::double_option::deserialize")]
    #[schema(value_type = Option<String>)]
    pub employee_id: Option<Option<String>>,
    pub contact_number: Option<String>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

/// Extended information for a doctor-role user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DoctorDetail {
    pub id: RowId,
    pub user: RowId,
    pub specialization: Specialization,
    pub department: String,
    pub license_number: String,
    pub certifications: String,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct NewDoctorDetail {
    pub specialization: Specialization,
    pub department: String,
    pub license_number: String,
    #[serde(default)]
    pub certifications: String,
}

/// Extended information for a nurse-role user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NurseDetail {
    pub id: RowId,
    pub user: RowId,
    pub department: String,
    pub shift: Shift,
    pub license_number: String,
    pub certifications: String,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct NewNurseDetail {
    pub department: String,
    pub shift: Shift,
    pub license_number: String,
    #[serde(default)]
    pub certifications: String,
}

/// A role-filtered view over the user table.
///
/// Reading through a view returns only users of its role; creating through a view stamps
/// its role before the first save.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StaffView {
    Doctors,
    Nurses,
}

impl StaffView {
    pub const fn role(self) -> Role {
        match self {
            StaffView::Doctors => Role::Doctor,
            StaffView::Nurses => Role::Nurse,
        }
    }

    pub const fn entity_name(self) -> &'static str {
        match self {
            StaffView::Doctors => "Doctor",
            StaffView::Nurses => "Nurse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("nurse".parse::<Role>(), Ok(Role::Nurse));
        assert_eq!(" DOCTOR ".parse::<Role>(), Ok(Role::Doctor));
        assert!("surgeon".parse::<Role>().is_err());
    }

    #[test]
    fn console_codes_parse() {
        assert_eq!(
            "critical-care".parse::<Specialization>(),
            Ok(Specialization::CriticalCare)
        );
        assert_eq!("night".parse::<Shift>(), Ok(Shift::Night));
        assert!("evening".parse::<Shift>().is_err());
    }

    #[test]
    fn enums_serialise_as_upper_case_codes() {
        assert_eq!(
            serde_json::to_string(&Specialization::CriticalCare).unwrap(),
            "\"CRITICAL_CARE\""
        );
        assert_eq!(serde_json::to_string(&Shift::Night).unwrap(), "\"NIGHT\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
    }

    #[test]
    fn shift_codes_match_serialised_form() {
        for shift in [Shift::Morning, Shift::Afternoon, Shift::Night] {
            let json = serde_json::to_string(&shift).unwrap();
            assert_eq!(json, format!("\"{}\"", shift.code()));
            assert_eq!(shift.code().parse::<Shift>(), Ok(shift));
        }
    }

    #[test]
    fn views_map_to_roles() {
        assert_eq!(StaffView::Doctors.role(), Role::Doctor);
        assert_eq!(StaffView::Nurses.role(), Role::Nurse);
    }
}
