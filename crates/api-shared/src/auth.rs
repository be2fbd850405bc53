use icu_core::models::{Role, RowId, User};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Login request. Missing fields deserialise as empty so they can be reported together.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct LoginReq {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Claimed role, matched case-insensitively.
    #[serde(default)]
    pub role: String,
}

/// Public profile of a user. Never carries the password hash.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserRes {
    pub id: RowId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserRes {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
        }
    }
}
