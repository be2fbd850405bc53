use std::collections::BTreeMap;

/// Field name to the list of problems found with it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Why a login attempt was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Role mismatch")]
    RoleMismatch,
    #[error("User account is inactive")]
    Inactive,
}

/// Coarse classification of an [`IcuError`], used by API layers to pick a status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Authentication,
    Constraint,
    StorageUnavailable,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum IcuError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("validation failed: {}", summarise(.0))]
    Validation(FieldErrors),
    #[error("{0}")]
    Authentication(#[from] AuthFailure),
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("failed to write snapshot file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read snapshot file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize store: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize store: {0}")]
    Deserialization(serde_json::Error),
    #[error("failed to hash password: {0}")]
    PasswordHash(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl IcuError {
    /// A validation failure on a single field.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![message.into()]);
        IcuError::Validation(errors)
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        IcuError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            IcuError::NotFound { .. } => ErrorKind::NotFound,
            IcuError::Validation(_) => ErrorKind::Validation,
            IcuError::Authentication(_) => ErrorKind::Authentication,
            IcuError::Constraint(_) => ErrorKind::Constraint,
            IcuError::StorageUnavailable(_)
            | IcuError::FileWrite(_)
            | IcuError::FileRead(_) => ErrorKind::StorageUnavailable,
            IcuError::Serialization(_)
            | IcuError::Deserialization(_)
            | IcuError::PasswordHash(_)
            | IcuError::InvalidConfig(_) => ErrorKind::Internal,
        }
    }

    /// Field-level detail, when this is a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            IcuError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

fn summarise(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type IcuResult<T> = std::result::Result<T, IcuError>;
