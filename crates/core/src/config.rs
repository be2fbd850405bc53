//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services.
//! Nothing in this crate reads environment variables while handling a request.

use crate::constants::{DEFAULT_DATA_DIR, MEMORY_STORE_MARKER, SNAPSHOT_FILENAME};
use crate::{IcuError, IcuResult};
use std::path::{Path, PathBuf};

/// Where the store keeps its data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageLocation {
    /// Nothing is written to disk; data is lost when the process exits.
    Memory,
    /// Path of the JSON snapshot file, rewritten after every committed write.
    Snapshot(PathBuf),
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    storage: StorageLocation,
    password_params: argon2::Params,
}

impl CoreConfig {
    pub fn new(storage: StorageLocation, password_params: argon2::Params) -> Self {
        Self {
            storage,
            password_params,
        }
    }

    /// Memory-only store with cheap hashing parameters. Intended for tests and demos.
    pub fn in_memory() -> Self {
        Self::new(StorageLocation::Memory, fast_password_params())
    }

    /// Snapshot store under `data_dir` with cheap hashing parameters.
    pub fn with_data_dir(data_dir: &Path) -> Self {
        Self::new(
            StorageLocation::Snapshot(data_dir.join(SNAPSHOT_FILENAME)),
            fast_password_params(),
        )
    }

    pub fn storage(&self) -> &StorageLocation {
        &self.storage
    }

    pub fn password_params(&self) -> &argon2::Params {
        &self.password_params
    }
}

fn fast_password_params() -> argon2::Params {
    argon2::Params::new(8, 1, 1, None).unwrap_or_default()
}

/// Resolve the storage location from an optional `ICU_DATA_DIR` value.
///
/// Unset or blank selects [`DEFAULT_DATA_DIR`]; `:memory:` selects a memory-only store.
pub fn storage_from_env_value(value: Option<String>) -> StorageLocation {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value.as_deref() {
        Some(MEMORY_STORE_MARKER) => StorageLocation::Memory,
        Some(dir) => StorageLocation::Snapshot(PathBuf::from(dir).join(SNAPSHOT_FILENAME)),
        None => StorageLocation::Snapshot(PathBuf::from(DEFAULT_DATA_DIR).join(SNAPSHOT_FILENAME)),
    }
}

/// Parse argon2 cost parameters from an optional `ICU_ARGON2_PARAMS` value.
///
/// The format is `m_cost,t_cost,p_cost` (memory in KiB, iterations, lanes). Unset or blank
/// returns the argon2 defaults.
pub fn password_params_from_env_value(value: Option<String>) -> IcuResult<argon2::Params> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(value) = value else {
        return Ok(argon2::Params::default());
    };

    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| IcuError::InvalidConfig(format!("ICU_ARGON2_PARAMS: {}", e)))?;

    let [m_cost, t_cost, p_cost] = parts[..] else {
        return Err(IcuError::InvalidConfig(
            "ICU_ARGON2_PARAMS must be m_cost,t_cost,p_cost".into(),
        ));
    };

    argon2::Params::new(m_cost, t_cost, p_cost, None)
        .map_err(|e| IcuError::InvalidConfig(format!("ICU_ARGON2_PARAMS: {}", e)))
}
