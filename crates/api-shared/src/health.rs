use icu_core::Store;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Probes the store: the lock must be usable and the snapshot directory present.
#[derive(Clone, Debug, Default)]
pub struct HealthService;

impl HealthService {
    pub fn check(store: &Store) -> HealthRes {
        match store.ping() {
            Ok(()) => HealthRes {
                ok: true,
                message: "API is running and store is available".into(),
            },
            Err(e) => {
                tracing::warn!("health check failed: {}", e);
                HealthRes {
                    ok: false,
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_is_healthy() {
        let res = HealthService::check(&Store::in_memory());
        assert!(res.ok);
    }
}
