//! Alerts and the bulk acknowledgment workflow.

use super::shared::{check_patient_ref, RoleGate};
use crate::constants::MAX_NAME_LEN;
use crate::models::{Alert, NewAlert, RowId};
use crate::store::Store;
use crate::validation::Validator;
use crate::IcuResult;
use chrono::Utc;
use icu_ids::IdPrefix;

const ACKNOWLEDGED_BY: RoleGate = RoleGate::any("acknowledged_by");

#[derive(Clone)]
pub struct AlertService {
    store: Store,
}

impl AlertService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn raise(&self, req: NewAlert) -> IcuResult<Alert> {
        let alert = self.store.write(|t| {
            let mut v = Validator::new();
            let title = v.required("title", &req.title, MAX_NAME_LEN);
            let message = v.required("message", &req.message, usize::MAX);
            check_patient_ref(&mut v, t, "patient", req.patient);
            v.finish()?;

            let alert_id = t.issue_record_id(IdPrefix::Alert)?;
            Ok(t.alerts
                .insert_with(|id| Alert {
                    id,
                    alert_id,
                    severity: req.severity,
                    title,
                    message,
                    patient: req.patient,
                    timestamp: Utc::now(),
                    acknowledged: false,
                    acknowledged_by: None,
                    acknowledged_at: None,
                })
                .clone())
        })?;

        tracing::warn!(
            "{} alert {}: {}",
            alert.severity.label(),
            alert.alert_id,
            alert.title
        );
        Ok(alert)
    }

    /// Alerts, newest first, optionally filtered by acknowledgment state.
    pub fn list(&self, acknowledged: Option<bool>) -> IcuResult<Vec<Alert>> {
        self.store.read(|t| {
            let mut rows: Vec<Alert> = t
                .alerts
                .values()
                .filter(|a| acknowledged.map_or(true, |want| a.acknowledged == want))
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
            Ok(rows)
        })
    }

    /// Acknowledge every alert in `alert_ids` on behalf of `actor`.
    ///
    /// The batch is checked as a whole first: an unknown alert or actor fails it with no
    /// alert changed. Alerts that are already acknowledged are stamped again with the new
    /// actor and time.
    pub fn acknowledge(&self, alert_ids: &[RowId], actor: RowId) -> IcuResult<Vec<Alert>> {
        let acknowledged = self.store.write(|t| {
            let mut v = Validator::new();
            if alert_ids.is_empty() {
                v.push("alert_ids", "This list may not be empty.");
            }
            for id in alert_ids {
                if !t.alerts.contains(*id) {
                    v.push("alert_ids", format!("Alert {} does not exist.", id));
                }
            }
            ACKNOWLEDGED_BY.check(&mut v, t, actor);
            v.finish()?;

            let now = Utc::now();
            let mut out = Vec::with_capacity(alert_ids.len());
            for id in alert_ids {
                if let Some(alert) = t.alerts.get_mut(*id) {
                    alert.acknowledged = true;
                    alert.acknowledged_by = Some(actor);
                    alert.acknowledged_at = Some(now);
                    out.push(alert.clone());
                }
            }
            Ok(out)
        })?;

        tracing::info!("user {} acknowledged {} alert(s)", actor, acknowledged.len());
        Ok(acknowledged)
    }
}
