//! In-process record store.
//!
//! All tables live behind one `RwLock`. A write runs against a draft copy of the tables;
//! the draft replaces the live tables only after the snapshot file (if configured) has been
//! rewritten, so every write is all-or-nothing. Identifier assignment happens inside the
//! same write, which makes "assign identifier, then first save" atomic.
//!
//! The snapshot is a single JSON document. It is written to a temporary sibling file and
//! then renamed over the previous snapshot.
//!
//! Several processes (the server and the `icu` console) may open the same data directory.
//! Writes take an exclusive lock on `store.lock` next to the snapshot, reload the snapshot
//! from disk and only then apply the draft, so uniqueness checks always see every committed
//! row. Reads reload when the snapshot's modification stamp has moved.
//!
//! Known limit: a write clones every table and rewrites the whole document, so its cost
//! grows with the total number of rows rather than with the size of the change.

use crate::config::{CoreConfig, StorageLocation};
use crate::models::{
    Admission, Alert, DoctorDetail, Equipment, NurseDetail, Patient, Prescription, RowId,
    Schedule, Treatment, TreatmentHistory, User, Vitals,
};
use crate::{IcuError, IcuResult};
use icu_ids::{IdGenerator, IdPrefix, RecordId};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

const LOCK_FILE_NAME: &str = "store.lock";

/// One table of rows keyed by an auto-incrementing store key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Table<T> {
    next_id: RowId,
    rows: BTreeMap<RowId, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    /// Allocate the next key and insert the row built from it. Keys start at 1.
    pub fn insert_with(&mut self, build: impl FnOnce(RowId) -> T) -> &T {
        self.next_id += 1;
        let id = self.next_id;
        self.rows.entry(id).or_insert(build(id))
    }

    pub fn get(&self, id: RowId) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: RowId) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    pub fn contains(&self, id: RowId) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn remove(&mut self, id: RowId) -> Option<T> {
        self.rows.remove(&id)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.rows.retain(|_, row| keep(row));
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.rows.values_mut()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Every table in the store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Tables {
    pub users: Table<User>,
    pub doctor_details: Table<DoctorDetail>,
    pub nurse_details: Table<NurseDetail>,
    pub patients: Table<Patient>,
    pub vitals: Table<Vitals>,
    pub prescriptions: Table<Prescription>,
    pub treatments: Table<Treatment>,
    pub admissions: Table<Admission>,
    pub history: Table<TreatmentHistory>,
    pub equipment: Table<Equipment>,
    pub alerts: Table<Alert>,
    pub schedules: Table<Schedule>,
    #[serde(skip)]
    ids: IdGenerator,
}

impl Tables {
    /// Issue the next identifier for `prefix`.
    ///
    /// Fails with a constraint violation if a stored record already carries it, which can
    /// only happen if the snapshot was edited by hand.
    pub fn issue_record_id(&mut self, prefix: IdPrefix) -> IcuResult<RecordId> {
        let id = self.ids.next(prefix);
        if self.record_ids(prefix).any(|existing| existing == &id) {
            return Err(IcuError::Constraint(format!(
                "identifier {} already exists",
                id
            )));
        }
        Ok(id)
    }

    fn record_ids(&self, prefix: IdPrefix) -> Box<dyn Iterator<Item = &RecordId> + '_> {
        match prefix {
            IdPrefix::Patient => Box::new(self.patients.values().map(|r| &r.patient_id)),
            IdPrefix::Prescription => {
                Box::new(self.prescriptions.values().map(|r| &r.prescription_id))
            }
            IdPrefix::Treatment => Box::new(self.treatments.values().map(|r| &r.treatment_id)),
            IdPrefix::Admission => Box::new(self.admissions.values().map(|r| &r.admission_id)),
            IdPrefix::History => Box::new(self.history.values().map(|r| &r.history_id)),
            IdPrefix::Alert => Box::new(self.alerts.values().map(|r| &r.alert_id)),
        }
    }

    /// Recompute the last-issued identifier per prefix from the stored rows, starting from
    /// what `ids` has already issued.
    fn rebuild_ids(&mut self, mut ids: IdGenerator) {
        for prefix in IdPrefix::ALL {
            for id in self.record_ids(prefix) {
                ids.observe(id);
            }
        }
        self.ids = ids;
    }

    /// Delete a patient together with everything that belongs to it.
    ///
    /// Vitals, prescriptions, treatments, admissions, history entries and alerts about the
    /// patient are removed; equipment assigned to the patient is released.
    pub fn delete_patient(&mut self, id: RowId) -> Option<Patient> {
        let patient = self.patients.remove(id)?;

        self.vitals.retain(|r| r.patient != id);
        self.prescriptions.retain(|r| r.patient != id);
        self.treatments.retain(|r| r.patient != id);
        self.admissions.retain(|r| r.patient != id);
        self.history.retain(|r| r.patient != id);
        self.alerts.retain(|r| r.patient != Some(id));
        for equipment in self.equipment.values_mut() {
            if equipment.assigned_to_patient == Some(id) {
                equipment.assigned_to_patient = None;
            }
        }

        Some(patient)
    }

    /// Delete a user. References to the user are cleared; the user's role detail and
    /// schedule rows are deleted with it.
    pub fn delete_user(&mut self, id: RowId) -> Option<User> {
        let user = self.users.remove(id)?;
        let who = Some(id);

        self.doctor_details.retain(|r| r.user != id);
        self.nurse_details.retain(|r| r.user != id);
        self.schedules.retain(|r| r.staff != id);

        for p in self.patients.values_mut() {
            if p.attending_physician == who {
                p.attending_physician = None;
            }
            if p.admitted_by == who {
                p.admitted_by = None;
            }
        }
        for v in self.vitals.values_mut() {
            if v.recorded_by == who {
                v.recorded_by = None;
            }
        }
        for rx in self.prescriptions.values_mut() {
            if rx.prescribed_by == who {
                rx.prescribed_by = None;
            }
        }
        for t in self.treatments.values_mut() {
            if t.prescribed_by == who {
                t.prescribed_by = None;
            }
        }
        for a in self.admissions.values_mut() {
            if a.admitted_by == who {
                a.admitted_by = None;
            }
        }
        for h in self.history.values_mut() {
            if h.performed_by == who {
                h.performed_by = None;
            }
        }
        for alert in self.alerts.values_mut() {
            if alert.acknowledged_by == who {
                alert.acknowledged_by = None;
            }
        }

        Some(user)
    }
}

/// Modification time and length of the snapshot as last loaded or written.
type Stamp = (SystemTime, u64);

#[derive(Debug, Default)]
struct Live {
    tables: Tables,
    stamp: Option<Stamp>,
}

#[derive(Clone, Debug)]
struct Snapshot {
    path: PathBuf,
    lock: PathBuf,
}

/// Shared handle to the tables. Cloning is cheap; clones see the same data.
#[derive(Clone, Debug)]
pub struct Store {
    live: Arc<RwLock<Live>>,
    snapshot: Option<Snapshot>,
}

impl Store {
    /// Open the store described by `cfg`, loading an existing snapshot if there is one.
    pub fn open(cfg: &CoreConfig) -> IcuResult<Self> {
        match cfg.storage() {
            StorageLocation::Memory => {
                tracing::info!("using memory-only store");
                Ok(Self::in_memory())
            }
            StorageLocation::Snapshot(path) => {
                ensure_parent(path)?;
                let snapshot = Snapshot {
                    path: path.clone(),
                    lock: path.with_file_name(LOCK_FILE_NAME),
                };
                let mut live = Live::default();
                {
                    let _lock = snapshot.lock_exclusive()?;
                    snapshot.reload(&mut live)?;
                }
                tracing::info!("store snapshot at {}", path.display());
                Ok(Self {
                    live: Arc::new(RwLock::new(live)),
                    snapshot: Some(snapshot),
                })
            }
        }
    }

    pub fn in_memory() -> Self {
        Self {
            live: Arc::new(RwLock::new(Live::default())),
            snapshot: None,
        }
    }

    /// Run a read-only closure against the current tables.
    pub fn read<R>(&self, f: impl FnOnce(&Tables) -> IcuResult<R>) -> IcuResult<R> {
        if let Some(snapshot) = &self.snapshot {
            let current = snapshot.stamp()?;
            let stale = self
                .live
                .read()
                .map_err(|_| poisoned())?
                .stamp
                != current;
            if stale {
                let mut guard = self.live.write().map_err(|_| poisoned())?;
                if guard.stamp != snapshot.stamp()? {
                    snapshot.reload(&mut guard)?;
                }
            }
        }
        let guard = self.live.read().map_err(|_| poisoned())?;
        f(&guard.tables)
    }

    /// Run a write against a draft of the tables and commit it if the closure succeeds.
    pub fn write<R>(&self, f: impl FnOnce(&mut Tables) -> IcuResult<R>) -> IcuResult<R> {
        let mut guard = self.live.write().map_err(|_| poisoned())?;

        let Some(snapshot) = &self.snapshot else {
            let mut draft = guard.tables.clone();
            let out = f(&mut draft)?;
            guard.tables = draft;
            return Ok(out);
        };

        let _lock = snapshot.lock_exclusive()?;
        snapshot.reload(&mut guard)?;

        let mut draft = guard.tables.clone();
        let out = f(&mut draft)?;

        save_snapshot(&snapshot.path, &draft)?;
        guard.stamp = snapshot.stamp()?;
        guard.tables = draft;
        Ok(out)
    }

    /// Check the store can serve requests: the lock is healthy and the snapshot directory
    /// is present.
    pub fn ping(&self) -> IcuResult<()> {
        drop(self.live.read().map_err(|_| poisoned())?);
        if let Some(parent) = self.snapshot.as_ref().and_then(|s| s.path.parent()) {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(IcuError::StorageUnavailable(format!(
                    "snapshot directory {} is missing",
                    parent.display()
                )));
            }
        }
        Ok(())
    }
}

impl Snapshot {
    /// Block until this process holds the cross-process write lock.
    fn lock_exclusive(&self) -> IcuResult<FileLock> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock)
            .map_err(|e| {
                IcuError::StorageUnavailable(format!(
                    "cannot open lock file {}: {}",
                    self.lock.display(),
                    e
                ))
            })?;
        file.lock_exclusive().map_err(|e| {
            IcuError::StorageUnavailable(format!("cannot lock {}: {}", self.lock.display(), e))
        })?;
        Ok(FileLock { file })
    }

    fn stamp(&self) -> IcuResult<Option<Stamp>> {
        match fs::metadata(&self.path) {
            Ok(meta) => {
                let modified = meta.modified().map_err(IcuError::FileRead)?;
                Ok(Some((modified, meta.len())))
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
            Err(e) => Err(IcuError::FileRead(e)),
        }
    }

    /// Replace the live tables with what is on disk, keeping the identifiers already issued.
    fn reload(&self, live: &mut Live) -> IcuResult<()> {
        let stamp = self.stamp()?;
        let mut tables = load_snapshot(&self.path)?;
        tables.rebuild_ids(std::mem::take(&mut live.tables.ids));
        live.tables = tables;
        live.stamp = stamp;
        Ok(())
    }
}

/// Holds the lock file; the lock is released on drop.
struct FileLock {
    file: File,
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("failed to release store lock: {}", e);
        }
    }
}

fn poisoned() -> IcuError {
    IcuError::StorageUnavailable("store lock poisoned".into())
}

fn ensure_parent(path: &Path) -> IcuResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(IcuError::FileWrite)?;
        }
    }
    Ok(())
}

fn load_snapshot(path: &Path) -> IcuResult<Tables> {
    if !path.exists() {
        return Ok(Tables::default());
    }
    let contents = fs::read_to_string(path).map_err(IcuError::FileRead)?;
    serde_json::from_str(&contents).map_err(IcuError::Deserialization)
}

fn save_snapshot(path: &Path, tables: &Tables) -> IcuResult<()> {
    ensure_parent(path)?;
    let json = serde_json::to_vec_pretty(tables).map_err(IcuError::Serialization)?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(IcuError::FileWrite)?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        IcuError::FileWrite(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertSeverity, Gender, PatientStatus};
    use chrono::Utc;
    use tempfile::TempDir;

    fn patient(tables: &mut Tables, name: &str) -> RowId {
        let patient_id = tables.issue_record_id(IdPrefix::Patient).unwrap();
        let now = Utc::now();
        tables
            .patients
            .insert_with(|id| Patient {
                id,
                patient_id,
                name: name.into(),
                age: 40,
                gender: Gender::Other,
                date_of_birth: None,
                contact_number: String::new(),
                emergency_contact: String::new(),
                emergency_contact_name: String::new(),
                diagnosis: String::new(),
                medical_history: String::new(),
                status: PatientStatus::Stable,
                room_number: String::new(),
                bed_number: String::new(),
                admission_date: now,
                discharge_date: None,
                insurance_id: String::new(),
                insurance_verified: false,
                attending_physician: None,
                admitted_by: None,
                additional_notes: String::new(),
                created_at: now,
                updated_at: now,
            })
            .id
    }

    #[test]
    fn keys_start_at_one_and_increase() {
        let mut table: Table<i64> = Table::default();
        assert_eq!(*table.insert_with(|id| id), 1);
        assert_eq!(*table.insert_with(|id| id), 2);
        table.remove(2);
        assert_eq!(*table.insert_with(|id| id), 3);
    }

    #[test]
    fn failed_write_leaves_tables_untouched() {
        let store = Store::in_memory();
        let result: IcuResult<()> = store.write(|t| {
            patient(t, "Ghost");
            Err(IcuError::invalid("name", "rejected"))
        });
        assert!(result.is_err());
        assert_eq!(store.read(|t| Ok(t.patients.len())).unwrap(), 0);
    }

    #[test]
    fn snapshot_survives_reopen_and_ids_keep_increasing() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = CoreConfig::with_data_dir(dir.path());

        let store = Store::open(&cfg).unwrap();
        let first = store
            .write(|t| {
                let id = patient(t, "Jane Doe");
                Ok(t.patients.get(id).map(|p| p.patient_id.clone()))
            })
            .unwrap()
            .unwrap();
        drop(store);

        let reopened = Store::open(&cfg).unwrap();
        let (names, next) = reopened
            .write(|t| {
                let names: Vec<String> = t.patients.values().map(|p| p.name.clone()).collect();
                let next = t.issue_record_id(IdPrefix::Patient)?;
                Ok((names, next))
            })
            .unwrap();
        assert_eq!(names, vec!["Jane Doe".to_string()]);
        assert!(next > first);
    }

    #[test]
    fn deleting_patient_cascades_and_releases_equipment() {
        let mut tables = Tables::default();
        let keep = patient(&mut tables, "Keep");
        let gone = patient(&mut tables, "Gone");
        let alert_id = tables.issue_record_id(IdPrefix::Alert).unwrap();
        tables.alerts.insert_with(|id| Alert {
            id,
            alert_id,
            severity: AlertSeverity::Critical,
            title: "SpO2 low".into(),
            message: String::new(),
            patient: Some(gone),
            timestamp: Utc::now(),
            acknowledged: false,
            acknowledged_by: None,
            acknowledged_at: None,
        });
        tables.equipment.insert_with(|id| Equipment {
            id,
            equipment_id: "VENT-1".into(),
            name: "Ventilator".into(),
            equipment_type: "Ventilator".into(),
            status: Default::default(),
            location: "ICU-1".into(),
            last_maintenance_date: None,
            next_maintenance_date: None,
            assigned_to_patient: Some(gone),
            notes: String::new(),
        });

        assert!(tables.delete_patient(gone).is_some());
        assert!(tables.patients.contains(keep));
        assert!(tables.alerts.is_empty());
        assert_eq!(tables.equipment.len(), 1);
        assert!(tables
            .equipment
            .values()
            .all(|e| e.assigned_to_patient.is_none()));
        assert!(tables.delete_patient(gone).is_none());
    }

    #[test]
    fn two_handles_on_one_directory_share_committed_rows() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = CoreConfig::with_data_dir(dir.path());
        let console = Store::open(&cfg).unwrap();
        let server = Store::open(&cfg).unwrap();

        console.write(|t| Ok(patient(t, "From console"))).unwrap();
        let seen = server
            .read(|t| Ok(t.patients.values().map(|p| p.name.clone()).collect::<Vec<_>>()))
            .unwrap();
        assert_eq!(seen, vec!["From console".to_string()]);

        server.write(|t| Ok(patient(t, "From server"))).unwrap();
        drop((console, server));

        let reopened = Store::open(&cfg).unwrap();
        let mut names = reopened
            .read(|t| Ok(t.patients.values().map(|p| p.name.clone()).collect::<Vec<_>>()))
            .unwrap();
        names.sort();
        assert_eq!(names, vec!["From console".to_string(), "From server".to_string()]);
    }

    #[test]
    fn ping_reports_missing_snapshot_directory() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = dir.path().join("data");
        let store = Store::open(&CoreConfig::with_data_dir(&data_dir)).unwrap();
        assert!(store.ping().is_ok());

        fs::remove_dir_all(&data_dir).expect("Failed to remove data dir");
        let err = store.ping().unwrap_err();
        assert!(matches!(err, IcuError::StorageUnavailable(_)));
    }
}
