// ── JSON file reservation store ──
//
// The file is the only state. Reads parse it afresh; every mutation takes
// an exclusive lock on a sibling `.lock` file, re-reads the document,
// applies the change and renames a temp file into place. Separate
// processes sharing one path therefore never overwrite each other.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::{ReservationStore, missing, sort_by_start};
use crate::error::CoreError;
use crate::model::Reservation;

type Entries = BTreeMap<Uuid, Reservation>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    reservations: Vec<Reservation>,
}

/// Reservations persisted as a single JSON document.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
    /// Serializes writers inside this process; the file lock covers the rest.
    writer: Mutex<()>,
}

impl FileStore {
    /// Open `path`, starting empty if the file does not exist yet. An
    /// existing file must parse.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let count = read_entries(&path)?.len();
        debug!(path = %path.display(), count, "reservation store opened");
        Ok(Self {
            lock_path: path.with_extension("json.lock"),
            path,
            writer: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `apply` on the current document under the file lock and
    /// persist the result. Nothing is written when `apply` fails.
    fn mutate<R>(
        &self,
        apply: impl FnOnce(&mut Entries) -> Result<R, CoreError>,
    ) -> Result<R, CoreError> {
        let _writer = self.writer.lock().map_err(|_| CoreError::Store {
            message: "reservation store lock poisoned".into(),
        })?;
        let lock = self.acquire()?;

        let mut entries = read_entries(&self.path)?;
        let out = apply(&mut entries)?;
        self.persist(&entries)?;

        FileExt::unlock(&lock).map_err(|e| io_error(&self.lock_path, &e))?;
        Ok(out)
    }

    fn acquire(&self) -> Result<File, CoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, &e))?;
        }
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| io_error(&self.lock_path, &e))?;
        FileExt::lock_exclusive(&lock).map_err(|e| io_error(&self.lock_path, &e))?;
        Ok(lock)
    }

    fn persist(&self, entries: &Entries) -> Result<(), CoreError> {
        let mut reservations: Vec<_> = entries.values().cloned().collect();
        sort_by_start(&mut reservations);
        let body = serde_json::to_string_pretty(&Document { reservations }).map_err(|e| {
            CoreError::Store {
                message: e.to_string(),
            }
        })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|e| io_error(&tmp, &e))?;
        fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, &e))
    }
}

fn read_entries(path: &Path) -> Result<Entries, CoreError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let raw = fs::read_to_string(path).map_err(|e| io_error(path, &e))?;
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let doc: Document = serde_json::from_str(&raw).map_err(|e| CoreError::Store {
        message: format!("{}: {e}", path.display()),
    })?;
    Ok(doc.reservations.into_iter().map(|r| (r.id, r)).collect())
}

fn io_error(path: &Path, err: &std::io::Error) -> CoreError {
    CoreError::Store {
        message: format!("{}: {err}", path.display()),
    }
}

impl ReservationStore for FileStore {
    fn list(&self) -> Result<Vec<Reservation>, CoreError> {
        let mut all: Vec<_> = read_entries(&self.path)?.into_values().collect();
        sort_by_start(&mut all);
        Ok(all)
    }

    fn get(&self, id: Uuid) -> Result<Reservation, CoreError> {
        read_entries(&self.path)?
            .remove(&id)
            .ok_or_else(|| missing(id))
    }

    fn insert(&self, reservation: Reservation) -> Result<(), CoreError> {
        self.mutate(|entries| {
            if entries.contains_key(&reservation.id) {
                return Err(CoreError::Store {
                    message: format!("reservation {} already exists", reservation.id),
                });
            }
            entries.insert(reservation.id, reservation);
            Ok(())
        })
    }

    fn update(
        &self,
        id: Uuid,
        change: &mut dyn FnMut(&mut Reservation) -> Result<(), CoreError>,
    ) -> Result<Reservation, CoreError> {
        self.mutate(|entries| {
            let entry = entries.get_mut(&id).ok_or_else(|| missing(id))?;
            let mut draft = entry.clone();
            change(&mut draft)?;
            *entry = draft.clone();
            Ok(draft)
        })
    }

    fn delete(&self, id: Uuid) -> Result<(), CoreError> {
        self.mutate(|entries| entries.remove(&id).map(drop).ok_or_else(|| missing(id)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{ReservationStatus, Transition};
    use crate::store::test_support::reservation;

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("reservations.json");

        let store = FileStore::open(&path).unwrap();
        let keep = reservation(10);
        let gone = reservation(12);
        store.insert(keep.clone()).unwrap();
        store.insert(gone.clone()).unwrap();
        store
            .transition(keep.id, Transition::DraftToWaitingForApproval)
            .unwrap();
        store.delete(gone.id).unwrap();

        let reopened = FileStore::open(&path).unwrap();
        let all = reopened.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, keep.id);
        assert_eq!(all[0].status, ReservationStatus::WaitingForApproval);
    }

    #[test]
    fn handles_on_one_path_keep_each_others_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reservations.json");

        let first = FileStore::open(&path).unwrap();
        let a = reservation(9);
        first.insert(a.clone()).unwrap();

        // Opened before `b` exists, as a long-running approval would be.
        let second = FileStore::open(&path).unwrap();
        let b = reservation(11);
        FileStore::open(&path).unwrap().insert(b.clone()).unwrap();

        second
            .transition(a.id, Transition::DraftToWaitingForApproval)
            .unwrap();
        assert_eq!(first.get(b.id).unwrap().id, b.id);

        let all = FileStore::open(&path).unwrap().list().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, a.id);
        assert_eq!(all[0].status, ReservationStatus::WaitingForApproval);
        assert_eq!(all[1].id, b.id);
    }

    #[test]
    fn failed_change_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reservations.json");
        let store = FileStore::open(&path).unwrap();
        let r = reservation(10);
        store.insert(r.clone()).unwrap();

        let err = store
            .transition(r.id, Transition::OngoingToCompleted)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert_eq!(store.get(r.id).unwrap().status, ReservationStatus::Draft);
        assert!(store.insert(r).is_err());
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("none.json")).unwrap();
        assert!(store.list().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn corrupt_file_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(FileStore::open(&path), Err(CoreError::Store { .. })));
    }
}
