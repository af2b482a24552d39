// ── In-memory reservation store ──

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use super::{ReservationStore, missing, sort_by_start};
use crate::error::CoreError;
use crate::model::Reservation;

/// Process-local store backed by a `DashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<Uuid, Reservation>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Reservation> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = Reservation>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|r| (r.id, r)).collect(),
        }
    }
}

impl ReservationStore for MemoryStore {
    fn list(&self) -> Result<Vec<Reservation>, CoreError> {
        let mut all: Vec<_> = self.entries.iter().map(|e| e.value().clone()).collect();
        sort_by_start(&mut all);
        Ok(all)
    }

    fn get(&self, id: Uuid) -> Result<Reservation, CoreError> {
        self.entries
            .get(&id)
            .map(|e| e.value().clone())
            .ok_or_else(|| missing(id))
    }

    fn insert(&self, reservation: Reservation) -> Result<(), CoreError> {
        match self.entries.entry(reservation.id) {
            Entry::Occupied(_) => Err(CoreError::Store {
                message: format!("reservation {} already exists", reservation.id),
            }),
            Entry::Vacant(slot) => {
                slot.insert(reservation);
                Ok(())
            }
        }
    }

    fn update(
        &self,
        id: Uuid,
        change: &mut dyn FnMut(&mut Reservation) -> Result<(), CoreError>,
    ) -> Result<Reservation, CoreError> {
        let mut entry = self.entries.get_mut(&id).ok_or_else(|| missing(id))?;
        let mut draft = entry.value().clone();
        change(&mut draft)?;
        *entry.value_mut() = draft.clone();
        Ok(draft)
    }

    fn delete(&self, id: Uuid) -> Result<(), CoreError> {
        self.entries.remove(&id).map(|_| ()).ok_or_else(|| missing(id))
    }
}
