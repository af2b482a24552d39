// ── Reservation store ──
//
// Persistence seam for reservations. The workflow engine addresses
// reservations by id and fields by name; transitions are validated
// against the state machine before they are written.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use tracing::info;
use uuid::Uuid;

use crate::error::CoreError;
use crate::model::{Reservation, ReservationField, Transition};

/// Storage for reservations.
///
/// `update` applies `change` to a copy and commits only when it returns
/// `Ok`, so a failed mutation leaves the stored reservation untouched.
pub trait ReservationStore: Send + Sync {
    /// Every reservation, ordered by start time.
    fn list(&self) -> Result<Vec<Reservation>, CoreError>;

    fn get(&self, id: Uuid) -> Result<Reservation, CoreError>;

    fn insert(&self, reservation: Reservation) -> Result<(), CoreError>;

    fn update(
        &self,
        id: Uuid,
        change: &mut dyn FnMut(&mut Reservation) -> Result<(), CoreError>,
    ) -> Result<Reservation, CoreError>;

    fn delete(&self, id: Uuid) -> Result<(), CoreError>;

    // ── Workflow-engine helpers ──────────────────────────────────────

    fn get_field(&self, id: Uuid, field: ReservationField) -> Result<Option<String>, CoreError> {
        Ok(self.get(id)?.field(field))
    }

    fn set_field(&self, id: Uuid, field: ReservationField, value: &str) -> Result<(), CoreError> {
        self.update(id, &mut |r| r.set_field(field, value))?;
        Ok(())
    }

    fn transition(&self, id: Uuid, transition: Transition) -> Result<Reservation, CoreError> {
        let updated = self.update(id, &mut |r| r.apply(transition))?;
        info!(%id, %transition, "reservation transitioned");
        Ok(updated)
    }
}

pub(crate) fn sort_by_start(reservations: &mut [Reservation]) {
    reservations.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
}

fn missing(id: Uuid) -> CoreError {
    CoreError::not_found("reservation", id.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    use chrono::{Duration, TimeZone, Utc};

    use crate::model::{CircuitType, NewReservation, Reservation};

    pub fn reservation(hour: u32) -> Reservation {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap();
        Reservation::draft(NewReservation {
            circuit_type: CircuitType::Eline,
            capacity: Some(10),
            start_time: start,
            end_time: start + Duration::hours(1),
            vlan: None,
            srt: None,
        })
    }
}
