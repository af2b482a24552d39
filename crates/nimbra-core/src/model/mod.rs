// ── Domain model ──
//
// Canonical types shared by the catalog, the request builder and the
// lifecycle controller. Nothing here talks to the element.

pub mod circuit;
pub mod circuit_type;
pub mod interface;
pub mod reservation;
pub mod srt;

// ── Re-exports ──────────────────────────────────────────────────────

pub use circuit::CircuitRow;
pub use circuit_type::{CircuitType, JPEG_CAPACITY_FLOOR, ServiceClass, VA_SRT_MODES};
pub use interface::{Direction, InterfaceFamily, InterfaceRecord};
pub use reservation::{
    InterfaceSelection, NewReservation, Reservation, ReservationField, ReservationStatus,
    Transition, WorkflowAction, format_time, parse_time,
};
pub use srt::{MIN_PASSPHRASE_LEN, SrtMode, SrtSettings};
