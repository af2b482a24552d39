//! Reservation lifecycle and interface catalog for Nimbra Vision circuits.
//!
//! This crate sits between `nimbra-api` and the `nimbra` CLI:
//!
//! - **[`Controller`]** drives reservations through the workflow
//!   (select interfaces, approve, reject, terminate, cancel), creates
//!   circuits with bounded confirmation polling and deletes them again.
//!   It also executes direct [`Command`]s against the circuit table.
//!
//! - **[`catalog`]** turns the element's interface and circuit tables into
//!   [`InterfaceRecord`]s, excluding interfaces held by exclusive-use
//!   circuit classes, and filters them per circuit type and direction.
//!
//! - **[`naming`]** translates raw interface ids into the circuit names the
//!   element expects.
//!
//! - **[`ReservationStore`]** persists reservations; [`MemoryStore`] and
//!   [`FileStore`] are provided.
//!
//! - **[`NimbraDevice`]** is the seam to the element, implemented for
//!   [`nimbra_api::VisionClient`].

pub mod catalog;
pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod device;
pub mod error;
pub mod model;
pub mod naming;
pub mod params;
pub mod poll;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::DeviceTables;
pub use command::requests::*;
pub use command::{Command, CommandResult};
pub use config::{ControllerConfig, TlsVerification};
pub use controller::{ActionOutcome, CREATION_FAILED_NOTE, Controller};
pub use device::NimbraDevice;
pub use error::CoreError;
pub use poll::RetryPolicy;
pub use store::{FileStore, MemoryStore, ReservationStore};

pub use model::{
    CircuitRow, CircuitType, Direction, InterfaceFamily, InterfaceRecord, InterfaceSelection,
    NewReservation, Reservation, ReservationField, ReservationStatus, ServiceClass, SrtMode,
    SrtSettings, Transition, WorkflowAction,
};
