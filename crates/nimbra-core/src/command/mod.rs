// ── Command API ──
//
// Direct circuit operations that bypass the reservation workflow. The
// controller routes each variant to the element.

pub mod requests;

use chrono::{DateTime, Utc};

pub use requests::{CircuitParams, CircuitRequest, CommonFields, build_request};

/// Every direct write operation against the element's circuit table.
#[derive(Debug, Clone)]
pub enum Command {
    /// Submit a creation request. Does not wait for the circuit to appear.
    CreateCircuit(CircuitRequest),
    /// Delete the circuit whose row key is `key`.
    DeleteCircuit { key: String },
    /// Schedule the circuit to end one minute after `now`.
    StopCircuit { key: String, now: DateTime<Utc> },
    /// Delete every circuit with `circuit_name` as source or destination.
    DeleteCircuitsOnInterface { circuit_name: String },
}

/// Result of a command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Ok,
    /// Shared ids of the circuits that were deleted.
    Deleted(Vec<String>),
}
