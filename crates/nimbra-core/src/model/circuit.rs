// ── Live circuit rows ──

use serde::{Deserialize, Serialize};

/// Typed view of one row of the element's circuit table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitRow {
    /// Row key in the circuit table.
    pub key: String,
    /// Identifier used by delete requests.
    pub shared_id: String,
    pub service_id: String,
    pub source: String,
    pub destination: String,
    pub capacity: Option<u32>,
    pub form_name: Option<String>,
    /// Hop interface names, in order.
    #[serde(default)]
    pub path: Vec<String>,
    pub vlan: Option<String>,
}

impl CircuitRow {
    /// Whether this row connects exactly `source` to `destination`.
    pub fn connects(&self, source: &str, destination: &str) -> bool {
        self.source == source && self.destination == destination
    }

    /// Whether either end of the circuit is `circuit_name`.
    pub fn touches(&self, circuit_name: &str) -> bool {
        self.source == circuit_name || self.destination == circuit_name
    }
}
