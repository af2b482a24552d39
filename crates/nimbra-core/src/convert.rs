// ── Table-row to domain conversions ──
//
// Element tables arrive as positional rows of JSON cells. The column
// offsets below are fixed by the element driver; everything downstream
// works with the typed records produced here.

use serde_json::Value;

use nimbra_api::Row;

use crate::error::CoreError;
use crate::model::{CircuitRow, InterfaceFamily, InterfaceRecord, VA_SRT_MODES};
use crate::naming;

// ── Column offsets ─────────────────────────────────────────────────

pub mod columns {
    pub const ITS_ID: usize = 0;
    pub const ITS_NODE: usize = 1;
    pub const ITS_CAPABILITY: usize = 2;

    pub const ETS_ID: usize = 0;
    pub const ETS_NODE: usize = 21;
    pub const ETS_CIRCUIT_NAME: usize = 23;

    pub const VA_ID: usize = 0;
    pub const VA_NODE: usize = 2;
    pub const VA_TYPE: usize = 3;
    pub const VA_MODE: usize = 4;
    pub const VA_CIRCUIT_NAME: usize = 16;

    pub const CIRCUIT_KEY: usize = 0;
    pub const CIRCUIT_SHARED_ID: usize = 1;
    pub const CIRCUIT_SERVICE_ID: usize = 2;
    pub const CIRCUIT_SOURCE: usize = 8;
    pub const CIRCUIT_DESTINATION: usize = 9;
    pub const CIRCUIT_CAPACITY: usize = 10;
    pub const CIRCUIT_FORM_NAME: usize = 11;
    pub const CIRCUIT_PATH: usize = 12;
    pub const CIRCUIT_VLAN: usize = 13;
}

/// VA resource type for plain interfaces (as opposed to codec pipes).
const VA_TYPE_INTERFACE: &str = "0";

// ── Helpers ────────────────────────────────────────────────────────

/// Cell as text. Missing cells and nulls read as the empty string.
pub fn cell(row: &Row, idx: usize) -> String {
    match row.get(idx) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

fn cell_u32(row: &Row, idx: usize) -> Option<u32> {
    match row.get(idx)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ── Circuits ───────────────────────────────────────────────────────

impl From<&Row> for CircuitRow {
    fn from(row: &Row) -> Self {
        let path = cell(row, columns::CIRCUIT_PATH)
            .split(';')
            .map(str::trim)
            .filter(|hop| !hop.is_empty())
            .map(str::to_owned)
            .collect();

        Self {
            key: cell(row, columns::CIRCUIT_KEY),
            shared_id: cell(row, columns::CIRCUIT_SHARED_ID),
            service_id: cell(row, columns::CIRCUIT_SERVICE_ID),
            source: cell(row, columns::CIRCUIT_SOURCE),
            destination: cell(row, columns::CIRCUIT_DESTINATION),
            capacity: cell_u32(row, columns::CIRCUIT_CAPACITY),
            form_name: non_empty(cell(row, columns::CIRCUIT_FORM_NAME)),
            path,
            vlan: non_empty(cell(row, columns::CIRCUIT_VLAN)),
        }
    }
}

pub fn circuit_rows(rows: &[Row]) -> Vec<CircuitRow> {
    rows.iter().map(CircuitRow::from).collect()
}

// ── Interfaces ─────────────────────────────────────────────────────

/// ITS rows with a capability. The circuit name is derived from the raw id.
pub fn its_records(rows: &[Row]) -> Result<Vec<InterfaceRecord>, CoreError> {
    rows.iter()
        .filter(|row| !cell(row, columns::ITS_CAPABILITY).is_empty())
        .map(|row| {
            let interface_id = cell(row, columns::ITS_ID);
            Ok(InterfaceRecord {
                circuit_name: naming::translate_its(&interface_id)?,
                interface_id,
                node_name: cell(row, columns::ITS_NODE),
                capability: cell(row, columns::ITS_CAPABILITY),
                family: InterfaceFamily::Its,
                in_use: Vec::new(),
            })
        })
        .collect()
}

/// Every ETS row; the element already publishes the circuit name.
pub fn ets_records(rows: &[Row]) -> Vec<InterfaceRecord> {
    rows.iter()
        .map(|row| InterfaceRecord {
            interface_id: cell(row, columns::ETS_ID),
            node_name: cell(row, columns::ETS_NODE),
            capability: "Ethernet".into(),
            circuit_name: cell(row, columns::ETS_CIRCUIT_NAME),
            family: InterfaceFamily::Ets,
            in_use: Vec::new(),
        })
        .collect()
}

/// VA interfaces running an SRT-capable mode. The mode code is the capability.
pub fn va_records(rows: &[Row]) -> Vec<InterfaceRecord> {
    rows.iter()
        .filter(|row| cell(row, columns::VA_TYPE) == VA_TYPE_INTERFACE)
        .filter(|row| VA_SRT_MODES.contains(&cell(row, columns::VA_MODE).as_str()))
        .map(|row| InterfaceRecord {
            interface_id: cell(row, columns::VA_ID),
            node_name: cell(row, columns::VA_NODE),
            capability: cell(row, columns::VA_MODE),
            circuit_name: cell(row, columns::VA_CIRCUIT_NAME),
            family: InterfaceFamily::Va,
            in_use: Vec::new(),
        })
        .collect()
}
