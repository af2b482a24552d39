// ── Interface catalog ──
//
// Builds the list of interfaces an operator can pick from. The catalog is
// recomputed from fresh table reads every time; interface usage changes
// under our feet as circuits come and go.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use nimbra_api::Row;

use crate::convert;
use crate::error::CoreError;
use crate::model::{CircuitRow, CircuitType, Direction, InterfaceRecord, ServiceClass};

/// Raw rows of every table the catalog depends on.
#[derive(Debug, Clone, Default)]
pub struct DeviceTables {
    pub its: Vec<Row>,
    pub ets: Vec<Row>,
    pub va: Vec<Row>,
    pub circuits: Vec<Row>,
}

/// Circuit names used as source or destination by circuits of `class`.
pub fn compute_in_use_set(circuits: &[CircuitRow], class: ServiceClass) -> HashSet<String> {
    circuits
        .iter()
        .filter(|c| class.matches(&c.service_id))
        .flat_map(|c| [c.source.clone(), c.destination.clone()])
        .filter(|name| !name.is_empty())
        .collect()
}

/// Assemble the catalog from raw tables.
///
/// ITS interfaces are tagged with the protected classes currently holding
/// them and dropped once every class they could serve is taken. VA
/// interfaces carrying an SRT circuit are dropped. ETS interfaces are
/// never exclusive.
pub fn load_catalog(tables: &DeviceTables) -> Result<Vec<InterfaceRecord>, CoreError> {
    let circuits = convert::circuit_rows(&tables.circuits);
    let j2k = compute_in_use_set(&circuits, ServiceClass::J2k);
    let jxs = compute_in_use_set(&circuits, ServiceClass::Jxs);
    let srt = compute_in_use_set(&circuits, ServiceClass::VaSrt);

    let mut catalog = Vec::new();

    for mut record in convert::its_records(&tables.its)? {
        for (class, used) in [(ServiceClass::J2k, &j2k), (ServiceClass::Jxs, &jxs)] {
            if used.contains(&record.circuit_name) {
                record.in_use.push(class);
            }
        }
        let capable: Vec<_> = [ServiceClass::J2k, ServiceClass::Jxs]
            .into_iter()
            .filter(|class| class.capable(&record.capability))
            .collect();
        let exhausted =
            !capable.is_empty() && capable.iter().all(|class| record.is_in_use_by(*class));
        if exhausted {
            debug!(interface = %record.interface_id, "ITS interface fully in use");
            continue;
        }
        catalog.push(record);
    }

    catalog.extend(convert::ets_records(&tables.ets));

    for record in convert::va_records(&tables.va) {
        if srt.contains(&record.circuit_name) {
            debug!(interface = %record.interface_id, "VA interface carries an SRT circuit");
            continue;
        }
        catalog.push(record);
    }

    debug!(
        interfaces = catalog.len(),
        circuits = circuits.len(),
        "catalog loaded"
    );
    Ok(catalog)
}

/// Interfaces eligible as `direction` of a new `circuit_type` circuit.
pub fn filter_by_circuit_type(
    catalog: &[InterfaceRecord],
    circuit_type: CircuitType,
    direction: Direction,
) -> Vec<&InterfaceRecord> {
    catalog
        .iter()
        .filter(|r| r.family == circuit_type.family())
        .filter(|r| circuit_type.accepts(&r.capability, direction))
        .filter(|r| {
            circuit_type
                .service_class()
                .is_none_or(|class| !r.is_in_use_by(class))
        })
        .collect()
}

/// Distinct node names offering at least one eligible interface, sorted.
pub fn nodes(
    catalog: &[InterfaceRecord],
    circuit_type: CircuitType,
    direction: Direction,
) -> Vec<String> {
    filter_by_circuit_type(catalog, circuit_type, direction)
        .into_iter()
        .map(|r| r.node_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
