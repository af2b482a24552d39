// ── Interface records ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::circuit_type::ServiceClass;

/// Device interface family. Each family has its own raw-id naming scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum InterfaceFamily {
    /// Ethernet interfaces.
    Ets,
    /// General-purpose encoder/decoder interfaces.
    Its,
    /// Audio/video resources.
    Va,
}

/// Which end of a circuit an interface is being picked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Direction {
    Source,
    Destination,
}

/// One interface as offered by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    /// Raw device identifier (row key of the interface table).
    pub interface_id: String,
    pub node_name: String,
    /// `"Ethernet"`, an ITS capability list, or a VA mode code.
    pub capability: String,
    /// Name the creation protocol expects for this interface.
    pub circuit_name: String,
    pub family: InterfaceFamily,
    /// Exclusive classes currently holding this interface.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub in_use: Vec<ServiceClass>,
}

impl InterfaceRecord {
    pub fn is_in_use_by(&self, class: ServiceClass) -> bool {
        self.in_use.contains(&class)
    }
}
