//! Parameter and table identifiers exposed by the Nimbra Vision element.

/// General-purpose (encoder/decoder) interface table.
pub const ITS_INTERFACES: u32 = 1600;
/// Live circuit table.
pub const CIRCUITS: u32 = 1800;
/// Ethernet interface table.
pub const ETS_INTERFACES: u32 = 1900;
/// Audio/video resource table.
pub const VA_RESOURCES: u32 = 2200;
/// Write-only parameter that accepts a circuit creation request.
pub const CREATE_CIRCUIT: u32 = 125;
