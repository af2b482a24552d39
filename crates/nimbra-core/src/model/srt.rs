// ── SRT stream settings ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Minimum passphrase length accepted by the element.
pub const MIN_PASSPHRASE_LEN: usize = 10;

/// SRT connection mode. Parses from the wire value or the dialog label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum SrtMode {
    #[strum(to_string = "push", serialize = "Caller -> Listener", serialize = "caller")]
    Push,
    #[strum(to_string = "pull", serialize = "Listener -> Caller", serialize = "listener")]
    Pull,
    #[strum(to_string = "rendezvous", serialize = "Rendezvous -> Rendezvous")]
    Rendezvous,
}

impl SrtMode {
    /// Label shown by the reservation dialog.
    pub fn label(self) -> &'static str {
        match self {
            Self::Push => "Caller -> Listener",
            Self::Pull => "Listener -> Caller",
            Self::Rendezvous => "Rendezvous -> Rendezvous",
        }
    }
}

/// Stream parameters carried by SDI SRT circuits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrtSettings {
    pub port: u16,
    pub mode: SrtMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn dialog_labels_map_to_wire_values() {
        assert_eq!(SrtMode::from_str("Caller -> Listener").unwrap(), SrtMode::Push);
        assert_eq!(SrtMode::from_str("Listener -> Caller").unwrap(), SrtMode::Pull);
        assert_eq!(
            SrtMode::from_str("Rendezvous -> Rendezvous").unwrap(),
            SrtMode::Rendezvous
        );
        assert_eq!(SrtMode::Pull.to_string(), "pull");
        assert_eq!(SrtMode::from_str(SrtMode::Push.label()).unwrap(), SrtMode::Push);
    }
}
