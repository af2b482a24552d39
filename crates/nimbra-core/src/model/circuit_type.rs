// ── Circuit types and service classes ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::interface::{Direction, InterfaceFamily};

/// Capacity floor (Mbps) applied to the JPEG family.
pub const JPEG_CAPACITY_FLOOR: i64 = 50;

/// Every circuit type an operator can reserve.
///
/// Parses from the display label ("JPEG 2000 1+1 Hitless"), the short id
/// ("j2k-hitless") or the numeric workflow code ("2").
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive)]
pub enum CircuitType {
    #[strum(to_string = "E-Line", serialize = "eline", serialize = "e-line", serialize = "0")]
    #[serde(rename = "e-line")]
    Eline,
    #[strum(to_string = "JPEG 2000", serialize = "j2k", serialize = "1")]
    J2k,
    #[strum(to_string = "JPEG 2000 1+1 Hitless", serialize = "j2k-hitless", serialize = "2")]
    J2kHitless,
    #[strum(to_string = "JPEG-XS", serialize = "jxs", serialize = "3")]
    Jxs,
    #[strum(to_string = "JPEG-XS 1+1 Hitless", serialize = "jxs-hitless", serialize = "4")]
    JxsHitless,
    #[strum(to_string = "SDI SRT", serialize = "sdi-srt", serialize = "srt", serialize = "5")]
    SdiSrt,
    #[strum(
        to_string = "E-Line VLAN",
        serialize = "eline-vlan",
        serialize = "e-line-vlan",
        serialize = "6"
    )]
    #[serde(rename = "e-line-vlan")]
    ElineVlan,
}

impl CircuitType {
    /// Service id written into the creation request.
    pub fn service_id(self) -> &'static str {
        match self {
            Self::Eline => "E-Line",
            Self::ElineVlan => "E-Line-VLAN",
            Self::J2k => "j2k",
            Self::J2kHitless => "j2k-hitless",
            Self::Jxs => "jxs",
            Self::JxsHitless => "jxs-hitless",
            Self::SdiSrt => "VA-SRT",
        }
    }

    /// Numeric code used by the workflow store.
    pub fn code(self) -> u8 {
        match self {
            Self::Eline => 0,
            Self::J2k => 1,
            Self::J2kHitless => 2,
            Self::Jxs => 3,
            Self::JxsHitless => 4,
            Self::SdiSrt => 5,
            Self::ElineVlan => 6,
        }
    }

    /// Interface family whose naming scheme applies to this type.
    pub fn family(self) -> InterfaceFamily {
        match self {
            Self::Eline | Self::ElineVlan => InterfaceFamily::Ets,
            Self::J2k | Self::J2kHitless | Self::Jxs | Self::JxsHitless => InterfaceFamily::Its,
            Self::SdiSrt => InterfaceFamily::Va,
        }
    }

    /// Exclusive-use class, if circuits of this type lock their interfaces.
    pub fn service_class(self) -> Option<ServiceClass> {
        match self {
            Self::J2k | Self::J2kHitless => Some(ServiceClass::J2k),
            Self::Jxs | Self::JxsHitless => Some(ServiceClass::Jxs),
            Self::SdiSrt => Some(ServiceClass::VaSrt),
            Self::Eline | Self::ElineVlan => None,
        }
    }

    pub fn is_hitless(self) -> bool {
        matches!(self, Self::J2kHitless | Self::JxsHitless)
    }

    /// Protection id sent with hitless requests (the first leg of 1+1).
    pub fn protection_id(self) -> Option<u8> {
        self.is_hitless().then_some(1)
    }

    /// Minimum capacity in Mbps, if the type is bitrate-capped.
    pub fn capacity_floor(self) -> Option<i64> {
        match self {
            Self::J2k | Self::J2kHitless | Self::Jxs | Self::JxsHitless => {
                Some(JPEG_CAPACITY_FLOOR)
            }
            _ => None,
        }
    }

    /// Capacity pre-filled by the reservation dialog.
    pub fn default_capacity(self) -> Option<u32> {
        match self {
            Self::J2k | Self::J2kHitless => Some(50),
            Self::Jxs => Some(103),
            Self::JxsHitless => Some(125),
            _ => None,
        }
    }

    /// SRT circuits may start and end on the same node.
    pub fn allows_colocated_nodes(self) -> bool {
        matches!(self, Self::SdiSrt)
    }

    /// Whether an interface advertising `capability` can serve as the
    /// given end of a circuit of this type.
    pub fn accepts(self, capability: &str, direction: Direction) -> bool {
        match (self, direction) {
            (Self::Eline | Self::ElineVlan, _) => capability == "Ethernet",
            (Self::J2k | Self::J2kHitless, Direction::Source) => capability.contains("j2kEnc"),
            (Self::J2k | Self::J2kHitless, Direction::Destination) => {
                capability.contains("j2kDec")
            }
            (Self::Jxs | Self::JxsHitless, Direction::Source) => capability.contains("jxse"),
            (Self::Jxs | Self::JxsHitless, Direction::Destination) => capability.contains("jxsd"),
            // Either SRT mode qualifies at both ends; the element's own
            // selection dialog does not split encoder and decoder modes.
            (Self::SdiSrt, _) => VA_SRT_MODES.contains(&capability),
        }
    }
}

/// VA resource modes that can carry SRT.
pub const VA_SRT_MODES: [&str; 2] = ["6", "7"];

/// Service classes whose interfaces can only carry one circuit at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
pub enum ServiceClass {
    #[strum(to_string = "j2k")]
    J2k,
    #[strum(to_string = "jxs")]
    Jxs,
    #[strum(to_string = "VA-SRT")]
    VaSrt,
}

impl ServiceClass {
    /// Whether a live circuit with this service id belongs to the class.
    pub fn matches(self, service_id: &str) -> bool {
        match self {
            Self::J2k => service_id.contains("j2k"),
            Self::Jxs => service_id.contains("jxs"),
            Self::VaSrt => service_id == "VA-SRT",
        }
    }

    /// Whether an ITS/VA capability string qualifies for this class at all.
    pub fn capable(self, capability: &str) -> bool {
        match self {
            Self::J2k => capability.contains("j2kEnc") || capability.contains("j2kDec"),
            Self::Jxs => capability.contains("jxse") || capability.contains("jxsd"),
            Self::VaSrt => VA_SRT_MODES.contains(&capability),
        }
    }
}
