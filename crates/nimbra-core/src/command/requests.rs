// ── Circuit creation requests ──
//
// One request variant per circuit family. Each carries only the fields
// its service accepts; `to_fields` produces the wire form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nimbra_api::CreateCircuitFields;
use nimbra_api::models::{CommonExtra, Extra};

use crate::error::CoreError;
use crate::model::{CircuitType, MIN_PASSPHRASE_LEN, SrtSettings, format_time};

/// Form name sent with SRT circuits.
pub const SRT_FORM_NAME: &str = "vaSdiSrt";
/// Form name used for VLAN circuits when the caller gives none.
pub const DEFAULT_VLAN_FORM_NAME: &str = "EVP-Line";

/// Fields shared by every creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonFields {
    /// Source circuit name (already translated).
    pub source: String,
    /// Destination circuit name (already translated).
    pub destination: String,
    /// Mbps.
    pub capacity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

/// A validated creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CircuitRequest {
    ELine {
        common: CommonFields,
    },
    ELineVlan {
        common: CommonFields,
        vlan: u16,
        form_name: String,
    },
    J2k {
        common: CommonFields,
        hitless: bool,
    },
    Jxs {
        common: CommonFields,
        hitless: bool,
    },
    SdiSrt {
        common: CommonFields,
        srt: SrtSettings,
    },
}

/// Loose inputs collected from a reservation or a CLI invocation.
#[derive(Debug, Clone, Default)]
pub struct CircuitParams {
    pub source: String,
    pub destination: String,
    pub capacity: i64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub vlan: Option<u16>,
    pub form_name: Option<String>,
    pub srt: Option<SrtSettings>,
}

impl CircuitRequest {
    pub fn common(&self) -> &CommonFields {
        match self {
            Self::ELine { common }
            | Self::ELineVlan { common, .. }
            | Self::J2k { common, .. }
            | Self::Jxs { common, .. }
            | Self::SdiSrt { common, .. } => common,
        }
    }

    pub fn circuit_type(&self) -> CircuitType {
        match self {
            Self::ELine { .. } => CircuitType::Eline,
            Self::ELineVlan { .. } => CircuitType::ElineVlan,
            Self::J2k { hitless: false, .. } => CircuitType::J2k,
            Self::J2k { hitless: true, .. } => CircuitType::J2kHitless,
            Self::Jxs { hitless: false, .. } => CircuitType::Jxs,
            Self::Jxs { hitless: true, .. } => CircuitType::JxsHitless,
            Self::SdiSrt { .. } => CircuitType::SdiSrt,
        }
    }

    pub fn service_id(&self) -> &'static str {
        self.circuit_type().service_id()
    }

    /// Wire form written to the creation parameter.
    pub fn to_fields(&self) -> CreateCircuitFields {
        let common = self.common();
        let extra = match self {
            Self::ELineVlan {
                vlan, form_name, ..
            } => Some(CommonExtra {
                form_name: form_name.clone(),
                vlans: Some(*vlan),
                stream_type: None,
                stream_port: None,
                passphrase: None,
            }),
            Self::SdiSrt { srt, .. } => Some(CommonExtra {
                form_name: SRT_FORM_NAME.into(),
                vlans: None,
                stream_type: Some(srt.mode.to_string()),
                stream_port: Some(srt.port),
                passphrase: srt.passphrase.clone(),
            }),
            _ => None,
        };

        CreateCircuitFields {
            service_id: self.service_id().into(),
            source: common.source.clone(),
            destination: common.destination.clone(),
            capacity: common.capacity,
            start_time: common.start_time.map(format_time),
            end_time: common.end_time.map(format_time),
            protection_id: self.circuit_type().protection_id(),
            extra: extra.map(|common| Extra { common }),
        }
    }
}

/// Validate `params` and build the request variant for `circuit_type`.
pub fn build_request(
    circuit_type: CircuitType,
    params: CircuitParams,
) -> Result<CircuitRequest, CoreError> {
    if params.source.trim().is_empty() || params.destination.trim().is_empty() {
        return Err(CoreError::validation(
            "Source and destination interfaces are required",
        ));
    }
    let capacity = u32::try_from(params.capacity)
        .ok()
        .filter(|c| *c >= 1)
        .ok_or_else(|| {
            CoreError::validation(format!(
                "Capacity must be at least 1 Mbps, got {}",
                params.capacity
            ))
        })?;
    if params
        .start_time
        .zip(params.end_time)
        .is_some_and(|(start, end)| end < start)
    {
        return Err(CoreError::validation("End time is before start time"));
    }

    let common = CommonFields {
        source: params.source,
        destination: params.destination,
        capacity,
        start_time: params.start_time,
        end_time: params.end_time,
    };

    let request = match circuit_type {
        CircuitType::Eline => CircuitRequest::ELine { common },
        CircuitType::ElineVlan => {
            let vlan = params
                .vlan
                .filter(|v| (1..=4094).contains(v))
                .ok_or_else(|| CoreError::validation("VLAN must be between 1 and 4094"))?;
            let form_name = params
                .form_name
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_VLAN_FORM_NAME.into());
            CircuitRequest::ELineVlan {
                common,
                vlan,
                form_name,
            }
        }
        CircuitType::J2k | CircuitType::J2kHitless => CircuitRequest::J2k {
            common,
            hitless: circuit_type.is_hitless(),
        },
        CircuitType::Jxs | CircuitType::JxsHitless => CircuitRequest::Jxs {
            common,
            hitless: circuit_type.is_hitless(),
        },
        CircuitType::SdiSrt => {
            let srt = params
                .srt
                .ok_or_else(|| CoreError::validation("SRT circuits need a stream port and mode"))?;
            if srt
                .passphrase
                .as_ref()
                .is_some_and(|pass| pass.chars().count() < MIN_PASSPHRASE_LEN)
            {
                return Err(CoreError::validation(format!(
                    "Passphrase must contain at least {MIN_PASSPHRASE_LEN} characters"
                )));
            }
            CircuitRequest::SdiSrt { common, srt }
        }
    };
    Ok(request)
}
