// Wire types for the element gateway.
//
// Table rows are positional: the gateway returns each row as a JSON array
// of cells whose meaning depends on the table's column layout. Typed views
// over rows live in nimbra-core.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One positional table row.
pub type Row = Vec<Value>;

// ── Element ─────────────────────────────────────────────────────────

/// Element header returned by `GET /api/elements/{element}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementInfo {
    pub name: String,
    pub state: String,
}

impl ElementInfo {
    /// Whether the element is in the `Active` state.
    pub fn is_active(&self) -> bool {
        self.state.eq_ignore_ascii_case("active")
    }
}

// ── Tables ──────────────────────────────────────────────────────────

/// `{ success, message, data }` envelope around a table read.
#[derive(Debug, Clone, Deserialize)]
pub struct TableResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Vec<Row>,
}

/// Body of a parameter-set call. The value is itself a JSON document
/// serialized to a string.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ParameterValue<'a> {
    pub value: &'a str,
}

// ── Circuit creation ────────────────────────────────────────────────

/// Creation request written to the circuit-creation parameter.
///
/// Unset times and the protection id are left out of the serialized form
/// entirely; the element treats a missing start time as "now" and a
/// missing end time as open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCircuitFields {
    pub service_id: String,
    pub source: String,
    pub destination: String,
    pub capacity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protection_id: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Extra>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extra {
    pub common: CommonExtra,
}

/// Service-specific form fields. VLAN circuits fill `vlans`; SRT circuits
/// fill the stream fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommonExtra {
    pub form_name: String,
    #[serde(rename = "VLANs", default, skip_serializing_if = "Option::is_none")]
    pub vlans: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

// ── Inter-app messages ──────────────────────────────────────────────

/// Messages delivered to the element's inter-app endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum InterAppMessage {
    DeleteCircuit { shared_id: String },
    EditCircuit { circuit_id: String, end_time: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterAppResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn unset_times_are_omitted() {
        let fields = CreateCircuitFields {
            service_id: "E-Line".into(),
            source: "1_nodeA".into(),
            destination: "2_nodeB".into(),
            capacity: 5,
            start_time: None,
            end_time: Some("2026-01-01T10:00:00Z".into()),
            protection_id: None,
            extra: None,
        };
        let value = serde_json::to_value(&fields).unwrap();
        assert_eq!(
            value,
            json!({
                "serviceId": "E-Line",
                "source": "1_nodeA",
                "destination": "2_nodeB",
                "capacity": 5,
                "endTime": "2026-01-01T10:00:00Z",
            })
        );
    }

    #[test]
    fn srt_extra_uses_pascal_case_keys() {
        let common = CommonExtra {
            form_name: "vaSdiSrt".into(),
            vlans: None,
            stream_type: Some("push".into()),
            stream_port: Some(5000),
            passphrase: None,
        };
        let value = serde_json::to_value(Extra { common }).unwrap();
        assert_eq!(
            value,
            json!({ "common": { "FormName": "vaSdiSrt", "StreamType": "push", "StreamPort": 5000 } })
        );
    }

    #[test]
    fn vlan_extra_serializes_vlans_key() {
        let common = CommonExtra {
            form_name: "EVP-Line".into(),
            vlans: Some(120),
            stream_type: None,
            stream_port: None,
            passphrase: None,
        };
        let value = serde_json::to_value(&common).unwrap();
        assert_eq!(value, json!({ "FormName": "EVP-Line", "VLANs": 120 }));
    }

    #[test]
    fn inter_app_messages_are_type_tagged() {
        let delete = InterAppMessage::DeleteCircuit {
            shared_id: "42".into(),
        };
        assert_eq!(
            serde_json::to_value(&delete).unwrap(),
            json!({ "type": "DeleteCircuit", "sharedId": "42" })
        );

        let edit = InterAppMessage::EditCircuit {
            circuit_id: "7".into(),
            end_time: "2026-01-01T10:01:00Z".into(),
        };
        assert_eq!(
            serde_json::to_value(&edit).unwrap(),
            json!({ "type": "EditCircuit", "circuitId": "7", "endTime": "2026-01-01T10:01:00Z" })
        );
    }

    #[test]
    fn element_state_is_case_insensitive() {
        let info: ElementInfo =
            serde_json::from_value(json!({ "name": "Nimbra Vision", "state": "ACTIVE" })).unwrap();
        assert!(info.is_active());
    }
}
