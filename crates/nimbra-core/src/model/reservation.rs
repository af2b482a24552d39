// ── Reservation entity and its state machine ──
//
// A reservation tracks a requested circuit through approval. It never
// stores the device circuit id: the live row is found again by matching
// translated interface names whenever it is needed.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use super::circuit_type::CircuitType;
use super::srt::SrtSettings;
use crate::error::CoreError;

// ── Status ──────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ReservationStatus {
    Draft,
    WaitingForApproval,
    Confirmed,
    Rejected,
    Ongoing,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    /// Statuses that still own (or are about to own) a device circuit.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Confirmed | Self::Ongoing)
    }
}

// ── Transitions ─────────────────────────────────────────────────────

/// Named edges of the reservation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum Transition {
    DraftToWaitingForApproval,
    WaitingForApprovalToConfirmed,
    WaitingForApprovalToRejected,
    ConfirmedToOngoing,
    ConfirmedToCancelled,
    ConfirmedToCompleted,
    OngoingToCompleted,
}

impl Transition {
    pub fn from_status(self) -> ReservationStatus {
        match self {
            Self::DraftToWaitingForApproval => ReservationStatus::Draft,
            Self::WaitingForApprovalToConfirmed | Self::WaitingForApprovalToRejected => {
                ReservationStatus::WaitingForApproval
            }
            Self::ConfirmedToOngoing | Self::ConfirmedToCancelled | Self::ConfirmedToCompleted => {
                ReservationStatus::Confirmed
            }
            Self::OngoingToCompleted => ReservationStatus::Ongoing,
        }
    }

    pub fn to_status(self) -> ReservationStatus {
        match self {
            Self::DraftToWaitingForApproval => ReservationStatus::WaitingForApproval,
            Self::WaitingForApprovalToConfirmed => ReservationStatus::Confirmed,
            Self::WaitingForApprovalToRejected => ReservationStatus::Rejected,
            Self::ConfirmedToOngoing => ReservationStatus::Ongoing,
            Self::ConfirmedToCancelled => ReservationStatus::Cancelled,
            Self::ConfirmedToCompleted | Self::OngoingToCompleted => ReservationStatus::Completed,
        }
    }
}

/// Transition id as used by the workflow engine, e.g.
/// `draft_to_waiting-for-approval`.
impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_to_{}", self.from_status(), self.to_status())
    }
}

// ── Workflow actions ────────────────────────────────────────────────

/// Actions the workflow engine can trigger on a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum WorkflowAction {
    #[strum(to_string = "Select Interfaces", serialize = "select-interfaces", serialize = "select")]
    SelectInterfaces,
    Approve,
    Reject,
    Terminate,
    Cancel,
}

// ── Reservation ─────────────────────────────────────────────────────

/// Workflow-backed reservation of one circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub circuit_type: CircuitType,
    pub source_interface: Option<String>,
    pub destination_interface: Option<String>,
    pub source_node: Option<String>,
    pub destination_node: Option<String>,
    /// Requested capacity in Mbps. May be raised to the type floor on
    /// interface selection.
    pub capacity: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReservationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srt: Option<SrtSettings>,
}

/// Operator input for a new draft.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub circuit_type: CircuitType,
    pub capacity: Option<i64>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub vlan: Option<u16>,
    pub srt: Option<SrtSettings>,
}

/// Interfaces chosen during the "Select Interfaces" step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSelection {
    pub source_interface: String,
    pub destination_interface: String,
    pub source_node: String,
    pub destination_node: String,
}

impl Reservation {
    /// A fresh draft. Capacity falls back to the dialog default for the type.
    pub fn draft(new: NewReservation) -> Self {
        let capacity = new
            .capacity
            .or_else(|| new.circuit_type.default_capacity().map(i64::from))
            .unwrap_or(0);
        Self {
            id: Uuid::new_v4(),
            circuit_type: new.circuit_type,
            source_interface: None,
            destination_interface: None,
            source_node: None,
            destination_node: None,
            capacity,
            start_time: new.start_time,
            end_time: new.end_time,
            status: ReservationStatus::Draft,
            notes: None,
            vlan: new.vlan,
            srt: new.srt,
        }
    }

    /// Move along `transition`, failing if the current status is not the
    /// edge's origin.
    pub fn apply(&mut self, transition: Transition) -> Result<(), CoreError> {
        if self.status != transition.from_status() {
            return Err(CoreError::InvalidTransition {
                transition: transition.to_string(),
                from: self.status.to_string(),
            });
        }
        self.status = transition.to_status();
        Ok(())
    }

    /// Raw source and destination interface ids.
    pub fn interface_pair(&self) -> Result<(&str, &str), CoreError> {
        match (
            self.source_interface.as_deref(),
            self.destination_interface.as_deref(),
        ) {
            (Some(src), Some(dst)) => Ok((src, dst)),
            _ => Err(CoreError::validation(format!(
                "reservation {} has no interfaces selected",
                self.id
            ))),
        }
    }

    /// Read a field by its workflow name.
    pub fn field(&self, field: ReservationField) -> Option<String> {
        match field {
            ReservationField::CircuitType => Some(self.circuit_type.code().to_string()),
            ReservationField::SourceInterface => self.source_interface.clone(),
            ReservationField::DestinationInterface => self.destination_interface.clone(),
            ReservationField::SourceNode => self.source_node.clone(),
            ReservationField::DestinationNode => self.destination_node.clone(),
            ReservationField::Capacity => Some(self.capacity.to_string()),
            ReservationField::StartTime => Some(format_time(self.start_time)),
            ReservationField::EndTime => Some(format_time(self.end_time)),
            ReservationField::Notes => self.notes.clone(),
            ReservationField::Vlan => self.vlan.map(|v| v.to_string()),
        }
    }

    /// Write a field by its workflow name, parsing the string value.
    pub fn set_field(&mut self, field: ReservationField, value: &str) -> Result<(), CoreError> {
        let invalid = |what: &str| CoreError::validation(format!("{field}: {what} '{value}'"));
        match field {
            ReservationField::CircuitType => {
                self.circuit_type = value.parse().map_err(|_| invalid("unknown circuit type"))?;
            }
            ReservationField::SourceInterface => self.source_interface = Some(value.to_owned()),
            ReservationField::DestinationInterface => {
                self.destination_interface = Some(value.to_owned());
            }
            ReservationField::SourceNode => self.source_node = Some(value.to_owned()),
            ReservationField::DestinationNode => self.destination_node = Some(value.to_owned()),
            ReservationField::Capacity => {
                self.capacity = value.trim().parse().map_err(|_| invalid("not an integer"))?;
            }
            ReservationField::StartTime => {
                self.start_time = parse_time(value).map_err(|_| invalid("not a timestamp"))?;
            }
            ReservationField::EndTime => {
                self.end_time = parse_time(value).map_err(|_| invalid("not a timestamp"))?;
            }
            ReservationField::Notes => self.notes = Some(value.to_owned()),
            ReservationField::Vlan => {
                self.vlan = Some(value.trim().parse().map_err(|_| invalid("not a VLAN id"))?);
            }
        }
        Ok(())
    }
}

/// Field names as exposed by the workflow store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum ReservationField {
    #[strum(to_string = "Circuit Type")]
    CircuitType,
    #[strum(to_string = "Source Interface")]
    SourceInterface,
    #[strum(to_string = "Destination Interface")]
    DestinationInterface,
    #[strum(to_string = "Source Node")]
    SourceNode,
    #[strum(to_string = "Destination Node")]
    DestinationNode,
    Capacity,
    #[strum(to_string = "Start time")]
    StartTime,
    #[strum(to_string = "End time")]
    EndTime,
    #[strum(to_string = "Circuit Notes")]
    Notes,
    #[strum(to_string = "VLAN")]
    Vlan,
}

// ── Time helpers ────────────────────────────────────────────────────

/// `yyyy-MM-ddTHH:mm:ssZ`, the only format the element accepts.
pub fn format_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn parse_time(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw.trim()).map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use strum::IntoEnumIterator;

    use super::*;

    fn sample() -> Reservation {
        Reservation::draft(NewReservation {
            circuit_type: CircuitType::Jxs,
            capacity: None,
            start_time: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            vlan: None,
            srt: None,
        })
    }

    #[test]
    fn transition_ids_match_workflow_names() {
        assert_eq!(
            Transition::DraftToWaitingForApproval.to_string(),
            "draft_to_waiting-for-approval"
        );
        assert_eq!(
            Transition::WaitingForApprovalToRejected.to_string(),
            "waiting-for-approval_to_rejected"
        );
        assert_eq!(Transition::ConfirmedToCompleted.to_string(), "confirmed_to_completed");
        assert_eq!(Transition::OngoingToCompleted.to_string(), "ongoing_to_completed");
    }

    #[test]
    fn apply_checks_origin_status() {
        let mut r = sample();
        r.apply(Transition::DraftToWaitingForApproval).unwrap();
        assert_eq!(r.status, ReservationStatus::WaitingForApproval);

        let err = r.apply(Transition::OngoingToCompleted).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert_eq!(r.status, ReservationStatus::WaitingForApproval);
    }

    #[test]
    fn every_edge_starts_and_ends_somewhere_different() {
        for t in Transition::iter() {
            assert_ne!(t.from_status(), t.to_status(), "{t}");
        }
    }

    #[test]
    fn draft_uses_dialog_default_capacity() {
        assert_eq!(sample().capacity, 103);
    }

    #[test]
    fn fields_round_trip_by_name() {
        let mut r = sample();
        let field: ReservationField = "end time".parse().unwrap();
        r.set_field(field, "2026-03-01T13:30:00Z").unwrap();
        assert_eq!(r.field(field).as_deref(), Some("2026-03-01T13:30:00Z"));

        r.set_field(ReservationField::Capacity, " 80 ").unwrap();
        assert_eq!(r.capacity, 80);

        r.set_field(ReservationField::CircuitType, "JPEG 2000 1+1 Hitless").unwrap();
        assert_eq!(r.field(ReservationField::CircuitType).as_deref(), Some("2"));
    }

    #[test]
    fn bad_field_values_are_validation_errors() {
        let mut r = sample();
        let err = r.set_field(ReservationField::Capacity, "lots").unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert!(r.set_field(ReservationField::StartTime, "tomorrow").is_err());
    }

    #[test]
    fn missing_interfaces_are_reported() {
        assert!(sample().interface_pair().is_err());
    }

    #[test]
    fn workflow_actions_parse_from_labels() {
        assert_eq!(
            "Select Interfaces".parse::<WorkflowAction>().unwrap(),
            WorkflowAction::SelectInterfaces
        );
        assert_eq!("approve".parse::<WorkflowAction>().unwrap(), WorkflowAction::Approve);
        assert!("Archive".parse::<WorkflowAction>().is_err());
    }

    #[test]
    fn time_format_has_no_fraction() {
        let t = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_time(t), "2026-01-02T03:04:05Z");
    }
}
