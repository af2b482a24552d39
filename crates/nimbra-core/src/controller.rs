// ── Reservation lifecycle controller ──
//
// Drives reservations through the workflow and keeps the element's
// circuit table in step: creation on approval (request, then poll until
// the row appears), deletion on termination or cancellation. The live
// circuit is never remembered; it is looked up by translated interface
// names every time it is needed.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use nimbra_api::{ElementInfo, InterAppMessage, VisionClient, tables};

use crate::catalog::{self, DeviceTables};
use crate::command::{CircuitParams, CircuitRequest, Command, CommandResult, build_request};
use crate::config::ControllerConfig;
use crate::convert;
use crate::device::NimbraDevice;
use crate::error::CoreError;
use crate::model::{
    CircuitRow, CircuitType, Direction, InterfaceRecord, InterfaceSelection, JPEG_CAPACITY_FLOOR,
    NewReservation, Reservation, ReservationStatus, Transition, WorkflowAction, format_time,
};
use crate::naming;
use crate::poll::{RetryPolicy, poll_until};
use crate::store::ReservationStore;

/// Note left on a reservation whose circuit never showed up.
pub const CREATION_FAILED_NOTE: &str = "Circuit creation wasn't successful";

/// Delay applied by `StopCircuit` before the circuit ends.
const STOP_GRACE_MINUTES: i64 = 1;

// ── ActionOutcome ────────────────────────────────────────────────

/// Result of a dispatched workflow action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The reservation moved (or was updated) and is returned as stored.
    Updated(Reservation),
    /// Approval ran; `created` tells whether the circuit was confirmed.
    Approval {
        created: bool,
        reservation: Reservation,
    },
}

impl ActionOutcome {
    pub fn reservation(&self) -> &Reservation {
        match self {
            Self::Updated(reservation) | Self::Approval { reservation, .. } => reservation,
        }
    }
}

// ── Controller ───────────────────────────────────────────────────

/// Lifecycle controller over a device and a reservation store.
pub struct Controller<D, S> {
    device: D,
    store: S,
    retry: RetryPolicy,
}

impl<S: ReservationStore> Controller<VisionClient, S> {
    /// Build the HTTP client from `config` and verify the element is up.
    pub async fn connect(config: &ControllerConfig, store: S) -> Result<Self, CoreError> {
        let client = VisionClient::new(config.url.as_str(), &config.element, &config.transport())?;
        let controller = Self::new(client, store).with_retry(config.retry);
        let element = controller.ensure_element().await?;
        info!(element = %element.name, url = %config.url, "connected to element");
        Ok(controller)
    }
}

impl<D: NimbraDevice, S: ReservationStore> Controller<D, S> {
    pub fn new(device: D, store: S) -> Self {
        Self {
            device,
            store,
            retry: RetryPolicy::workflow(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    // ── Element and tables ───────────────────────────────────────────

    /// The element must exist and be `Active` before anything is sent.
    pub async fn ensure_element(&self) -> Result<ElementInfo, CoreError> {
        let element = self.device.element_info().await?;
        if !element.is_active() {
            return Err(CoreError::ElementUnavailable {
                reason: format!("element is in state '{}'", element.state),
                element: element.name,
            });
        }
        Ok(element)
    }

    /// Fresh read of every table the catalog needs.
    pub async fn device_tables(&self) -> Result<DeviceTables, CoreError> {
        Ok(DeviceTables {
            its: self.device.read_table(tables::ITS_INTERFACES).await?,
            ets: self.device.read_table(tables::ETS_INTERFACES).await?,
            va: self.device.read_table(tables::VA_RESOURCES).await?,
            circuits: self.device.read_table(tables::CIRCUITS).await?,
        })
    }

    pub async fn load_catalog(&self) -> Result<Vec<InterfaceRecord>, CoreError> {
        catalog::load_catalog(&self.device_tables().await?)
    }

    /// Interfaces offered for `direction` of a new `circuit_type` circuit.
    pub async fn available_interfaces(
        &self,
        circuit_type: CircuitType,
        direction: Direction,
    ) -> Result<Vec<InterfaceRecord>, CoreError> {
        let catalog = self.load_catalog().await?;
        Ok(catalog::filter_by_circuit_type(&catalog, circuit_type, direction)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn available_nodes(
        &self,
        circuit_type: CircuitType,
        direction: Direction,
    ) -> Result<Vec<String>, CoreError> {
        let catalog = self.load_catalog().await?;
        Ok(catalog::nodes(&catalog, circuit_type, direction))
    }

    /// Live circuit table.
    pub async fn circuits(&self) -> Result<Vec<CircuitRow>, CoreError> {
        let rows = self.device.read_table(tables::CIRCUITS).await?;
        Ok(convert::circuit_rows(&rows))
    }

    async fn find_circuit(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<Option<CircuitRow>, CoreError> {
        Ok(self
            .circuits()
            .await?
            .into_iter()
            .find(|c| c.connects(source, destination)))
    }

    // ── Reservation workflow ─────────────────────────────────────────

    pub fn create_draft(&self, new: NewReservation) -> Result<Reservation, CoreError> {
        let reservation = Reservation::draft(new);
        self.store.insert(reservation.clone())?;
        info!(id = %reservation.id, circuit_type = %reservation.circuit_type, "draft created");
        Ok(reservation)
    }

    /// Record the chosen interfaces and submit the draft for approval.
    ///
    /// Both interfaces must be offered by a fresh catalog for the
    /// reservation's circuit type and their direction. Capacity below
    /// zero, or below the JPEG floor for JPEG types, is raised to 50 Mbps.
    pub async fn on_select_interfaces(
        &self,
        id: Uuid,
        selection: &InterfaceSelection,
    ) -> Result<Reservation, CoreError> {
        let reservation = self.store.get(id)?;
        Self::check_selection(&reservation, selection)?;

        let catalog = self.load_catalog().await?;
        for (direction, interface, node) in [
            (
                Direction::Source,
                &selection.source_interface,
                &selection.source_node,
            ),
            (
                Direction::Destination,
                &selection.destination_interface,
                &selection.destination_node,
            ),
        ] {
            let offered =
                catalog::filter_by_circuit_type(&catalog, reservation.circuit_type, direction)
                    .into_iter()
                    .any(|r| &r.interface_id == interface && &r.node_name == node);
            if !offered {
                return Err(CoreError::validation(format!(
                    "Interface '{interface}' on node '{node}' is not available as {direction} of a {} circuit",
                    reservation.circuit_type
                )));
            }
        }

        self.store.update(id, &mut |r| {
            Self::check_selection(r, selection)?;

            r.source_interface = Some(selection.source_interface.clone());
            r.destination_interface = Some(selection.destination_interface.clone());
            r.source_node = Some(selection.source_node.clone());
            r.destination_node = Some(selection.destination_node.clone());

            let floor = r.circuit_type.capacity_floor();
            if r.capacity < 0 || floor.is_some_and(|f| r.capacity < f) {
                let raised = floor.unwrap_or(JPEG_CAPACITY_FLOOR);
                info!(id = %r.id, requested = r.capacity, raised, "capacity raised to floor");
                r.capacity = raised;
            }

            r.apply(Transition::DraftToWaitingForApproval)
        })
    }

    /// Checks that need no device: draft status, distinct nodes and
    /// well-formed interface ids.
    fn check_selection(
        reservation: &Reservation,
        selection: &InterfaceSelection,
    ) -> Result<(), CoreError> {
        if reservation.status != ReservationStatus::Draft {
            return Err(CoreError::InvalidTransition {
                transition: Transition::DraftToWaitingForApproval.to_string(),
                from: reservation.status.to_string(),
            });
        }
        if !reservation.circuit_type.allows_colocated_nodes()
            && selection.source_node == selection.destination_node
        {
            return Err(CoreError::validation(format!(
                "Source and destination are both on node '{}'",
                selection.source_node
            )));
        }
        let family = reservation.circuit_type.family();
        naming::translate(family, &selection.source_interface)?;
        naming::translate(family, &selection.destination_interface)?;
        Ok(())
    }

    /// Translated (source, destination) circuit names of `reservation`.
    fn circuit_names(reservation: &Reservation) -> Result<(String, String), CoreError> {
        let (source, destination) = reservation.interface_pair()?;
        let family = reservation.circuit_type.family();
        Ok((
            naming::translate(family, source)?,
            naming::translate(family, destination)?,
        ))
    }

    fn reject(&self, id: Uuid, note: &str) -> Result<Reservation, CoreError> {
        let rejected = self.store.update(id, &mut |r| {
            r.notes = Some(note.to_owned());
            r.apply(Transition::WaitingForApprovalToRejected)
        })?;
        info!(%id, note, "reservation rejected");
        Ok(rejected)
    }

    /// Create the circuit and wait for the element to show it.
    ///
    /// Returns `Ok(true)` once the row appears (reservation confirmed) and
    /// `Ok(false)` when the times are invalid, the element refuses the
    /// request or the row never shows up (reservation rejected). Errors
    /// leave the reservation as it was.
    pub async fn on_approve(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, CoreError> {
        let reservation = self.store.get(id)?;
        if reservation.status != ReservationStatus::WaitingForApproval {
            return Err(CoreError::InvalidTransition {
                transition: Transition::WaitingForApprovalToConfirmed.to_string(),
                from: reservation.status.to_string(),
            });
        }

        if reservation.end_time < now || reservation.end_time < reservation.start_time {
            warn!(%id, end = %reservation.end_time, "end time already passed or precedes start");
            self.reject(id, "End time must be later than the start time and the current time")?;
            return Ok(false);
        }

        let (source, destination) = Self::circuit_names(&reservation)?;
        let request = build_request(
            reservation.circuit_type,
            CircuitParams {
                source: source.clone(),
                destination: destination.clone(),
                capacity: reservation.capacity,
                start_time: (reservation.start_time >= now).then_some(reservation.start_time),
                end_time: Some(reservation.end_time),
                vlan: reservation.vlan,
                form_name: None,
                srt: reservation.srt.clone(),
            },
        )?;

        self.ensure_element().await?;

        if let Err(e) = self.submit(&request).await {
            warn!(%id, error = %e, "creation request failed");
            self.reject(id, CREATION_FAILED_NOTE)?;
            return Ok(false);
        }

        let found = poll_until(self.retry, |attempt| {
            let (source, destination) = (source.as_str(), destination.as_str());
            async move {
                debug!(attempt, source, destination, "polling circuit table");
                self.find_circuit(source, destination).await
            }
        })
        .await;

        match found {
            Ok(Some(row)) => {
                self.store
                    .transition(id, Transition::WaitingForApprovalToConfirmed)?;
                info!(%id, key = %row.key, shared_id = %row.shared_id, "circuit confirmed");
                Ok(true)
            }
            Ok(None) => {
                warn!(%id, attempts = self.retry.max_attempts, "circuit never appeared");
                self.reject(id, CREATION_FAILED_NOTE)?;
                Ok(false)
            }
            Err(e) => {
                warn!(%id, error = %e, "circuit table unreadable on the final attempt");
                self.reject(id, CREATION_FAILED_NOTE)?;
                Ok(false)
            }
        }
    }

    pub fn on_reject(&self, id: Uuid) -> Result<Reservation, CoreError> {
        self.store
            .transition(id, Transition::WaitingForApprovalToRejected)
    }

    /// Delete the running circuit and complete the reservation, ending now.
    pub async fn on_terminate(&self, id: Uuid, now: DateTime<Utc>) -> Result<Reservation, CoreError> {
        self.end_reservation(id, Transition::OngoingToCompleted, Some(now))
            .await
    }

    /// Delete the scheduled circuit and cancel the reservation. The end
    /// time collapses onto the start time.
    pub async fn on_cancel(&self, id: Uuid) -> Result<Reservation, CoreError> {
        self.end_reservation(id, Transition::ConfirmedToCancelled, None)
            .await
    }

    async fn end_reservation(
        &self,
        id: Uuid,
        transition: Transition,
        end: Option<DateTime<Utc>>,
    ) -> Result<Reservation, CoreError> {
        let reservation = self.store.get(id)?;
        if reservation.status != transition.from_status() {
            return Err(CoreError::InvalidTransition {
                transition: transition.to_string(),
                from: reservation.status.to_string(),
            });
        }

        self.ensure_element().await?;
        self.delete_reservation_circuit(&reservation).await?;

        self.store.update(id, &mut |r| {
            r.end_time = end.unwrap_or(r.start_time);
            r.apply(transition)
        })
        .inspect(|r| info!(%id, %transition, end = %r.end_time, "reservation ended"))
    }

    /// Delete the circuit backing `reservation`, if the element still has
    /// it. Returns the deleted shared id.
    async fn delete_reservation_circuit(
        &self,
        reservation: &Reservation,
    ) -> Result<Option<String>, CoreError> {
        let (source, destination) = Self::circuit_names(reservation)?;
        match self.find_circuit(&source, &destination).await? {
            Some(row) => {
                self.delete_shared(&row.shared_id).await?;
                Ok(Some(row.shared_id))
            }
            None => {
                debug!(id = %reservation.id, %source, %destination, "no live circuit to delete");
                Ok(None)
            }
        }
    }

    /// Time-driven transitions for every reservation in the store.
    ///
    /// Ongoing reservations past their end complete. Confirmed ones past
    /// their end complete; otherwise confirmed ones past their start go
    /// ongoing.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> Result<Vec<(Uuid, Transition)>, CoreError> {
        let mut applied = Vec::new();
        for reservation in self.store.list()? {
            let transition = match reservation.status {
                ReservationStatus::Ongoing if reservation.end_time < now => {
                    Transition::OngoingToCompleted
                }
                ReservationStatus::Confirmed if reservation.end_time < now => {
                    Transition::ConfirmedToCompleted
                }
                ReservationStatus::Confirmed if reservation.start_time < now => {
                    Transition::ConfirmedToOngoing
                }
                _ => continue,
            };
            self.store.transition(reservation.id, transition)?;
            applied.push((reservation.id, transition));
        }
        if !applied.is_empty() {
            info!(count = applied.len(), "sweep applied transitions");
        }
        Ok(applied)
    }

    /// Route a workflow action by name.
    pub async fn dispatch(
        &self,
        action: &str,
        id: Uuid,
        selection: Option<&InterfaceSelection>,
        now: DateTime<Utc>,
    ) -> Result<ActionOutcome, CoreError> {
        let action: WorkflowAction = action.trim().parse().map_err(|_| CoreError::UnknownAction {
            action: action.to_owned(),
        })?;
        debug!(%id, %action, "dispatching workflow action");

        let outcome = match action {
            WorkflowAction::SelectInterfaces => {
                let selection = selection.ok_or_else(|| {
                    CoreError::validation("Select Interfaces needs a source and destination")
                })?;
                ActionOutcome::Updated(self.on_select_interfaces(id, selection).await?)
            }
            WorkflowAction::Approve => {
                let created = self.on_approve(id, now).await?;
                ActionOutcome::Approval {
                    created,
                    reservation: self.store.get(id)?,
                }
            }
            WorkflowAction::Reject => ActionOutcome::Updated(self.on_reject(id)?),
            WorkflowAction::Terminate => ActionOutcome::Updated(self.on_terminate(id, now).await?),
            WorkflowAction::Cancel => ActionOutcome::Updated(self.on_cancel(id).await?),
        };
        Ok(outcome)
    }

    /// Remove a reservation from the store. Active reservations first have
    /// their circuit deleted from the element.
    pub async fn purge_inactive(&self, id: Uuid) -> Result<Option<String>, CoreError> {
        let reservation = self.store.get(id)?;
        let deleted = if reservation.status.is_active() {
            self.ensure_element().await?;
            self.delete_reservation_circuit(&reservation).await?
        } else {
            None
        };
        self.store.delete(id)?;
        info!(%id, status = %reservation.status, "reservation purged");
        Ok(deleted)
    }

    // ── Direct circuit commands ──────────────────────────────────────

    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        self.ensure_element().await?;
        match cmd {
            Command::CreateCircuit(request) => {
                self.submit(&request).await?;
                Ok(CommandResult::Ok)
            }
            Command::DeleteCircuit { key } => {
                let row = self
                    .circuits()
                    .await?
                    .into_iter()
                    .find(|c| c.key == key)
                    .ok_or_else(|| CoreError::not_found("circuit", key))?;
                self.delete_shared(&row.shared_id).await?;
                Ok(CommandResult::Deleted(vec![row.shared_id]))
            }
            Command::StopCircuit { key, now } => {
                let end_time = format_time(now + ChronoDuration::minutes(STOP_GRACE_MINUTES));
                debug!(%key, %end_time, "stopping circuit");
                self.device
                    .send_message(&InterAppMessage::EditCircuit {
                        circuit_id: key,
                        end_time,
                    })
                    .await?;
                Ok(CommandResult::Ok)
            }
            Command::DeleteCircuitsOnInterface { circuit_name } => {
                let mut deleted = Vec::new();
                for row in self.circuits().await? {
                    if row.touches(&circuit_name) {
                        self.delete_shared(&row.shared_id).await?;
                        deleted.push(row.shared_id);
                    }
                }
                info!(interface = %circuit_name, count = deleted.len(), "circuits deleted");
                Ok(CommandResult::Deleted(deleted))
            }
        }
    }

    async fn submit(&self, request: &CircuitRequest) -> Result<(), CoreError> {
        let fields = request.to_fields();
        debug!(
            service_id = %fields.service_id,
            source = %fields.source,
            destination = %fields.destination,
            capacity = fields.capacity,
            "submitting circuit request"
        );
        self.device.submit_circuit(&fields).await
    }

    async fn delete_shared(&self, shared_id: &str) -> Result<(), CoreError> {
        debug!(shared_id, "deleting circuit");
        self.device
            .send_message(&InterAppMessage::DeleteCircuit {
                shared_id: shared_id.to_owned(),
            })
            .await
    }
}
