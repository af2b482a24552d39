//! Reservation workflow handlers.

use std::time::Duration;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use tabled::Tabled;

use nimbra_core::model::format_time;
use nimbra_core::{
    ActionOutcome, FileStore, InterfaceSelection, NewReservation, Reservation, ReservationField,
    ReservationStatus, ReservationStore, params,
};

use crate::cli::{
    CreateReservationArgs, GlobalOpts, OptionalSelection, ReservationsArgs, ReservationsCommand,
    SelectArgs,
};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::{build_controller, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ReservationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    circuit_type: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Mbps")]
    capacity: i64,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Reservation> for ReservationRow {
    fn from(r: &Reservation) -> Self {
        Self {
            id: r.id.to_string(),
            circuit_type: r.circuit_type.to_string(),
            source: r.source_interface.clone().unwrap_or_default(),
            destination: r.destination_interface.clone().unwrap_or_default(),
            capacity: r.capacity,
            start: format_time(r.start_time),
            end: format_time(r.end_time),
            status: r.status.to_string(),
        }
    }
}

fn detail(r: &Reservation, color: bool) -> String {
    let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
    let mut lines = vec![
        format!("ID:           {}", r.id),
        format!("Status:       {}", output::paint_status(r.status, color)),
        format!("Circuit Type: {}", r.circuit_type),
        format!("Source:       {} ({})", opt(&r.source_interface), opt(&r.source_node)),
        format!(
            "Destination:  {} ({})",
            opt(&r.destination_interface),
            opt(&r.destination_node)
        ),
        format!("Capacity:     {} Mbps", r.capacity),
        format!("Start:        {}", format_time(r.start_time)),
        format!("End:          {}", format_time(r.end_time)),
    ];
    if let Some(vlan) = r.vlan {
        lines.push(format!("VLAN:         {vlan}"));
    }
    if let Some(ref srt) = r.srt {
        lines.push(format!("SRT:          port {} ({})", srt.port, srt.mode.label()));
    }
    if let Some(ref notes) = r.notes {
        lines.push(format!("Notes:        {notes}"));
    }
    lines.join("\n")
}

fn print_reservation(r: &Reservation, global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_single(&global.output, r, |r| detail(r, color), |r| r.id.to_string());
    output::print_output(&out, global.quiet);
}

fn open_store(global: &GlobalOpts) -> Result<FileStore, CliError> {
    Ok(FileStore::open(config::resolve_store(global)?)?)
}

// ── Argument conversion ─────────────────────────────────────────────

fn required_time(name: &str, raw: &str) -> Result<DateTime<Utc>, CliError> {
    params::parse_time_param(name, raw)?.ok_or_else(|| CliError::Validation {
        field: name.into(),
        reason: "a time is required".into(),
    })
}

fn new_reservation(args: &CreateReservationArgs) -> Result<NewReservation, CliError> {
    let circuit_type = util::parse_circuit_type(&args.circuit_type)?;
    let capacity = args
        .capacity
        .as_deref()
        .and_then(params::parse_optional)
        .map(|value| {
            value.parse::<i64>().map_err(|_| CliError::Validation {
                field: "capacity".into(),
                reason: format!("'{value}' is not an integer"),
            })
        })
        .transpose()?;

    Ok(NewReservation {
        circuit_type,
        capacity,
        start_time: required_time("start", &args.start)?,
        end_time: required_time("end", &args.end)?,
        vlan: util::parse_optional_u16("vlan", args.vlan.as_deref())?,
        srt: util::parse_srt(circuit_type, &args.srt)?,
    })
}

fn selection(args: &SelectArgs) -> Result<InterfaceSelection, CliError> {
    Ok(InterfaceSelection {
        source_interface: params::parse_required("source", &args.source)?,
        destination_interface: params::parse_required("destination", &args.destination)?,
        source_node: params::parse_required("source node", &args.source_node)?,
        destination_node: params::parse_required("destination node", &args.destination_node)?,
    })
}

/// A selection for `action`, present only when every part was given.
fn optional_selection(args: &OptionalSelection) -> Result<Option<InterfaceSelection>, CliError> {
    let (Some(source), Some(destination), Some(source_node), Some(destination_node)) = (
        args.source.as_deref(),
        args.destination.as_deref(),
        args.source_node.as_deref(),
        args.destination_node.as_deref(),
    ) else {
        return Ok(None);
    };
    Ok(Some(InterfaceSelection {
        source_interface: params::parse_required("source", source)?,
        destination_interface: params::parse_required("destination", destination)?,
        source_node: params::parse_required("source node", source_node)?,
        destination_node: params::parse_required("destination node", destination_node)?,
    }))
}

fn spinner(message: String, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(args: ReservationsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    match args.command {
        ReservationsCommand::List { status } => {
            let store = open_store(global)?;
            let status: Option<ReservationStatus> = status
                .as_deref()
                .map(|raw| util::parse_enum("status", raw))
                .transpose()?;
            let mut all = store.list()?;
            if let Some(status) = status {
                all.retain(|r| r.status == status);
            }
            let out = output::render_list(
                &global.output,
                &all,
                |r| ReservationRow::from(r),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReservationsCommand::Show { id } => {
            let reservation = open_store(global)?.get(util::parse_id(&id)?)?;
            print_reservation(&reservation, global);
            Ok(())
        }

        ReservationsCommand::GetField { id, field } => {
            let field: ReservationField = util::parse_enum("field", &field)?;
            let value = open_store(global)?.get_field(util::parse_id(&id)?, field)?;
            output::print_output(&value.unwrap_or_default(), global.quiet);
            Ok(())
        }

        ReservationsCommand::SetField { id, field, value } => {
            let field: ReservationField = util::parse_enum("field", &field)?;
            open_store(global)?.set_field(util::parse_id(&id)?, field, &value)?;
            output::print_success(&format!("{field} updated"), color, global.quiet);
            Ok(())
        }

        ReservationsCommand::Create(args) => {
            let new = new_reservation(&args)?;
            let reservation = build_controller(global)?.create_draft(new)?;
            print_reservation(&reservation, global);
            Ok(())
        }

        ReservationsCommand::Select(args) => {
            let id = util::parse_id(&args.id)?;
            let selection = selection(&args)?;
            let reservation = build_controller(global)?
                .on_select_interfaces(id, &selection)
                .await?;
            print_reservation(&reservation, global);
            output::print_success("Submitted for approval", color, global.quiet);
            Ok(())
        }

        ReservationsCommand::Approve { id } => {
            let id = util::parse_id(&id)?;
            let controller = build_controller(global)?;
            let retry = controller.retry();
            let bar = spinner(
                format!(
                    "Creating circuit, waiting up to {}s for confirmation",
                    retry.max_wait().as_secs()
                ),
                global.quiet,
            );
            let created = controller.on_approve(id, Utc::now()).await;
            bar.finish_and_clear();
            let created = created?;

            let reservation = controller.store().get(id)?;
            print_reservation(&reservation, global);
            if created {
                output::print_success("Circuit confirmed", color, global.quiet);
                Ok(())
            } else {
                Err(CliError::NotConfirmed { id: id.to_string() })
            }
        }

        ReservationsCommand::Reject { id } => {
            let reservation = build_controller(global)?.on_reject(util::parse_id(&id)?)?;
            print_reservation(&reservation, global);
            Ok(())
        }

        ReservationsCommand::Terminate { id } => {
            let id = util::parse_id(&id)?;
            if !util::confirm(&format!("Terminate reservation {id} now?"), global.yes)? {
                return Ok(());
            }
            let reservation = build_controller(global)?
                .on_terminate(id, Utc::now())
                .await?;
            print_reservation(&reservation, global);
            Ok(())
        }

        ReservationsCommand::Cancel { id } => {
            let id = util::parse_id(&id)?;
            if !util::confirm(&format!("Cancel reservation {id}?"), global.yes)? {
                return Ok(());
            }
            let reservation = build_controller(global)?.on_cancel(id).await?;
            print_reservation(&reservation, global);
            Ok(())
        }

        ReservationsCommand::Action {
            id,
            action,
            selection,
        } => {
            let id = util::parse_id(&id)?;
            let selection = optional_selection(&selection)?;
            let action = params::parse_script_value(&action);
            let outcome = build_controller(global)?
                .dispatch(&action, id, selection.as_ref(), Utc::now())
                .await?;
            print_reservation(outcome.reservation(), global);
            match outcome {
                ActionOutcome::Approval { created: false, .. } => {
                    Err(CliError::NotConfirmed { id: id.to_string() })
                }
                _ => Ok(()),
            }
        }

        ReservationsCommand::Sweep => {
            let applied = build_controller(global)?.sweep_expired(Utc::now())?;
            for (id, transition) in &applied {
                output::print_output(&format!("{id}\t{transition}"), global.quiet);
            }
            output::print_success(
                &format!("{} reservation(s) updated", applied.len()),
                color,
                global.quiet,
            );
            Ok(())
        }

        ReservationsCommand::Purge { id } => {
            let id = util::parse_id(&id)?;
            if !util::confirm(
                &format!("Remove reservation {id}? An active circuit is deleted too."),
                global.yes,
            )? {
                return Ok(());
            }
            let deleted = build_controller(global)?.purge_inactive(id).await?;
            if let Some(shared_id) = deleted {
                output::print_output(&shared_id, global.quiet);
            }
            output::print_success("Reservation removed", color, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nimbra_core::CircuitType;

    use super::*;
    use crate::cli::SrtArgs;

    fn create_args(capacity: Option<&str>) -> CreateReservationArgs {
        CreateReservationArgs {
            circuit_type: r#"["1"]"#.into(),
            capacity: capacity.map(Into::into),
            start: "2026-03-01T10:00:00Z".into(),
            end: r#"["2026-03-01T12:00:00Z"]"#.into(),
            vlan: None,
            srt: SrtArgs {
                port: None,
                mode: None,
                passphrase: None,
            },
        }
    }

    #[test]
    fn draft_input_from_script_parameters() {
        let new = new_reservation(&create_args(Some("-1"))).unwrap();
        assert_eq!(new.circuit_type, CircuitType::J2k);
        assert_eq!(new.capacity, None);
        assert!(new.end_time > new.start_time);

        let explicit = new_reservation(&create_args(Some("120"))).unwrap();
        assert_eq!(explicit.capacity, Some(120));
    }

    #[test]
    fn partial_selection_is_absent() {
        let partial = OptionalSelection {
            source: Some("nodeA_eth1".into()),
            destination: None,
            source_node: Some("nodeA".into()),
            destination_node: Some("nodeB".into()),
        };
        assert!(optional_selection(&partial).unwrap().is_none());
    }
}
