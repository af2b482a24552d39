//! Live circuit handlers.

use chrono::Utc;
use tabled::Tabled;

use nimbra_core::{
    CircuitParams, CircuitRow, Command as CoreCommand, CommandResult, build_request, params,
};

use crate::cli::{CircuitsArgs, CircuitsCommand, CreateCircuitArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{CliController, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CircuitTableRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Service")]
    service_id: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Mbps")]
    capacity: String,
    #[tabled(rename = "Form")]
    form_name: String,
    #[tabled(rename = "VLAN")]
    vlan: String,
    #[tabled(rename = "Shared ID")]
    shared_id: String,
}

impl From<&CircuitRow> for CircuitTableRow {
    fn from(c: &CircuitRow) -> Self {
        Self {
            key: c.key.clone(),
            service_id: c.service_id.clone(),
            source: c.source.clone(),
            destination: c.destination.clone(),
            capacity: c.capacity.map(|v| v.to_string()).unwrap_or_default(),
            form_name: c.form_name.clone().unwrap_or_default(),
            vlan: c.vlan.clone().unwrap_or_default(),
            shared_id: c.shared_id.clone(),
        }
    }
}

/// Turn raw CLI parameters into a validated creation command.
fn create_command(args: &CreateCircuitArgs) -> Result<CoreCommand, CliError> {
    let circuit_type = util::parse_circuit_type(&args.circuit_type)?;
    let inputs = CircuitParams {
        source: params::parse_required("source", &args.source)?,
        destination: params::parse_required("destination", &args.destination)?,
        capacity: i64::from(params::parse_capacity(&args.capacity)?),
        start_time: args
            .start
            .as_deref()
            .map(|raw| params::parse_time_param("start", raw))
            .transpose()?
            .flatten(),
        end_time: args
            .end
            .as_deref()
            .map(|raw| params::parse_time_param("end", raw))
            .transpose()?
            .flatten(),
        vlan: util::parse_optional_u16("vlan", args.vlan.as_deref())?,
        form_name: args.form_name.as_deref().and_then(params::parse_optional),
        srt: util::parse_srt(circuit_type, &args.srt)?,
    };
    Ok(CoreCommand::CreateCircuit(build_request(circuit_type, inputs)?))
}

fn report_deleted(result: &CommandResult, global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    match result {
        CommandResult::Deleted(ids) if ids.is_empty() => {
            output::print_success("No circuits to delete", color, global.quiet);
        }
        CommandResult::Deleted(ids) => {
            output::print_output(&ids.join("\n"), global.quiet);
            output::print_success(
                &format!("Deleted {} circuit(s)", ids.len()),
                color,
                global.quiet,
            );
        }
        CommandResult::Ok => output::print_success("Done", color, global.quiet),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &CliController,
    args: CircuitsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    match args.command {
        CircuitsCommand::List => {
            let circuits = controller.circuits().await?;
            let out = output::render_list(
                &global.output,
                &circuits,
                |c| CircuitTableRow::from(c),
                |c| c.key.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CircuitsCommand::Create(args) => {
            let cmd = create_command(&args)?;
            controller.execute(cmd).await?;
            output::print_success("Circuit creation requested", color, global.quiet);
            Ok(())
        }

        CircuitsCommand::Delete { key } => {
            let key = params::parse_required("key", &key)?;
            if !util::confirm(&format!("Delete circuit '{key}'?"), global.yes)? {
                return Ok(());
            }
            let result = controller.execute(CoreCommand::DeleteCircuit { key }).await?;
            report_deleted(&result, global);
            Ok(())
        }

        CircuitsCommand::Stop { key } => {
            let key = params::parse_required("key", &key)?;
            controller
                .execute(CoreCommand::StopCircuit {
                    key: key.clone(),
                    now: Utc::now(),
                })
                .await?;
            output::print_success(
                &format!("Circuit '{key}' ends in one minute"),
                color,
                global.quiet,
            );
            Ok(())
        }

        CircuitsCommand::PurgeInterface { circuit_name } => {
            let circuit_name = params::parse_required("circuit name", &circuit_name)?;
            if !util::confirm(
                &format!("Delete every circuit on '{circuit_name}'? This is destructive."),
                global.yes,
            )? {
                return Ok(());
            }
            let result = controller
                .execute(CoreCommand::DeleteCircuitsOnInterface { circuit_name })
                .await?;
            report_deleted(&result, global);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nimbra_core::CircuitRequest;

    use super::*;
    use crate::cli::SrtArgs;

    fn args(circuit_type: &str, capacity: &str) -> CreateCircuitArgs {
        CreateCircuitArgs {
            circuit_type: circuit_type.into(),
            source: r#"["3_nodeA"]"#.into(),
            destination: "7_nodeB".into(),
            capacity: capacity.into(),
            start: Some("-1".into()),
            end: Some(r#"["2026-03-01T12:00:00Z"]"#.into()),
            vlan: None,
            form_name: None,
            srt: SrtArgs {
                port: None,
                mode: None,
                passphrase: None,
            },
        }
    }

    #[test]
    fn script_form_parameters_build_a_request() {
        let CoreCommand::CreateCircuit(request) = create_command(&args("jxs", "100")).unwrap()
        else {
            panic!("expected a creation command");
        };
        assert!(matches!(request, CircuitRequest::Jxs { hitless: false, .. }));
        let common = request.common();
        assert_eq!(common.source, "3_nodeA");
        assert_eq!(common.capacity, 100);
        assert!(common.start_time.is_none());
        assert!(common.end_time.is_some());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(
            create_command(&args("jxs", "0")),
            Err(CliError::Validation { .. })
        ));
    }
}
