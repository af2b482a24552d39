//! Interface catalog handlers.

use tabled::Tabled;

use nimbra_core::{Direction, InterfaceFamily, InterfaceRecord, naming};

use crate::cli::{GlobalOpts, InterfacesArgs, InterfacesCommand};
use crate::error::CliError;
use crate::output;

use super::{build_controller, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "Interface")]
    interface_id: String,
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "Family")]
    family: String,
    #[tabled(rename = "Capability")]
    capability: String,
    #[tabled(rename = "Circuit Name")]
    circuit_name: String,
    #[tabled(rename = "In Use")]
    in_use: String,
}

impl From<&InterfaceRecord> for InterfaceRow {
    fn from(r: &InterfaceRecord) -> Self {
        Self {
            interface_id: r.interface_id.clone(),
            node: r.node_name.clone(),
            family: r.family.to_string(),
            capability: r.capability.clone(),
            circuit_name: r.circuit_name.clone(),
            in_use: r
                .in_use
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Node")]
    node: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: InterfacesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        InterfacesCommand::List {
            circuit_type,
            direction,
            node,
        } => {
            let controller = build_controller(global)?;
            let mut records = match (circuit_type, direction) {
                (Some(raw), Some(direction)) => {
                    let circuit_type = util::parse_circuit_type(&raw)?;
                    controller
                        .available_interfaces(circuit_type, Direction::from(direction))
                        .await?
                }
                _ => controller.load_catalog().await?,
            };
            if let Some(ref node) = node {
                records.retain(|r| &r.node_name == node);
            }
            let out = output::render_list(
                &global.output,
                &records,
                |r| InterfaceRow::from(r),
                |r| r.interface_id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        InterfacesCommand::Nodes {
            circuit_type,
            direction,
        } => {
            let controller = build_controller(global)?;
            let circuit_type = util::parse_circuit_type(&circuit_type)?;
            let nodes = controller
                .available_nodes(circuit_type, Direction::from(direction))
                .await?;
            let out = output::render_list(
                &global.output,
                &nodes,
                |n| NodeRow { node: n.clone() },
                Clone::clone,
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        InterfacesCommand::Translate { family, id } => {
            let family: InterfaceFamily = util::parse_enum("family", &family)?;
            let name = naming::translate(family, &id)?;
            output::print_output(&name, global.quiet);
            Ok(())
        }
    }
}
