//! Command dispatch: bridges CLI args -> core Controller -> output formatting.

pub mod circuits;
pub mod config_cmd;
pub mod element;
pub mod interfaces;
pub mod reservations;
pub mod util;

use nimbra_api::VisionClient;
use nimbra_core::{Controller, CoreError, FileStore};

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// Controller over the HTTP client and the reservation file.
pub type CliController = Controller<VisionClient, FileStore>;

/// Build the controller without contacting the element. Operations that
/// send anything check the element first.
pub fn build_controller(global: &GlobalOpts) -> Result<CliController, CliError> {
    let resolved = config::resolve(global)?;
    let settings = &resolved.controller;
    let client = VisionClient::new(
        settings.url.as_str(),
        &settings.element,
        &settings.transport(),
    )
    .map_err(CoreError::from)?;
    let store = FileStore::open(&resolved.store)?;
    tracing::debug!(store = %resolved.store.display(), "reservation store");
    Ok(Controller::new(client, store).with_retry(settings.retry))
}

/// Dispatch a gateway or store bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Element => element::handle(&build_controller(global)?, global).await,
        Command::Interfaces(args) => interfaces::handle(args, global).await,
        Command::Circuits(args) => circuits::handle(&build_controller(global)?, args, global).await,
        Command::Reservations(args) => reservations::handle(args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
