//! Element status handler.

use nimbra_api::ElementInfo;
use nimbra_core::NimbraDevice;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::CliController;

fn detail(element: &ElementInfo, color: bool) -> String {
    let state = if color && !element.is_active() {
        use owo_colors::OwoColorize;
        element.state.red().to_string()
    } else {
        element.state.clone()
    };
    format!("Element:  {}\nState:    {state}", element.name)
}

pub async fn handle(controller: &CliController, global: &GlobalOpts) -> Result<(), CliError> {
    let element = controller.device().element_info().await?;
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &element,
        |e| detail(e, color),
        |e| e.state.clone(),
    );
    output::print_output(&out, global.quiet);
    if !element.is_active() {
        output::print_warning("element is not Active; circuit operations will fail", color);
    }
    Ok(())
}
