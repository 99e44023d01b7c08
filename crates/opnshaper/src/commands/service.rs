//! Service-level commands: reconfigure and the interface listing.

use tabled::Tabled;

use opnshaper_core::{InterfaceRow, Shaper};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct InterfaceTableRow {
    #[tabled(rename = "Identifier")]
    identifier: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Device")]
    device: String,
}

impl InterfaceTableRow {
    fn new(i: &InterfaceRow) -> Self {
        Self {
            identifier: i.identifier.clone(),
            description: output::or_dash(&i.description),
            device: output::or_dash(&i.device),
        }
    }
}

pub async fn interfaces(shaper: &Shaper, global: &GlobalOpts) -> Result<(), CliError> {
    let rows = shaper.list_interfaces().await?;
    let out = output::render_list(
        &global.output,
        &rows,
        InterfaceTableRow::new,
        |i| i.identifier.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Explicit reconfigure. Unlike the commit after a mutation, failure here
/// is an error.
pub async fn reconfigure(shaper: &Shaper, global: &GlobalOpts) -> Result<(), CliError> {
    shaper.reconfigure().await?;
    output::print_done("traffic shaper reconfigured", global.quiet);
    Ok(())
}
