//! Formats command implementation.

use anyhow::Result;
use clap::Args;

use crate::output;
use crate::settings;

use super::Globals;

#[derive(Args, Debug)]
pub struct FormatsArgs {
    /// Print the formats as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: FormatsArgs, globals: &Globals) -> Result<()> {
    let config = settings::load_config(globals.config.as_deref())?;
    let registry = config.registry()?;

    if args.json {
        return output::json_pretty(&registry.all());
    }

    for format in registry.all() {
        output::field("metadataPrefix", &format.prefix);
        output::field("  schema", &format.schema_url);
        output::field("  namespace", &format.namespace);
        if let Some(selector) = &format.selector_property {
            output::field("  selector", selector);
        }
    }
    Ok(())
}
