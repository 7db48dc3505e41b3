//! sk remove - Remove source records

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{OutputFormat, emit_json};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Skill names to remove
    #[arg(value_name = "NAME", required = true, num_args = 1..)]
    pub names: Vec<String>,
}

pub fn run(ctx: &AppContext, args: &RemoveArgs) -> Result<()> {
    let mut registry = ctx.registry.load()?;
    let removed = registry.remove_all(&args.names);

    // nothing matched: leave the registry file untouched
    if !removed.is_empty() {
        ctx.registry.save(&registry)?;
    }

    match ctx.output_format {
        OutputFormat::Json => emit_json(&serde_json::json!({
            "status": "ok",
            "removed": removed,
        })),
        OutputFormat::Human => {
            if removed.is_empty() {
                println!("No sources removed");
            } else {
                for name in &removed {
                    println!("Removed source: {name}");
                }
            }
            Ok(())
        }
    }
}
