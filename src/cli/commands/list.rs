//! sk list - List registered source records

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputFormat, emit_human, emit_json};
use crate::error::Result;

#[derive(Args, Debug, Default)]
pub struct ListArgs {}

pub fn run(ctx: &AppContext, _args: &ListArgs) -> Result<()> {
    let registry = ctx.registry.load()?;

    match ctx.output_format {
        OutputFormat::Json => emit_json(&serde_json::json!({
            "status": "ok",
            "version": registry.version,
            "count": registry.skills.len(),
            "skills": registry.skills,
        })),
        OutputFormat::Human => {
            if registry.is_empty() {
                println!("No sources recorded");
                println!();
                println!("Record one with: sk add --name <name> --local-path <dir>");
                return Ok(());
            }

            let mut layout = HumanLayout::new();
            layout.title("Skill Sources");
            for (name, source) in &registry.skills {
                layout.kv(name, &source.describe());
            }
            layout
                .blank()
                .push_line(format!("Total: {} sources", registry.skills.len()));
            emit_human(layout);
            Ok(())
        }
    }
}
