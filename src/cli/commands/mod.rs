//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod add;
pub mod list;
pub mod remove;
pub mod update;

use crate::app::AppContext;
use crate::error::Result;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Add(args) => add::run(ctx, args),
        Commands::List(args) => list::run(ctx, args),
        Commands::Remove(args) => remove::run(ctx, args),
        Commands::Update(args) => update::run(ctx, args),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register or replace a skill's source record
    Add(add::AddArgs),

    /// List registered source records
    List(list::ListArgs),

    /// Remove source records
    Remove(remove::RemoveArgs),

    /// Update installed skills from their registered sources
    Update(update::UpdateArgs),
}
