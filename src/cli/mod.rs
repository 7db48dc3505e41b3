//! Command-line surface.

pub mod commands;
pub mod output;

pub use commands::Commands;
pub use output::OutputFormat;

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "sk",
    version,
    about = "Keep installed agent skills in sync with their registered sources"
)]
pub struct Cli {
    /// Installed-skills root (default: platform data dir)
    #[arg(long, global = true, value_name = "DIR", env = "SK_SKILLS_ROOT")]
    pub skills_root: Option<PathBuf>,

    /// Source registry file (default: <skills-root>/.skill-sources.json)
    #[arg(long, global = true, value_name = "FILE", env = "SK_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        if self.robot {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}
