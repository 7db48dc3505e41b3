//! sk update - Update installed skills from their registered sources

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{OutputFormat, emit_json};
use crate::error::{Result, SkError};
use crate::updater::{InstallerProcess, UpdateEngine, UpdateStatus};
use crate::utils::fs::expand_path;

/// Installer location tried when neither the flag nor configuration names
/// one, relative to the skills root.
const DEFAULT_INSTALLER_PATH: &str = ".system/skill-installer/install-skill-from-github";

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Update every registered skill
    #[arg(long, conflicts_with = "names")]
    pub all: bool,

    /// Skill names to update
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,

    /// Fetch collaborator binary for remote sources
    #[arg(long, value_name = "BIN", env = "SK_INSTALLER")]
    pub installer: Option<PathBuf>,

    /// Keep the timestamped backup of each replaced skill
    #[arg(long)]
    pub keep_backup: bool,
}

pub fn run(ctx: &AppContext, args: &UpdateArgs) -> Result<()> {
    if !ctx.registry.exists() {
        return Err(SkError::MissingConfig(format!(
            "registry not found: {} (record a source with `sk add` first)",
            ctx.registry.path().display()
        )));
    }
    let registry = ctx.registry.load()?;

    let targets: Vec<String> = if args.all {
        registry.names()
    } else {
        args.names.clone()
    };
    if targets.is_empty() {
        return Err(SkError::MissingConfig(
            "nothing to update: pass --all or one or more skill names".to_string(),
        ));
    }

    let fetcher = InstallerProcess::new(resolve_installer(ctx, args));
    let keep_backup = args.keep_backup || ctx.config.update.keep_backups;
    let engine = UpdateEngine::new(&ctx.skills_root, &fetcher, keep_backup);
    let reports = engine.update_batch(&registry, &targets);

    let failed = reports.iter().filter(|report| report.is_failure()).count();

    match ctx.output_format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = reports
                .iter()
                .map(|report| {
                    let (status, error) = match &report.status {
                        UpdateStatus::Changed => ("changed", None),
                        UpdateStatus::Unchanged => ("unchanged", None),
                        UpdateStatus::SkippedMissing => ("skipped", None),
                        UpdateStatus::Failed(err) => ("failed", Some(err.to_string())),
                    };
                    serde_json::json!({
                        "name": report.name,
                        "status": status,
                        "error": error,
                    })
                })
                .collect();
            emit_json(&serde_json::json!({
                "status": if failed == 0 { "ok" } else { "partial" },
                "updated": reports
                    .iter()
                    .filter(|r| matches!(r.status, UpdateStatus::Changed))
                    .count(),
                "failed": failed,
                "skills": entries,
            }))?;
        }
        OutputFormat::Human => {
            for report in &reports {
                match &report.status {
                    UpdateStatus::Changed => {
                        println!("{} updated: {}", "✓".green().bold(), report.name);
                    }
                    UpdateStatus::Unchanged => {
                        println!("{} up to date: {}", "·".dimmed(), report.name);
                    }
                    UpdateStatus::SkippedMissing => {
                        eprintln!(
                            "{} no source record, skipped: {}",
                            "!".yellow(),
                            report.name
                        );
                    }
                    UpdateStatus::Failed(err) => {
                        eprintln!("{} failed: {} - {err}", "✗".red(), report.name);
                    }
                }
            }
        }
    }

    if failed > 0 {
        Err(SkError::UpdatesFailed(failed))
    } else {
        Ok(())
    }
}

fn resolve_installer(ctx: &AppContext, args: &UpdateArgs) -> PathBuf {
    args.installer.clone().unwrap_or_else(|| {
        ctx.config
            .update
            .installer
            .as_deref()
            .map_or_else(
                || ctx.skills_root.join(DEFAULT_INSTALLER_PATH),
                expand_path,
            )
    })
}
