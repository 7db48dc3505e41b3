//! sk add - Register or replace a skill's source record

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{OutputFormat, emit_json};
use crate::error::{Result, SkError};
use crate::registry::{FetchMethod, RepoPath, SkillSource, validate_repo_path};
use crate::skill::validate_skill_dir;
use crate::utils::fs::expand_path;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Skill name
    #[arg(long)]
    pub name: String,

    /// Local skill directory to use as the source
    #[arg(long, value_name = "DIR", conflicts_with_all = ["url", "repo", "path"])]
    pub local_path: Option<String>,

    /// URL pointing at a skill directory in a remote repository
    #[arg(long, conflicts_with = "repo")]
    pub url: Option<String>,

    /// Repository in owner/repo form (default: configured default_repo)
    #[arg(long, value_name = "OWNER/REPO")]
    pub repo: Option<String>,

    /// Repository-relative path of the skill, for --repo or the default
    /// repository
    #[arg(long, value_name = "PATH")]
    pub path: Option<String>,

    /// Branch or tag
    #[arg(long = "ref", value_name = "REF", default_value = "main")]
    pub git_ref: String,

    /// Fetch method passed to the installer
    #[arg(long, value_enum, default_value_t = FetchMethod::Auto)]
    pub method: FetchMethod,
}

pub fn run(ctx: &AppContext, args: &AddArgs) -> Result<()> {
    let mut registry = ctx.registry.load()?;

    let source = if let Some(local) = &args.local_path {
        let local_path = expand_path(local);
        validate_skill_dir(&local_path)?;
        SkillSource::Local { local_path }
    } else if let Some(url) = &args.url {
        SkillSource::Url {
            url: url.clone(),
            git_ref: Some(args.git_ref.clone()),
            method: Some(args.method),
        }
    } else {
        let repo = args
            .repo
            .clone()
            .or_else(|| ctx.config.registry.default_repo.clone())
            .ok_or_else(|| {
                SkError::MissingConfig(
                    "no --repo given and no default repository configured".to_string(),
                )
            })?;
        let path = args.path.clone().ok_or_else(|| {
            SkError::MissingConfig(
                "--path is required with --repo or the default repository".to_string(),
            )
        })?;
        validate_repo_path(&path)?;
        SkillSource::Repo {
            repo,
            path: RepoPath::from(path),
            git_ref: Some(args.git_ref.clone()),
            method: Some(args.method),
        }
    };

    registry.insert(&args.name, source.clone());
    ctx.registry.save(&registry)?;

    match ctx.output_format {
        OutputFormat::Json => emit_json(&serde_json::json!({
            "status": "ok",
            "name": args.name,
            "source": source,
        })),
        OutputFormat::Human => {
            println!("Recorded source: {} ({})", args.name, source.describe());
            Ok(())
        }
    }
}
