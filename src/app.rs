use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::{Result, SkError};
use crate::registry::{DEFAULT_REGISTRY_FILE, RegistryStore};
use crate::utils::fs::expand_path;

pub struct AppContext {
    pub skills_root: PathBuf,
    pub registry: RegistryStore,
    pub config: Config,
    pub output_format: OutputFormat,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let config = Config::load()?;

        let skills_root = match (&cli.skills_root, &config.paths.skills_root) {
            (Some(root), _) => root.clone(),
            (None, Some(root)) => expand_path(root),
            (None, None) => default_skills_root()?,
        };

        let registry_path = match (&cli.registry, &config.paths.registry_file) {
            (Some(path), _) => path.clone(),
            (None, Some(path)) => expand_path(path),
            (None, None) => skills_root.join(DEFAULT_REGISTRY_FILE),
        };

        Ok(Self {
            skills_root,
            registry: RegistryStore::new(registry_path),
            config,
            output_format: cli.output_format(),
            verbosity: cli.verbose,
        })
    }
}

fn default_skills_root() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| SkError::MissingConfig("data directory not found".to_string()))?;
    Ok(data_dir.join("sk/skills"))
}
