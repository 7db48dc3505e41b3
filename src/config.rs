//! Layered configuration.
//!
//! Defaults, overlaid by an optional `config.toml` under the platform
//! config directory (or `SK_CONFIG`), overlaid by `SK_*` environment
//! variables. Path-shaped settings also have CLI flags, which win over
//! everything here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub update: UpdateConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Installed-skills root directory.
    #[serde(default)]
    pub skills_root: Option<String>,
    /// Source registry file.
    #[serde(default)]
    pub registry_file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Repository assumed by `add --path` when `--repo` is not given.
    #[serde(default)]
    pub default_repo: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Fetch collaborator binary for remote sources.
    #[serde(default)]
    pub installer: Option<String>,
    /// Retain timestamped backups of replaced skills.
    #[serde(default)]
    pub keep_backups: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        let explicit = std::env::var("SK_CONFIG").ok().map(PathBuf::from);
        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else if let Some(global) = Self::load_global()? {
            config.merge_patch(global);
        }

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("sk/config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| SkError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| SkError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.paths {
            if let Some(value) = patch.skills_root {
                self.paths.skills_root = Some(value);
            }
            if let Some(value) = patch.registry_file {
                self.paths.registry_file = Some(value);
            }
        }
        if let Some(patch) = patch.registry {
            if let Some(value) = patch.default_repo {
                self.registry.default_repo = Some(value);
            }
        }
        if let Some(patch) = patch.update {
            if let Some(value) = patch.installer {
                self.update.installer = Some(value);
            }
            if let Some(value) = patch.keep_backups {
                self.update.keep_backups = value;
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Some(value) = env_string("SK_DEFAULT_REPO") {
            self.registry.default_repo = Some(value);
        }
        if let Some(value) = env_bool("SK_KEEP_BACKUPS") {
            self.update.keep_backups = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub paths: Option<PathsPatch>,
    pub registry: Option<RegistryPatch>,
    pub update: Option<UpdatePatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PathsPatch {
    pub skills_root: Option<String>,
    pub registry_file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RegistryPatch {
    pub default_repo: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct UpdatePatch {
    pub installer: Option<String>,
    pub keep_backups: Option<bool>,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
