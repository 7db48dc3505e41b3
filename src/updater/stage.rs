//! Staging of candidate skill copies.
//!
//! A `StagingArea` owns a freshly created temporary root; the whole tree is
//! removed when the value drops, so cleanup is guaranteed on every exit
//! path (success, unchanged short-circuit, or error). Candidates are
//! materialized either by local copy or through a `SkillFetcher`
//! collaborator, and re-validated afterwards in both cases.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tracing::debug;

use crate::error::{Result, SkError};
use crate::registry::{SkillSource, validate_repo_path};
use crate::skill::validate_skill_dir;
use crate::utils::fs::copy_dir_all;

/// Materialize a named skill under a staging root from a source descriptor.
///
/// The subprocess-based implementation is the only one shipped; the trait
/// keeps the update engine independent of any particular fetch technology.
pub trait SkillFetcher {
    fn fetch(&self, stage_root: &Path, name: &str, source: &SkillSource) -> Result<()>;
}

/// External installer program invoked as a subprocess. On success (zero
/// exit) it must leave a valid skill directory at `<stage-root>/<name>`.
#[derive(Debug, Clone)]
pub struct InstallerProcess {
    program: PathBuf,
}

impl InstallerProcess {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl SkillFetcher for InstallerProcess {
    fn fetch(&self, stage_root: &Path, name: &str, source: &SkillSource) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--dest").arg(stage_root).arg("--name").arg(name);

        // descriptor problems must surface before anything is spawned
        match source {
            SkillSource::Url {
                url,
                git_ref,
                method,
            } => {
                cmd.arg("--url").arg(url);
                push_ref_method(&mut cmd, git_ref.as_deref(), *method);
            }
            SkillSource::Repo {
                repo,
                path,
                git_ref,
                method,
            } => {
                let rel = path.single()?;
                validate_repo_path(rel)?;
                cmd.arg("--repo").arg(repo).arg("--path").arg(rel);
                push_ref_method(&mut cmd, git_ref.as_deref(), *method);
            }
            SkillSource::Local { .. } => {
                return Err(SkError::ValidationFailed(
                    "local sources are staged by copy, not through the installer".to_string(),
                ));
            }
        }

        if !self.program.is_file() {
            return Err(SkError::MissingConfig(format!(
                "installer not found: {} (pass --installer)",
                self.program.display()
            )));
        }

        debug!(target: "stage", installer = %self.program.display(), name, "invoking installer");
        let status = cmd.status().map_err(|err| {
            SkError::Installer(format!("spawn {}: {err}", self.program.display()))
        })?;
        if !status.success() {
            return Err(SkError::Installer(format!(
                "{} exited with {status}",
                self.program.display()
            )));
        }
        Ok(())
    }
}

fn push_ref_method(
    cmd: &mut Command,
    git_ref: Option<&str>,
    method: Option<crate::registry::FetchMethod>,
) {
    if let Some(git_ref) = git_ref {
        cmd.arg("--ref").arg(git_ref);
    }
    if let Some(method) = method {
        cmd.arg("--method").arg(method.to_string());
    }
}

/// One candidate skill copy in an isolated temporary root.
pub struct StagingArea {
    temp: TempDir,
}

impl StagingArea {
    /// Allocate a fresh staging root on disk.
    pub fn create() -> Result<Self> {
        let temp = tempfile::Builder::new()
            .prefix("skill-update-")
            .tempdir()?;
        std::fs::create_dir_all(temp.path().join("stage"))?;
        Ok(Self { temp })
    }

    /// The directory the candidate is materialized under.
    pub fn root(&self) -> PathBuf {
        self.temp.path().join("stage")
    }

    /// Where the staged copy of `name` lands.
    pub fn staged_path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Stage by copying a local skill directory.
    pub fn stage_local(&self, name: &str, source_dir: &Path) -> Result<PathBuf> {
        validate_skill_dir(source_dir)?;
        let staged = self.staged_path(name);
        copy_dir_all(source_dir, &staged)?;
        validate_skill_dir(&staged)?;
        Ok(staged)
    }

    /// Stage through the fetch collaborator, then re-validate the result
    /// (the collaborator is opaque and not trusted to produce a valid
    /// layout).
    pub fn stage_remote(
        &self,
        name: &str,
        source: &SkillSource,
        fetcher: &dyn SkillFetcher,
    ) -> Result<PathBuf> {
        fetcher.fetch(&self.root(), name, source)?;
        let staged = self.staged_path(name);
        validate_skill_dir(&staged)?;
        Ok(staged)
    }
}
