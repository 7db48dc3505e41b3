//! Per-skill update workflow and batch orchestration.

use std::path::Path;

use tracing::debug;

use crate::error::{Result, SkError};
use crate::registry::{Registry, SkillSource};
use crate::updater::fingerprint::fingerprint;
use crate::updater::replace::replace_skill;
use crate::updater::stage::{SkillFetcher, StagingArea};

/// Terminal state of one successful skill update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The staged copy differed and was swapped in.
    Changed,
    /// Installed copy already matched the source; nothing was touched.
    Unchanged,
}

/// What happened to one name in a batch.
#[derive(Debug)]
pub enum UpdateStatus {
    Changed,
    Unchanged,
    /// The name has no source record; reported, but not a failure.
    SkippedMissing,
    Failed(SkError),
}

#[derive(Debug)]
pub struct SkillReport {
    pub name: String,
    pub status: UpdateStatus,
}

impl SkillReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, UpdateStatus::Failed(_))
    }
}

/// Drives updates for a batch of skill names, one at a time.
pub struct UpdateEngine<'a> {
    skills_root: &'a Path,
    fetcher: &'a dyn SkillFetcher,
    keep_backup: bool,
}

impl<'a> UpdateEngine<'a> {
    pub fn new(skills_root: &'a Path, fetcher: &'a dyn SkillFetcher, keep_backup: bool) -> Self {
        Self {
            skills_root,
            fetcher,
            keep_backup,
        }
    }

    /// Update every target sequentially against a registry snapshot.
    /// Per-skill failures are captured in the report; they never abort the
    /// rest of the batch.
    pub fn update_batch(&self, registry: &Registry, targets: &[String]) -> Vec<SkillReport> {
        targets
            .iter()
            .map(|name| {
                let status = match registry.get(name) {
                    None => UpdateStatus::SkippedMissing,
                    Some(source) => match self.update_one(name, source) {
                        Ok(UpdateOutcome::Changed) => UpdateStatus::Changed,
                        Ok(UpdateOutcome::Unchanged) => UpdateStatus::Unchanged,
                        Err(err) => UpdateStatus::Failed(err),
                    },
                };
                SkillReport {
                    name: name.clone(),
                    status,
                }
            })
            .collect()
    }

    /// stage -> fingerprint-compare -> replace. The staging area drops (and
    /// with it the whole temporary root) on every path out of this
    /// function.
    fn update_one(&self, name: &str, source: &SkillSource) -> Result<UpdateOutcome> {
        let staging = StagingArea::create()?;
        let staged = match source {
            SkillSource::Local { local_path } => staging.stage_local(name, local_path)?,
            remote => staging.stage_remote(name, remote, self.fetcher)?,
        };

        let installed = self.skills_root.join(name);
        if installed.is_dir() && fingerprint(&installed)? == fingerprint(&staged)? {
            debug!(target: "update", skill = name, "installed copy already matches source");
            return Ok(UpdateOutcome::Unchanged);
        }

        replace_skill(self.skills_root, name, &staged, self.keep_backup)?;
        debug!(target: "update", skill = name, "installed new copy");
        Ok(UpdateOutcome::Changed)
    }
}
