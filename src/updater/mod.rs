//! The update engine: stage a candidate copy, compare it against the
//! installed copy by content digest, and swap it in with
//! backup-and-rollback when they differ.

pub mod engine;
pub mod fingerprint;
pub mod replace;
pub mod stage;

pub use engine::{SkillReport, UpdateEngine, UpdateOutcome, UpdateStatus};
pub use fingerprint::fingerprint;
pub use replace::replace_skill;
pub use stage::{InstallerProcess, SkillFetcher, StagingArea};
