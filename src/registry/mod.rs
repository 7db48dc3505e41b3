//! Source registry: the persisted mapping from skill name to the source it
//! is updated from.
//!
//! The registry is a single JSON document (`version` + `skills` map), read
//! fully into memory, mutated, and rewritten wholesale. A missing file reads
//! as an empty registry. `RegistryStore` is the one seam where a different
//! record store could later be substituted.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SkError};
use crate::utils::fs::ensure_dir;

/// Current registry schema version.
pub const REGISTRY_VERSION: u32 = 1;

/// Default registry file name, resolved under the skills root.
pub const DEFAULT_REGISTRY_FILE: &str = ".skill-sources.json";

/// How the fetch collaborator should obtain a remote skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FetchMethod {
    #[default]
    Auto,
    Download,
    Git,
}

impl fmt::Display for FetchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Download => write!(f, "download"),
            Self::Git => write!(f, "git"),
        }
    }
}

/// A repository-relative path. Older registries encoded this as a
/// single-element list; a multi-element list is malformed and rejected
/// before any staging I/O.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepoPath {
    One(String),
    Many(Vec<String>),
}

impl RepoPath {
    /// The single path this record refers to.
    pub fn single(&self) -> Result<&str> {
        match self {
            Self::One(path) => Ok(path),
            Self::Many(paths) if paths.len() == 1 => Ok(&paths[0]),
            Self::Many(_) => Err(SkError::ValidationFailed(
                "source record path must contain exactly one path".to_string(),
            )),
        }
    }
}

impl From<String> for RepoPath {
    fn from(path: String) -> Self {
        Self::One(path)
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(path) => write!(f, "{path}"),
            Self::Many(paths) => write!(f, "{}", paths.join(",")),
        }
    }
}

/// Where a skill's authoritative content comes from. Variants are mutually
/// exclusive; the persisted form is keyed by which fields are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillSource {
    /// A skill directory on this machine.
    Local { local_path: PathBuf },

    /// A URL pointing at a skill directory inside a remote repository.
    Url {
        url: String,
        #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
        git_ref: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<FetchMethod>,
    },

    /// A repository identifier plus a path inside it.
    Repo {
        repo: String,
        path: RepoPath,
        #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
        git_ref: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<FetchMethod>,
    },
}

impl SkillSource {
    /// One-line human description, used by `sk list`.
    pub fn describe(&self) -> String {
        match self {
            Self::Local { local_path } => format!("local {}", local_path.display()),
            Self::Url {
                url,
                git_ref,
                method,
            } => format!("url {url}{}", ref_method_suffix(git_ref, method)),
            Self::Repo {
                repo,
                path,
                git_ref,
                method,
            } => format!("repo {repo} {path}{}", ref_method_suffix(git_ref, method)),
        }
    }
}

fn ref_method_suffix(git_ref: &Option<String>, method: &Option<FetchMethod>) -> String {
    let mut parts = Vec::new();
    if let Some(git_ref) = git_ref {
        parts.push(git_ref.clone());
    }
    if let Some(method) = method {
        parts.push(method.to_string());
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(" "))
    }
}

/// Reject repository-relative paths that are absolute or escape the
/// repository root after normalization.
pub fn validate_repo_path(raw: &str) -> Result<()> {
    let path = Path::new(raw);
    if path.is_absolute() {
        return Err(SkError::ValidationFailed(
            "repository path must be relative to the repository root".to_string(),
        ));
    }
    let mut depth = 0i32;
    for component in path.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return Err(SkError::ValidationFailed(
                        "repository path must not escape the repository root".to_string(),
                    ));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(SkError::ValidationFailed(
                    "repository path must be relative to the repository root".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// In-memory registry snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registry {
    pub version: u32,
    pub skills: BTreeMap<String, SkillSource>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            version: REGISTRY_VERSION,
            skills: BTreeMap::new(),
        }
    }
}

impl Registry {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SkillSource> {
        self.skills.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, source: SkillSource) {
        self.skills.insert(name.into(), source);
    }

    /// Remove every listed name that exists; returns the names actually
    /// removed, in the order given.
    pub fn remove_all(&mut self, names: &[String]) -> Vec<String> {
        names
            .iter()
            .filter(|name| self.skills.remove(name.as_str()).is_some())
            .cloned()
            .collect()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.skills.keys().cloned().collect()
    }
}

/// Load/save access to the registry document on disk.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the whole registry. A missing file is an empty registry.
    pub fn load(&self) -> Result<Registry> {
        if !self.path.exists() {
            return Ok(Registry::default());
        }
        let raw = std::fs::read_to_string(&self.path).map_err(|err| {
            SkError::Config(format!("read registry {}: {err}", self.path.display()))
        })?;
        let value: serde_json::Value = serde_json::from_str(&raw).map_err(|err| {
            SkError::Config(format!("parse registry {}: {err}", self.path.display()))
        })?;

        let Some(document) = value.as_object() else {
            return Err(SkError::Config(
                "registry is malformed: top level must be an object".to_string(),
            ));
        };

        let version = match document.get("version") {
            None | Some(serde_json::Value::Null) => REGISTRY_VERSION,
            Some(value) => u32::try_from(value.as_u64().ok_or_else(|| {
                SkError::Config("registry is malformed: version must be an integer".to_string())
            })?)
            .map_err(|_| {
                SkError::Config("registry is malformed: version must be an integer".to_string())
            })?,
        };

        let mut skills = BTreeMap::new();
        match document.get("skills") {
            None | Some(serde_json::Value::Null) => {}
            Some(serde_json::Value::Object(entries)) => {
                for (name, entry) in entries {
                    let source: SkillSource =
                        serde_json::from_value(entry.clone()).map_err(|_| {
                            SkError::Config(format!(
                                "registry is malformed: source record for {name} is not recognized"
                            ))
                        })?;
                    skills.insert(name.clone(), source);
                }
            }
            Some(_) => {
                return Err(SkError::Config(
                    "registry is malformed: skills must be an object".to_string(),
                ));
            }
        }

        Ok(Registry { version, skills })
    }

    /// Rewrite the whole registry document, indented, with a trailing
    /// newline.
    pub fn save(&self, registry: &Registry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let mut payload = serde_json::to_string_pretty(registry)?;
        payload.push('\n');
        std::fs::write(&self.path, payload).map_err(|err| {
            SkError::Config(format!("write registry {}: {err}", self.path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> RegistryStore {
        RegistryStore::new(dir.join(DEFAULT_REGISTRY_FILE))
    }

    #[test]
    fn missing_file_reads_as_empty_registry() {
        let dir = tempdir().unwrap();
        let registry = store_in(dir.path()).load().unwrap();
        assert_eq!(registry.version, REGISTRY_VERSION);
        assert!(registry.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let mut registry = Registry::default();
        registry.insert(
            "foo",
            SkillSource::Local {
                local_path: PathBuf::from("/src/foo"),
            },
        );
        registry.insert(
            "bar",
            SkillSource::Repo {
                repo: "owner/skills".to_string(),
                path: RepoPath::from("skills/bar".to_string()),
                git_ref: Some("main".to_string()),
                method: Some(FetchMethod::Auto),
            },
        );
        store.save(&registry).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.ends_with('\n'), "registry must end with a newline");
        assert!(raw.contains("\"version\": 1"));

        let loaded = store.load().unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.skills.len(), 2);
        assert_eq!(loaded.get("foo"), registry.get("foo"));
        assert_eq!(loaded.get("bar"), registry.get("bar"));
    }

    #[test]
    fn loads_minimal_local_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sources.json");
        std::fs::write(
            &path,
            r#"{"version":1,"skills":{"foo":{"local_path":"/src/foo"}}}"#,
        )
        .unwrap();

        let registry = RegistryStore::new(&path).load().unwrap();
        assert_eq!(
            registry.get("foo"),
            Some(&SkillSource::Local {
                local_path: PathBuf::from("/src/foo")
            })
        );
    }

    #[test]
    fn loads_url_record_with_ref_and_method() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sources.json");
        std::fs::write(
            &path,
            r#"{"version":1,"skills":{"web":{"url":"https://example.com/r/tree/main/web","ref":"main","method":"download"}}}"#,
        )
        .unwrap();

        let registry = RegistryStore::new(&path).load().unwrap();
        match registry.get("web").unwrap() {
            SkillSource::Url {
                url,
                git_ref,
                method,
            } => {
                assert_eq!(url, "https://example.com/r/tree/main/web");
                assert_eq!(git_ref.as_deref(), Some("main"));
                assert_eq!(*method, Some(FetchMethod::Download));
            }
            other => panic!("expected url source, got {other:?}"),
        }
    }

    #[test]
    fn loads_legacy_single_element_path_list() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sources.json");
        std::fs::write(
            &path,
            r#"{"version":1,"skills":{"x":{"repo":"o/r","path":["skills/x"]}}}"#,
        )
        .unwrap();

        let registry = RegistryStore::new(&path).load().unwrap();
        match registry.get("x").unwrap() {
            SkillSource::Repo { path, .. } => assert_eq!(path.single().unwrap(), "skills/x"),
            other => panic!("expected repo source, got {other:?}"),
        }
    }

    #[test]
    fn multi_element_path_list_is_rejected_on_use() {
        let path = RepoPath::Many(vec!["a".to_string(), "b".to_string()]);
        let err = path.single().unwrap_err();
        assert!(err.to_string().contains("exactly one path"));
    }

    #[test]
    fn rejects_non_object_top_level() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sources.json");
        std::fs::write(&path, "[1, 2, 3]\n").unwrap();
        let err = RegistryStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("top level must be an object"));
    }

    #[test]
    fn rejects_non_object_skills() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sources.json");
        std::fs::write(&path, r#"{"version":1,"skills":["foo"]}"#).unwrap();
        let err = RegistryStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("skills must be an object"));
    }

    #[test]
    fn rejects_unrecognized_source_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sources.json");
        std::fs::write(&path, r#"{"version":1,"skills":{"foo":{"kind":"???"}}}"#).unwrap();
        let err = RegistryStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("source record for foo"));
    }

    #[test]
    fn missing_version_defaults_to_current() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sources.json");
        std::fs::write(&path, r#"{"skills":{}}"#).unwrap();
        let registry = RegistryStore::new(&path).load().unwrap();
        assert_eq!(registry.version, REGISTRY_VERSION);
    }

    #[test]
    fn remove_all_reports_only_existing_names() {
        let mut registry = Registry::default();
        registry.insert(
            "keep",
            SkillSource::Local {
                local_path: PathBuf::from("/src/keep"),
            },
        );
        registry.insert(
            "drop",
            SkillSource::Local {
                local_path: PathBuf::from("/src/drop"),
            },
        );

        let removed = registry.remove_all(&["drop".to_string(), "ghost".to_string()]);
        assert_eq!(removed, vec!["drop".to_string()]);
        assert!(registry.get("keep").is_some());
        assert!(registry.get("drop").is_none());
    }

    #[test]
    fn validate_repo_path_accepts_normal_relative_paths() {
        assert!(validate_repo_path("skills/foo").is_ok());
        assert!(validate_repo_path("a/../b").is_ok());
        assert!(validate_repo_path("./a/b").is_ok());
    }

    #[test]
    fn validate_repo_path_rejects_absolute() {
        assert!(validate_repo_path("/etc/skills").is_err());
    }

    #[test]
    fn validate_repo_path_rejects_escape() {
        assert!(validate_repo_path("../x").is_err());
        assert!(validate_repo_path("a/../../x").is_err());
    }

    #[test]
    fn describe_formats_each_variant() {
        let local = SkillSource::Local {
            local_path: PathBuf::from("/src/foo"),
        };
        assert_eq!(local.describe(), "local /src/foo");

        let url = SkillSource::Url {
            url: "https://example.com/r".to_string(),
            git_ref: Some("main".to_string()),
            method: Some(FetchMethod::Auto),
        };
        assert_eq!(url.describe(), "url https://example.com/r (main auto)");

        let repo = SkillSource::Repo {
            repo: "o/r".to_string(),
            path: RepoPath::from("skills/x".to_string()),
            git_ref: None,
            method: None,
        };
        assert_eq!(repo.describe(), "repo o/r skills/x");
    }
}
