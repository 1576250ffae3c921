//! Registry directory scanning.
//!
//! Profiles live under `registry/stable/` and `registry/contrib/`, nested
//! arbitrarily deep, one `.yaml` file per device.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::document::Profile;
use crate::error::ProfileError;

/// Stability tier of a registry entry, from its top-level directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    /// Reviewed profiles under `registry/stable/`.
    Stable,
    /// Community contributions under `registry/contrib/`.
    Contrib,
}

impl Stability {
    /// All tiers, in scan order.
    pub const ALL: [Self; 2] = [Self::Stable, Self::Contrib];

    /// Directory name of this tier.
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Contrib => "contrib",
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// One profile file found in the registry.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    /// Absolute or root-joined path to the file.
    pub path: PathBuf,
    /// Path relative to the registry root, with `/` separators.
    pub rel_path: String,
    /// Tier the file was found under.
    pub stability: Stability,
}

impl RegistryEntry {
    /// Parse the profile this entry points at.
    pub fn load(&self) -> Result<Profile, ProfileError> {
        Profile::load(&self.path)
    }
}

/// List every profile file under `root/registry/{stable,contrib}`.
///
/// Entries are sorted by path within each tier, stable first. Missing tier
/// directories are skipped; a missing `registry/` directory is an error.
pub fn scan(root: &Path) -> Result<Vec<RegistryEntry>, ProfileError> {
    let registry_dir = root.join("registry");
    if !registry_dir.is_dir() {
        return Err(ProfileError::RegistryNotFound(root.to_path_buf()));
    }

    let mut entries = Vec::new();
    for stability in Stability::ALL {
        let tier_dir = registry_dir.join(stability.dir_name());
        if !tier_dir.is_dir() {
            tracing::debug!(dir = %tier_dir.display(), "registry tier missing, skipping");
            continue;
        }

        let mut files = Vec::new();
        collect_yaml_files(&tier_dir, &mut files)?;
        files.sort();

        entries.extend(files.into_iter().map(|path| RegistryEntry {
            rel_path: relative_display(root, &path),
            path,
            stability,
        }));
    }

    tracing::info!(count = entries.len(), root = %root.display(), "scanned registry");
    Ok(entries)
}

fn collect_yaml_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ProfileError> {
    // Directory symlinks are not followed, so a link cycle cannot recurse.
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_yaml_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "yaml") {
            out.push(path);
        }
    }
    Ok(())
}

fn relative_display(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}


#[cfg(test)]
mod tests {
    use super::fixtures::write_profile;
    use super::*;

    #[test]
    fn scans_both_tiers_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(dir.path(), "registry/contrib/zeta/z.yaml", "device: {id: z}\n");
        write_profile(dir.path(), "registry/stable/acme/b.yaml", "device: {id: b}\n");
        write_profile(dir.path(), "registry/stable/acme/a.yaml", "device: {id: a}\n");
        write_profile(dir.path(), "registry/stable/acme/README.md", "# not a profile\n");

        let entries = scan(dir.path()).unwrap();
        let rels: Vec<&str> = entries.iter().map(|e| e.rel_path.as_str()).collect();
        assert_eq!(
            rels,
            [
                "registry/stable/acme/a.yaml",
                "registry/stable/acme/b.yaml",
                "registry/contrib/zeta/z.yaml",
            ]
        );
        assert_eq!(entries[2].stability, Stability::Contrib);
        assert_eq!(entries[0].load().unwrap().id(), Some("a"));
    }

    #[test]
    fn missing_registry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan(dir.path()).unwrap_err();
        assert!(matches!(err, ProfileError::RegistryNotFound(_)));
    }

    #[test]
    fn missing_tier_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(dir.path(), "registry/contrib/x.yaml", "device: {id: x}\n");
        let entries = scan(dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn directory_symlink_cycle_is_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(dir.path(), "registry/stable/acme/a.yaml", "device: {id: a}\n");
        let stable = dir.path().join("registry/stable");
        std::os::unix::fs::symlink(&stable, stable.join("acme/loop")).unwrap();

        let entries = scan(dir.path()).unwrap();
        let rels: Vec<&str> = entries.iter().map(|e| e.rel_path.as_str()).collect();
        assert_eq!(rels, ["registry/stable/acme/a.yaml"]);
    }
}
