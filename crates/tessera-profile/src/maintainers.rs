//! Maintainer presence auditing.
//!
//! Every profile should have at least one maintainer. Orphaned profiles are
//! reported, not rejected.

use std::path::Path;

use serde::Serialize;

use crate::error::ProfileError;
use crate::registry::{self, Stability};

/// A profile with at least one maintainer.
#[derive(Debug, Serialize)]
pub struct MaintainedProfile {
    /// Device id, or the file stem when the profile has none.
    pub id: String,
    /// Stability tier.
    pub stability: Stability,
    /// GitHub handles of the maintainers that have one.
    pub maintainers: Vec<String>,
}

/// A profile nobody maintains.
#[derive(Debug, Serialize)]
pub struct OrphanedProfile {
    /// Device id, or the file stem when the profile has none.
    pub id: String,
    /// Stability tier.
    pub stability: Stability,
    /// Path relative to the registry root.
    pub path: String,
}

/// Result of a maintainer audit over the whole registry.
#[derive(Debug, Default, Serialize)]
pub struct MaintainerAudit {
    /// Profiles with maintainers.
    pub maintained: Vec<MaintainedProfile>,
    /// Profiles without maintainers.
    pub orphaned: Vec<OrphanedProfile>,
    /// Non-fatal problems found along the way.
    pub warnings: Vec<String>,
}

/// Audit maintainer presence for every profile under `root`.
pub fn audit(root: &Path) -> Result<MaintainerAudit, ProfileError> {
    let mut report = MaintainerAudit::default();

    for entry in registry::scan(root)? {
        let profile = entry.load()?;
        let id = profile.id().map_or_else(
            || {
                entry
                    .path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            },
            str::to_owned,
        );

        let maintainers = profile.maintainers();
        if maintainers.is_empty() {
            tracing::warn!(id = %id, path = %entry.rel_path, "profile has no maintainer");
            report.orphaned.push(OrphanedProfile {
                id,
                stability: entry.stability,
                path: entry.rel_path,
            });
            continue;
        }

        let mut handles = Vec::new();
        for m in maintainers {
            match m.github_handle {
                Some(handle) => handles.push(handle),
                None => report.warnings.push(format!(
                    "maintainer without github username in {}",
                    entry.rel_path
                )),
            }
        }
        report.maintained.push(MaintainedProfile {
            id,
            stability: entry.stability,
            maintainers: handles,
        });
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::fixtures::write_profile;

    #[test]
    fn reports_orphans_and_missing_handles() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(
            dir.path(),
            "registry/stable/a.yaml",
            "device:\n  id: a\n  maintainers:\n    - github: alice\n    - email: bob@example.com\n",
        );
        write_profile(dir.path(), "registry/contrib/orphan.yaml", "device:\n  model: X\n");

        let audit = audit(dir.path()).unwrap();

        assert_eq!(audit.maintained.len(), 1);
        assert_eq!(audit.maintained[0].maintainers, ["alice"]);

        assert_eq!(audit.orphaned.len(), 1);
        assert_eq!(audit.orphaned[0].id, "orphan");
        assert_eq!(audit.orphaned[0].stability, Stability::Contrib);
        assert_eq!(audit.orphaned[0].path, "registry/contrib/orphan.yaml");

        assert_eq!(audit.warnings.len(), 1);
        assert!(audit.warnings[0].contains("registry/stable/a.yaml"));
    }
}
