//! Registry manifest generation.
//!
//! Aggregates every registry profile into a single `manifest.json` index
//! keyed by device id, with one version entry per profile file.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::document::Profile;
use crate::error::ProfileError;
use crate::registry::{self, RegistryEntry, Stability};

/// Manifest format version.
pub const MANIFEST_VERSION: &str = "0.1.0";

/// Version assigned to every profile until profiles carry their own.
const DEFAULT_PROFILE_VERSION: &str = "1.0.0";

/// The aggregated registry index.
#[derive(Debug, Serialize)]
pub struct Manifest {
    /// Manifest format version.
    pub version: String,
    /// Schema version of the manifest layout.
    pub schema_version: String,
    /// When the manifest was generated (RFC 3339).
    pub updated_at: String,
    /// Human-readable description.
    pub description: String,
    /// Devices keyed by `device.id`.
    pub devices: BTreeMap<String, DeviceEntry>,
}

/// All published versions of one device.
#[derive(Debug, Serialize)]
pub struct DeviceEntry {
    /// Manufacturer name.
    pub manufacturer: String,
    /// Model name.
    pub model: String,
    /// Free-form description.
    pub description: String,
    /// Communication protocol.
    pub protocol: String,
    /// One entry per profile file describing this device.
    pub versions: Vec<VersionEntry>,
    /// Latest version per stability tier.
    pub latest: BTreeMap<Stability, String>,
}

/// One profile file's entry in the manifest.
#[derive(Debug, Serialize)]
pub struct VersionEntry {
    /// Profile version.
    pub version: String,
    /// Stability tier.
    pub stability: Stability,
    /// Path relative to the registry root.
    pub path: String,
    /// Download URL.
    pub url: String,
    /// Publication timestamp (RFC 3339).
    pub published_at: String,
    /// Maintainers, reduced to handle and role.
    pub maintainers: Vec<MaintainerSummary>,
    /// Whether anyone maintains this profile.
    pub has_active_maintainer: bool,
    /// Upstream source the profile was derived from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_source: Option<serde_yaml::Value>,
}

/// Public maintainer information carried into the manifest.
#[derive(Debug, Serialize)]
pub struct MaintainerSummary {
    /// GitHub username.
    pub github: Option<String>,
    /// Role in the registry.
    pub role: String,
}

/// Options controlling manifest generation.
#[derive(Debug, Clone)]
pub struct ManifestOptions {
    /// Base URL that registry-relative paths are appended to.
    pub raw_base_url: String,
    /// Timestamp recorded as `updated_at` and `published_at`.
    pub now: DateTime<Utc>,
}

/// Build the manifest for the registry rooted at `root`.
pub fn generate(root: &Path, options: &ManifestOptions) -> Result<Manifest, ProfileError> {
    let entries = registry::scan(root)?;
    let mut devices: BTreeMap<String, DeviceEntry> = BTreeMap::new();
    let timestamp = options.now.to_rfc3339_opts(SecondsFormat::Secs, true);

    for entry in &entries {
        let profile = entry.load()?;
        let Some(device_id) = profile.id().map(str::to_owned) else {
            tracing::warn!(path = %entry.rel_path, "no device.id, skipping");
            continue;
        };

        let version = version_entry(&profile, entry, options, &timestamp);
        let device = devices.entry(device_id).or_insert_with(|| DeviceEntry {
            manufacturer: device_field(&profile, "manufacturer"),
            model: device_field(&profile, "model"),
            description: device_field(&profile, "description"),
            protocol: device_field(&profile, "protocol"),
            versions: Vec::new(),
            latest: BTreeMap::new(),
        });
        device
            .latest
            .insert(entry.stability, DEFAULT_PROFILE_VERSION.to_owned());
        device.versions.push(version);
    }

    tracing::info!(devices = devices.len(), "generated manifest");
    Ok(Manifest {
        version: MANIFEST_VERSION.to_owned(),
        schema_version: MANIFEST_VERSION.to_owned(),
        updated_at: timestamp,
        description: "Device Registry - community-maintained device profiles".to_owned(),
        devices,
    })
}

/// Serialize `manifest` as pretty JSON with a trailing newline and write it.
pub fn write(manifest: &Manifest, path: &Path) -> Result<(), ProfileError> {
    let mut json = serde_json::to_string_pretty(manifest)?;
    json.push('\n');
    std::fs::write(path, json)?;
    Ok(())
}

fn version_entry(
    profile: &Profile,
    entry: &RegistryEntry,
    options: &ManifestOptions,
    timestamp: &str,
) -> VersionEntry {
    let maintainers: Vec<MaintainerSummary> = profile
        .maintainers()
        .into_iter()
        .map(|m| MaintainerSummary {
            github: m.github_handle,
            role: m.role,
        })
        .collect();

    VersionEntry {
        version: DEFAULT_PROFILE_VERSION.to_owned(),
        stability: entry.stability,
        path: entry.rel_path.clone(),
        url: format!(
            "{}/{}",
            options.raw_base_url.trim_end_matches('/'),
            entry.rel_path
        ),
        published_at: timestamp.to_owned(),
        has_active_maintainer: !maintainers.is_empty(),
        maintainers,
        canonical_source: profile
            .device()
            .and_then(|d| d.get("canonical_source"))
            .filter(|v| !v.is_null())
            .cloned(),
    }
}

fn device_field(profile: &Profile, key: &str) -> String {
    profile.device_str(key).unwrap_or_default().to_owned()
}
