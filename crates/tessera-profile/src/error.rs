//! Error types for the profile subsystem.

use std::path::PathBuf;

/// Errors from loading, scanning, or serializing device profiles.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// The profile file could not be parsed as YAML.
    #[error("failed to parse profile `{path}`: {source}")]
    ParseError {
        /// Path (or label) of the offending profile.
        path: String,
        /// The underlying YAML error.
        source: serde_yaml::Error,
    },

    /// The profile parsed, but is not a mapping with a `device` section.
    #[error("invalid profile `{path}`: {reason}")]
    InvalidProfile {
        /// Path (or label) of the offending profile.
        path: String,
        /// What is missing or malformed.
        reason: String,
    },

    /// Re-serialization into the canonical form failed.
    #[error("canonical serialization failed: {0}")]
    CanonicalError(#[source] serde_yaml::Error),

    /// The registry root does not contain any profile directory.
    #[error("no registry directory found under {0}")]
    RegistryNotFound(PathBuf),

    /// I/O error while reading profiles or writing output.
    #[error("profile I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error while writing the manifest.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
