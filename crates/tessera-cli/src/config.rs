//! CLI configuration.
//!
//! Resolution order:
//! 1. The file given with `--config` (must exist)
//! 2. `./tessera.toml`
//! 3. XDG config dir (`~/.config/tessera/config.toml`)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;
use tessera_seal::VerifyConfig;

/// Default raw-content base for manifest URLs.
const DEFAULT_RAW_BASE_URL: &str = "https://raw.githubusercontent.com/stekker/OpenModbusSpecs/main";

/// Config files searched when `--config` is not given, resolved lazily.
static DEFAULT_CONFIG_PATHS: LazyLock<Vec<PathBuf>> = LazyLock::new(|| {
    let mut paths = vec![PathBuf::from("tessera.toml")];
    if let Some(dirs) = directories::ProjectDirs::from("dev", "tessera", "tessera") {
        paths.push(dirs.config_dir().join("config.toml"));
    }
    paths
});

/// Top-level configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub(crate) registry: RegistrySection,
    pub(crate) verify: VerifySection,
}

/// `[registry]` section.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RegistrySection {
    /// Registry checkout root, containing `registry/`.
    pub(crate) root: PathBuf,
    /// Base URL that manifest paths are appended to.
    pub(crate) raw_base_url: String,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            raw_base_url: DEFAULT_RAW_BASE_URL.to_owned(),
        }
    }
}

/// `[verify]` section.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct VerifySection {
    pub(crate) fetch_timeout_secs: u64,
    pub(crate) wkd: bool,
    pub(crate) enforce_fingerprint: bool,
}

impl Default for VerifySection {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 10,
            wkd: true,
            enforce_fingerprint: false,
        }
    }
}

impl VerifySection {
    pub(crate) const fn to_verify_config(&self) -> VerifyConfig {
        VerifyConfig {
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            use_wkd: self.wkd,
            enforce_fingerprint: self.enforce_fingerprint,
        }
    }
}

impl Config {
    /// Load the configuration, honoring an explicit path first.
    pub(crate) fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let Some(found) = DEFAULT_CONFIG_PATHS.iter().find(|p| p.is_file()) else {
            tracing::debug!("no config file found, using defaults");
            return Ok(Self::default());
        };
        Self::load(found)
    }

    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
        let config = toml::from_str(&content)
            .wrap_err_with(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.registry.root, PathBuf::from("."));
        assert_eq!(config.registry.raw_base_url, DEFAULT_RAW_BASE_URL);
        assert_eq!(config.verify.fetch_timeout_secs, 10);
        assert!(config.verify.wkd);
        assert!(!config.verify.enforce_fingerprint);
    }

    #[test]
    fn sections_override_defaults() {
        let config: Config = toml::from_str(
            r#"
            [registry]
            root = "/srv/registry"

            [verify]
            fetch_timeout_secs = 3
            enforce_fingerprint = true
            "#,
        )
        .unwrap();
        assert_eq!(config.registry.root, PathBuf::from("/srv/registry"));
        assert_eq!(config.registry.raw_base_url, DEFAULT_RAW_BASE_URL);

        let verify = config.verify.to_verify_config();
        assert_eq!(verify.fetch_timeout, Duration::from_secs(3));
        assert!(verify.use_wkd);
        assert!(verify.enforce_fingerprint);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("[verify]\nretries = 3\n").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::resolve(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
