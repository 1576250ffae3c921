//! The device profile document model.
//!
//! A profile is kept as a generic YAML value so that canonicalization sees
//! every field, including ones this crate does not know about. Typed views
//! ([`SignatureBlock`], [`MaintainerRecord`]) are extracted on demand.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::ProfileError;

/// A parsed device profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    value: Value,
}

/// The signature block found under `device.signature`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureBlock {
    /// Base64 of the detached OpenPGP signature (wire name `pgp`).
    pub signature_b64: String,
    /// Identity (email address) of the claimed signer.
    pub signed_by: String,
    /// Signing timestamp, as written by the signer.
    pub signed_at: Option<String>,
}

/// Result of looking for a signature block in a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureField {
    /// No signature block, or an empty one.
    Absent,
    /// A well-formed block with both required fields.
    Present(SignatureBlock),
    /// A block exists but lacks required fields or has the wrong shape.
    Malformed(String),
}

/// A maintainer entry under `device.maintainers`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MaintainerRecord {
    /// Email identity, matched against `signature.signed_by`.
    #[serde(default, rename = "email")]
    pub identity: Option<String>,
    /// GitHub username.
    #[serde(default, rename = "github")]
    pub github_handle: Option<String>,
    /// Explicit location of the maintainer's public key.
    #[serde(default)]
    pub pgp_key_url: Option<String>,
    /// Expected OpenPGP fingerprint of the maintainer's key.
    #[serde(default)]
    pub pgp_fingerprint: Option<String>,
    /// Role in the registry.
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "contributor".to_owned()
}

impl Profile {
    /// Parse a profile from YAML text.
    ///
    /// `label` names the source in error messages.
    pub fn from_yaml_str(yaml: &str, label: &str) -> Result<Self, ProfileError> {
        let value: Value = serde_yaml::from_str(yaml).map_err(|source| ProfileError::ParseError {
            path: label.to_owned(),
            source,
        })?;
        Self::from_value(value, label)
    }

    /// Wrap an already-parsed YAML value.
    ///
    /// The value must be a mapping; the `device` section is checked lazily
    /// by the accessors and by validation.
    pub fn from_value(value: Value, label: &str) -> Result<Self, ProfileError> {
        if !value.is_mapping() {
            return Err(ProfileError::InvalidProfile {
                path: label.to_owned(),
                reason: "top level is not a mapping".to_owned(),
            });
        }
        Ok(Self { value })
    }

    /// Load a profile from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&data, &path.display().to_string())
    }

    /// The raw YAML value.
    pub const fn as_value(&self) -> &Value {
        &self.value
    }

    /// The `device` section, if it is a mapping.
    pub fn device(&self) -> Option<&Mapping> {
        self.value.get("device").and_then(Value::as_mapping)
    }

    /// A string field of the `device` section.
    pub fn device_str(&self, key: &str) -> Option<&str> {
        self.device()
            .and_then(|d| d.get(key))
            .and_then(Value::as_str)
    }

    /// The `device.id` field.
    pub fn id(&self) -> Option<&str> {
        self.device_str("id")
    }

    /// Extract the signature block.
    pub fn signature(&self) -> SignatureField {
        let Some(raw) = self.device().and_then(|d| d.get("signature")) else {
            return SignatureField::Absent;
        };

        let block = match raw {
            Value::Null => return SignatureField::Absent,
            Value::Mapping(m) if m.is_empty() => return SignatureField::Absent,
            Value::Mapping(m) => m,
            _ => {
                return SignatureField::Malformed(
                    "device.signature is not a mapping".to_owned(),
                );
            }
        };

        let field = |key: &str| {
            block
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };

        let Some(signature_b64) = field("pgp") else {
            return SignatureField::Malformed("missing signature.pgp".to_owned());
        };
        let Some(signed_by) = field("signed_by") else {
            return SignatureField::Malformed("missing signature.signed_by".to_owned());
        };

        // Timestamps may have been written unquoted; keep whatever scalar is there.
        let signed_at = block.get("signed_at").and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        SignatureField::Present(SignatureBlock {
            signature_b64,
            signed_by,
            signed_at,
        })
    }

    /// The maintainer records. Entries that are not mappings are skipped.
    pub fn maintainers(&self) -> Vec<MaintainerRecord> {
        let Some(list) = self
            .device()
            .and_then(|d| d.get("maintainers"))
            .and_then(Value::as_sequence)
        else {
            return Vec::new();
        };

        list.iter()
            .filter_map(|entry| match serde_yaml::from_value(entry.clone()) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed maintainer entry");
                    None
                }
            })
            .collect()
    }

    /// The maintainer whose identity equals `identity`, if any.
    pub fn maintainer_for(&self, identity: &str) -> Option<MaintainerRecord> {
        self.maintainers()
            .into_iter()
            .find(|m| m.identity.as_deref() == Some(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNED: &str = r"
device:
  id: acme-meter-3000
  manufacturer: Acme
  model: Meter 3000
  maintainers:
    - email: alice@example.com
      github: alice
      pgp_key_url: https://keys.example.com/alice.asc
      pgp_fingerprint: 0123456789ABCDEF0123456789ABCDEF01234567
      role: vendor
    - github: bob
  signature:
    pgp: c2lnbmF0dXJl
    signed_by: alice@example.com
    signed_at: 2025-01-01T00:00:00Z
";

    fn parse(yaml: &str) -> Profile {
        Profile::from_yaml_str(yaml, "test.yaml").expect("parse")
    }

    #[test]
    fn extracts_signature_block() {
        let profile = parse(SIGNED);
        let SignatureField::Present(block) = profile.signature() else {
            panic!("expected a signature block");
        };
        assert_eq!(block.signature_b64, "c2lnbmF0dXJl");
        assert_eq!(block.signed_by, "alice@example.com");
        assert_eq!(block.signed_at.as_deref(), Some("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn missing_or_empty_signature_is_absent() {
        let profile = parse("device:\n  id: x\n");
        assert_eq!(profile.signature(), SignatureField::Absent);

        let profile = parse("device:\n  id: x\n  signature: {}\n");
        assert_eq!(profile.signature(), SignatureField::Absent);

        let profile = parse("device:\n  id: x\n  signature:\n");
        assert_eq!(profile.signature(), SignatureField::Absent);
    }

    #[test]
    fn signature_without_signer_is_malformed() {
        let profile = parse("device:\n  signature:\n    pgp: abc\n");
        assert!(matches!(profile.signature(), SignatureField::Malformed(m) if m.contains("signed_by")));

        let profile = parse("device:\n  signature:\n    signed_by: a@b.c\n    pgp: ''\n");
        assert!(matches!(profile.signature(), SignatureField::Malformed(m) if m.contains("pgp")));

        let profile = parse("device:\n  signature: just-a-string\n");
        assert!(matches!(profile.signature(), SignatureField::Malformed(_)));
    }

    #[test]
    fn maintainers_default_role_and_lookup() {
        let profile = parse(SIGNED);
        let maintainers = profile.maintainers();
        assert_eq!(maintainers.len(), 2);
        assert_eq!(maintainers[0].role, "vendor");
        assert_eq!(maintainers[1].role, "contributor");
        assert_eq!(maintainers[1].identity, None);

        let alice = profile.maintainer_for("alice@example.com").expect("alice");
        assert_eq!(alice.github_handle.as_deref(), Some("alice"));
        assert!(profile.maintainer_for("mallory@example.com").is_none());
    }

    #[test]
    fn non_mapping_document_is_rejected() {
        let err = Profile::from_yaml_str("- a\n- b\n", "list.yaml").unwrap_err();
        assert!(err.to_string().contains("not a mapping"), "got: {err}");
    }
}
