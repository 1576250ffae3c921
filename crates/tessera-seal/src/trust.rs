//! Ephemeral, per-verification keyring.
//!
//! A [`TrustStore`] holds exactly one imported OpenPGP certificate in
//! memory. It is only reachable through [`TrustStore::with_scope`], which
//! lends a [`TrustHandle`] to a closure and drops the store when the
//! closure returns, on every path. Nothing is written to disk.

use sequoia_openpgp as openpgp;

use openpgp::Cert;
use openpgp::parse::Parse;

use crate::error::SealError;
use crate::resolver::KeyMaterial;

/// An isolated keyring holding one signer certificate.
pub struct TrustStore {
    cert: Cert,
}

/// Borrowed access to the certificate of a live [`TrustStore`].
///
/// The lifetime ties the handle to the scope that created it.
pub struct TrustHandle<'s> {
    store: &'s TrustStore,
}

impl TrustStore {
    /// Import `key` into a fresh store and run `f` with a handle to it.
    ///
    /// Import fails if the bytes are not exactly one OpenPGP certificate
    /// (binary or ASCII-armored).
    pub fn with_scope<T>(
        key: KeyMaterial,
        f: impl FnOnce(&TrustHandle<'_>) -> T,
    ) -> Result<T, SealError> {
        let store = Self::import(&key)?;
        drop(key);
        let handle = TrustHandle { store: &store };
        Ok(f(&handle))
    }

    fn import(key: &KeyMaterial) -> Result<Self, SealError> {
        let cert = Cert::from_bytes(key.as_bytes())
            .map_err(|e| SealError::Engine(format!("failed to import key: {e}")))?;
        tracing::debug!(fingerprint = %cert.fingerprint(), "imported key into trust store");
        Ok(Self { cert })
    }
}

impl Drop for TrustStore {
    fn drop(&mut self) {
        tracing::debug!(fingerprint = %self.cert.fingerprint(), "trust store discarded");
    }
}

impl TrustHandle<'_> {
    /// The imported certificate.
    pub(crate) const fn cert(&self) -> &Cert {
        &self.store.cert
    }

    /// Primary key fingerprint, uppercase hex without spaces.
    pub fn fingerprint(&self) -> String {
        self.store.cert.fingerprint().to_hex()
    }

    /// Fingerprints of the primary key and every subkey.
    pub fn fingerprints(&self) -> Vec<String> {
        self.store
            .cert
            .keys()
            .map(|ka| ka.key().fingerprint().to_hex())
            .collect()
    }

    /// User IDs bound to the certificate.
    pub fn user_ids(&self) -> Vec<String> {
        self.store
            .cert
            .userids()
            .map(|ua| String::from_utf8_lossy(ua.userid().value()).into_owned())
            .collect()
    }
}

/// Normalize a fingerprint for comparison.
///
/// Strips whitespace and an optional `0x` prefix, then uppercases.
pub fn normalize_fingerprint(fingerprint: &str) -> String {
    let compact: String = fingerprint
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let compact = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    compact.to_ascii_uppercase()
}
