//! Signer key discovery.
//!
//! Resolution order, first success wins:
//! 1. Web Key Directory under the identity's own domain
//! 2. The maintainer-supplied `pgp_key_url`, if any
//!
//! Every miss is soft until both sources are exhausted. There are no
//! retries and nothing is cached between calls.

use std::fmt;

use serde::Serialize;

use crate::error::SealError;
use crate::fetch::KeyFetcher;
use crate::report::Trace;
use crate::wkd;

/// Raw public key bytes, as served by a key source.
pub struct KeyMaterial(Vec<u8>);

impl KeyMaterial {
    /// Wrap raw key bytes.
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial({} bytes)", self.0.len())
    }
}

/// Where a resolved key came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method", content = "url", rename_all = "snake_case")]
pub enum KeySource {
    /// Web Key Directory lookup.
    Wkd(String),
    /// Maintainer-supplied URL.
    Fallback(String),
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wkd(url) => write!(f, "WKD ({url})"),
            Self::Fallback(url) => write!(f, "key URL ({url})"),
        }
    }
}

/// Key material together with its origin.
#[derive(Debug)]
pub struct ResolvedKey {
    /// The fetched key bytes.
    pub material: KeyMaterial,
    /// Which lookup produced them.
    pub source: KeySource,
}

/// Discovers signer keys through WKD and a fallback URL.
pub struct KeyResolver<F> {
    fetcher: F,
    use_wkd: bool,
}

impl<F: KeyFetcher> KeyResolver<F> {
    /// Create a resolver that fetches through `fetcher`.
    pub const fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            use_wkd: true,
        }
    }

    /// Enable or disable the WKD step.
    #[must_use]
    pub const fn with_wkd(mut self, enabled: bool) -> Self {
        self.use_wkd = enabled;
        self
    }

    /// Resolve the public key for `identity`.
    pub fn resolve(
        &self,
        identity: &str,
        fallback_url: Option<&str>,
        trace: &mut Trace,
    ) -> Result<ResolvedKey, SealError> {
        if self.use_wkd {
            if let Some(key) = self.try_wkd(identity, trace) {
                return Ok(key);
            }
        } else {
            trace.skip("WKD lookup disabled");
        }

        if let Some(url) = fallback_url {
            if let Some(key) = self.try_fallback(url, trace) {
                return Ok(key);
            }
        } else {
            trace.skip("no pgp_key_url recorded for signer");
        }

        trace.fail(format!("could not fetch public key for {identity}"));
        Err(SealError::KeyUnavailable {
            identity: identity.to_owned(),
        })
    }

    fn try_wkd(&self, identity: &str, trace: &mut Trace) -> Option<ResolvedKey> {
        let url = match wkd::wkd_url(identity) {
            Ok(url) => url,
            Err(e) => {
                trace.warn(format!("WKD lookup not possible: {e}"));
                return None;
            }
        };

        trace.info(format!("trying WKD: {url}"));
        match self.fetcher.fetch(&url) {
            Ok(bytes) => {
                trace.pass(format!("public key fetched via WKD ({} bytes)", bytes.len()));
                Some(ResolvedKey {
                    material: KeyMaterial::new(bytes),
                    source: KeySource::Wkd(url),
                })
            }
            Err(e) => {
                trace.warn(format!("WKD lookup failed: {e}"));
                None
            }
        }
    }

    fn try_fallback(&self, url: &str, trace: &mut Trace) -> Option<ResolvedKey> {
        if !url.starts_with("https://") {
            trace.warn(format!("refusing non-HTTPS key URL: {url}"));
            return None;
        }

        trace.info(format!("fetching key from: {url}"));
        match self.fetcher.fetch(url) {
            Ok(bytes) => {
                trace.pass(format!(
                    "public key fetched from key URL ({} bytes)",
                    bytes.len()
                ));
                Some(ResolvedKey {
                    material: KeyMaterial::new(bytes),
                    source: KeySource::Fallback(url.to_owned()),
                })
            }
            Err(e) => {
                trace.warn(format!("key URL fetch failed: {e}"));
                None
            }
        }
    }
}
