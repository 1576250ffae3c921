//! Top-level verification policy.
//!
//! The [`ProfileVerifier`] walks one profile through local signature
//! checks, key discovery, import, and cryptographic verification, and
//! folds every outcome into a [`VerificationReport`].

use std::path::Path;
use std::time::Duration;

use tessera_profile::{CANONICAL_FORM, Profile, SignatureField, canonicalize};

use crate::error::SealError;
use crate::fetch::{DEFAULT_FETCH_TIMEOUT, HttpFetcher, KeyFetcher};
use crate::report::{Advisory, Trace, VerificationReport, Verdict};
use crate::resolver::{KeyResolver, ResolvedKey};
use crate::signature::{DetachedSignature, verify_detached};
use crate::trust::{TrustStore, normalize_fingerprint};

/// Configuration for a verification run.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Timeout for each key fetch.
    pub fetch_timeout: Duration,
    /// Try Web Key Directory before the maintainer's key URL.
    pub use_wkd: bool,
    /// Reject when the key fingerprint differs from the maintainer record.
    pub enforce_fingerprint: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            use_wkd: true,
            enforce_fingerprint: false,
        }
    }
}

/// Verifies signed profiles.
pub struct ProfileVerifier<F = HttpFetcher> {
    config: VerifyConfig,
    resolver: KeyResolver<F>,
}

impl ProfileVerifier<HttpFetcher> {
    /// Create a verifier that fetches keys over HTTPS.
    pub fn new(config: VerifyConfig) -> Self {
        let fetcher = HttpFetcher::new(config.fetch_timeout);
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: KeyFetcher> ProfileVerifier<F> {
    /// Create a verifier that fetches keys through `fetcher`.
    pub fn with_fetcher(config: VerifyConfig, fetcher: F) -> Self {
        let resolver = KeyResolver::new(fetcher).with_wkd(config.use_wkd);
        Self { config, resolver }
    }

    /// Load and verify the profile at `path`.
    ///
    /// Only loading can fail; every verification outcome is a report.
    pub fn verify_file(&self, path: &Path) -> Result<VerificationReport, SealError> {
        let profile = Profile::load(path)?;
        Ok(self.verify(&profile))
    }

    /// Verify a parsed profile.
    pub fn verify(&self, profile: &Profile) -> VerificationReport {
        let mut trace = Trace::default();
        let mut report = VerificationReport::new(Verdict::Unsigned);

        let verdict = self.evaluate(profile, &mut report, &mut trace);

        report.verdict = verdict;
        report.accepted = verdict.is_accepted();
        report.steps = trace.into_steps();
        tracing::info!(
            profile = profile.id().unwrap_or("<unknown>"),
            %verdict,
            accepted = report.accepted,
            "verification complete"
        );
        report
    }

    fn evaluate(
        &self,
        profile: &Profile,
        report: &mut VerificationReport,
        trace: &mut Trace,
    ) -> Verdict {
        let block = match profile.signature() {
            SignatureField::Absent => {
                trace.skip("no signature block, profile is unsigned");
                return Verdict::Unsigned;
            }
            SignatureField::Malformed(reason) => {
                trace.fail(format!("malformed signature block: {reason}"));
                return Verdict::MalformedSignature;
            }
            SignatureField::Present(block) => block,
        };

        let signer = block.signed_by.as_str();
        report.signer = Some(signer.to_owned());
        report.signed_at.clone_from(&block.signed_at);
        trace.info(format!("signed by {signer}"));
        if let Some(at) = &block.signed_at {
            trace.info(format!("signed at {at}"));
        }

        // Decode and frame locally before anything touches the network.
        let signature = match DetachedSignature::from_base64(&block.signature_b64) {
            Ok(signature) => {
                trace.pass("signature decodes to an OpenPGP signature packet");
                signature
            }
            Err(e) => {
                trace.fail(e.to_string());
                return Verdict::MalformedSignature;
            }
        };

        let maintainer = profile.maintainer_for(signer);
        if maintainer.is_some() {
            trace.pass(format!("{signer} is a listed maintainer"));
        } else {
            trace.warn(format!(
                "{signer} is not in the maintainers list, manual review recommended"
            ));
            report.advisories.push(Advisory::SignerUnknown {
                identity: signer.to_owned(),
            });
        }

        let payload = match canonicalize(profile) {
            Ok(payload) => payload,
            Err(e) => {
                trace.fail(format!("failed to build {CANONICAL_FORM} payload: {e}"));
                return Verdict::VerificationEngineError;
            }
        };
        trace.info(format!(
            "canonical payload is {} bytes ({CANONICAL_FORM})",
            payload.len()
        ));

        let fallback_url = maintainer.as_ref().and_then(|m| m.pgp_key_url.as_deref());
        let Ok(ResolvedKey { material, source }) =
            self.resolver.resolve(signer, fallback_url, trace)
        else {
            return Verdict::KeyUnavailable;
        };
        report.key_source = Some(source);

        let checked = TrustStore::with_scope(material, |handle| {
            verify_detached(&payload, &signature, handle).map(|valid| {
                (
                    valid,
                    handle.fingerprint(),
                    handle.fingerprints(),
                    handle.user_ids(),
                )
            })
        })
        .and_then(|inner| inner);

        let (valid, primary, fingerprints, user_ids) = match checked {
            Ok(checked) => checked,
            Err(e) => {
                trace.fail(e.to_string());
                return Verdict::VerificationEngineError;
            }
        };
        trace.info(format!("key fingerprint {primary}"));
        if !user_ids.is_empty() {
            trace.info(format!("key user IDs: {}", user_ids.join(", ")));
        }
        report.key_fingerprint = Some(primary);

        if !valid {
            trace.fail("signature does not match the canonical profile");
            return Verdict::SignatureInvalid;
        }
        trace.pass(format!("good signature from {signer}"));

        let Some(expected) = maintainer.as_ref().and_then(|m| m.pgp_fingerprint.as_deref())
        else {
            trace.skip("no pgp_fingerprint recorded for signer");
            return Verdict::Verified;
        };

        let wanted = normalize_fingerprint(expected);
        if fingerprints.iter().any(|fp| normalize_fingerprint(fp) == wanted) {
            trace.pass("key fingerprint matches maintainer record");
            return Verdict::Verified;
        }

        report.advisories.push(Advisory::FingerprintMismatch {
            expected: expected.to_owned(),
            actual: fingerprints,
        });
        if self.config.enforce_fingerprint {
            trace.fail(format!("key fingerprint differs from recorded {expected}"));
            Verdict::FingerprintMismatch
        } else {
            trace.warn(format!(
                "key fingerprint differs from recorded {expected}, manual review recommended"
            ));
            Verdict::Verified
        }
    }
}
