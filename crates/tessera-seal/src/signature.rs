//! Detached OpenPGP signature checking.
//!
//! Signatures arrive base64-encoded in the profile's signature block. They
//! are decoded and framed locally before any key is fetched, then checked
//! in-process against the single certificate held by a [`TrustHandle`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sequoia_openpgp as openpgp;

use openpgp::parse::Parse;
use openpgp::parse::stream::{
    DetachedVerifierBuilder, GoodChecksum, MessageLayer, MessageStructure, VerificationHelper,
};
use openpgp::policy::StandardPolicy;
use openpgp::{Cert, Fingerprint, KeyHandle, Packet, PacketPile};

use crate::error::SealError;
use crate::trust::TrustHandle;

/// A decoded detached signature, known to contain a signature packet.
#[derive(Debug, Clone)]
pub struct DetachedSignature {
    bytes: Vec<u8>,
}

impl DetachedSignature {
    /// Decode a base64 signature and check its OpenPGP framing.
    ///
    /// ASCII whitespace is ignored so multi-line YAML scalars decode. The
    /// decoded bytes may be binary or armored.
    pub fn from_base64(signature_b64: &str) -> Result<Self, SealError> {
        let compact: String = signature_b64
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        if compact.is_empty() {
            return Err(SealError::MalformedSignature("signature is empty".to_owned()));
        }

        let bytes = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| SealError::MalformedSignature(format!("invalid base64: {e}")))?;

        let pile = PacketPile::from_bytes(&bytes).map_err(|e| {
            SealError::MalformedSignature(format!("not an OpenPGP packet stream: {e}"))
        })?;
        if !pile
            .descendants()
            .any(|p| matches!(p, Packet::Signature(_)))
        {
            return Err(SealError::MalformedSignature(
                "no signature packet found".to_owned(),
            ));
        }

        Ok(Self { bytes })
    }

    /// The decoded signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Collects signature results for one certificate.
struct Helper<'a> {
    cert: &'a Cert,
    good: Option<Fingerprint>,
    failures: Vec<String>,
}

impl VerificationHelper for Helper<'_> {
    fn get_certs(&mut self, _ids: &[KeyHandle]) -> openpgp::Result<Vec<Cert>> {
        Ok(vec![self.cert.clone()])
    }

    fn check(&mut self, structure: MessageStructure) -> openpgp::Result<()> {
        for layer in structure {
            let MessageLayer::SignatureGroup { results } = layer else {
                continue;
            };
            for result in results {
                match result {
                    Ok(GoodChecksum { ka, .. }) => {
                        if self.good.is_none() {
                            self.good = Some(ka.key().fingerprint());
                        }
                    }
                    Err(e) => self.failures.push(e.to_string()),
                }
            }
        }
        Ok(())
    }
}

/// Check a base64 detached signature over `payload`.
///
/// Returns `Ok(true)` only for a good signature by the handle's
/// certificate over exactly these bytes.
pub fn verify(
    payload: &[u8],
    signature_b64: &str,
    handle: &TrustHandle<'_>,
) -> Result<bool, SealError> {
    let signature = DetachedSignature::from_base64(signature_b64)?;
    verify_detached(payload, &signature, handle)
}

/// Check an already-decoded detached signature over `payload`.
pub fn verify_detached(
    payload: &[u8],
    signature: &DetachedSignature,
    handle: &TrustHandle<'_>,
) -> Result<bool, SealError> {
    let policy = StandardPolicy::new();
    let helper = Helper {
        cert: handle.cert(),
        good: None,
        failures: Vec::new(),
    };

    let mut verifier = DetachedVerifierBuilder::from_bytes(signature.as_bytes())
        .map_err(engine_error)?
        .with_policy(&policy, None, helper)
        .map_err(engine_error)?;
    verifier.verify_bytes(payload).map_err(engine_error)?;

    let helper = verifier.into_helper();
    match helper.good {
        Some(fingerprint) => {
            tracing::debug!(%fingerprint, "good signature");
            Ok(true)
        }
        None => {
            for failure in &helper.failures {
                tracing::debug!(%failure, "signature rejected");
            }
            Ok(false)
        }
    }
}

fn engine_error(e: impl std::fmt::Display) -> SealError {
    SealError::Engine(format!("signature check failed: {e}"))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::resolver::KeyMaterial;
    use crate::testkeys::TestSigner;
    use crate::trust::TrustStore;

    const PAYLOAD: &[u8] = b"device:\n  id: acme-meter\n";

    fn check(signer: &TestSigner, payload: &[u8], signature_b64: &str) -> bool {
        TrustStore::with_scope(KeyMaterial::new(signer.public_cert()), |h| {
            verify(payload, signature_b64, h)
        })
        .unwrap()
        .unwrap()
    }

    #[test]
    fn good_signature_verifies() {
        let alice = TestSigner::generate("alice@example.com");
        let sig = alice.sign_b64(PAYLOAD);
        assert!(check(&alice, PAYLOAD, &sig));
    }

    #[test]
    fn signature_with_line_breaks_still_decodes() {
        let alice = TestSigner::generate("alice@example.com");
        let sig = alice.sign_b64(PAYLOAD);
        let wrapped: String = sig
            .as_bytes()
            .chunks(20)
            .map(|c| format!("{}\n  ", String::from_utf8_lossy(c)))
            .collect();
        assert!(check(&alice, PAYLOAD, &wrapped));
    }

    #[test]
    fn signature_by_another_key_fails() {
        let alice = TestSigner::generate("alice@example.com");
        let mallory = TestSigner::generate("mallory@example.com");
        let sig = mallory.sign_b64(PAYLOAD);
        assert!(!check(&alice, PAYLOAD, &sig));
    }

    #[test]
    fn tampered_payload_fails() {
        let alice = TestSigner::generate("alice@example.com");
        let sig = alice.sign_b64(PAYLOAD);
        assert!(!check(&alice, b"device:\n  id: acme-meter2\n", &sig));
    }

    #[test]
    fn invalid_base64_is_malformed() {
        let err = DetachedSignature::from_base64("not-valid-base64!!").unwrap_err();
        assert!(matches!(err, SealError::MalformedSignature(_)), "got: {err}");
    }

    #[test]
    fn valid_base64_of_garbage_is_malformed() {
        let b64 = STANDARD.encode(b"hello, this is not a signature");
        let err = DetachedSignature::from_base64(&b64).unwrap_err();
        assert!(matches!(err, SealError::MalformedSignature(_)), "got: {err}");
    }

    #[test]
    fn empty_signature_is_malformed() {
        assert!(matches!(
            DetachedSignature::from_base64("  \n "),
            Err(SealError::MalformedSignature(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn signature_holds_until_any_bit_flips(
            payload in prop::collection::vec(any::<u8>(), 1..256),
            index in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let alice = TestSigner::generate("alice@example.com");
            let sig = alice.sign_b64(&payload);
            prop_assert!(check(&alice, &payload, &sig));

            let mut tampered = payload.clone();
            tampered[index.index(payload.len())] ^= 1 << bit;
            prop_assert!(!check(&alice, &tampered, &sig));
        }
    }
}
