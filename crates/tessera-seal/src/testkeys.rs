//! Throwaway signing keys for unit tests.

use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sequoia_openpgp as openpgp;

use openpgp::Cert;
use openpgp::cert::prelude::*;
use openpgp::policy::StandardPolicy;
use openpgp::serialize::SerializeInto;
use openpgp::serialize::stream::{Message, Signer};

pub(crate) struct TestSigner {
    cert: Cert,
}

impl TestSigner {
    pub(crate) fn generate(user_id: &str) -> Self {
        let (cert, _revocation) = CertBuilder::general_purpose(None, Some(user_id))
            .generate()
            .unwrap();
        Self { cert }
    }

    pub(crate) fn fingerprint(&self) -> String {
        self.cert.fingerprint().to_hex()
    }

    /// Binary public certificate.
    pub(crate) fn public_cert(&self) -> Vec<u8> {
        self.cert.to_vec().unwrap()
    }

    pub(crate) fn public_cert_armored(&self) -> Vec<u8> {
        self.cert.armored().to_vec().unwrap()
    }

    /// Detached binary signature over `payload`.
    pub(crate) fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let policy = StandardPolicy::new();
        let keypair = self
            .cert
            .keys()
            .unencrypted_secret()
            .with_policy(&policy, None)
            .supported()
            .alive()
            .revoked(false)
            .for_signing()
            .next()
            .unwrap()
            .key()
            .clone()
            .into_keypair()
            .unwrap();

        let mut sink = Vec::new();
        {
            let message = Message::new(&mut sink);
            let mut signer = Signer::new(message, keypair).detached().build().unwrap();
            signer.write_all(payload).unwrap();
            signer.finalize().unwrap();
        }
        sink
    }

    /// Detached signature over `payload`, base64-encoded as stored in profiles.
    pub(crate) fn sign_b64(&self, payload: &[u8]) -> String {
        STANDARD.encode(self.sign(payload))
    }
}
