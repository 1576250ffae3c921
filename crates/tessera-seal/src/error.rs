//! Error types for the signature verification subsystem.

/// Errors from the Seal verification subsystem.
///
/// These never escape [`crate::verify::ProfileVerifier::verify`]; they are
/// folded into a [`crate::report::Verdict`] there.
#[derive(Debug, thiserror::Error)]
pub enum SealError {
    /// The signature field is not base64 or not an OpenPGP signature.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// The identity is not of the form `local@domain`.
    #[error("invalid signer identity `{0}`: expected local-part@domain")]
    InvalidIdentity(String),

    /// A single key fetch failed.
    #[error("fetch of {url} failed: {reason}")]
    FetchFailed {
        /// The URL that was attempted.
        url: String,
        /// What went wrong.
        reason: String,
    },

    /// Neither WKD nor the fallback URL produced a key.
    #[error("public key unavailable for `{identity}`")]
    KeyUnavailable {
        /// The signer identity being resolved.
        identity: String,
    },

    /// Key import or the verification primitive itself failed.
    #[error("verification engine error: {0}")]
    Engine(String),

    /// The profile could not be loaded or canonicalized.
    #[error(transparent)]
    Profile(#[from] tessera_profile::ProfileError),
}
