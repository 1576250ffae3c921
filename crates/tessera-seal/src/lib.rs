//! Signed-profile trust verification for Tessera.
//!
//! `tessera-seal` establishes that a device profile was endorsed by a
//! specific maintainer using OpenPGP detached signatures.
//!
//! The verification pipeline has four phases:
//! 1. **Decode**: base64 and OpenPGP framing, checked locally
//! 2. **Discover**: fetch the signer's key via WKD, then the maintainer's key URL
//! 3. **Import**: load the key into a scoped in-memory trust store
//! 4. **Verify**: check the signature over the canonical profile payload

pub mod error;
pub mod fetch;
pub mod report;
pub mod resolver;
pub mod signature;
pub mod trust;
pub mod verify;
pub mod wkd;

#[cfg(test)]
pub(crate) mod testkeys;

// Re-export primary types for convenience.
pub use error::SealError;
pub use fetch::{HttpFetcher, KeyFetcher};
pub use report::{Advisory, VerificationReport, VerificationStep, Verdict};
pub use resolver::{KeyResolver, KeySource};
pub use verify::{ProfileVerifier, VerifyConfig};
