//! Web Key Directory address derivation.
//!
//! The lookup address for `local@domain` is
//! `https://domain/.well-known/openpgpkey/hu/<hash>?l=<local>`, where
//! `<hash>` is the SHA-1 of the local-part, base-32 encoded (RFC 4648
//! alphabet), unpadded and lowercased.

use data_encoding::BASE32_NOPAD;
use sha1::{Digest, Sha1};
use url::Url;

use crate::error::SealError;

/// Split an identity into `(local, domain)`.
///
/// Exactly one `@` is allowed and both halves must be non-empty.
pub fn split_identity(identity: &str) -> Result<(&str, &str), SealError> {
    let invalid = || SealError::InvalidIdentity(identity.to_owned());
    let (local, domain) = identity.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    Ok((local, domain))
}

/// Hash a local-part into its WKD path segment.
pub fn wkd_hash(local: &str) -> String {
    let digest = Sha1::digest(local.as_bytes());
    BASE32_NOPAD.encode(&digest).to_ascii_lowercase()
}

/// Build the WKD lookup URL for `identity`.
pub fn wkd_url(identity: &str) -> Result<String, SealError> {
    let (local, domain) = split_identity(identity)?;
    let base = format!(
        "https://{domain}/.well-known/openpgpkey/hu/{}",
        wkd_hash(local)
    );
    let url = Url::parse_with_params(&base, &[("l", local)])
        .map_err(|_| SealError::InvalidIdentity(identity.to_owned()))?;
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_reference_vectors() {
        assert_eq!(wkd_hash("alice"), "kivso2rvnpptsaj57k7kftkd4fa6zspi");
        assert_eq!(wkd_hash("bob"), "jambvtjcwpw25pekir4grj67pttcteqk");
        // The local-part is hashed verbatim, case included.
        assert_eq!(wkd_hash("Joe.Doe"), "nmgxykytf5tbbko4oz7vfqjq5ujvsl37");
    }

    #[test]
    fn url_carries_hash_and_local_part() {
        let url = wkd_url("alice@example.com").unwrap();
        assert_eq!(
            url,
            "https://example.com/.well-known/openpgpkey/hu/kivso2rvnpptsaj57k7kftkd4fa6zspi?l=alice"
        );
    }

    #[test]
    fn malformed_identities_are_rejected() {
        for bad in ["alice", "@example.com", "alice@", "a@b@c", ""] {
            assert!(
                matches!(split_identity(bad), Err(SealError::InvalidIdentity(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn domain_must_form_a_valid_host() {
        assert!(wkd_url("alice@exa mple.com").is_err());
    }
}
