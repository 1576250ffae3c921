//! Key material transport.
//!
//! The [`KeyFetcher`] trait is the network seam of the resolver. The
//! production implementation, [`HttpFetcher`], performs a blocking HTTPS
//! GET with a global timeout and a response size cap.

use std::time::Duration;

use crate::error::SealError;

/// Default timeout for a single key fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest key body accepted from the network.
pub const MAX_KEY_BYTES: u64 = 1024 * 1024;

/// Fetches raw key material from a URL.
pub trait KeyFetcher: Send + Sync {
    /// GET `url` and return the response body.
    ///
    /// Any transport failure, non-success status, or unreadable body is an
    /// error; the caller decides whether it is fatal.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, SealError>;
}

impl<T: KeyFetcher + ?Sized> KeyFetcher for &T {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, SealError> {
        (**self).fetch(url)
    }
}

/// Blocking HTTPS fetcher backed by `ureq`.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Create a fetcher whose requests are cut off after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .https_only(true)
            .build()
            .into();
        Self { agent }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT)
    }
}

impl KeyFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, SealError> {
        let failed = |reason: String| SealError::FetchFailed {
            url: url.to_owned(),
            reason,
        };

        // Non-2xx statuses surface as `ureq::Error::StatusCode`.
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| failed(e.to_string()))?;

        let mut body = response.into_body();
        let bytes = body
            .with_config()
            .limit(MAX_KEY_BYTES)
            .read_to_vec()
            .map_err(|e| failed(format!("failed to read body: {e}")))?;

        if bytes.is_empty() {
            return Err(failed("empty response body".to_owned()));
        }

        tracing::debug!(url, bytes = bytes.len(), "fetched key material");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_http_is_refused() {
        let fetcher = HttpFetcher::new(Duration::from_secs(1));
        let err = fetcher.fetch("http://127.0.0.1:9/key.asc").unwrap_err();
        assert!(
            matches!(err, SealError::FetchFailed { ref url, .. } if url == "http://127.0.0.1:9/key.asc"),
            "got: {err}"
        );
    }

    #[test]
    fn unreachable_host_is_a_fetch_failure() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2));
        let err = fetcher.fetch("https://tessera.invalid/key.asc").unwrap_err();
        assert!(matches!(err, SealError::FetchFailed { .. }), "got: {err}");
    }
}
