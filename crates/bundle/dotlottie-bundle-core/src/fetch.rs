//! Byte retrieval for URL sources.
//!
//! The host usually owns networking (browser fetch, an app's HTTP client),
//! so the player only sees this trait. Failures are surfaced to callers
//! unchanged as [`BundleError::NetworkFailure`].

use async_trait::async_trait;

use crate::error::BundleError;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("fetch {url} failed: {reason}")]
pub struct FetchError {
    pub url: String,
    pub reason: String,
}

impl FetchError {
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

impl From<FetchError> for BundleError {
    fn from(err: FetchError) -> Self {
        BundleError::NetworkFailure {
            url: err.url,
            reason: err.reason,
        }
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieve the full body at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetcher for players that only ever load bytes or documents directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFetcher;

#[async_trait]
impl Fetcher for NoFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::new(url, "no fetcher configured"))
    }
}

/// Blocking HTTP client, run on tokio's blocking pool when a runtime is
/// available and on the polling thread otherwise.
#[cfg(feature = "http")]
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpFetcher;

#[cfg(feature = "http")]
fn http_get(url: &str) -> attohttpc::Result<Vec<u8>> {
    attohttpc::get(url)
        .send()
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.bytes())
}

#[cfg(feature = "http")]
#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let body = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let owned = url.to_string();
                handle
                    .spawn_blocking(move || http_get(&owned))
                    .await
                    .map_err(|e| FetchError::new(url, e.to_string()))?
            }
            Err(_) => http_get(url),
        };
        body.map_err(|e| FetchError::new(url, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_fetcher_reports_network_failure() {
        let err = NoFetcher.fetch("https://example.com/a.lottie").await.unwrap_err();
        let err = BundleError::from(err);
        assert_eq!(err.category(), "network");
        assert!(matches!(
            err,
            BundleError::NetworkFailure { ref url, .. } if url == "https://example.com/a.lottie"
        ));
    }
}
