//! HTTP source backed by reqwest

use super::{check_relative, ResourceSource};
use crate::error::SourceError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;

/// Fetches resources with `GET <base_url>/<path>`
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: Client,
}

impl HttpSource {
    /// Source for `base_url` with a per-request `timeout`
    ///
    /// # Errors
    /// Returns error if the URL does not parse or the client cannot be built
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        reqwest::Url::parse(base_url)
            .map_err(|e| SourceError::Setup(format!("invalid base url '{base_url}': {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Setup(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Base URL without trailing slash
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl ResourceSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<Option<Arc<[u8]>>, SourceError> {
        check_relative(path)?;
        let url = self.url_for(path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::transport(path, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(url = %url, "not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::transport(path, e))?;
        tracing::trace!(url = %url, bytes = bytes.len(), "fetched");
        Ok(Some(Arc::from(bytes.as_ref())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let source = HttpSource::new("https://cdn.example.com/items/", Duration::from_secs(1)).unwrap();
        assert_eq!(source.base_url(), "https://cdn.example.com/items");
        assert_eq!(
            source.url_for("1.21/manifest.json"),
            "https://cdn.example.com/items/1.21/manifest.json"
        );
    }

    #[test]
    fn invalid_base_url_rejected() {
        let err = HttpSource::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, SourceError::Setup(_)));
    }

    #[tokio::test]
    async fn escaping_path_rejected_before_request() {
        let source = HttpSource::new("http://127.0.0.1:9", Duration::from_millis(50)).unwrap();
        let err = source.fetch("../x").await.unwrap_err();
        assert!(matches!(err, SourceError::InvalidPath(_)));
    }
}
