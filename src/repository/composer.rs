//! HTTP client for Composer repositories.
//!
//! Lookups use the repository search endpoint:
//! `GET {repository}/search.json?q={name}`, answering
//! `{"results": [{"name": ..., "description": ..., "url": ...}], "next": ...}`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::config::ValidatorConfig;
use crate::model::{PackageDescriptor, SearchResponse};
use crate::traits::{PackageRepository, RepositoryError, RepositoryFactory};

/// Search client bound to a single Composer repository.
#[derive(Debug, Clone)]
pub struct ComposerRepository {
    http: reqwest::Client,
    base_url: Url,
    uri: String,
    max_pages: usize,
}

impl ComposerRepository {
    /// Creates a client for `uri` sharing the given HTTP connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::InvalidUri`] if `uri` is not an absolute
    /// http(s) URL.
    pub fn new(http: reqwest::Client, uri: &str, max_pages: usize) -> Result<Self, RepositoryError> {
        let mut base_url = Url::parse(uri).map_err(|e| RepositoryError::InvalidUri {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(RepositoryError::InvalidUri {
                uri: uri.to_string(),
                reason: format!("unsupported scheme `{}`", base_url.scheme()),
            });
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http,
            base_url,
            uri: uri.to_string(),
            max_pages: max_pages.max(1),
        })
    }

    fn search_url(&self, name: &str) -> Result<Url, RepositoryError> {
        let mut url = self
            .base_url
            .join("search.json")
            .map_err(|e| RepositoryError::InvalidUri {
                uri: self.uri.clone(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut().append_pair("q", name);
        Ok(url)
    }

    async fn fetch_page(&self, url: Url) -> Result<SearchResponse, RepositoryError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| RepositoryError::Http {
                uri: self.uri.clone(),
                source: e,
            })?;

        if !resp.status().is_success() {
            return Err(RepositoryError::Status {
                uri: self.uri.clone(),
                status: resp.status().as_u16(),
            });
        }

        resp.json().await.map_err(|e| RepositoryError::Decode {
            uri: self.uri.clone(),
            source: e,
        })
    }
}

#[async_trait]
impl PackageRepository for ComposerRepository {
    fn uri(&self) -> &str {
        &self.uri
    }

    /// Follows `next` links until an exact name match shows up or the page
    /// budget runs out.
    async fn search(&self, name: &str) -> Result<Vec<PackageDescriptor>, RepositoryError> {
        let mut results = Vec::new();
        let mut next = Some(self.search_url(name)?);
        let mut pages = 0;

        while let Some(url) = next.take() {
            pages += 1;
            debug!(repository = %self.uri, package = name, page = pages, "Searching repository");
            let page = self.fetch_page(url).await?;
            let exact = page.results.iter().any(|p| p.name == name);
            results.extend(page.results);

            if exact || pages >= self.max_pages {
                break;
            }
            next = page.next.as_deref().and_then(|n| Url::parse(n).ok());
        }

        Ok(results)
    }
}

/// Creates [`ComposerRepository`] clients that share one HTTP pool.
#[derive(Debug, Clone)]
pub struct HttpRepositoryFactory {
    http: reqwest::Client,
    max_pages: usize,
}

impl HttpRepositoryFactory {
    pub fn new(config: &ValidatorConfig) -> Result<Self, RepositoryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| RepositoryError::Http {
                uri: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            max_pages: config.max_search_pages,
        })
    }
}

impl RepositoryFactory for HttpRepositoryFactory {
    fn create(&self, uri: &str) -> Result<Arc<dyn PackageRepository>, RepositoryError> {
        Ok(Arc::new(ComposerRepository::new(
            self.http.clone(),
            uri,
            self.max_pages,
        )?))
    }
}
