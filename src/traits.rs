use crate::model::PackageDescriptor;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Invalid repository URI `{uri}`: {reason}")]
    InvalidUri { uri: String, reason: String },
    #[error("Request to `{uri}` failed: {source}")]
    Http {
        uri: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Repository `{uri}` answered with HTTP {status}")]
    Status { uri: String, status: u16 },
    #[error("Failed to decode search results from `{uri}`: {source}")]
    Decode {
        uri: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Repository error: {0}")]
    Other(String),
}

#[async_trait]
pub trait PackageRepository: Send + Sync {
    /// Returns the repository URI this client talks to.
    fn uri(&self) -> &str;

    /// Searches the repository by package name. May return partial matches;
    /// callers decide what counts as an exact hit.
    async fn search(&self, name: &str) -> Result<Vec<PackageDescriptor>, RepositoryError>;
}

/// Builds one [`PackageRepository`] per repository URI.
pub trait RepositoryFactory: Send + Sync {
    fn create(&self, uri: &str) -> Result<Arc<dyn PackageRepository>, RepositoryError>;
}
