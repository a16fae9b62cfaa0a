//! Reference resolution.
//!
//! A record declares the package it concerns as `composer://<vendor>/<package>`.
//! The package path must match the directory the record is stored in, and the
//! package must exist in its Composer repository (`composer-repository`, or
//! the default repository when absent).

use tracing::debug;
use url::Url;

use crate::document::{Mapping, Node};
use crate::repository::RepositoryCache;
use crate::rules::Diagnostics;
use crate::traits::{RepositoryError, RepositoryFactory};

pub const REFERENCE_PREFIX: &str = "composer://";

/// Which repository a record's package is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryChoice<'a> {
    Default,
    Custom(&'a str),
    /// `composer-repository: false`; the package lives outside any repository.
    Disabled,
}

impl<'a> RepositoryChoice<'a> {
    pub fn of(doc: &'a Mapping) -> Self {
        match doc.get("composer-repository") {
            Some(Node::Bool(false)) => RepositoryChoice::Disabled,
            Some(Node::String(uri)) if !uri.trim().is_empty() => RepositoryChoice::Custom(uri.trim()),
            _ => RepositoryChoice::Default,
        }
    }
}

/// Directory part of a record path, `/`-separated, without surrounding slashes.
pub fn storage_dir(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let dir = match normalized.rfind('/') {
        Some(idx) => &normalized[..idx],
        None => "",
    };
    dir.trim_matches('/').to_string()
}

/// Package name carried by a well-formed reference.
pub fn package_name(reference: &str) -> Option<&str> {
    reference.strip_prefix(REFERENCE_PREFIX)
}

/// Checks `reference` and confirms the package exists.
///
/// Owns the repository client cache, so records sharing a repository reuse
/// one client for the whole run.
pub struct ReferenceResolver<F> {
    cache: RepositoryCache<F>,
    default_repository: String,
}

impl<F: RepositoryFactory> ReferenceResolver<F> {
    pub fn new(factory: F, default_repository: &Url) -> Self {
        Self {
            cache: RepositoryCache::new(factory),
            default_repository: default_repository.as_str().trim_end_matches('/').to_string(),
        }
    }

    pub fn default_repository(&self) -> &str {
        &self.default_repository
    }

    /// Number of repository clients created so far.
    pub fn repositories(&self) -> usize {
        self.cache.len()
    }

    /// # Errors
    ///
    /// Only repository failures are errors; every problem with the record
    /// itself is reported through `out`, including a `composer-repository`
    /// the factory rejects as a URI.
    pub async fn check(
        &mut self,
        doc: &Mapping,
        out: &mut Diagnostics<'_>,
    ) -> Result<(), RepositoryError> {
        let Some(node) = doc.get("reference") else {
            return Ok(());
        };

        let Some(package) = node.as_str().and_then(package_name) else {
            out.report(format!(
                "Reference `{node}` must start with `{REFERENCE_PREFIX}`."
            ));
            return Ok(());
        };

        let expected = storage_dir(out.path());
        let declared = package.replace('\\', "/");
        if declared.trim_matches('/') != expected {
            out.report(format!(
                "Reference `{REFERENCE_PREFIX}{package}` does not match the file location `{expected}`."
            ));
        }

        if package.is_empty() {
            return Ok(());
        }

        let uri = match RepositoryChoice::of(doc) {
            RepositoryChoice::Disabled => return Ok(()),
            RepositoryChoice::Custom(uri) => uri.trim_end_matches('/').to_string(),
            RepositoryChoice::Default => self.default_repository.clone(),
        };

        let repository = match self.cache.get_or_create(&uri) {
            Ok(repository) => repository,
            Err(RepositoryError::InvalidUri { reason, .. }) => {
                debug!(repository = %uri, %reason, "Rejected composer repository");
                out.report(format!("Invalid composer repository `{uri}`."));
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let results = repository.search(package).await?;
        debug!(package, repository = %uri, hits = results.len(), "Repository search finished");

        if !results.iter().any(|p| p.name == package) {
            out.report(format!(
                "Invalid composer package (not found in repository `{uri}`)."
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;
    use crate::findings::Findings;
    use crate::model::PackageDescriptor;
    use crate::traits::PackageRepository;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Repository holding a fixed package list; logs every searched URI.
    struct FixedRepository {
        uri: String,
        packages: Vec<&'static str>,
        searches: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl PackageRepository for FixedRepository {
        fn uri(&self) -> &str {
            &self.uri
        }

        async fn search(&self, name: &str) -> Result<Vec<PackageDescriptor>, RepositoryError> {
            self.searches.lock().unwrap().push(self.uri.clone());
            // Substring matches, like a real search endpoint.
            Ok(self
                .packages
                .iter()
                .filter(|p| p.contains(name))
                .map(|p| PackageDescriptor::named(*p))
                .collect())
        }
    }

    #[derive(Default)]
    struct FixedFactory {
        searches: Arc<Mutex<Vec<String>>>,
    }

    impl RepositoryFactory for FixedFactory {
        fn create(&self, uri: &str) -> Result<Arc<dyn PackageRepository>, RepositoryError> {
            if !uri.starts_with("http") {
                return Err(RepositoryError::InvalidUri {
                    uri: uri.to_string(),
                    reason: "unsupported scheme".to_string(),
                });
            }
            Ok(Arc::new(FixedRepository {
                uri: uri.to_string(),
                packages: vec!["acme/widget", "acme/widget-extra"],
                searches: Arc::clone(&self.searches),
            }))
        }
    }

    fn resolver() -> (ReferenceResolver<FixedFactory>, Arc<Mutex<Vec<String>>>) {
        let factory = FixedFactory::default();
        let searches = Arc::clone(&factory.searches);
        let url = Url::parse("https://packagist.org").unwrap();
        (ReferenceResolver::new(factory, &url), searches)
    }

    async fn check(resolver: &mut ReferenceResolver<FixedFactory>, path: &str, yaml: &str) -> Vec<String> {
        let doc = parse(yaml).unwrap();
        let mut findings = Findings::new();
        resolver
            .check(&doc, &mut Diagnostics::new(path, &mut findings))
            .await
            .unwrap();
        findings.messages(path).to_vec()
    }

    #[test]
    fn test_storage_dir() {
        assert_eq!(storage_dir("acme/widget/entry.yaml"), "acme/widget");
        assert_eq!(storage_dir("acme\\widget\\entry.yaml"), "acme/widget");
        assert_eq!(storage_dir("entry.yaml"), "");
    }

    #[test]
    fn test_repository_choice() {
        let doc = parse("composer-repository: false\n").unwrap();
        assert_eq!(RepositoryChoice::of(&doc), RepositoryChoice::Disabled);
        let doc = parse("composer-repository: ''\n").unwrap();
        assert_eq!(RepositoryChoice::of(&doc), RepositoryChoice::Default);
        let doc = parse("composer-repository: https://repo.example.com\n").unwrap();
        assert_eq!(
            RepositoryChoice::of(&doc),
            RepositoryChoice::Custom("https://repo.example.com")
        );
    }

    #[tokio::test]
    async fn test_matching_reference_is_clean() {
        let (mut resolver, searches) = resolver();
        let messages = check(&mut resolver, "acme/widget/entry.yaml", "reference: composer://acme/widget\n").await;
        assert!(messages.is_empty());
        assert_eq!(*searches.lock().unwrap(), vec!["https://packagist.org".to_string()]);
    }

    #[tokio::test]
    async fn test_reference_location_mismatch() {
        let (mut resolver, _) = resolver();
        let messages = check(&mut resolver, "acme/other/entry.yaml", "reference: composer://acme/widget\n").await;
        assert_eq!(
            messages,
            vec!["Reference `composer://acme/widget` does not match the file location `acme/other`."]
        );
    }

    #[tokio::test]
    async fn test_reference_prefix_required() {
        let (mut resolver, searches) = resolver();
        let messages = check(&mut resolver, "acme/widget/entry.yaml", "reference: acme/widget\n").await;
        assert_eq!(messages, vec!["Reference `acme/widget` must start with `composer://`."]);
        assert!(searches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_search_hit_is_not_a_match() {
        let (mut resolver, _) = resolver();
        let messages = check(&mut resolver, "acme/widg/entry.yaml", "reference: composer://acme/widg\n").await;
        assert_eq!(
            messages,
            vec!["Invalid composer package (not found in repository `https://packagist.org`)."]
        );
    }

    #[tokio::test]
    async fn test_custom_repository_and_cache() {
        let (mut resolver, searches) = resolver();
        let yaml = "reference: composer://acme/widget\ncomposer-repository: https://repo.example.com/\n";
        check(&mut resolver, "acme/widget/a.yaml", yaml).await;
        check(&mut resolver, "acme/widget/b.yaml", yaml).await;
        check(&mut resolver, "acme/widget/c.yaml", "reference: composer://acme/widget\n").await;

        assert_eq!(resolver.repositories(), 2);
        assert_eq!(
            *searches.lock().unwrap(),
            vec![
                "https://repo.example.com".to_string(),
                "https://repo.example.com".to_string(),
                "https://packagist.org".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_disabled_repository_skips_lookup() {
        let (mut resolver, searches) = resolver();
        let yaml = "reference: composer://acme/private\ncomposer-repository: false\n";
        assert!(check(&mut resolver, "acme/private/a.yaml", yaml).await.is_empty());
        assert!(searches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_repository_is_a_finding() {
        let (mut resolver, searches) = resolver();
        let yaml = "reference: composer://acme/widget\ncomposer-repository: not a url\n";
        let messages = check(&mut resolver, "acme/widget/a.yaml", yaml).await;

        assert_eq!(messages, vec!["Invalid composer repository `not a url`."]);
        assert!(searches.lock().unwrap().is_empty());
        assert_eq!(resolver.repositories(), 0);

        // The resolver stays usable for later records.
        let messages = check(&mut resolver, "acme/widget/b.yaml", "reference: composer://acme/widget\n").await;
        assert!(messages.is_empty());
    }
}
