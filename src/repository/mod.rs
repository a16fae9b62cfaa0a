//! Package repository access.
//!
//! - [`RepositoryCache`]: one client per repository URI, created on first use
//!   and reused for the rest of the run
//! - [`composer`]: HTTP client for Composer repositories (`search.json`)

pub mod composer;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::traits::{PackageRepository, RepositoryError, RepositoryFactory};

pub use composer::{ComposerRepository, HttpRepositoryFactory};

/// Lazily populated map of repository clients keyed by URI.
///
/// Insert-once-per-key; the cache never evicts. It is owned by the reference
/// resolver and lives as long as the validator that holds it.
pub struct RepositoryCache<F> {
    factory: F,
    clients: HashMap<String, Arc<dyn PackageRepository>>,
}

impl<F: RepositoryFactory> RepositoryCache<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            clients: HashMap::new(),
        }
    }

    /// Returns the client for `uri`, constructing it on first request.
    ///
    /// URIs differing only by a trailing `/` share a client.
    pub fn get_or_create(&mut self, uri: &str) -> Result<Arc<dyn PackageRepository>, RepositoryError> {
        let key = uri.trim_end_matches('/');
        if let Some(client) = self.clients.get(key) {
            return Ok(Arc::clone(client));
        }

        debug!(repository = key, "Creating package repository client");
        let client = self.factory.create(key)?;
        self.clients.insert(key.to_string(), Arc::clone(&client));
        Ok(client)
    }

    /// Number of distinct repositories contacted so far.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
