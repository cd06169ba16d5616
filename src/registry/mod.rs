//! Per-realm greeting service configuration.
//!
//! [`ServiceRegistry`] is the seam to whatever holds realm configuration in
//! the host. It is consulted once per realm, when the realm's
//! [`RealmGreetingService`](crate::RealmGreetingService) is first built; the
//! resolved URL is then fixed for the lifetime of the owning
//! [`Greetings`](crate::Greetings).

use std::collections::HashMap;

use async_trait::async_trait;

use crate::config::Config;
use crate::{GreetingsError, Realm, Result};

/// Resolves the greeting service URL configured for a realm.
///
/// Implementations return [`GreetingsError::ServiceNotConfigured`] when the
/// realm has no service instance and [`GreetingsError::Configuration`] when
/// the configuration itself cannot be read.
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// Registry name for logging/debugging.
    fn name(&self) -> &str;

    async fn service_url(&self, realm: &Realm) -> Result<String>;
}

/// Fixed realm → URL map.
#[derive(Debug, Clone, Default)]
pub struct StaticServiceRegistry {
    urls: HashMap<Realm, String>,
}

impl StaticServiceRegistry {
    /// Create a registry with no realms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the service URL for a realm.
    pub fn with_realm(mut self, realm: impl Into<Realm>, service_url: impl Into<String>) -> Self {
        self.urls.insert(realm.into(), service_url.into());
        self
    }

    /// Number of configured realms.
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether no realm is configured.
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl From<&Config> for StaticServiceRegistry {
    fn from(config: &Config) -> Self {
        config
            .realms
            .iter()
            .fold(Self::new(), |registry, (realm, realm_config)| {
                registry.with_realm(realm.clone(), realm_config.service_url.clone())
            })
    }
}

#[async_trait]
impl ServiceRegistry for StaticServiceRegistry {
    fn name(&self) -> &str {
        "static"
    }

    async fn service_url(&self, realm: &Realm) -> Result<String> {
        self.urls
            .get(realm)
            .cloned()
            .ok_or_else(|| GreetingsError::ServiceNotConfigured {
                realm: realm.to_string(),
            })
    }
}
