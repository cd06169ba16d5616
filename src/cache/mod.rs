//! Two-level greeting cache.
//!
//! - [`Greetings`]: realm → [`RealmGreetingService`]. Entries never expire
//!   and are never evicted; a realm's service URL is resolved once, the
//!   first time the realm is seen.
//! - [`RealmGreetingService`]: username → greeting, with a write-based TTL
//!   (1 hour by default). See [`realm`] module docs for the wire contract.
//!
//! # Loading
//!
//! Both layers use moka's entry API (`or_try_insert_with`): the first caller
//! for a missing key runs the loader, concurrent callers for the same key
//! wait on it and share its outcome. An `Err` from the loader is handed to
//! every waiter and nothing is inserted, so the next access retries. There is
//! no backoff and no negative caching of failures.
//!
//! # Staleness
//!
//! There is no invalidation path for realms. A changed service URL is only
//! picked up by a new [`Greetings`] instance.

pub mod realm;

pub use realm::RealmGreetingService;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::GreetingsConfig;
use crate::registry::ServiceRegistry;
use crate::secrets::SecretStore;
use crate::telemetry;
use crate::{Realm, Result};

/// Greeting lookups across realms.
///
/// Construct one per process (or per host component) and share it behind an
/// `Arc`; it is internally synchronised.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use realm_greetings::{
///     Greetings, GreetingsConfig, Realm, StaticSecretStore, StaticServiceRegistry,
/// };
///
/// # async fn run() -> realm_greetings::Result<()> {
/// let registry = StaticServiceRegistry::new().with_realm("acme", "https://greetings.acme.test");
/// let secrets = StaticSecretStore::new().with_secret("acme", "greetings.api", "k-acme");
///
/// let greetings = Greetings::new(
///     reqwest::Client::new(),
///     Arc::new(registry),
///     Arc::new(secrets),
///     GreetingsConfig::default(),
/// );
///
/// if let Some(text) = greetings.get_greeting(&Realm::new("acme"), "alice").await? {
///     println!("{text}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct Greetings {
    services: Cache<Realm, Arc<RealmGreetingService>>,
    http: Client,
    registry: Arc<dyn ServiceRegistry>,
    secrets: Arc<dyn SecretStore>,
    config: GreetingsConfig,
}

impl Greetings {
    /// Create an empty cache; realms are resolved on first lookup.
    pub fn new(
        http: Client,
        registry: Arc<dyn ServiceRegistry>,
        secrets: Arc<dyn SecretStore>,
        config: GreetingsConfig,
    ) -> Self {
        Self {
            services: Cache::builder().build(),
            http,
            registry,
            secrets,
            config,
        }
    }

    /// Cache tuning this instance was built with.
    pub fn config(&self) -> &GreetingsConfig {
        &self.config
    }

    /// Whether a greeting service has been built for `realm`.
    pub fn is_loaded(&self, realm: &Realm) -> bool {
        self.services.contains_key(realm)
    }

    /// The greeting service for `realm`, built on first use.
    pub async fn service(&self, realm: &Realm) -> Result<Arc<RealmGreetingService>> {
        let entry = self
            .services
            .entry_by_ref(realm)
            .or_try_insert_with(self.build_service(realm))
            .await?;

        if entry.is_fresh() {
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "cache" => "realm").increment(1);
        } else {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "cache" => "realm").increment(1);
        }
        Ok(entry.into_value())
    }

    /// Greeting for `username` in `realm`.
    ///
    /// `Ok(None)` means the realm's service has no greeting for the user.
    /// Infrastructure failures (configuration, secret, transport) are
    /// returned as errors, never folded into `None`.
    pub async fn get_greeting(&self, realm: &Realm, username: &str) -> Result<Option<String>> {
        self.get_greeting_with_cancel(realm, username, &CancellationToken::new())
            .await
    }

    /// Greeting lookup that can be interrupted.
    ///
    /// If this call has to load the greeting and `cancel` fires first (or has
    /// already fired), the load fails with
    /// [`GreetingsError::Interrupted`](crate::GreetingsError::Interrupted)
    /// for this call and any caller waiting on the same load. The token only
    /// affects this call: later lookups load normally, and cached greetings
    /// are served even when `cancel` is already cancelled.
    pub async fn get_greeting_with_cancel(
        &self,
        realm: &Realm,
        username: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        let result = async {
            self.service(realm)
                .await?
                .get_greeting_with_cancel(username, cancel)
                .await
        }
        .await;

        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::LOOKUPS_TOTAL, "status" => status).increment(1);
        result
    }

    async fn build_service(&self, realm: &Realm) -> Result<Arc<RealmGreetingService>> {
        self.config.validate()?;

        let service_url = self
            .registry
            .service_url(realm)
            .await
            .inspect_err(|e| {
                warn!(realm = %realm, registry = self.registry.name(), error = %e, "failed to resolve greeting service");
            })?;

        info!(realm = %realm, service_url = %service_url, "greeting service resolved");
        Ok(Arc::new(RealmGreetingService::new(
            realm.clone(),
            service_url,
            self.http.clone(),
            Arc::clone(&self.secrets),
            &self.config,
        )))
    }
}
