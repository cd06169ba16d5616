//! Per-realm greeting client.
//!
//! A [`RealmGreetingService`] owns the greeting cache of one realm and
//! performs the authenticated lookups against that realm's service:
//!
//! ```text
//! GET <service_url>?username=<username>
//! Authorization: ApiKey <key>
//! ```
//!
//! An empty response body means the user has no greeting; anything else is
//! the greeting text itself. The username is appended as-is, without
//! percent-encoding, so usernames containing `&`, `#` or similar characters
//! produce a different query than intended.
//!
//! # Interruption
//!
//! A lookup can carry a [`CancellationToken`]. Cancelling it fails the load
//! that call started with [`GreetingsError::Interrupted`], along with any
//! callers coalesced onto that load. Nothing is cached and the token is
//! never stored, so later lookups go to the network again. A token that is
//! already cancelled still lets cached greetings through.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Client, RequestBuilder, Url};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::GreetingsConfig;
use crate::secrets::{GREETINGS_API_KEY, SecretStore};
use crate::telemetry;
use crate::{GreetingsError, Realm, Result};

/// Greeting lookups for a single realm.
///
/// Results (including "no greeting") are cached per username for the
/// configured TTL, counted from the write. Failed lookups are not cached.
/// Concurrent lookups of the same username share one request.
pub struct RealmGreetingService {
    realm: Realm,
    service_url: String,
    http: Client,
    secrets: Arc<dyn SecretStore>,
    request_timeout: Option<Duration>,
    greetings: Cache<String, Option<String>>,
}

impl RealmGreetingService {
    pub(crate) fn new(
        realm: Realm,
        service_url: String,
        http: Client,
        secrets: Arc<dyn SecretStore>,
        config: &GreetingsConfig,
    ) -> Self {
        let greetings = Cache::builder().time_to_live(config.ttl).build();
        Self {
            realm,
            service_url,
            http,
            secrets,
            request_timeout: config.request_timeout,
            greetings,
        }
    }

    /// Realm this client serves.
    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    /// The service URL resolved when this client was built.
    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    /// Whether a live (unexpired) result is cached for `username`.
    pub fn is_cached(&self, username: &str) -> bool {
        self.greetings.contains_key(username)
    }

    /// Greeting for `username`, from cache or from the service.
    ///
    /// Returns `Ok(None)` when the service has no greeting for the user.
    pub async fn get_greeting(&self, username: &str) -> Result<Option<String>> {
        self.get_greeting_with_cancel(username, &CancellationToken::new())
            .await
    }

    /// Like [`get_greeting`](Self::get_greeting), but a load started by this
    /// call fails with [`GreetingsError::Interrupted`] once `cancel` fires.
    pub async fn get_greeting_with_cancel(
        &self,
        username: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        let entry = self
            .greetings
            .entry_by_ref(username)
            .or_try_insert_with(self.load_greeting(username, cancel))
            .await?;

        if entry.is_fresh() {
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "cache" => "greeting").increment(1);
        } else {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "cache" => "greeting").increment(1);
        }
        Ok(entry.into_value())
    }

    async fn load_greeting(
        &self,
        username: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        if cancel.is_cancelled() {
            debug!(realm = %self.realm, username, "lookup cancelled before loading");
            return Err(GreetingsError::Interrupted);
        }
        debug!(realm = %self.realm, username, "loading greeting");

        let secret = self
            .secrets
            .active_secret(&self.realm, &GREETINGS_API_KEY)
            .await
            .inspect_err(|e| {
                warn!(realm = %self.realm, store = self.secrets.name(), error = %e, "greetings api key unavailable");
            })?;

        let uri = format!("{}?username={}", self.service_url, username);
        let url = Url::parse(&uri).map_err(|e| GreetingsError::InvalidUri(format!("{uri}: {e}")))?;

        let mut authorization = secret
            .reveal(|key| HeaderValue::from_str(&format!("ApiKey {key}")))
            .map_err(|e| GreetingsError::InvalidHeader(format!("{AUTHORIZATION}: {e}")))?;
        authorization.set_sensitive(true);
        drop(secret);

        let mut request = self.http.get(url).header(AUTHORIZATION, authorization);
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }

        let start = Instant::now();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GreetingsError::Interrupted),
            result = self.fetch(request) => result,
        };
        metrics::histogram!(telemetry::REMOTE_REQUEST_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());

        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::REMOTE_REQUESTS_TOTAL, "status" => status).increment(1);

        if let Err(e) = &result {
            warn!(realm = %self.realm, username, error = %e, "greeting lookup failed");
        }
        result
    }

    async fn fetch(&self, request: RequestBuilder) -> Result<Option<String>> {
        let response = request.send().await?;

        // The service contract has no error statuses: any response that
        // arrives is read for its body.
        let status = response.status();
        if !status.is_success() {
            warn!(
                realm = %self.realm,
                status = status.as_u16(),
                "greeting service returned non-success status"
            );
        }

        let body = response.bytes().await?;
        Ok(decode_greeting(&body))
    }
}

/// Empty body → no greeting; otherwise the body as UTF-8 text.
///
/// Invalid sequences are replaced with U+FFFD rather than rejected.
pub(crate) fn decode_greeting(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    Some(String::from_utf8_lossy(body).into_owned())
}
