//! Map-backed secret store.

use std::collections::HashMap;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use super::ids::{SecretIdProvider, registered_secret_ids};
use super::{Purpose, SecretMaterial, SecretStore};
use crate::config::Secrets;
use crate::{GreetingsError, Realm, Result};

/// In-memory [`SecretStore`] keyed on `(realm, secret id)`.
///
/// With the environment fallback enabled, a missing entry is looked up in
/// the variable named by [`env_var_name`], e.g. `GREETINGS_API_KEY_ACME`
/// for the greetings key of realm `acme`.
#[derive(Default)]
pub struct StaticSecretStore {
    secrets: HashMap<Realm, HashMap<String, SecretString>>,
    env_fallback: bool,
}

impl StaticSecretStore {
    /// Create an empty store with the environment fallback disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a loaded secrets file.
    ///
    /// Only ids declared by one of `providers` are kept; anything else is
    /// logged and dropped. The environment fallback is enabled.
    pub fn from_secrets(secrets: &Secrets, providers: &[&dyn SecretIdProvider]) -> Self {
        let known = registered_secret_ids(providers);
        let mut store = Self::new().env_fallback(true);
        for (realm, entries) in &secrets.realms {
            for (secret_id, value) in entries {
                if !known.contains(secret_id) {
                    warn!(realm = %realm, secret_id = %secret_id, "ignoring unregistered secret id");
                    continue;
                }
                store.insert(realm.clone(), secret_id.clone(), value.clone());
            }
        }
        store
    }

    /// Add a secret.
    pub fn with_secret(
        mut self,
        realm: impl Into<Realm>,
        secret_id: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.insert(realm.into(), secret_id.into(), value.into());
        self
    }

    /// Enable or disable the environment variable fallback.
    pub fn env_fallback(mut self, enabled: bool) -> Self {
        self.env_fallback = enabled;
        self
    }

    fn insert(&mut self, realm: Realm, secret_id: String, value: String) {
        self.secrets
            .entry(realm)
            .or_default()
            .insert(secret_id, SecretString::from(value));
    }

    fn env_secret(&self, realm: &Realm, purpose: &Purpose) -> Option<SecretMaterial> {
        if !self.env_fallback {
            return None;
        }
        let var = env_var_name(realm, purpose);
        let value = std::env::var(&var).ok()?;
        debug!(realm = %realm, var = %var, "resolved secret from environment");
        Some(SecretMaterial::new(value))
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    fn name(&self) -> &str {
        "static"
    }

    async fn active_secret(&self, realm: &Realm, purpose: &Purpose) -> Result<SecretMaterial> {
        if let Some(secret) = self
            .secrets
            .get(realm)
            .and_then(|entries| entries.get(purpose.id()))
        {
            return Ok(SecretMaterial::new(secret.expose_secret()));
        }

        self.env_secret(realm, purpose)
            .ok_or_else(|| GreetingsError::NoSuchSecret {
                realm: realm.to_string(),
                secret_id: purpose.id().to_string(),
            })
    }
}

/// Environment variable consulted for `purpose` in `realm`.
///
/// `<PURPOSE ID>_KEY_<REALM>`, upper-cased, with every non-alphanumeric
/// character replaced by `_`.
pub fn env_var_name(realm: &Realm, purpose: &Purpose) -> String {
    format!(
        "{}_KEY_{}",
        env_segment(purpose.id()),
        env_segment(realm.as_str())
    )
}

fn env_segment(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
