//! Secret resolution.
//!
//! The greeting service authenticates every request with a per-realm API
//! key. Keys are resolved through a [`SecretStore`] on each lookup miss and
//! are only reachable as plain text inside [`SecretMaterial::reveal`].
//!
//! - [`ids`]: the secret ids this crate registers with a host.
//! - [`store`]: [`StaticSecretStore`], a map-backed store fed from
//!   `secrets.toml` with an environment variable fallback.

pub mod ids;
pub mod store;

pub use ids::{
    GREETINGS_API_KEY_ID, GreetingsSecretIdProvider, SecretIdProvider, SecretIdRegistration,
    registered_secret_ids,
};
pub use store::StaticSecretStore;

use std::fmt;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::{Realm, Result};

/// What a secret is used for.
///
/// The `id` is the stable key the secret is stored under; the description is
/// for humans (logs, CLI listings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Purpose {
    id: &'static str,
    description: &'static str,
}

impl Purpose {
    pub const fn new(id: &'static str, description: &'static str) -> Self {
        Self { id, description }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description, self.id)
    }
}

/// API key presented to the greeting service.
pub const GREETINGS_API_KEY: Purpose = Purpose::new(GREETINGS_API_KEY_ID, "greetings api key");

/// Revealable secret material.
///
/// The plain text never leaves [`reveal`](Self::reveal); `Debug` output is
/// redacted.
pub struct SecretMaterial {
    value: SecretString,
}

impl SecretMaterial {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: SecretString::from(value.into()),
        }
    }

    /// Run `f` with the secret as UTF-8 text.
    ///
    /// Do not let the `&str` (or copies of it) escape the closure.
    pub fn reveal<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        f(self.value.expose_secret())
    }
}

impl fmt::Debug for SecretMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretMaterial([REDACTED])")
    }
}

/// Resolves the active secret for a realm and purpose.
///
/// Implementations return [`GreetingsError::NoSuchSecret`](crate::GreetingsError::NoSuchSecret)
/// when nothing is configured and
/// [`GreetingsError::SecretResolution`](crate::GreetingsError::SecretResolution)
/// when the backing store itself fails.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Store name for logging/debugging.
    fn name(&self) -> &str;

    async fn active_secret(&self, realm: &Realm, purpose: &Purpose) -> Result<SecretMaterial>;
}
