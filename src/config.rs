//! Configuration.
//!
//! [`GreetingsConfig`] tunes the caches at construction time. The file based
//! [`Config`] and [`Secrets`] feed the bundled
//! [`StaticServiceRegistry`](crate::StaticServiceRegistry) and
//! [`StaticSecretStore`](crate::StaticSecretStore) when the crate runs
//! standalone (e.g. the `greet` binary).
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.realm-greetings/config.toml` (user)
//! 3. `/etc/realm-greetings/config.toml` (system)
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.realm-greetings/secrets.toml` (user, must be 0600)
//! 2. `/etc/realm-greetings/secrets.toml` (system, must be 0600)

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{GreetingsError, Realm, Result};

/// Default lifetime of a cached greeting, counted from the write.
pub const DEFAULT_GREETING_TTL: Duration = Duration::from_secs(3600);

/// Longest greeting TTL the cache accepts (1000 years of 365 days).
pub const MAX_GREETING_TTL: Duration = Duration::from_secs(1000 * 365 * 24 * 3600);

/// Service URL used for a realm section that does not set one.
pub const DEFAULT_SERVICE_URL: &str = "http://local.example.com:8888";

/// Tuning for [`Greetings`](crate::Greetings).
///
/// ```rust
/// # use realm_greetings::GreetingsConfig;
/// # use std::time::Duration;
/// let config = GreetingsConfig::new()
///     .ttl(Duration::from_secs(600))
///     .request_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct GreetingsConfig {
    /// Lifetime of a cached greeting, from the write. Reads do not extend
    /// it. Default: 1 hour.
    pub ttl: Duration,
    /// Timeout for a single greeting service request. Default: none, the
    /// transport's own behaviour applies.
    pub request_timeout: Option<Duration>,
}

impl Default for GreetingsConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_GREETING_TTL,
            request_timeout: None,
        }
    }
}

impl GreetingsConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the greeting time-to-live.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Bound each greeting service request.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Reject settings the cache cannot be built with.
    ///
    /// The TTL must not exceed [`MAX_GREETING_TTL`].
    pub fn validate(&self) -> Result<()> {
        if self.ttl > MAX_GREETING_TTL {
            return Err(GreetingsError::Configuration(format!(
                "greeting ttl of {}s exceeds the maximum of {}s",
                self.ttl.as_secs(),
                MAX_GREETING_TTL.as_secs()
            )));
        }
        Ok(())
    }
}

/// File configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub greetings: GreetingsSection,
    /// Per-realm service configuration.
    #[serde(default)]
    pub realms: BTreeMap<Realm, RealmConfig>,
}

/// `[greetings]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct GreetingsSection {
    /// Greeting TTL in seconds (default: 3600).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Request timeout in seconds (default: none).
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for GreetingsSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            request_timeout_secs: None,
        }
    }
}

fn default_ttl_secs() -> u64 {
    DEFAULT_GREETING_TTL.as_secs()
}

impl From<&GreetingsSection> for GreetingsConfig {
    fn from(section: &GreetingsSection) -> Self {
        let config = GreetingsConfig::new().ttl(Duration::from_secs(section.ttl_secs));
        match section.request_timeout_secs {
            Some(secs) => config.request_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}

/// `[realms.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RealmConfig {
    /// Greeting service endpoint (default: http://local.example.com:8888).
    #[serde(default = "default_service_url")]
    pub service_url: String,
}

fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

/// Secrets file contents.
///
/// ```toml
/// [realms.acme]
/// "greetings.api" = "key-for-acme"
/// ```
#[derive(Clone, Default, Deserialize)]
pub struct Secrets {
    /// Realm → secret id → value.
    #[serde(default)]
    pub realms: BTreeMap<Realm, BTreeMap<String, String>>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: BTreeMap<&Realm, Vec<&String>> = self
            .realms
            .iter()
            .map(|(realm, entries)| (realm, entries.keys().collect()))
            .collect();
        f.debug_struct("Secrets").field("realms", &ids).finish()
    }
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.realm-greetings/config.toml`
    /// 3. `/etc/realm-greetings/config.toml`
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?;
        let content = fs::read_to_string(&path).map_err(|e| {
            GreetingsError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            GreetingsError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })?;
        config.greetings_config().validate()?;
        Ok(config)
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(GreetingsError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".realm-greetings").join("config.toml");
            if user_config.exists() {
                return Ok(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/realm-greetings/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }

        Err(GreetingsError::Configuration(
            "No config file found. Create ~/.realm-greetings/config.toml or /etc/realm-greetings/config.toml"
                .to_string(),
        ))
    }

    /// Cache tuning from the `[greetings]` section.
    pub fn greetings_config(&self) -> GreetingsConfig {
        GreetingsConfig::from(&self.greetings)
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Resolution order:
    /// 1. `~/.realm-greetings/secrets.toml` (if exists, must be 0600)
    /// 2. `/etc/realm-greetings/secrets.toml` (if exists, must be 0600)
    ///
    /// Returns empty secrets if no file exists (keys may come from env vars).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".realm-greetings").join("secrets.toml");
            if user_secrets.exists() {
                return Self::load_from_file(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/realm-greetings/secrets.toml");
        if system_secrets.exists() {
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    /// Load a specific secrets file, enforcing the permission check.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::check_permissions(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            GreetingsError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            GreetingsError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            GreetingsError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(GreetingsError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }
}
