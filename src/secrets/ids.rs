//! Secret id registration.
//!
//! A host that manages secrets per realm needs to know up front which secret
//! ids a component will ask for, so it can offer them for configuration.
//! Components describe theirs through [`SecretIdProvider`].

use std::collections::BTreeSet;

/// Secret id of the greeting service API key.
pub const GREETINGS_API_KEY_ID: &str = "greetings.api";

/// Component name the greeting secrets are registered under.
pub const GREETINGS_COMPONENT: &str = "greetings-plugin";

/// One realm-singleton secret id owned by a component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SecretIdRegistration {
    /// Owning component (e.g. `"greetings-plugin"`).
    pub component: String,
    /// Secret id within the realm (e.g. `"greetings.api"`).
    pub secret_id: String,
}

impl SecretIdRegistration {
    pub fn new(component: impl Into<String>, secret_id: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            secret_id: secret_id.into(),
        }
    }
}

/// Declares the secret ids a component resolves once per realm.
pub trait SecretIdProvider: Send + Sync {
    fn realm_singleton_secret_ids(&self) -> Vec<SecretIdRegistration>;
}

/// Registers the greeting service API key.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreetingsSecretIdProvider;

impl SecretIdProvider for GreetingsSecretIdProvider {
    fn realm_singleton_secret_ids(&self) -> Vec<SecretIdRegistration> {
        vec![SecretIdRegistration::new(
            GREETINGS_COMPONENT,
            GREETINGS_API_KEY_ID,
        )]
    }
}

/// Collect the secret ids declared by all `providers`, deduplicated.
pub fn registered_secret_ids(providers: &[&dyn SecretIdProvider]) -> BTreeSet<String> {
    providers
        .iter()
        .flat_map(|p| p.realm_singleton_secret_ids())
        .map(|r| r.secret_id)
        .collect()
}
