//! realm-greetings - per-realm greeting lookups for authentication flows
//!
//! This crate fetches a personalised greeting for a user from a remote HTTP
//! service configured per realm, and caches the result. Two cache layers:
//! realm → [`RealmGreetingService`] (built once, never evicted) and, inside
//! each, username → greeting (expires one hour after it was written).
//!
//! The host supplies the realm configuration through a [`ServiceRegistry`]
//! and the per-realm API key through a [`SecretStore`]; simple map-backed
//! implementations of both are included.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use realm_greetings::{
//!     Greetings, GreetingsConfig, Realm, StaticSecretStore, StaticServiceRegistry,
//! };
//!
//! #[tokio::main]
//! async fn main() -> realm_greetings::Result<()> {
//!     let registry =
//!         StaticServiceRegistry::new().with_realm("acme", "https://greetings.acme.test/api");
//!     let secrets = StaticSecretStore::new().with_secret("acme", "greetings.api", "k-acme");
//!
//!     let greetings = Greetings::new(
//!         reqwest::Client::new(),
//!         Arc::new(registry),
//!         Arc::new(secrets),
//!         GreetingsConfig::default(),
//!     );
//!
//!     match greetings.get_greeting(&Realm::new("acme"), "alice").await? {
//!         Some(text) => println!("{text}"),
//!         None => println!("no greeting for alice"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod node;
pub mod registry;
pub mod secrets;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use cache::{Greetings, RealmGreetingService};
pub use config::{Config, GreetingsConfig, Secrets};
pub use error::{GreetingsError, Result};
pub use node::{Action, Callback, GreetingNode, TreeContext};
pub use registry::{ServiceRegistry, StaticServiceRegistry};
pub use secrets::{
    GREETINGS_API_KEY, GreetingsSecretIdProvider, Purpose, SecretIdProvider, SecretMaterial,
    SecretStore, StaticSecretStore,
};
pub use types::Realm;
