//! greet: look up realm greetings from the command line.
//!
//! Uses the same configuration and secrets files as an embedding host would
//! hand to [`StaticServiceRegistry`] and [`StaticSecretStore`].

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use realm_greetings::secrets::registered_secret_ids;
use realm_greetings::{
    Config, Greetings, GreetingsSecretIdProvider, Realm, SecretIdProvider, Secrets,
    StaticSecretStore, StaticServiceRegistry,
};

/// Realm greeting lookup client
#[derive(Parser)]
#[command(name = "greet")]
#[command(version)]
#[command(about = "Look up per-realm user greetings")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "GREETINGS_CONFIG")]
    config: Option<PathBuf>,

    /// Path to secrets file (must be 0600 or 0400).
    #[arg(short, long, env = "GREETINGS_SECRETS")]
    secrets: Option<PathBuf>,

    /// List the secret ids that must be configured per realm, then exit.
    #[arg(long, conflicts_with_all = ["realm", "username"])]
    list_secret_ids: bool,

    /// Realm name
    #[arg(required_unless_present = "list_secret_ids")]
    realm: Option<String>,

    /// Username, sent as-is
    #[arg(required_unless_present = "list_secret_ids")]
    username: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let providers: [&dyn SecretIdProvider; 1] = [&GreetingsSecretIdProvider];

    let (Some(realm), Some(username)) = (args.realm, args.username) else {
        for id in registered_secret_ids(&providers) {
            println!("{id}");
        }
        return Ok(());
    };

    let config = Config::load(args.config.as_deref())?;
    let secrets = match args.secrets.as_deref() {
        Some(path) => Secrets::load_from_file(path)?,
        None => Secrets::load()?,
    };

    let registry = StaticServiceRegistry::from(&config);
    let store = StaticSecretStore::from_secrets(&secrets, &providers);
    info!(realms = registry.len(), "configuration loaded");

    let greetings = Greetings::new(
        reqwest::Client::new(),
        Arc::new(registry),
        Arc::new(store),
        config.greetings_config(),
    );

    match greetings
        .get_greeting(&Realm::new(realm), &username)
        .await?
    {
        Some(text) => println!("{text}"),
        None => println!("(no greeting)"),
    }

    Ok(())
}
