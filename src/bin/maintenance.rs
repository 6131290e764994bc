use std::env;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use docvault::{
    auth::password,
    config::AppConfig,
    db,
    store::{PgStore, UserStore},
    validation::normalize_email,
};

const USAGE: &str = "Usage: maintenance delete-user <email> | hash-password <password>";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let mut args = env::args().skip(1);
    match (args.next().as_deref(), args.next()) {
        (Some("delete-user"), Some(email)) => delete_user(&email)?,
        (Some("hash-password"), Some(plain)) => {
            let hash = password::hash_password(&plain).context("failed to hash password")?;
            println!("{hash}");
        }
        (Some(cmd @ ("delete-user" | "hash-password")), None) => {
            eprintln!("Missing argument for {cmd}\n{USAGE}");
            std::process::exit(1);
        }
        (Some(cmd), _) => {
            eprintln!("Unknown command: {cmd}\n{USAGE}");
            std::process::exit(1);
        }
        (None, _) => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn delete_user(email: &str) -> Result<()> {
    let config = AppConfig::from_env()?;
    tracing::info!(
        component = "maintenance",
        database_url = %config.redacted_database_url(),
        pool_size = config.database_max_pool_size,
        "loaded configuration"
    );
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow!("DATABASE_URL must be set to delete users"))?;
    let pool = db::init_pool_with_size(database_url, config.database_max_pool_size)?;
    let store = PgStore::new(pool);

    let email = normalize_email(email);
    let Some(user) = store.find_by_email(&email)? else {
        println!("No user with email {email}.");
        return Ok(());
    };

    if store.delete_user(user.id)? {
        println!("Deleted user {} and all of their documents.", user.id);
    } else {
        println!("User {} was already gone.", user.id);
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
