//! Creates the SQLite database and applies pending migrations, then exits.

use std::env;

use config::Config;
use dotenvy::dotenv;

use food_rush::db::{establish_connection_pool, run_migrations};

fn main() {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let settings = Config::builder()
        .add_source(config::File::with_name("config/default"))
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(config::Environment::with_prefix("APP"))
        .build();

    // Only the database location is needed here.
    let database_url = match settings.and_then(|s| s.get_string("database_url")) {
        Ok(database_url) => database_url,
        Err(err) => {
            log::error!("Error loading settings: {err}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&database_url) {
        Ok(pool) => pool,
        Err(err) => {
            log::error!("Failed to open {database_url}: {err}");
            std::process::exit(1);
        }
    };

    match run_migrations(&pool) {
        Ok(0) => log::info!("Database {database_url} is up to date"),
        Ok(applied) => log::info!("Applied {applied} migrations to {database_url}"),
        Err(err) => {
            log::error!("Migration failed: {err}");
            std::process::exit(1);
        }
    }
}
