use std::env;

use config::Config;
use dotenvy::dotenv;

use food_rush::models::config::ServerConfig;

/// Loads `config/default.yaml`, the `APP_ENV` profile and `APP_*` variables.
fn load_config() -> Result<ServerConfig, config::ConfigError> {
    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    Config::builder()
        .add_source(config::File::with_name("config/default"))
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(config::Environment::with_prefix("APP"))
        .build()?
        .try_deserialize::<ServerConfig>()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match load_config() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    food_rush::run(server_config).await
}
