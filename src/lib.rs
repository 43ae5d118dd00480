#[cfg(feature = "server")]
use std::path::Path;

#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_files::Files;
#[cfg(feature = "server")]
use actix_identity::IdentityMiddleware;
#[cfg(feature = "server")]
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};

#[cfg(feature = "server")]
use crate::db::connect_and_migrate;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::DieselRepository;
#[cfg(feature = "server")]
use crate::routes::ws::GameServer;

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "data")]
mod error_conversions;
#[cfg(feature = "data")]
pub mod forms;
#[cfg(feature = "data")]
pub mod game;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod multiplayer;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "data")]
pub mod schema;
#[cfg(feature = "data")]
pub mod services;

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Open the SQLite pool and bring the schema up to date.
    let pool = connect_and_migrate(&server_config.database_url)
        .map_err(|e| std::io::Error::other(format!("Failed to prepare database: {e}")))?;

    let repo = DieselRepository::new(pool);
    let game_server = web::Data::new(GameServer::new(server_config.rules.clone()));

    let secret_key = Key::try_from(server_config.secret.as_bytes())
        .map_err(|e| std::io::Error::other(format!("Invalid session secret: {e}")))?;

    let static_dir = Path::new(&server_config.static_dir)
        .is_dir()
        .then(|| server_config.static_dir.clone());
    if static_dir.is_none() {
        log::warn!(
            "Static directory {} not found, serving the API only",
            server_config.static_dir
        );
    }

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!("Food Rush listening on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        let app = App::new()
            .wrap(Cors::permissive())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(server_config.secure_cookies)
                    .build(),
            )
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(repo.clone()))
            .app_data(game_server.clone())
            .app_data(web::Data::new(server_config.clone()))
            .configure(routes::configure);

        // Registered last so it never shadows the API.
        match &static_dir {
            Some(dir) => app.service(Files::new("/", dir).index_file("index.html")),
            None => app,
        }
    })
    .bind(bind_address)?
    .run()
    .await
}
