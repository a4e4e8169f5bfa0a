use std::sync::Arc;

use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;

use storehub::config::ServerConfig;
use storehub::db::establish_connection_pool;
use storehub::notifications::{LogNotifier, OrderNotifier};
use storehub::repository::DieselRepository;
use storehub::routes::{self, json_config, path_config, query_config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let secret_key = match &config.secret_key {
        Some(key) => Key::from(key.as_bytes()),
        None => {
            log::warn!("SECRET_KEY not set, sessions will not survive a restart");
            Key::generate()
        }
    };

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let notifier: Arc<dyn OrderNotifier> = Arc::new(LogNotifier);
    let notifier = web::Data::from(notifier);

    let cookie_domain = config.domain.clone();
    let cookie_secure = config.cookie_secure;

    log::info!("Listening on {}:{}", config.address, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(cookie_secure)
                    .cookie_domain(cookie_domain.clone())
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .app_data(web::Data::new(repo.clone()))
            .app_data(notifier.clone())
            .configure(routes::configure)
    })
    .bind((config.address.clone(), config.port))?
    .run()
    .await
}
