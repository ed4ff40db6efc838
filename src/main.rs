use actix_web::{App, HttpServer, middleware, web};

use marketplace_orders::auth::JwtKeys;
use marketplace_orders::config::ServerConfig;
use marketplace_orders::db::{establish_connection_pool, run_migrations};
use marketplace_orders::repository::DieselRepository;
use marketplace_orders::routes;
use marketplace_orders::services::users::ensure_admin_account;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    match pool.get() {
        Ok(mut conn) => {
            if let Err(e) = run_migrations(&mut conn) {
                log::error!("Failed to run migrations: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            log::error!("Failed to get a connection for migrations: {e}");
            std::process::exit(1);
        }
    }

    let repo = DieselRepository::new(pool);

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        match ensure_admin_account(&repo, email, password) {
            Ok(_) => {}
            Err(e) => {
                log::error!("Failed to bootstrap admin account: {e}");
                std::process::exit(1);
            }
        }
    }

    let keys = JwtKeys::new(&config.jwt_secret, config.token_ttl_hours);
    let address = config.address.clone();
    let port = config.port;

    log::info!("Listening on {address}:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(keys.clone()))
            .app_data(web::Data::new(config.clone()))
            .configure(routes::configure)
    })
    .bind((address, port))?
    .run()
    .await
}
