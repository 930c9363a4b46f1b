use actix_web::{web, App, HttpServer};
use actix_web_prom::PrometheusMetricsBuilder;
use dotenv::dotenv;
use log::info;
use env_logger::Env;
use actix_web::middleware::Logger;
use std::collections::HashMap;
use std::io;

use activity_tracker_backend::config::Settings;
use activity_tracker_backend::db;
use activity_tracker_backend::routes;
use activity_tracker_backend::utils::jwt::TokenService;
use activity_tracker_backend::utils::password::PasswordHasher;

fn startup_error<E: std::fmt::Display>(err: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let settings = Settings::from_env().map_err(startup_error)?;

    // Initialize the database pool and schema
    let pool = db::init_pool(&settings.database_url, settings.db_max_connections)
        .await
        .map_err(startup_error)?;

    let pool = web::Data::new(pool);
    let tokens = web::Data::new(TokenService::new(&settings.jwt_secret));
    let hasher = web::Data::new(PasswordHasher::new(settings.bcrypt_cost));

    // Set up Prometheus metrics
    let mut labels = HashMap::new();
    labels.insert("app".to_string(), "activity_tracker".to_string());
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .const_labels(labels)
        .build()
        .map_err(startup_error)?;

    info!("Starting server at {} with {} workers", settings.bind_address, settings.workers);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(prometheus.clone())
            .app_data(pool.clone())
            .app_data(tokens.clone())
            .app_data(hasher.clone())
            .configure(routes::configure)
    })
    .workers(settings.workers)
    .bind(&settings.bind_address)?
    .run()
    .await
}
