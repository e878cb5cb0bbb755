use std::io;
use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};
use log::info;

use northwind_admin::config::Config;
use northwind_admin::db::{self, NorthwindStore, PgStore};
use northwind_admin::handlers;
use northwind_admin::utils::photo::PhotoStore;

fn to_io_error<E: std::fmt::Display>(err: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Loads `.env` as well, so RUST_LOG from there reaches the logger.
    let config = Config::from_env().map_err(to_io_error)?;
    env_logger::init();

    // Initialize the database pool
    let pool = db::create_pool(&config).await.map_err(to_io_error)?;
    let store: Arc<dyn NorthwindStore> = Arc::new(PgStore::new(pool));

    let photos = PhotoStore::new(&config.web_root, config.max_photo_bytes);
    photos.ensure_dir().await.map_err(to_io_error)?;

    let addr = config.bind_address();
    info!("Starting server at {}", addr);
    info!("Employee photos stored in {}", photos.dir().display());

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::from(Arc::clone(&store)))
            .app_data(web::Data::new(photos.clone()))
            .configure(handlers::configure_routes)
    })
    .bind(addr)?
    .run()
    .await
}
