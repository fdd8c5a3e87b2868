use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use caffyrute::config::{LoggingSettings, Settings};
use caffyrute::core::{CafeFinder, FallbackSearch};
use caffyrute::models::SearchSettings;
use caffyrute::routes::{self, AppState};
use caffyrute::services::{GooglePlacesClient, ResultCache};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings.logging);
    info!("Starting CaffyRute cafe discovery service...");

    settings.places.require_api_key().map_err(|e| {
        error!("{}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let places = GooglePlacesClient::new(
        settings.places.base_url.clone(),
        settings.places.api_key.clone(),
        settings.places.autocomplete_components.clone(),
        settings.places.timeout(),
    )
    .map_err(|e| {
        error!("Failed to create Places client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    info!("Places client initialized (timeout: {}s)", settings.places.timeout_secs);

    // One cache per process, shared by every worker
    let cache = Arc::new(ResultCache::new(
        settings.cache.max_entries,
        Duration::from_secs(settings.cache.default_ttl_secs),
    ));

    info!("Result cache initialized (max {} entries)", settings.cache.max_entries);

    let search_settings = SearchSettings::from(&settings.search);
    info!("Search cascade configured: {:?}", search_settings);

    let finder = CafeFinder::new(
        Arc::new(places),
        cache.clone(),
        FallbackSearch::new(search_settings),
        settings.cache.ttls(),
    );

    let app_state = AppState { finder };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    let result = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "OPTIONS"])
            .allow_any_header();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await;

    cache.clear();
    info!("Server stopped, result cache released");

    result
}
