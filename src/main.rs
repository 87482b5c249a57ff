mod api;
mod app_state;
mod db;
mod env_config;
mod layers;
mod logger;
mod services;
mod utils;

#[cfg(test)]
mod test_support;

use api::create_application_router;
use app_state::models::AppState;
use axum::Router;
use db::postgres::postgres_service::PostgresService;
use env_config::models::{app_config::AppConfig, app_env::AppEnv, app_setting::AppSettings};
use services::financial::FinancialService;
use services::indices::{IndexService, scheduler::IndexSyncScheduler};
use services::market_data::VciClient;
use services::news::NewsService;
use services::stock::StockService;
use services::stock_updates::StockUpdatesService;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    // Application setup
    let settings: Arc<AppSettings> = Arc::new(initialize_application());

    // Database connection
    let postgres_service = Arc::new(initialize_database_connection(settings.clone()).await);

    let server_address: SocketAddr = format!(
        "{}:{}",
        settings.app_env.server_address, settings.app_env.server_port,
    )
    .parse()
    .expect("Invalid server address configuration");

    info!("Server will listen on: {}", server_address);

    // Global application state
    let app_state: Arc<AppState> =
        Arc::new(initialize_services(settings.clone(), postgres_service).await);

    // Background services
    initialize_background_services(app_state.clone());

    let app_router = create_application_router(app_state.clone());

    start_http_server(app_router, server_address).await;
}

/// Loads settings and initializes logging
fn initialize_application() -> AppSettings {
    let environment = AppEnv::new();
    let config = AppConfig::new(&environment.env);
    let app_settings = AppSettings {
        app_config: config,
        app_env: environment,
    };

    logger::init_logger(
        &app_settings.app_config.log.level,
        &app_settings.app_config.log.format,
        app_settings.app_env.is_local(),
    )
    .expect("Failed to initialize logger");

    info!("Starting Bank Market Board application...");
    info!("Current environment: {}", app_settings.app_env.env);

    if app_settings.app_env.is_local() {
        info!("Running in local development mode");
        debug!("Configuration details: {:#?}", app_settings);
    } else {
        info!("Running in production mode");
    }

    app_settings
}

async fn initialize_database_connection(settings: Arc<AppSettings>) -> PostgresService {
    info!("Initializing database connection...");

    match PostgresService::new(&settings).await {
        Ok(service) => {
            info!("PostgreSQL connection established successfully");
            service
        }
        Err(err) => {
            error!("Failed to connect to PostgreSQL: {}", err);
            panic!("Cannot continue without PostgreSQL connection");
        }
    }
}

/// Builds the provider client and every service on top of the repositories
async fn initialize_services(
    settings: Arc<AppSettings>,
    postgres_service: Arc<PostgresService>,
) -> AppState {
    let config = &settings.app_config;

    let provider = match VciClient::new(&config.provider.base_url, config.provider.timeout_seconds)
    {
        Ok(client) => Arc::new(client),
        Err(err) => {
            error!("Failed to create market data client: {}", err);
            panic!("Cannot continue without market data client");
        }
    };

    let index_service = IndexService::new(
        config.indices.clone(),
        postgres_service.repository_index.clone(),
        provider.clone(),
    )
    .await;

    let financial_service = FinancialService::new(
        postgres_service.repository_financial.clone(),
        config.financial.clone(),
    );
    let news_service = NewsService::new(postgres_service.repository_news.clone());
    let stock_service = StockService::new(
        postgres_service.repository_financial.clone(),
        postgres_service.repository_transaction.clone(),
    );
    let stock_updates_service =
        StockUpdatesService::new(provider, config.stock_updates.symbols.clone());

    AppState {
        settings: settings.clone(),
        postgres_service,
        index_service: Arc::new(index_service),
        financial_service: Arc::new(financial_service),
        news_service: Arc::new(news_service),
        stock_service: Arc::new(stock_service),
        stock_updates_service: Arc::new(stock_updates_service),
    }
}

async fn start_http_server(app: Router, addr: SocketAddr) {
    info!("Starting HTTP server on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind to address {}: {}", addr, err);
            panic!("Cannot start server: {}", err);
        }
    };

    info!("Server started successfully, now accepting connections");

    if let Err(err) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        error!("Server error: {}", err);
        panic!("Server failed: {}", err);
    }
}

fn initialize_background_services(app_state: Arc<AppState>) {
    IndexSyncScheduler::new(app_state).start();
    info!("Background services initialized successfully");
}
