mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use config::Config;
use db::{DBClient, Store};
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use service::{
    application_service::ApplicationService,
    escrow_service::EscrowService,
    gig_service::GigService,
    mining_service::MiningService,
    profile_service::ProfileService,
    storage_service::{LocalStorage, StorageService},
    wallet_service::WalletService,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<dyn Store>,
    // Services
    pub gig_service: Arc<GigService>,
    pub application_service: Arc<ApplicationService>,
    pub escrow_service: Arc<EscrowService>,
    pub profile_service: Arc<ProfileService>,
    pub mining_service: Arc<MiningService>,
    pub wallet_service: Arc<WalletService>,
    pub storage_service: Arc<StorageService>,
}

impl AppState {
    pub fn new(db_client: Arc<dyn Store>, config: Config) -> Self {
        let profile_service = Arc::new(ProfileService::new(
            db_client.clone(),
            config.starting_credits,
        ));
        let gig_service = Arc::new(GigService::new(db_client.clone()));
        let application_service = Arc::new(ApplicationService::new(db_client.clone()));
        let escrow_service = Arc::new(EscrowService::new(db_client.clone()));
        let mining_service = Arc::new(MiningService::new(
            profile_service.clone(),
            config.mining_cycle_secs,
            config.mining_reward_credits,
        ));
        let wallet_service = Arc::new(WalletService::new(
            profile_service.clone(),
            config.eth_rpc_url.clone(),
        ));
        let storage_service = Arc::new(StorageService::new(Arc::new(LocalStorage::new(
            config.storage_dir.clone(),
            config.storage_public_url.clone(),
        ))));

        Self {
            env: config,
            db_client,
            gig_service,
            application_service,
            escrow_service,
            profile_service,
            mining_service,
            wallet_service,
            storage_service,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("✅ Connection to the database is successful!");
            pool
        }
        Err(err) => {
            tracing::error!("🔥 Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::error!("🔥 Failed to run database migrations: {:?}", err);
        std::process::exit(1);
    }

    let allowed_origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT]);

    let db_client: Arc<dyn Store> = Arc::new(DBClient::new(pool));
    let app_state = AppState::new(db_client, config.clone());

    let app = create_router(Arc::new(app_state)).layer(cors);

    tracing::info!("🚀 Server is running on http://localhost:{}", config.port);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("🔥 Failed to bind port {}: {:?}", config.port, err);
            std::process::exit(1);
        }
    };

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("🔥 Server error: {:?}", err);
    }
}
