// config.rs
use crate::service::mining_service::MAX_MINING_CYCLE_SECS;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Minutes.
    pub jwt_maxage: i64,
    pub port: u16,
    pub eth_rpc_url: Option<String>,
    pub storage_dir: String,
    pub storage_public_url: String,
    pub starting_credits: i32,
    pub mining_cycle_secs: u64,
    pub mining_reward_credits: i32,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        // Balance lookups answer 503 while this is unset
        let eth_rpc_url = std::env::var("ETH_RPC_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let storage_dir = std::env::var("STORAGE_DIR").unwrap_or_else(|_| "./storage".to_string());
        let storage_public_url = std::env::var("STORAGE_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}/storage", port));

        let starting_credits = std::env::var("STARTING_CREDITS")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(100);
        let mining_cycle_secs = std::env::var("MINING_CYCLE_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .map(|v| v.min(MAX_MINING_CYCLE_SECS))
            .unwrap_or(50);
        let mining_reward_credits = std::env::var("MINING_REWARD_CREDITS")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(25);

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Config {
            database_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().expect("JWT_MAXAGE must be a number of minutes"),
            port,
            eth_rpc_url,
            storage_dir,
            storage_public_url: storage_public_url.trim_end_matches('/').to_string(),
            starting_credits,
            mining_cycle_secs,
            mining_reward_credits,
            cors_origins,
        }
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests(storage_dir: &str) -> Config {
        Config {
            database_url: "postgres://localhost/gigmine_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_maxage: 60,
            port: 8000,
            eth_rpc_url: None,
            storage_dir: storage_dir.to_string(),
            storage_public_url: "http://localhost:8000/storage".to_string(),
            starting_credits: 100,
            mining_cycle_secs: 50,
            mining_reward_credits: 25,
            cors_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}
