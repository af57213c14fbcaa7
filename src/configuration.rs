use std::{env, fs, ops::Deref, sync::Arc};

use tracing::warn;

use crate::{
    dao::get_path,
    error::Error,
    provider::{CoinMarketCap, DatabasePool},
    service::{AnalyticsEngine, MarketDataService},
};

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

#[derive(Debug)]
pub struct State {
    pub config: Config,
    pub database: DatabasePool,
    pub market: MarketDataService,
    pub analytics: AnalyticsEngine,
}

impl State {
    pub async fn new(
        config: Config,
        database: DatabasePool,
        client: CoinMarketCap,
    ) -> Result<State, Error> {
        // a store that is down at startup must not keep the process from
        // serving its fallback tiers
        if let Err(err) = Self::init_migrations(&database).await {
            warn!("store unavailable, migrations skipped: {}", err);
        }

        let market = MarketDataService::new(
            config.clone(),
            database.price_snapshot.clone(),
            client,
        );
        let analytics = AnalyticsEngine::new(database.price_snapshot.clone());

        Ok(Self {
            config,
            database,
            market,
            analytics,
        })
    }

    async fn init_migrations(database: &DatabasePool) -> Result<(), Error> {
        let files = vec![
            "price_snapshot.sql",
            "price_snapshot_symbol_idx.sql",
            "price_snapshot_asset_idx.sql",
        ];

        let dir = env!("CARGO_MANIFEST_DIR");

        for file in files {
            let data = get_path(dir, file)?;
            sqlx::query(data.as_str()).execute(&database.pool).await?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub static_dir: String,
    pub cmc_api_key: Option<String>,
    pub cmc_base_url: String,
    pub max_results: i64,
    pub quote_currency: String,
    pub cache_enabled: bool,
    pub sync_interval: u64,
    pub request_timeout: u64,
    pub retention_days: i64,
}

pub fn get_configuration() -> Result<Config, Error> {
    let database_url = env::var("DATABASE_URL")?;
    let server_host = env_default("SERVER_HOST", "0.0.0.0");
    let port: u16 = env_default("PORT", "8080").parse()?;

    let allowed_origins = env_default("ALLOWED_ORIGINS", "*")
        .split(',')
        .map(|item| item.to_owned())
        .collect::<Vec<String>>();

    let static_dir = format!(
        "{}/{}",
        env!("CARGO_MANIFEST_DIR"),
        env_default("STATIC_DIRECTORY", "static")
    );

    let cmc_api_key = env::var("COINMARKET_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    let cmc_base_url = env_default(
        "COINMARKET_BASE_URL",
        "https://pro-api.coinmarketcap.com/v1",
    );

    let max_results: i64 = env_default("MAX_RESULTS", "10").parse()?;
    let quote_currency = env_default("QUOTE_CURRENCY", "USD");
    let cache_enabled: bool = env_default("CACHE_ENABLED", "true").parse()?;
    let sync_interval: u64 =
        env_default("SYNC_INTERVAL_IN_SEC", "300").parse()?;
    let request_timeout: u64 =
        env_default("REQUEST_TIMEOUT_IN_SEC", "5").parse()?;
    let retention_days: i64 = env_default("RETENTION_DAYS", "30").parse()?;

    let config = Config {
        database_url,
        server_host,
        port,
        allowed_origins,
        static_dir,
        cmc_api_key,
        cmc_base_url,
        max_results,
        quote_currency,
        cache_enabled,
        sync_interval,
        request_timeout,
        retention_days,
    };

    Ok(config)
}

fn env_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Loads `.env` from the manifest directory into process env vars. Real
/// environment variables win over file entries; a missing file is fine.
pub fn set_configuration() -> Result<(), Error> {
    let config_file: &str = ".env";

    let directory = env!("CARGO_MANIFEST_DIR");
    let path = format!("{}/{}", directory, config_file);

    let config_string = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(_) => return Ok(()),
    };

    parse_config_string(config_string);

    Ok(())
}

fn parse_config_string(config: String) {
    for line in config.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            if env::var(key).is_err() {
                env::set_var(key, value);
            }
        }
    }
}
