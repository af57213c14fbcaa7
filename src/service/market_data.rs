use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{
    configuration::Config,
    error::Error,
    helpers,
    model::{PriceSnapshot, Table},
    provider::CoinMarketCap,
    types::CmcAsset,
};

/// Listings fetched per sync cycle.
pub const SYNC_BATCH_LIMIT: usize = 50;

/// Answers "what are the current values for asset(s) X", degrading through
/// three strictly ordered tiers as dependencies fail: the store, the live
/// price source, and a static table of well-known assets. The final tier
/// never fails, so neither does any read operation here.
///
/// The service is stateless; all shared state lives in the store.
#[derive(Debug)]
pub struct MarketDataService {
    config: Config,
    store: Table<PriceSnapshot>,
    client: CoinMarketCap,
}

#[derive(Debug, Serialize)]
pub struct SyncOutcome {
    pub performed: bool,
    pub received: usize,
    pub inserted: usize,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub source_configured: bool,
    pub cache_enabled: bool,
    /// `None` when the store is unreachable.
    pub snapshot_count: Option<i64>,
}

impl MarketDataService {
    pub fn new(
        config: Config,
        store: Table<PriceSnapshot>,
        client: CoinMarketCap,
    ) -> Self {
        MarketDataService {
            config,
            store,
            client,
        }
    }

    /// Up to `limit` assets (configured default when absent or non-positive),
    /// each the latest snapshot for its asset, ranked ascending.
    pub async fn get_popular_assets(
        &self,
        limit: Option<i64>,
    ) -> Vec<PriceSnapshot> {
        let limit = match limit {
            Some(value) if value > 0 => value,
            _ => self.config.max_results,
        };

        if self.config.cache_enabled {
            match self.store.get_latest_ranked(limit).await {
                Ok(assets) if !assets.is_empty() => {
                    info!("returning {} assets from store", assets.len());
                    return assets;
                },
                Ok(_) => {},
                Err(err) => {
                    warn!("store unavailable for popular listing: {}", err);
                },
            }
        }

        if self.client.is_configured() {
            match self
                .client
                .get_latest_listings(limit as usize, &self.config.quote_currency)
                .await
            {
                Ok(listings) => {
                    let observed_at = Utc::now();
                    let assets: Vec<PriceSnapshot> = listings
                        .data
                        .iter()
                        .map(|asset| {
                            self.convert_asset(asset, observed_at)
                        })
                        .take(limit as usize)
                        .collect();

                    if !assets.is_empty() {
                        info!(
                            "returning {} assets from live source",
                            assets.len()
                        );
                        // persisted only by the sync path
                        return assets;
                    }
                },
                Err(err) => {
                    warn!("live listings unavailable: {}", err);
                },
            }
        } else {
            warn!("price source not configured, skipping live listings");
        }

        let mut assets = fallback_assets();
        assets.truncate(limit as usize);
        assets
    }

    /// Current price for one symbol. `None` means "not found": the symbol is
    /// outside the allow-list or no tier could produce a sane value.
    pub async fn get_price(&self, symbol: &str) -> Option<f64> {
        let symbol = helpers::normalize_symbol(symbol);

        if !helpers::is_valid_symbol(&symbol) {
            return None;
        }

        if self.config.cache_enabled {
            match self.store.get_latest_by_symbol(&symbol).await {
                Ok(Some(snapshot)) => {
                    if let Some(price) = snapshot.price {
                        if helpers::is_valid_price(price) {
                            return Some(price);
                        }
                    }
                },
                Ok(None) => {},
                Err(err) => {
                    warn!(
                        "store unavailable for {} price lookup: {}",
                        symbol, err
                    );
                },
            }
        }

        if self.client.is_configured() {
            match self
                .client
                .get_latest_quotes(&symbol, &self.config.quote_currency)
                .await
            {
                Ok(quotes) => {
                    if let Some(asset) = quotes.data.get(&symbol) {
                        let snapshot =
                            self.convert_asset(asset, Utc::now());

                        if let Some(price) = snapshot.price {
                            if self.config.cache_enabled {
                                if let Err(err) =
                                    self.store.insert(&snapshot).await
                                {
                                    warn!(
                                        "could not persist live quote for {}: {}",
                                        symbol, err
                                    );
                                }
                            }
                            return Some(price);
                        }
                    }
                },
                Err(err) => {
                    warn!("live quote for {} unavailable: {}", symbol, err);
                },
            }
        }

        fallback_price(&symbol)
    }

    /// Substring search over the latest-per-asset set; an empty term behaves
    /// like the popular listing.
    pub async fn search(&self, term: &str) -> Vec<PriceSnapshot> {
        let term = term.trim();

        if term.is_empty() {
            return self.get_popular_assets(None).await;
        }

        if self.config.cache_enabled {
            match self.store.search_latest(term).await {
                Ok(assets) => return assets,
                Err(err) => {
                    warn!("store unavailable for search: {}", err);
                },
            }
        }

        let needle = term.to_lowercase();
        self.get_popular_assets(None)
            .await
            .into_iter()
            .filter(|asset| {
                asset.name.to_lowercase().contains(&needle)
                    || asset.symbol.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Sum of `get_price` over the given symbols; symbols that resolve to
    /// "not found" contribute nothing.
    pub async fn portfolio_value(&self, symbols: &[String]) -> f64 {
        let mut total = 0.0;

        for symbol in symbols {
            if let Some(price) = self.get_price(symbol).await {
                total += price;
            }
        }

        total
    }

    /// Fetches up to [`SYNC_BATCH_LIMIT`] listings and inserts one snapshot
    /// per asset. Each insert is its own unit of work: a failure is counted
    /// and logged, never aborting the batch. A no-op (with the reason
    /// reported) when the source is unconfigured or the store disabled.
    pub async fn refresh(&self) -> Result<SyncOutcome, Error> {
        if !self.client.is_configured() {
            return Ok(SyncOutcome {
                performed: false,
                received: 0,
                inserted: 0,
                message: String::from("price source not configured"),
            });
        }

        if !self.config.cache_enabled {
            return Ok(SyncOutcome {
                performed: false,
                received: 0,
                inserted: 0,
                message: String::from("store disabled"),
            });
        }

        let listings = self
            .client
            .get_latest_listings(SYNC_BATCH_LIMIT, &self.config.quote_currency)
            .await?;

        let observed_at = Utc::now();
        let snapshots: Vec<PriceSnapshot> = listings
            .data
            .iter()
            .map(|asset| self.convert_asset(asset, observed_at))
            .collect();
        let received = snapshots.len();

        let results =
            join_all(snapshots.iter().map(|snapshot| self.store.insert(snapshot)))
                .await;

        let mut inserted = 0;
        for (snapshot, result) in snapshots.iter().zip(results) {
            match result {
                Ok(_) => inserted += 1,
                Err(err) => {
                    error!("could not store {}: {}", snapshot.symbol, err);
                },
            }
        }

        self.prune(observed_at).await;

        info!("sync stored {} of {} assets", inserted, received);

        Ok(SyncOutcome {
            performed: true,
            received,
            inserted,
            message: format!("synced {} of {} assets", inserted, received),
        })
    }

    /// Explicit status query for the health and config endpoints.
    pub async fn status(&self) -> ServiceStatus {
        let snapshot_count = match self.store.count().await {
            Ok(count) => Some(count),
            Err(err) => {
                warn!("store unavailable for status query: {}", err);
                None
            },
        };

        ServiceStatus {
            source_configured: self.client.is_configured(),
            cache_enabled: self.config.cache_enabled,
            snapshot_count,
        }
    }

    async fn prune(&self, now: DateTime<Utc>) {
        let cutoff = now - Duration::days(self.config.retention_days);

        match self.store.prune_older_than(cutoff).await {
            Ok(0) => {},
            Ok(pruned) => {
                info!(
                    "pruned {} snapshots older than {} days",
                    pruned, self.config.retention_days
                );
            },
            Err(err) => {
                warn!("retention prune failed: {}", err);
            },
        }
    }

    fn convert_asset(
        &self,
        asset: &CmcAsset,
        observed_at: DateTime<Utc>,
    ) -> PriceSnapshot {
        convert_asset(asset, &self.config.quote_currency, observed_at)
    }
}

/// Maps one listing entry onto a snapshot, picking the quote in the given
/// currency. Missing quote fields stay absent.
pub fn convert_asset(
    asset: &CmcAsset,
    currency: &str,
    observed_at: DateTime<Utc>,
) -> PriceSnapshot {
    let quote = asset.quote.get(currency);

    PriceSnapshot {
        id: None,
        external_id: Some(asset.id),
        symbol: asset.symbol.to_owned(),
        name: asset.name.to_owned(),
        price: quote.and_then(|quote| quote.price),
        market_cap: quote.and_then(|quote| quote.market_cap),
        volume_24h: quote.and_then(|quote| quote.volume_24h),
        percent_change_1h: quote.and_then(|quote| quote.percent_change_1h),
        percent_change_24h: quote.and_then(|quote| quote.percent_change_24h),
        percent_change_7d: quote.and_then(|quote| quote.percent_change_7d),
        rank: asset.cmc_rank,
        observed_at,
    }
}

/// The last tier: well-known assets with plausible static values. Static so
/// repeated lookups stay stable while the tier is active.
fn fallback_assets() -> Vec<PriceSnapshot> {
    FALLBACK_TABLE
        .iter()
        .enumerate()
        .map(|(index, (symbol, name, price))| PriceSnapshot {
            id: None,
            external_id: None,
            symbol: (*symbol).to_owned(),
            name: (*name).to_owned(),
            price: Some(*price),
            market_cap: Some(price * 21_000_000.0),
            volume_24h: Some(price * 1_000_000.0),
            percent_change_1h: None,
            percent_change_24h: None,
            percent_change_7d: None,
            rank: Some(index as i32 + 1),
            observed_at: Utc::now(),
        })
        .collect()
}

fn fallback_price(symbol: &str) -> Option<f64> {
    FALLBACK_TABLE
        .iter()
        .find(|(fallback_symbol, _, _)| *fallback_symbol == symbol)
        .map(|(_, _, price)| *price)
}

const FALLBACK_TABLE: [(&str, &str, f64); 10] = [
    ("BTC", "Bitcoin", 50_000.0),
    ("ETH", "Ethereum", 3_000.0),
    ("BNB", "BNB", 400.0),
    ("XRP", "XRP", 0.60),
    ("ADA", "Cardano", 1.20),
    ("DOGE", "Dogecoin", 0.30),
    ("SOL", "Solana", 100.0),
    ("TRX", "TRON", 0.08),
    ("TON", "Toncoin", 5.50),
    ("AVAX", "Avalanche", 25.0),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{configuration::Config, dao::PoolOption, types::CmcQuote};
    use std::collections::HashMap;

    fn test_config(cache_enabled: bool) -> Config {
        Config {
            database_url: String::from("postgres://127.0.0.1:1/unreachable"),
            server_host: String::from("127.0.0.1"),
            port: 0,
            allowed_origins: vec![String::from("*")],
            static_dir: String::from("static"),
            cmc_api_key: None,
            cmc_base_url: String::from(
                "https://pro-api.coinmarketcap.com/v1",
            ),
            max_results: 10,
            quote_currency: String::from("USD"),
            cache_enabled,
            sync_interval: 300,
            request_timeout: 5,
            retention_days: 30,
        }
    }

    /// Service whose store points at an unreachable address (errors surface
    /// at query time, not at construction) and whose source is unconfigured:
    /// every read must resolve on the static tier.
    fn degraded_service() -> MarketDataService {
        let config = test_config(true);
        let store = Table::new(
            PoolOption::new()
                .acquire_timeout(std::time::Duration::from_millis(100))
                .connect_lazy(&config.database_url)
                .unwrap(),
        );
        let client = CoinMarketCap::new(&config).unwrap();

        MarketDataService::new(config, store, client)
    }

    #[tokio::test]
    async fn popular_resolves_on_static_tier() {
        let service = degraded_service();

        let assets = service.get_popular_assets(Some(10)).await;

        assert_eq!(assets.len(), 10);
        assert_eq!(assets[0].symbol, "BTC");

        let mut previous_rank = 0;
        for asset in &assets {
            assert!(asset.price.unwrap() > 0.0);
            let rank = asset.rank.expect("popular assets must be ranked");
            assert!(rank > previous_rank, "ranks must ascend");
            previous_rank = rank;
        }
    }

    #[tokio::test]
    async fn popular_respects_limit() {
        let service = degraded_service();

        assert_eq!(service.get_popular_assets(Some(3)).await.len(), 3);
        // non-positive limits fall back to the configured default
        assert_eq!(service.get_popular_assets(Some(0)).await.len(), 10);
        assert_eq!(service.get_popular_assets(Some(-5)).await.len(), 10);
        assert_eq!(service.get_popular_assets(None).await.len(), 10);
    }

    #[tokio::test]
    async fn price_normalizes_and_falls_back() {
        let service = degraded_service();

        assert_eq!(service.get_price(" btc ").await, Some(50_000.0));
        assert_eq!(service.get_price("xrp").await, Some(0.60));
    }

    #[tokio::test]
    async fn price_is_idempotent_between_refreshes() {
        let service = degraded_service();

        let first = service.get_price("ETH").await;
        let second = service.get_price("ETH").await;

        assert_eq!(first, Some(3_000.0));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unknown_symbol_is_not_found() {
        let service = degraded_service();

        assert_eq!(service.get_price("ZZZZZ").await, None);
        assert_eq!(service.get_price("").await, None);
    }

    #[tokio::test]
    async fn allowed_symbol_without_fallback_entry_is_not_found() {
        let service = degraded_service();

        // DOT and LINK pass validation but have no static price
        assert_eq!(service.get_price("DOT").await, None);
        assert_eq!(service.get_price("LINK").await, None);
    }

    #[tokio::test]
    async fn empty_search_matches_popular_listing() {
        let service = degraded_service();

        let popular: Vec<String> = service
            .get_popular_assets(None)
            .await
            .into_iter()
            .map(|asset| asset.symbol)
            .collect();
        let searched: Vec<String> = service
            .search("")
            .await
            .into_iter()
            .map(|asset| asset.symbol)
            .collect();

        assert_eq!(popular, searched);
    }

    #[tokio::test]
    async fn search_filters_in_memory_when_store_is_down() {
        let service = degraded_service();

        let results = service.search("bit").await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Bitcoin");

        assert!(service.search("no-such-asset").await.is_empty());
    }

    #[tokio::test]
    async fn portfolio_skips_unknown_symbols() {
        let service = degraded_service();

        let symbols = vec![
            String::from("BTC"),
            String::from("ETH"),
            String::from("ZZZZZ"),
        ];

        assert_eq!(service.portfolio_value(&symbols).await, 53_000.0);
    }

    #[tokio::test]
    async fn refresh_without_source_is_a_noop() {
        let service = degraded_service();

        let outcome = service.refresh().await.unwrap();

        assert!(!outcome.performed);
        assert_eq!(outcome.received, 0);
        assert_eq!(outcome.inserted, 0);
        assert_eq!(outcome.message, "price source not configured");
    }

    #[tokio::test]
    async fn status_reports_degraded_dependencies() {
        let service = degraded_service();

        let status = service.status().await;

        assert!(!status.source_configured);
        assert!(status.cache_enabled);
        assert_eq!(status.snapshot_count, None);
    }

    #[test]
    fn converts_listing_entries_to_snapshots() {
        let mut quote = HashMap::new();
        quote.insert(
            String::from("USD"),
            CmcQuote {
                price: Some(62_000.5),
                volume_24h: Some(28e9),
                percent_change_1h: Some(-0.12),
                percent_change_24h: Some(2.4),
                percent_change_7d: Some(8.1),
                market_cap: Some(1.22e12),
            },
        );
        let asset = CmcAsset {
            id: 1,
            name: String::from("Bitcoin"),
            symbol: String::from("BTC"),
            cmc_rank: Some(1),
            quote,
        };

        let observed_at = Utc::now();
        let snapshot = convert_asset(&asset, "USD", observed_at);

        assert_eq!(snapshot.id, None);
        assert_eq!(snapshot.external_id, Some(1));
        assert_eq!(snapshot.symbol, "BTC");
        assert_eq!(snapshot.price, Some(62_000.5));
        assert_eq!(snapshot.percent_change_7d, Some(8.1));
        assert_eq!(snapshot.rank, Some(1));
        assert_eq!(snapshot.observed_at, observed_at);

        // a different convert currency yields no quote values
        let snapshot = convert_asset(&asset, "EUR", observed_at);
        assert_eq!(snapshot.price, None);
        assert_eq!(snapshot.market_cap, None);
    }
}
