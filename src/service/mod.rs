mod analytics;
mod market_data;

pub use analytics::{
    AnalyticsEngine, ChartPoint, CryptoAnalytics, PerformanceMetrics,
    PriceStatistics,
};
pub use market_data::{MarketDataService, ServiceStatus, SyncOutcome};
