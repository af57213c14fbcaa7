use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One recorded market observation for an asset. Rows are immutable once
/// written; every refresh inserts a new row instead of updating in place.
#[derive(Debug, Clone, FromRow, Deserialize, Serialize)]
pub struct PriceSnapshot {
    /// Store-assigned surrogate key. `None` until the row is persisted
    /// (live- and fallback-tier snapshots exist before any row does).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// CoinMarketCap asset id; absent for fallback-only assets.
    pub external_id: Option<i64>,
    pub symbol: String,
    pub name: String,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
    pub percent_change_1h: Option<f64>,
    pub percent_change_24h: Option<f64>,
    pub percent_change_7d: Option<f64>,
    /// Market-cap rank, lower is more prominent. Rows without a rank are
    /// excluded from popular listings.
    pub rank: Option<i32>,
    pub observed_at: DateTime<Utc>,
}
