use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    error::Error,
    helpers,
    model::{PriceSnapshot, Table},
};

/// Chart series length delivered to the frontend.
pub const CHART_POINTS: usize = 100;
/// Detail table length delivered to the frontend.
pub const TABLE_ROWS: usize = 50;

/// Turns the raw history of one asset into statistics, performance metrics
/// and chartable series. Rolling-window aggregation over the delivered
/// series happens on the consumer side; nothing is resampled here.
#[derive(Debug)]
pub struct AnalyticsEngine {
    store: Table<PriceSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct CryptoAnalytics {
    pub symbol: String,
    pub name: String,
    pub current_price: Option<f64>,
    pub rank: Option<i32>,
    pub statistics: PriceStatistics,
    pub performance: PerformanceMetrics,
    pub chart_data: Vec<ChartPoint>,
    pub table_data: Vec<PriceSnapshot>,
}

/// Point-in-time statistics over every priced row of the history.
#[derive(Debug, Serialize)]
pub struct PriceStatistics {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub range: f64,
    pub standard_deviation: f64,
    pub coefficient_of_variation: f64,
    pub sample_count: usize,
}

#[derive(Debug, Serialize)]
pub struct PerformanceMetrics {
    pub absolute_change: f64,
    pub percent_change: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_1h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_24h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_7d: Option<f64>,
    pub timespan: String,
}

#[derive(Debug, Serialize)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub price: Option<f64>,
    pub volume: Option<f64>,
    pub market_cap: Option<f64>,
}

impl AnalyticsEngine {
    pub fn new(store: Table<PriceSnapshot>) -> Self {
        AnalyticsEngine { store }
    }

    /// `Ok(None)` when no history (or no priced row) exists for the symbol;
    /// a store failure surfaces as `Err` so callers can tell "no data"
    /// from "could not fetch".
    pub async fn compute(
        &self,
        symbol: &str,
    ) -> Result<Option<CryptoAnalytics>, Error> {
        let symbol = helpers::normalize_symbol(symbol);
        let history = self.store.get_history_by_symbol(&symbol).await?;

        Ok(build_analytics(history))
    }
}

/// `history` is expected newest-first, the order the store delivers it in.
fn build_analytics(history: Vec<PriceSnapshot>) -> Option<CryptoAnalytics> {
    let latest = history.first()?;
    let oldest = history.last()?;

    let prices: Vec<f64> =
        history.iter().filter_map(|snapshot| snapshot.price).collect();

    if prices.is_empty() {
        return None;
    }

    let average = mean(&prices);
    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let standard_deviation = population_std_dev(&prices, average);
    let coefficient_of_variation = if average != 0.0 {
        100.0 * standard_deviation / average
    } else {
        0.0
    };

    let statistics = PriceStatistics {
        min,
        max,
        average,
        range: max - min,
        standard_deviation,
        coefficient_of_variation,
        sample_count: prices.len(),
    };

    let absolute_change = match (latest.price, oldest.price) {
        (Some(latest_price), Some(oldest_price)) => {
            latest_price - oldest_price
        },
        _ => 0.0,
    };
    let percent_change = match oldest.price {
        Some(oldest_price) if oldest_price != 0.0 => {
            100.0 * absolute_change / oldest_price
        },
        _ => 0.0,
    };

    let performance = PerformanceMetrics {
        absolute_change,
        percent_change,
        change_1h: latest.percent_change_1h,
        change_24h: latest.percent_change_24h,
        change_7d: latest.percent_change_7d,
        timespan: format!(
            "From {} to {}",
            oldest.observed_at, latest.observed_at
        ),
    };

    let chart_data = history
        .iter()
        .take(CHART_POINTS)
        .map(|snapshot| ChartPoint {
            timestamp: snapshot.observed_at,
            price: snapshot.price,
            volume: snapshot.volume_24h,
            market_cap: snapshot.market_cap,
        })
        .collect();

    let analytics = CryptoAnalytics {
        symbol: latest.symbol.to_owned(),
        name: latest.name.to_owned(),
        current_price: latest.price,
        rank: latest.rank,
        statistics,
        performance,
        chart_data,
        table_data: history.into_iter().take(TABLE_ROWS).collect(),
    };

    Some(analytics)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around the given mean.
fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / values.len() as f64;

    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot(
        price: Option<f64>,
        observed_at: DateTime<Utc>,
    ) -> PriceSnapshot {
        PriceSnapshot {
            id: None,
            external_id: Some(1),
            symbol: String::from("BTC"),
            name: String::from("Bitcoin"),
            price,
            market_cap: None,
            volume_24h: None,
            percent_change_1h: Some(0.5),
            percent_change_24h: Some(-1.5),
            percent_change_7d: None,
            rank: Some(1),
            observed_at,
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    /// Newest-first, like the store delivers.
    fn history(prices: &[f64]) -> Vec<PriceSnapshot> {
        prices
            .iter()
            .enumerate()
            .map(|(index, price)| {
                snapshot(Some(*price), at((prices.len() - index) as u32))
            })
            .collect()
    }

    #[test]
    fn empty_history_yields_nothing() {
        assert!(build_analytics(vec![]).is_none());
    }

    #[test]
    fn history_without_prices_yields_nothing() {
        let history = vec![snapshot(None, at(2)), snapshot(None, at(1))];

        assert!(build_analytics(history).is_none());
    }

    #[test]
    fn single_row_degenerates_cleanly() {
        let analytics = build_analytics(vec![snapshot(Some(42.0), at(1))])
            .expect("one priced row is enough");

        let statistics = &analytics.statistics;
        assert_eq!(statistics.min, 42.0);
        assert_eq!(statistics.max, 42.0);
        assert_eq!(statistics.average, 42.0);
        assert_eq!(statistics.range, 0.0);
        assert_eq!(statistics.standard_deviation, 0.0);
        assert_eq!(statistics.sample_count, 1);

        let performance = &analytics.performance;
        assert_eq!(performance.absolute_change, 0.0);
        assert_eq!(performance.percent_change, 0.0);
    }

    #[test]
    fn change_is_measured_latest_against_oldest() {
        // oldest observed 100, then 110, latest 90
        let analytics = build_analytics(history(&[90.0, 110.0, 100.0]))
            .expect("priced history");

        assert_eq!(analytics.performance.absolute_change, -10.0);
        assert_eq!(analytics.performance.percent_change, -10.0);
        assert_eq!(analytics.statistics.min, 90.0);
        assert_eq!(analytics.statistics.max, 110.0);
        assert_eq!(analytics.statistics.average, 100.0);
        assert_eq!(analytics.statistics.range, 20.0);
    }

    #[test]
    fn statistics_use_population_std_dev() {
        let analytics = build_analytics(history(&[4.0, 2.0]))
            .expect("priced history");

        // mean 3, variance ((4-3)^2 + (2-3)^2) / 2 = 1
        assert_eq!(analytics.statistics.average, 3.0);
        assert_eq!(analytics.statistics.standard_deviation, 1.0);
        assert!(
            (analytics.statistics.coefficient_of_variation - 100.0 / 3.0)
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn zero_average_has_zero_variation_coefficient() {
        let analytics =
            build_analytics(history(&[0.0])).expect("priced history");

        assert_eq!(analytics.statistics.coefficient_of_variation, 0.0);
        assert_eq!(analytics.performance.percent_change, 0.0);
    }

    #[test]
    fn short_horizon_changes_come_from_latest_row() {
        let analytics = build_analytics(history(&[90.0, 100.0]))
            .expect("priced history");

        assert_eq!(analytics.performance.change_1h, Some(0.5));
        assert_eq!(analytics.performance.change_24h, Some(-1.5));
        assert_eq!(analytics.performance.change_7d, None);
    }

    #[test]
    fn series_are_bounded_and_newest_first() {
        let prices: Vec<f64> = (0..120).map(|i| 100.0 + i as f64).collect();
        let rows: Vec<PriceSnapshot> = prices
            .iter()
            .enumerate()
            .map(|(index, price)| {
                snapshot(
                    Some(*price),
                    at(0) + chrono::Duration::minutes(1200 - index as i64),
                )
            })
            .collect();

        let analytics = build_analytics(rows).expect("priced history");

        assert_eq!(analytics.chart_data.len(), CHART_POINTS);
        assert_eq!(analytics.table_data.len(), TABLE_ROWS);
        assert_eq!(analytics.chart_data[0].price, Some(100.0));
        assert!(
            analytics.chart_data[0].timestamp
                > analytics.chart_data[1].timestamp
        );
        assert_eq!(analytics.current_price, Some(100.0));
    }
}
