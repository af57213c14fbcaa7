use std::collections::HashMap;

use serde::Deserialize;

/// Response of `/cryptocurrency/listings/latest`.
#[derive(Debug, Deserialize)]
pub struct CmcListings {
    pub status: CmcStatus,
    #[serde(default)]
    pub data: Vec<CmcAsset>,
}

/// Response of `/cryptocurrency/quotes/latest`; `data` is keyed by symbol.
#[derive(Debug, Deserialize)]
pub struct CmcQuotes {
    pub status: CmcStatus,
    #[serde(default)]
    pub data: HashMap<String, CmcAsset>,
}

#[derive(Debug, Deserialize)]
pub struct CmcStatus {
    pub error_code: i32,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CmcAsset {
    pub id: i64,
    pub name: String,
    pub symbol: String,
    pub cmc_rank: Option<i32>,
    /// Quote values keyed by convert currency ("USD", ...).
    #[serde(default)]
    pub quote: HashMap<String, CmcQuote>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CmcQuote {
    pub price: Option<f64>,
    pub volume_24h: Option<f64>,
    pub percent_change_1h: Option<f64>,
    pub percent_change_24h: Option<f64>,
    pub percent_change_7d: Option<f64>,
    pub market_cap: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTINGS_SAMPLE: &str = r#"
    {
        "status": {
            "timestamp": "2024-03-01T12:00:00.000Z",
            "error_code": 0,
            "error_message": null,
            "elapsed": 12,
            "credit_count": 1
        },
        "data": [
            {
                "id": 1,
                "name": "Bitcoin",
                "symbol": "BTC",
                "slug": "bitcoin",
                "cmc_rank": 1,
                "last_updated": "2024-03-01T11:59:00.000Z",
                "quote": {
                    "USD": {
                        "price": 62000.5,
                        "volume_24h": 28000000000.0,
                        "percent_change_1h": -0.12,
                        "percent_change_24h": 2.4,
                        "percent_change_7d": 8.1,
                        "market_cap": 1220000000000.0,
                        "last_updated": "2024-03-01T11:59:00.000Z"
                    }
                }
            },
            {
                "id": 5426,
                "name": "Solana",
                "symbol": "SOL",
                "slug": "solana",
                "cmc_rank": 5,
                "quote": {}
            }
        ]
    }
    "#;

    #[test]
    fn deserializes_listings_payload() {
        let listings: CmcListings =
            serde_json::from_str(LISTINGS_SAMPLE).unwrap();

        assert_eq!(listings.status.error_code, 0);
        assert_eq!(listings.data.len(), 2);

        let btc = &listings.data[0];
        assert_eq!(btc.id, 1);
        assert_eq!(btc.symbol, "BTC");
        assert_eq!(btc.cmc_rank, Some(1));

        let usd = btc.quote.get("USD").unwrap();
        assert_eq!(usd.price, Some(62000.5));
        assert_eq!(usd.percent_change_7d, Some(8.1));

        // entries without quote data still parse
        assert!(listings.data[1].quote.is_empty());
    }

    #[test]
    fn deserializes_quotes_payload_keyed_by_symbol() {
        let sample = r#"
        {
            "status": { "error_code": 0, "error_message": null },
            "data": {
                "ETH": {
                    "id": 1027,
                    "name": "Ethereum",
                    "symbol": "ETH",
                    "cmc_rank": 2,
                    "quote": { "USD": { "price": 3400.0 } }
                }
            }
        }
        "#;

        let quotes: CmcQuotes = serde_json::from_str(sample).unwrap();
        let eth = quotes.data.get("ETH").unwrap();

        assert_eq!(eth.id, 1027);
        assert_eq!(
            eth.quote.get("USD").and_then(|quote| quote.price),
            Some(3400.0)
        );
    }
}
