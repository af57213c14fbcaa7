//! Symbol and price validation shared by the data service and controllers.

/// Symbols accepted by the single-price lookup.
pub const VALID_SYMBOLS: [&str; 7] =
    ["BTC", "ETH", "ADA", "SOL", "DOT", "LINK", "XRP"];

/// Upper sanity bound for a quoted price.
pub const MAX_VALID_PRICE: f64 = 1_000_000.0;

pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

pub fn is_valid_symbol(symbol: &str) -> bool {
    let symbol = symbol.trim();

    if symbol.is_empty() {
        return false;
    }

    VALID_SYMBOLS
        .iter()
        .any(|valid| valid.eq_ignore_ascii_case(symbol))
}

pub fn is_valid_price(price: f64) -> bool {
    (0.0..=MAX_VALID_PRICE).contains(&price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_symbols() {
        assert_eq!(normalize_symbol(" btc "), "BTC");
        assert_eq!(normalize_symbol("Eth"), "ETH");
        assert_eq!(normalize_symbol(""), "");
    }

    #[test]
    fn validates_known_symbols_only() {
        assert!(is_valid_symbol("BTC"));
        assert!(is_valid_symbol("xrp"));
        assert!(is_valid_symbol(" link "));

        assert!(!is_valid_symbol("ZZZZZ"));
        assert!(!is_valid_symbol("DOGE"));
        assert!(!is_valid_symbol(""));
    }

    #[test]
    fn validates_price_bounds() {
        assert!(is_valid_price(0.0));
        assert!(is_valid_price(50_000.0));
        assert!(is_valid_price(MAX_VALID_PRICE));

        assert!(!is_valid_price(-0.01));
        assert!(!is_valid_price(MAX_VALID_PRICE + 1.0));
    }
}
