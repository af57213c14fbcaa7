mod coin_market_cap;

pub use coin_market_cap::{
    CmcAsset, CmcListings, CmcQuote, CmcQuotes, CmcStatus,
};
