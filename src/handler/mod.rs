pub mod market_sync;
