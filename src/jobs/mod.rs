pub mod imbalance_prices_sync;
