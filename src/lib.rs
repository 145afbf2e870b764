// src/lib.rs

pub mod config;

pub mod entities {
    pub mod prelude;
    pub mod imbalance_prices;
}

pub mod services {
    pub mod apg;
    pub mod fetch_window;
    pub mod imbalance_price_store;
}

pub mod jobs;
