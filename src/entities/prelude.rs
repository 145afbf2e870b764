pub use super::imbalance_prices::Entity as ImbalancePrices;
