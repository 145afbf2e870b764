//! APG (Austrian Power Grid) transparency API client
//!
//! Fetches 15-minute imbalance prices (`AE` data set) and maps the provider's
//! value rows onto `imbalance_prices` records.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use thiserror::Error;

use crate::entities::imbalance_prices;

/// Fixed identity of the APG imbalance price feed
pub mod source {
    use chrono_tz::Tz;

    pub const AREA_CODE: &str = "10YAT-APG------L";
    pub const CURRENCY: &str = "EUR";
    pub const UNIT: &str = "MWH";
    pub const SOURCE: &str = "apg";
    pub const TIMEZONE: Tz = chrono_tz::Europe::Prague;
}

pub const DEFAULT_BASE_URL: &str = "https://transparency.apg.at/api/v1";

/// Quality selector: always the first published value, never a correction
const QUALITY_PARAM: (&str, &str) = ("p_aeTimeSeriesQuality", "FirstValue");

/// Local timestamp format used in the URL path, e.g. `2024-06-10T000000`
const PATH_TIME_FORMAT: &str = "%Y-%m-%dT%H%M%S";

/// `DF` + `TF` row fields, e.g. `10.06.2024 13:45`
const ROW_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Price decimals stored by the `imbalance_prices` columns
const PRICE_SCALE: u32 = 3;

#[derive(Debug, Error)]
pub enum ApgError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(StatusCode),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("row is missing field {0}")]
    MissingField(&'static str),

    #[error("invalid row timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("price {0} is not representable as a decimal")]
    InvalidPrice(String),
}

/// Constants stamped onto every record of one ingestion source.
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub area_code: String,
    pub currency: String,
    pub unit: String,
    pub source: String,
    pub timezone: Tz,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            area_code: source::AREA_CODE.to_string(),
            currency: source::CURRENCY.to_string(),
            unit: source::UNIT.to_string(),
            source: source::SOURCE.to_string(),
            timezone: source::TIMEZONE,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImbalancePriceResponse {
    #[serde(rename = "ResponseData", default)]
    pub response_data: Option<ResponseData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseData {
    /// `null` when the provider has nothing for the interval
    #[serde(rename = "ValueRows", default)]
    pub value_rows: Option<Vec<ValueRow>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValueRow {
    /// Interval start date, `dd.mm.yyyy`
    #[serde(rename = "DF", default)]
    pub date_from: Option<String>,
    /// Interval start time, `HH:MM`
    #[serde(rename = "TF", default)]
    pub time_from: Option<String>,
    /// Missing, `null` and `[null]` all mean "no value published"
    #[serde(rename = "V", default)]
    pub values: Option<Vec<Option<RowValue>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RowValue {
    #[serde(rename = "V", default)]
    pub value: Option<f64>,
}

impl ImbalancePriceResponse {
    pub fn value_rows(&self) -> &[ValueRow] {
        self.response_data
            .as_ref()
            .and_then(|data| data.value_rows.as_deref())
            .unwrap_or_default()
    }
}

impl ValueRow {
    /// Published price, `None` when the interval has no data yet
    pub fn price(&self) -> Option<f64> {
        self.values
            .as_deref()
            .and_then(|values| values.first())
            .and_then(|first| first.as_ref())
            .and_then(|first| first.value)
    }
}

/// Source of imbalance prices for one local time interval.
#[async_trait]
pub trait ImbalancePriceSource: Send + Sync {
    async fn fetch_imbalance_prices(
        &self,
        from_local: NaiveDateTime,
        to_local: NaiveDateTime,
    ) -> Result<ImbalancePriceResponse, ApgError>;
}

#[derive(Clone)]
pub struct ApgService {
    client: Client,
    base_url: String,
}

impl ApgService {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn imbalance_prices_url(&self, from_local: NaiveDateTime, to_local: NaiveDateTime) -> String {
        format!(
            "{}/AE/Data/English/PT15M/{}/{}",
            self.base_url.trim_end_matches('/'),
            from_local.format(PATH_TIME_FORMAT),
            to_local.format(PATH_TIME_FORMAT)
        )
    }
}

#[async_trait]
impl ImbalancePriceSource for ApgService {
    async fn fetch_imbalance_prices(
        &self,
        from_local: NaiveDateTime,
        to_local: NaiveDateTime,
    ) -> Result<ImbalancePriceResponse, ApgError> {
        let url = self.imbalance_prices_url(from_local, to_local);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[QUALITY_PARAM])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApgError::Status(response.status()));
        }

        // Bad bodies surface as Decode, not Request
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Map provider rows onto records, skipping intervals without a value.
///
/// APG publishes one unified imbalance price, so both legs get the same value.
pub fn rows_to_records(
    rows: &[ValueRow],
    settings: &IngestSettings,
) -> Result<Vec<imbalance_prices::Model>, RowError> {
    let mut records = Vec::with_capacity(rows.len());
    let mut seen_ambiguous = HashSet::new();

    for row in rows {
        let Some(price) = row.price() else {
            continue;
        };

        let date_from = row.date_from.as_deref().ok_or(RowError::MissingField("DF"))?;
        let time_from = row.time_from.as_deref().ok_or(RowError::MissingField("TF"))?;
        let raw = format!("{} {}", date_from, time_from);
        let local = NaiveDateTime::parse_from_str(&raw, ROW_TIME_FORMAT)
            .map_err(|_| RowError::InvalidTimestamp(raw.clone()))?;

        let time = match settings.timezone.from_local_datetime(&local) {
            LocalResult::Single(time) => time,
            // Autumn DST switch repeats an hour: first occurrence is the earlier instant
            LocalResult::Ambiguous(earliest, latest) => {
                if seen_ambiguous.insert(local) {
                    earliest
                } else {
                    latest
                }
            }
            LocalResult::None => {
                tracing::warn!("Skipping non-existent local time {} ({})", raw, settings.timezone);
                continue;
            }
        };

        let price = Decimal::from_f64(price)
            .ok_or_else(|| RowError::InvalidPrice(price.to_string()))?
            .round_dp(PRICE_SCALE);

        records.push(imbalance_prices::Model {
            time: time.fixed_offset(),
            area_code: settings.area_code.clone(),
            price_up: Some(price),
            price_down: Some(price),
            currency: settings.currency.clone(),
            unit: Some(settings.unit.clone()),
            source: settings.source.clone(),
        });
    }

    Ok(records)
}
