//! Incremental, day-by-day sync of APG imbalance prices
//!
//! A run resolves the window still to fetch from the newest stored record,
//! then walks it one local day at a time. Each day is fetched and upserted on
//! its own: a failing day is logged and skipped, the next run picks it up
//! again through the one-day back-off.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use sea_orm::DbErr;
use thiserror::Error;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};

use crate::services::apg::{
    rows_to_records, ApgError, ImbalancePriceSource, IngestSettings, RowError,
};
use crate::services::fetch_window::{resolve_fetch_window, FetchWindow, WindowError};
use crate::services::imbalance_price_store::ImbalancePriceStore;

const JOB_NAME: &str = "imbalance_prices_sync";

/// Failure that stops a whole run before any day is fetched
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Window(#[from] WindowError),

    #[error("failed to read latest stored record: {0}")]
    Store(#[from] DbErr),
}

/// Failure of a single day; never aborts the run
#[derive(Debug, Error)]
pub enum DayError {
    #[error(transparent)]
    Fetch(#[from] ApgError),

    #[error("failed to parse rows: {0}")]
    Parse(#[from] RowError),

    #[error("upsert failed: {0}")]
    Store(#[from] DbErr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayResult {
    pub day: NaiveDate,
    pub upserted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDay {
    pub day: NaiveDate,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub window: FetchWindow,
    pub days: Vec<DayResult>,
    pub failed_days: Vec<FailedDay>,
}

impl SyncSummary {
    pub fn rows_upserted(&self) -> usize {
        self.days.iter().map(|d| d.upserted).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_days.is_empty()
    }
}

/// Imbalance price ingestion over an injected provider and store
pub struct ImbalancePriceSync<'a> {
    source: &'a dyn ImbalancePriceSource,
    store: &'a dyn ImbalancePriceStore,
    settings: IngestSettings,
}

impl<'a> ImbalancePriceSync<'a> {
    pub fn new(
        source: &'a dyn ImbalancePriceSource,
        store: &'a dyn ImbalancePriceStore,
        settings: IngestSettings,
    ) -> Self {
        Self {
            source,
            store,
            settings,
        }
    }

    /// Resolve the window to fetch as of `now`.
    ///
    /// `lookback_days` only matters while nothing is stored for the area/source.
    pub async fn resolve_window(
        &self,
        lookback_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<FetchWindow, SyncError> {
        let tz = self.settings.timezone;
        let today = now.with_timezone(&tz).date_naive();

        let latest_day = self
            .store
            .latest_time(&self.settings.area_code, &self.settings.source)
            .await?
            .map(|time| time.with_timezone(&tz).date_naive());

        Ok(resolve_fetch_window(
            &self.settings.area_code,
            lookback_days,
            latest_day,
            today,
        )?)
    }

    /// Run one full sync. Only window resolution can fail the run.
    pub async fn run(
        &self,
        lookback_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<SyncSummary, SyncError> {
        let window = match self.resolve_window(lookback_days, now).await {
            Ok(window) => window,
            Err(e) => {
                tracing::error!("[{}] {}", JOB_NAME, e);
                return Err(e);
            }
        };

        tracing::info!(
            "[{}] Starting fetch from {} to {} ({} days)",
            JOB_NAME,
            window.start,
            window.end,
            window.day_count()
        );

        let mut summary = SyncSummary {
            window,
            days: Vec::with_capacity(window.day_count()),
            failed_days: Vec::new(),
        };

        for day in window.days() {
            tracing::info!("[{}] Fetching day {}...", JOB_NAME, day);

            match self.sync_day(day).await {
                Ok(upserted) => {
                    tracing::info!("[{}] Day {}: upserted {} rows", JOB_NAME, day, upserted);
                    summary.days.push(DayResult { day, upserted });
                }
                Err(e) => {
                    tracing::error!("[{}] Error fetching day {}: {}", JOB_NAME, day, e);
                    summary.failed_days.push(FailedDay {
                        day,
                        error: e.to_string(),
                    });
                }
            }
        }

        if summary.has_failures() {
            tracing::warn!(
                "[{}] Fetch complete with {} failed day(s): {} rows upserted",
                JOB_NAME,
                summary.failed_days.len(),
                summary.rows_upserted()
            );
        } else {
            tracing::info!(
                "[{}] Fetch complete: {} rows upserted",
                JOB_NAME,
                summary.rows_upserted()
            );
        }

        Ok(summary)
    }

    /// Fetch, map and upsert one local day `[day, day + 1)`.
    pub async fn sync_day(&self, day: NaiveDate) -> Result<usize, DayError> {
        let day_from = day.and_time(NaiveTime::MIN);
        let day_to = (day + Days::new(1)).and_time(NaiveTime::MIN);

        let response = self.source.fetch_imbalance_prices(day_from, day_to).await?;
        let records = rows_to_records(response.value_rows(), &self.settings)?;

        if records.is_empty() {
            return Ok(0);
        }

        let count = records.len();
        self.store.upsert(records).await?;

        Ok(count)
    }
}

/// Schedule for repeated runs; a run longer than the period delays the next
/// tick instead of firing the missed ones back to back.
fn sync_interval(interval_secs: u64) -> Interval {
    let mut interval = interval(Duration::from_secs(interval_secs));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Run the sync on a fixed interval until the process stops.
///
/// The first tick fires immediately.
pub async fn start_imbalance_prices_sync_job(
    source: impl ImbalancePriceSource + 'static,
    store: impl ImbalancePriceStore + 'static,
    initial_lookback_days: Option<u32>,
    interval_secs: u64,
) {
    tokio::spawn(async move {
        let sync = ImbalancePriceSync::new(&source, &store, IngestSettings::default());
        let mut interval = sync_interval(interval_secs);

        loop {
            interval.tick().await;
            tracing::info!("[{}] Starting scheduled imbalance prices sync", JOB_NAME);

            if let Err(e) = sync.run(initial_lookback_days, Utc::now()).await {
                tracing::error!("[{}] Failed to sync imbalance prices: {}", JOB_NAME, e);
            }
        }
    });
}
