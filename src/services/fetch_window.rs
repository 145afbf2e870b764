//! Resolution of the date range an ingestion run still has to fetch
//!
//! The window is always expressed in provider-local calendar days and is
//! half-open: `start` is fetched, `end` is not.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("No records found for {area_code} and no lookback (--days) provided")]
    MissingStartPoint { area_code: String },

    #[error("Lookback of {0} days is out of range")]
    LookbackOutOfRange(u32),
}

/// Half-open `[start, end)` range of local days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchWindow {
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn day_count(&self) -> usize {
        usize::try_from((self.end - self.start).num_days()).unwrap_or(0)
    }

    /// Days in ascending order, `end` excluded.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day < end)
    }

    /// Local midnight at the start of the window
    pub fn start_local(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Local midnight at the (exclusive) end of the window
    pub fn end_local(&self) -> NaiveDateTime {
        self.end.and_time(NaiveTime::MIN)
    }
}

/// Decide which days to fetch.
///
/// - `latest_day`: local day of the newest persisted record for the area/source
/// - `today`: current date in the provider's timezone
///
/// With an empty table the lookback decides the start. Once any record exists
/// the lookback is ignored and the run restarts one day before the latest
/// record, so late corrections and half-finished days are fetched again.
/// The end is always local midnight between today and tomorrow.
pub fn resolve_fetch_window(
    area_code: &str,
    lookback_days: Option<u32>,
    latest_day: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<FetchWindow, WindowError> {
    let end = today + Days::new(1);

    let start = match (latest_day, lookback_days) {
        (None, Some(days)) => today
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or(WindowError::LookbackOutOfRange(days))?,
        (None, None) => {
            return Err(WindowError::MissingStartPoint {
                area_code: area_code.to_string(),
            });
        }
        (Some(latest), _) => latest - Days::new(1),
    };

    // A record dated after tomorrow leaves nothing to fetch
    Ok(FetchWindow {
        start: start.min(end),
        end,
    })
}
