use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// One row of the price dataset for a single symbol and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub symbol: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub dividends: f64,
    pub stock_splits: f64,
}

/// OHLCV summary of all records falling in one calendar bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodAggregate {
    pub period_start: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub dividends: f64,
    pub stock_splits: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Weekly,
    Monthly,
    Quarterly,
}

impl Granularity {
    /// First day of the bucket containing `date`.
    ///
    /// Weekly buckets end on Friday, so they open on the preceding Saturday.
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Weekly => {
                let days_since_saturday = (date.weekday().num_days_from_monday() + 2) % 7;
                date - Duration::days(days_since_saturday as i64)
            }
            Granularity::Monthly => {
                NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
            }
            Granularity::Quarterly => {
                let quarter_month = ((date.month() - 1) / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(date.year(), quarter_month, 1).unwrap_or(date)
            }
        }
    }

    /// Friday that closes the weekly bucket containing `date`.
    pub fn week_ending(date: NaiveDate) -> NaiveDate {
        let start = Granularity::Weekly.period_start(date);
        let end = start + Duration::days(6);
        debug_assert_eq!(end.weekday(), Weekday::Fri);
        end
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Weekly => write!(f, "weekly"),
            Granularity::Monthly => write!(f, "monthly"),
            Granularity::Quarterly => write!(f, "quarterly"),
        }
    }
}
