use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{Granularity, PriceRecord};
use crate::services::aggregation_service::{aggregate, round_to};

/// Read-only access to historical price rows keyed by (symbol, date).
pub trait PriceSource: Send + Sync {
    /// All rows for `symbol`, in dataset order. Unknown symbols yield an empty vector.
    fn records_for(&self, symbol: &str) -> Result<Vec<PriceRecord>, AppError>;

    fn symbols(&self) -> Vec<String>;
}

#[derive(Debug, Deserialize, Serialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: f64,
    #[serde(rename = "Dividends", default)]
    dividends: f64,
    #[serde(rename = "Stock Splits", default)]
    stock_splits: f64,
}

/// Accepts `YYYY-MM-DD` optionally followed by a time and UTC offset,
/// e.g. `2024-03-08 00:00:00-05:00`.
fn parse_row_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

impl CsvRow {
    fn into_record(self, line: usize) -> Result<PriceRecord, AppError> {
        let date = parse_row_date(&self.date).ok_or_else(|| {
            AppError::Internal(format!("Invalid date '{}' on line {}", self.date, line))
        })?;
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(AppError::Internal(format!(
                "Invalid volume {} on line {}",
                self.volume, line
            )));
        }

        Ok(PriceRecord {
            date,
            symbol: self.symbol.trim().to_string(),
            open: round_to(self.open, 3),
            high: round_to(self.high, 3),
            low: round_to(self.low, 3),
            close: round_to(self.close, 3),
            volume: self.volume.round() as u64,
            dividends: round_to(self.dividends, 3),
            stock_splits: round_to(self.stock_splits, 3),
        })
    }
}

fn read_records<R: Read>(input: R) -> Result<Vec<PriceRecord>, AppError> {
    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    let mut records = Vec::new();
    for (idx, row) in reader.deserialize::<CsvRow>().enumerate() {
        // header is line 1
        records.push(row?.into_record(idx + 2)?);
    }
    Ok(records)
}

/// Price dataset loaded once from a CSV snapshot and immutable afterwards.
#[derive(Debug, Default)]
pub struct CsvPriceStore {
    by_symbol: BTreeMap<String, Vec<PriceRecord>>,
}

impl CsvPriceStore {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            AppError::Internal(format!("Cannot open price dataset {}: {}", path.display(), e))
        })?;
        let store = Self::from_reader(file)?;
        info!(
            "Loaded price dataset from {} ({} symbols)",
            path.display(),
            store.by_symbol.len()
        );
        Ok(store)
    }

    pub fn from_reader<R: Read>(input: R) -> Result<Self, AppError> {
        Ok(Self::from_records(read_records(input)?))
    }

    pub fn from_records(records: Vec<PriceRecord>) -> Self {
        let mut by_symbol: BTreeMap<String, Vec<PriceRecord>> = BTreeMap::new();
        for record in records {
            by_symbol.entry(record.symbol.clone()).or_default().push(record);
        }
        Self { by_symbol }
    }
}

impl PriceSource for CsvPriceStore {
    fn records_for(&self, symbol: &str) -> Result<Vec<PriceRecord>, AppError> {
        Ok(self
            .by_symbol
            .get(symbol.trim())
            .cloned()
            .unwrap_or_default())
    }

    fn symbols(&self) -> Vec<String> {
        self.by_symbol.keys().cloned().collect()
    }
}

/// Resample a daily price CSV into the weekly dataset layout the service
/// reads. Each output row is dated by the Friday closing its week.
///
/// Returns the number of weekly rows written.
pub fn resample_to_weekly<R: Read, W: Write>(input: R, output: W) -> Result<usize, AppError> {
    let store = CsvPriceStore::from_reader(input)?;
    let mut writer = WriterBuilder::new().from_writer(output);
    let mut written = 0;

    for (symbol, records) in &store.by_symbol {
        let weeks = aggregate(records, Granularity::Weekly);
        if weeks.is_empty() {
            warn!("No weekly rows produced for {}", symbol);
            continue;
        }
        for week in weeks {
            writer.serialize(CsvRow {
                date: Granularity::week_ending(week.period_start)
                    .format("%Y-%m-%d")
                    .to_string(),
                symbol: symbol.clone(),
                open: round_to(week.open, 3),
                high: round_to(week.high, 3),
                low: round_to(week.low, 3),
                close: round_to(week.close, 3),
                volume: week.volume,
                dividends: round_to(week.dividends, 3),
                stock_splits: round_to(week.stock_splits, 3),
            })?;
            written += 1;
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::Internal(format!("Failed to write weekly dataset: {}", e)))?;
    info!("Wrote {} weekly rows for {} symbols", written, store.by_symbol.len());
    Ok(written)
}
