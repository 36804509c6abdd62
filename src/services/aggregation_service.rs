use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::external::price_source::PriceSource;
use crate::models::{Granularity, PeriodAggregate, PriceRecord};

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Resample raw records into one aggregate per period present in the input,
/// ordered by `period_start`.
///
/// Weekly buckets keep OHLC semantics (first open, max high, min low, last
/// close, summed volume). Monthly and quarterly buckets average OHLC and
/// volume and round to 2 decimals. Dividends and splits are summed in every
/// mode.
pub fn aggregate(records: &[PriceRecord], granularity: Granularity) -> Vec<PeriodAggregate> {
    let mut sorted: Vec<&PriceRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let mut buckets: BTreeMap<NaiveDate, Vec<&PriceRecord>> = BTreeMap::new();
    for record in sorted {
        buckets
            .entry(granularity.period_start(record.date))
            .or_default()
            .push(record);
    }

    buckets
        .into_iter()
        .filter_map(|(period_start, bucket)| match granularity {
            Granularity::Weekly => summarize_ohlc(period_start, &bucket),
            Granularity::Monthly | Granularity::Quarterly => average(period_start, &bucket),
        })
        .collect()
}

fn summarize_ohlc(period_start: NaiveDate, bucket: &[&PriceRecord]) -> Option<PeriodAggregate> {
    let first = bucket.first()?;
    let last = bucket.last()?;

    Some(PeriodAggregate {
        period_start,
        open: first.open,
        high: bucket.iter().map(|r| r.high).fold(f64::NEG_INFINITY, f64::max),
        low: bucket.iter().map(|r| r.low).fold(f64::INFINITY, f64::min),
        close: last.close,
        volume: bucket.iter().map(|r| r.volume as f64).sum(),
        dividends: bucket.iter().map(|r| r.dividends).sum(),
        stock_splits: bucket.iter().map(|r| r.stock_splits).sum(),
    })
}

fn average(period_start: NaiveDate, bucket: &[&PriceRecord]) -> Option<PeriodAggregate> {
    if bucket.is_empty() {
        return None;
    }
    let n = bucket.len() as f64;
    let mean = |f: fn(&PriceRecord) -> f64| round_to(bucket.iter().map(|r| f(r)).sum::<f64>() / n, 2);

    Some(PeriodAggregate {
        period_start,
        open: mean(|r| r.open),
        high: mean(|r| r.high),
        low: mean(|r| r.low),
        close: mean(|r| r.close),
        volume: mean(|r| r.volume as f64),
        dividends: bucket.iter().map(|r| r.dividends).sum(),
        stock_splits: bucket.iter().map(|r| r.stock_splits).sum(),
    })
}

/// Aggregate every record the source holds for `symbol`.
pub fn aggregate_symbol(
    source: &dyn PriceSource,
    symbol: &str,
    granularity: Granularity,
) -> Result<Vec<PeriodAggregate>, AppError> {
    let records = source.records_for(symbol)?;
    if records.is_empty() {
        warn!("No price rows for symbol {}", symbol);
        return Err(AppError::DataUnavailable(format!(
            "No price data found for symbol {}",
            symbol
        )));
    }

    let periods = aggregate(&records, granularity);
    info!(
        "Aggregated {} records for {} into {} {} periods",
        records.len(),
        symbol,
        periods.len(),
        granularity
    );
    Ok(periods)
}
