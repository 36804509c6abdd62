use crate::errors::AppError;
use crate::models::{DirectionStats, PeriodAggregate};

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Empirical P(direction | high volume) over a sample of periods.
///
/// A period is an increase when close > open and a decrease when close < open;
/// flat periods count toward neither. High volume means strictly above the
/// sample median. Undefined conditionals resolve to 0.
pub fn estimate(periods: &[PeriodAggregate]) -> Result<DirectionStats, AppError> {
    if periods.is_empty() {
        return Err(AppError::InsufficientData(
            "At least one period is required to estimate direction probabilities".to_string(),
        ));
    }

    let n = periods.len();
    let mut volumes: Vec<f64> = periods.iter().map(|p| p.volume).collect();
    let median_volume = median(&mut volumes);

    let increases: Vec<&PeriodAggregate> = periods.iter().filter(|p| p.close > p.open).collect();
    let decreases: Vec<&PeriodAggregate> = periods.iter().filter(|p| p.close < p.open).collect();

    let high_count = periods.iter().filter(|p| p.volume > median_volume).count();
    let high_and_increase = increases.iter().filter(|p| p.volume > median_volume).count();
    let high_and_decrease = decreases.iter().filter(|p| p.volume > median_volume).count();

    let p_increase = ratio(increases.len(), n);
    let p_decrease = ratio(decreases.len(), n);
    let p_high_volume = ratio(high_count, n);
    let p_high_vol_given_increase = ratio(high_and_increase, increases.len());
    let p_high_vol_given_decrease = ratio(high_and_decrease, decreases.len());

    let (p_increase_given_high_vol, p_decrease_given_high_vol) = if p_high_volume > 0.0 {
        (
            p_high_vol_given_increase * p_increase / p_high_volume,
            p_high_vol_given_decrease * p_decrease / p_high_volume,
        )
    } else {
        (0.0, 0.0)
    };

    Ok(DirectionStats {
        p_increase,
        p_decrease,
        p_high_volume,
        p_high_vol_given_increase,
        p_high_vol_given_decrease,
        p_increase_given_high_vol,
        p_decrease_given_high_vol,
        median_volume,
    })
}
