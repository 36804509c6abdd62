use serde::{Deserialize, Serialize};

use crate::models::PeriodAggregate;

/// Empirical direction/volume probabilities over a sample of periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionStats {
    pub p_increase: f64,
    pub p_decrease: f64,
    pub p_high_volume: f64,
    pub p_high_vol_given_increase: f64,
    pub p_high_vol_given_decrease: f64,
    pub p_increase_given_high_vol: f64,
    pub p_decrease_given_high_vol: f64,
    pub median_volume: f64,
}

/// Response of the `analyze` operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightResult {
    pub symbol: String,
    pub periods: Vec<PeriodAggregate>,
    pub narrative: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionReport {
    pub symbol: String,
    pub periods: usize,
    pub stats: DirectionStats,
}
