use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Annual values keyed by fiscal period end date (`YYYY-MM-DD`).
///
/// `None` serializes as `null` for periods the provider reports without a value.
pub type AnnualSeries = BTreeMap<String, Option<f64>>;

/// Raw annual income statement lines as returned by a provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomeStatement {
    pub total_revenue: Option<Vec<(String, f64)>>,
    pub net_income: Option<Vec<(String, f64)>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialData {
    pub revenue: AnnualSeries,
    pub net_income: AnnualSeries,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialDataResponse {
    pub ticker_symbol: String,
    pub financial_data: FinancialData,
}
