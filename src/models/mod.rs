mod chat;
mod financials;
mod insight;
mod news;
mod price;

pub use chat::{ChatRequest, ChatResponse};
pub use financials::{AnnualSeries, FinancialData, FinancialDataResponse, IncomeStatement};
pub use insight::{DirectionReport, DirectionStats, InsightResult};
pub use news::{CompanyRequest, NewsArticle, TopArticlesResponse};
pub use price::{Granularity, PeriodAggregate, PriceRecord};
