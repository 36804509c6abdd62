pub mod financials;
pub mod news_api;
pub mod price_source;
