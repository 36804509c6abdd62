pub(crate) mod chat;
pub(crate) mod financials;
pub(crate) mod health;
pub(crate) mod insights;
pub(crate) mod news;
