use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

/// Configuration for the text-generation service
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: env_or("LLM_BASE_URL", &defaults.base_url),
            model: env_or("LLM_MODEL", &defaults.model),
            timeout: Duration::from_secs(env_parse("LLM_TIMEOUT_SECS", 30)),
        }
    }
}

/// Configuration for the news source
#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub lookback_days: i64,
    pub page_size: usize,
    pub timeout: Duration,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://newsapi.org/v2".to_string(),
            lookback_days: 2,
            page_size: 20,
            timeout: Duration::from_secs(15),
        }
    }
}

impl NewsConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("NEWS_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: env_or("NEWS_API_BASE_URL", &defaults.base_url),
            lookback_days: env_parse("NEWS_LOOKBACK_DAYS", defaults.lookback_days),
            page_size: env_parse("NEWS_PAGE_SIZE", defaults.page_size),
            timeout: Duration::from_secs(env_parse("NEWS_TIMEOUT_SECS", 15)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub news: NewsConfig,
    pub price_data_path: PathBuf,
    pub financials_base_url: String,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            llm: LlmConfig::from_env(),
            news: NewsConfig::from_env(),
            price_data_path: PathBuf::from(env_or("PRICE_DATA_PATH", "./Data/stock_data.csv")),
            financials_base_url: env_or(
                "FINANCIALS_BASE_URL",
                "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries",
            ),
            bind_addr: env_parse("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_config_default() {
        let config = LlmConfig::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_news_config_default_window() {
        let config = NewsConfig::default();
        assert_eq!(config.lookback_days, 2);
        assert_eq!(config.page_size, 20);
    }
}
