use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// YAML file with the target brand's keyword lists. `None` selects the
    /// built-in Lay's lists.
    pub keywords_path: Option<PathBuf>,
    /// Acceptable GPS drift, in meters, between a visit event and the shop.
    pub gps_radius_m: f64,
    pub vision_api_key: Option<String>,
    pub vision_base_url: String,
    pub vision_request_timeout_secs: u64,
    pub vision_max_retries: u32,
    pub vision_retry_backoff_base_ms: u64,
    pub rate_limit_max_requests: usize,
    pub rate_limit_window_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("keywords_path", &self.keywords_path)
            .field("gps_radius_m", &self.gps_radius_m)
            .field(
                "vision_api_key",
                &self.vision_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("vision_base_url", &self.vision_base_url)
            .field(
                "vision_request_timeout_secs",
                &self.vision_request_timeout_secs,
            )
            .field("vision_max_retries", &self.vision_max_retries)
            .field(
                "vision_retry_backoff_base_ms",
                &self.vision_retry_backoff_base_ms,
            )
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .finish()
    }
}
