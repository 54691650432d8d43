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

/// Runtime configuration, loaded from environment variables by
/// [`crate::config::load_app_config`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Per-request timeout applied to every page fetch.
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    /// Referrer header sent with page fetches.
    pub referrer: String,
    /// Upper bound on concurrent store fetches during a search batch.
    pub max_concurrent_stores: usize,
    /// Additional attempts after the first failure for transient errors.
    pub max_retries: u32,
    /// Base delay for exponential retry backoff: `base * 2^attempt` seconds.
    pub retry_backoff_base_secs: u64,
}
