use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Browser-like user agent sent by default; several storefronts serve
/// reduced markup to obvious bot agents.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup
/// function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("DEALSCOUT_ENV", "development"));
    let log_level = or_default("DEALSCOUT_LOG_LEVEL", "info");

    let fetch_timeout_secs = parse_u64("DEALSCOUT_FETCH_TIMEOUT_SECS", "15")?;
    let user_agent = or_default("DEALSCOUT_USER_AGENT", DEFAULT_USER_AGENT);
    let referrer = or_default("DEALSCOUT_REFERRER", "https://www.google.com");

    // A zero bound would stall the fan-out; clamp to at least one in-flight
    // fetch.
    let max_concurrent_stores = parse_usize("DEALSCOUT_MAX_CONCURRENT_STORES", "4")?.max(1);

    let max_retries = parse_u32("DEALSCOUT_MAX_RETRIES", "2")?;
    let retry_backoff_base_secs = parse_u64("DEALSCOUT_RETRY_BACKOFF_BASE_SECS", "1")?;

    Ok(AppConfig {
        env,
        log_level,
        fetch_timeout_secs,
        user_agent,
        referrer,
        max_concurrent_stores,
        max_retries,
        retry_backoff_base_secs,
    })
}

fn parse_environment(raw: &str) -> Environment {
    match raw.to_ascii_lowercase().as_str() {
        "production" | "prod" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
