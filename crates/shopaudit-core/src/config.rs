use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so only malformed values fail. Decoupled from
/// the process environment so it can be tested with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("SHOPAUDIT_ENV", "development"))?;

    let bind_addr = parse_addr("SHOPAUDIT_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SHOPAUDIT_LOG_LEVEL", "info");
    let keywords_path = lookup("SHOPAUDIT_KEYWORDS_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let gps_radius_m = parse_radius(&or_default("SHOPAUDIT_GPS_RADIUS_M", "30"))
        .map_err(|reason| invalid("SHOPAUDIT_GPS_RADIUS_M", reason))?;

    let vision_api_key = lookup("VISION_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let vision_base_url = or_default("SHOPAUDIT_VISION_BASE_URL", "https://vision.googleapis.com");
    let vision_request_timeout_secs = parse_u64("SHOPAUDIT_VISION_REQUEST_TIMEOUT_SECS", "30")?;
    let vision_max_retries = parse_u32("SHOPAUDIT_VISION_MAX_RETRIES", "3")?;
    let vision_retry_backoff_base_ms = parse_u64("SHOPAUDIT_VISION_RETRY_BACKOFF_BASE_MS", "1000")?;

    let rate_limit_max_requests = parse_usize("SHOPAUDIT_RATE_LIMIT_MAX_REQUESTS", "120")?;
    let rate_limit_window_secs = parse_u64("SHOPAUDIT_RATE_LIMIT_WINDOW_SECS", "60")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        keywords_path,
        gps_radius_m,
        vision_api_key,
        vision_base_url,
        vision_request_timeout_secs,
        vision_max_retries,
        vision_retry_backoff_base_ms,
        rate_limit_max_requests,
        rate_limit_window_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHOPAUDIT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_radius(raw: &str) -> Result<f64, String> {
    let radius = raw.trim().parse::<f64>().map_err(|e| e.to_string())?;
    if !radius.is_finite() || radius < 0.0 {
        return Err(format!("radius must be a non-negative number of meters, got {raw}"));
    }
    Ok(radius)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
