use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Upper bound Square accepts for `limit` on catalog search.
const MAX_CATALOG_PAGE_LIMIT: u32 = 100;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
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

    let square_access_token = require("SQUARE_ACCESS_TOKEN")?;

    let env = parse_environment(&or_default("TCGSHOP_ENV", "development"))?;

    let bind_addr = or_default("TCGSHOP_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("TCGSHOP_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("TCGSHOP_LOG_LEVEL", "info");

    let square_base_url = or_default("SQUARE_BASE_URL", "https://connect.squareup.com");
    if !square_base_url.starts_with("http://") && !square_base_url.starts_with("https://") {
        return Err(invalid(
            "SQUARE_BASE_URL",
            format!("\"{square_base_url}\" is not an http(s) URL"),
        ));
    }
    let square_api_version = or_default("SQUARE_API_VERSION", "2024-10-17");
    let square_location_id = optional("SQUARE_LOCATION_ID");
    let category_groups_path = optional("TCGSHOP_CATEGORY_GROUPS_PATH").map(PathBuf::from);

    let catalog_page_limit = parse_u32("TCGSHOP_CATALOG_PAGE_LIMIT", "24")?;
    if catalog_page_limit == 0 || catalog_page_limit > MAX_CATALOG_PAGE_LIMIT {
        return Err(invalid(
            "TCGSHOP_CATALOG_PAGE_LIMIT",
            format!("{catalog_page_limit} is outside 1..={MAX_CATALOG_PAGE_LIMIT}"),
        ));
    }

    let request_timeout_secs = parse_u64("TCGSHOP_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("TCGSHOP_USER_AGENT", "tcgshop/0.1 (storefront-catalog)");
    let max_retries = parse_u32("TCGSHOP_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("TCGSHOP_RETRY_BACKOFF_BASE_MS", "500")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        square_access_token,
        square_base_url,
        square_api_version,
        square_location_id,
        category_groups_path,
        catalog_page_limit,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TCGSHOP_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
