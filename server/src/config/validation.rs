//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

static RE_CLIENT_ID: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{1,64}$"));
static RE_TOKEN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-\.]{8,}$"));

fn check_pattern(
    re: &LazyLock<Result<Regex, regex::Error>>,
    value: &str,
    what: &str,
) -> Result<(), String> {
    let re = re.as_ref().map_err(|e| e.to_string())?;
    if !re.is_match(value) {
        return Err(format!("invalid {what} format"));
    }
    Ok(())
}

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "TWITCH_CLIENT_ID" => check_pattern(&RE_CLIENT_ID, value, "client id")?,
        "TWITCH_ACCESS_TOKEN" | "DISCORD_BOT_TOKEN" => check_pattern(&RE_TOKEN, value, "token")?,
        "POLL_INTERVAL_SECS" => validate_int_range(value, 30, 3600)?,
        "QUERY_BATCH_SIZE" => validate_int_range(value, 1, 100)?,
        "MAX_IDS_PER_CYCLE" => validate_int_range(value, 1, 100_000)?,
        "FETCH_RETRIES" => validate_int_range(value, 0, 5)?,
        "TENANT_CONCURRENCY" => validate_int_range(value, 1, 64)?,
        "CATEGORY_MAX_PAGES" => validate_int_range(value, 1, 50)?,
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.trim().parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
