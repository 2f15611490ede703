use std::env;

use time::UtcOffset;

use super::types::{ConfigError, Environment};

const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:8000",
    "http://127.0.0.1:8000",
    "https://tutorias.inacap.cl",
];

pub(super) fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

pub(super) fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

pub(super) fn parse_u16(field: &'static str, value: String) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidValue { field, value })
}

pub(super) fn parse_u64(field: &'static str, value: String) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue { field, value })
}

pub(super) fn parse_i64(field: &'static str, value: String) -> Result<i64, ConfigError> {
    value.parse::<i64>().map_err(|_| ConfigError::InvalidValue { field, value })
}

/// Accepts a JSON array or a comma separated list. Bare host names are
/// expanded to `http://` and `https://` origins.
pub(super) fn parse_cors_origins(value: Option<String>) -> Result<Vec<String>, ConfigError> {
    let Some(raw) = value else {
        return Ok(default_cors_origins());
    };

    if raw.trim().is_empty() {
        return Ok(default_cors_origins());
    }

    let items: Vec<String> = if raw.trim_start().starts_with('[') {
        serde_json::from_str(&raw).map_err(|_| ConfigError::InvalidCors(raw.clone()))?
    } else {
        raw.split(',').map(|item| item.trim().to_string()).filter(|item| !item.is_empty()).collect()
    };

    if items.is_empty() {
        return Ok(default_cors_origins());
    }

    let mut origins = Vec::with_capacity(items.len());
    for item in items {
        if item == "*" {
            return Ok(Vec::new());
        }
        if item.contains("://") {
            origins.push(item);
        } else {
            origins.push(format!("http://{item}"));
            origins.push(format!("https://{item}"));
        }
    }

    Ok(origins)
}

pub(super) fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "on" | "ON")
}

pub(super) fn parse_environment(value: Option<String>) -> Environment {
    match value.as_deref().map(|item| item.to_lowercase()) {
        Some(ref val) if val == "production" || val == "prod" => Environment::Production,
        Some(ref val) if val == "staging" => Environment::Staging,
        Some(ref val) if val == "test" || val == "testing" => Environment::Test,
        _ => Environment::Development,
    }
}

/// Parses `+HH:MM`, `-HH:MM` or `Z`.
pub(super) fn parse_utc_offset(field: &'static str, value: String) -> Result<UtcOffset, ConfigError> {
    let invalid = || ConfigError::InvalidValue { field, value: value.clone() };

    if value.eq_ignore_ascii_case("z") || value == "00:00" {
        return Ok(UtcOffset::UTC);
    }

    let (sign, rest) = match value.as_bytes().first() {
        Some(b'-') => (-1i8, &value[1..]),
        Some(b'+') => (1i8, &value[1..]),
        _ => return Err(invalid()),
    };

    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i8 = hours.parse().map_err(|_| invalid())?;
    let minutes: i8 = minutes.parse().map_err(|_| invalid())?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return Err(invalid());
    }

    UtcOffset::from_hms(sign * hours, sign * minutes, 0).map_err(|_| invalid())
}

fn default_cors_origins() -> Vec<String> {
    DEFAULT_CORS_ORIGINS.iter().map(|item| item.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cors_origins_json() {
        let raw = "[\"http://a\",\"http://b\"]".to_string();
        let parsed = parse_cors_origins(Some(raw)).expect("cors json");
        assert_eq!(parsed, vec!["http://a".to_string(), "http://b".to_string()]);
    }

    #[test]
    fn parse_cors_origins_expands_bare_hosts() {
        let raw = "tutorias.example.cl, http://localhost:3000".to_string();
        let parsed = parse_cors_origins(Some(raw)).expect("cors csv");
        assert_eq!(
            parsed,
            vec![
                "http://tutorias.example.cl".to_string(),
                "https://tutorias.example.cl".to_string(),
                "http://localhost:3000".to_string(),
            ]
        );
    }

    #[test]
    fn parse_cors_origins_wildcard_allows_any() {
        let parsed = parse_cors_origins(Some("*".to_string())).expect("cors wildcard");
        assert!(parsed.is_empty());
    }

    #[test]
    fn parse_cors_origins_defaults_on_empty() {
        let parsed = parse_cors_origins(Some(" ".to_string())).expect("cors empty");
        assert_eq!(parsed, default_cors_origins());
    }

    #[test]
    fn parse_bool_variants() {
        assert!(parse_bool("1"));
        assert!(parse_bool("True"));
        assert!(parse_bool("yes"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
    }

    #[test]
    fn parse_environment_variants() {
        assert_eq!(parse_environment(Some("prod".to_string())), Environment::Production);
        assert_eq!(parse_environment(Some("staging".to_string())), Environment::Staging);
        assert_eq!(parse_environment(Some("testing".to_string())), Environment::Test);
        assert_eq!(parse_environment(None), Environment::Development);
    }

    #[test]
    fn parse_utc_offset_variants() {
        let santiago = parse_utc_offset("LOCAL_UTC_OFFSET", "-03:00".to_string()).expect("offset");
        assert_eq!(santiago.whole_hours(), -3);
        assert_eq!(santiago.minutes_past_hour(), 0);

        let india = parse_utc_offset("LOCAL_UTC_OFFSET", "+05:30".to_string()).expect("offset");
        assert_eq!(india.whole_hours(), 5);
        assert_eq!(india.minutes_past_hour(), 30);

        assert_eq!(parse_utc_offset("LOCAL_UTC_OFFSET", "Z".to_string()).unwrap(), UtcOffset::UTC);
        assert!(parse_utc_offset("LOCAL_UTC_OFFSET", "America/Santiago".to_string()).is_err());
        assert!(parse_utc_offset("LOCAL_UTC_OFFSET", "+25:00".to_string()).is_err());
    }
}
