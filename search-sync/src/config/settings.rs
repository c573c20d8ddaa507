//! Settings read from the environment.

use std::env;
use std::time::Duration;

use crate::AppError;

pub const SEARCH_SERVICE_ENDPOINT: &str = "SEARCH_SERVICE_ENDPOINT";
pub const SEARCH_SERVICE_API_KEY: &str = "SEARCH_SERVICE_API_KEY";
pub const AZURE_SQL_CONNECTION_STRING: &str = "AZURE_SQL_CONNECTION_STRING";
pub const COSMOS_DB_CONNECTION_STRING: &str = "COSMOS_DB_CONNECTION_STRING";
pub const COSMOS_DB_DATABASE_NAME: &str = "COSMOS_DB_DATABASE_NAME";
pub const SEARCH_INDEX_NAME: &str = "SEARCH_INDEX_NAME";
pub const SEARCH_SUGGESTER_NAME: &str = "SEARCH_SUGGESTER_NAME";
pub const SEARCH_API_VERSION: &str = "SEARCH_API_VERSION";
pub const INDEXER_POLL_INTERVAL_SECS: &str = "INDEXER_POLL_INTERVAL_SECS";
pub const INDEXER_TIMEOUT_SECS: &str = "INDEXER_TIMEOUT_SECS";

/// Default seconds between indexer status polls.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;

/// Default seconds an indexer run may take.
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Default suggester used by suggest and autocomplete.
const DEFAULT_SUGGESTER_NAME: &str = "sg";

/// Sample configs ship with values such as
/// `Put your search service endpoint here`.
fn is_placeholder(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    value.is_empty() || (value.starts_with("put your") && value.ends_with("here"))
}

/// Resolved configuration for one invocation.
///
/// Source-specific settings are kept raw and checked by the `require_*`
/// accessors, so a command only fails on the settings it actually uses.
#[derive(Clone)]
pub struct Settings {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: Option<String>,
    pub index_name: Option<String>,
    pub suggester_name: String,
    pub poll_interval: Duration,
    pub timeout: Duration,
    sql_connection_string: Option<String>,
    cosmos_connection_string: Option<String>,
    cosmos_database_name: Option<String>,
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SEARCH_SERVICE_ENDPOINT`: service URL (required)
    /// - `SEARCH_SERVICE_API_KEY`: admin API key (required)
    /// - `AZURE_SQL_CONNECTION_STRING`: SQL source (sync, multi-source)
    /// - `COSMOS_DB_CONNECTION_STRING`, `COSMOS_DB_DATABASE_NAME`: document store source (multi-source)
    /// - `SEARCH_INDEX_NAME`: overrides the command's default index
    /// - `SEARCH_SUGGESTER_NAME`: suggester name (default: sg)
    /// - `SEARCH_API_VERSION`: REST api-version (default: 2020-06-30)
    /// - `INDEXER_POLL_INTERVAL_SECS`: status poll interval (default: 1)
    /// - `INDEXER_TIMEOUT_SECS`: indexer run timeout (default: 600)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through `lookup`, which returns the raw value of a key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !is_placeholder(v));

        Ok(Self {
            endpoint: required(&lookup, SEARCH_SERVICE_ENDPOINT)?,
            api_key: required(&lookup, SEARCH_SERVICE_API_KEY)?,
            api_version: optional(SEARCH_API_VERSION),
            index_name: optional(SEARCH_INDEX_NAME),
            suggester_name: optional(SEARCH_SUGGESTER_NAME)
                .unwrap_or_else(|| DEFAULT_SUGGESTER_NAME.to_string()),
            poll_interval: seconds(
                INDEXER_POLL_INTERVAL_SECS,
                optional(INDEXER_POLL_INTERVAL_SECS),
                DEFAULT_POLL_INTERVAL_SECS,
            )?,
            timeout: seconds(
                INDEXER_TIMEOUT_SECS,
                optional(INDEXER_TIMEOUT_SECS),
                DEFAULT_TIMEOUT_SECS,
            )?,
            sql_connection_string: lookup(AZURE_SQL_CONNECTION_STRING),
            cosmos_connection_string: lookup(COSMOS_DB_CONNECTION_STRING),
            cosmos_database_name: lookup(COSMOS_DB_DATABASE_NAME),
        })
    }

    pub fn require_sql_connection(&self) -> Result<&str, AppError> {
        check(AZURE_SQL_CONNECTION_STRING, self.sql_connection_string.as_deref())
    }

    pub fn require_cosmos_connection(&self) -> Result<&str, AppError> {
        check(
            COSMOS_DB_CONNECTION_STRING,
            self.cosmos_connection_string.as_deref(),
        )
    }

    pub fn require_cosmos_database(&self) -> Result<&str, AppError> {
        check(COSMOS_DB_DATABASE_NAME, self.cosmos_database_name.as_deref())
    }

    /// The configured index name, or `default` when unset.
    pub fn index_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.index_name.as_deref().unwrap_or(default)
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    check(key, lookup(key).as_deref()).map(|v| v.trim().to_string())
}

fn check<'a>(key: &str, value: Option<&'a str>) -> Result<&'a str, AppError> {
    match value {
        Some(v) if !is_placeholder(v) => Ok(v),
        _ => Err(AppError::missing(key)),
    }
}

fn seconds(key: &str, value: Option<String>, default: u64) -> Result<Duration, AppError> {
    let Some(value) = value else {
        return Ok(Duration::from_secs(default));
    };
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(AppError::config(format!(
            "{} must be a positive number of seconds, got '{}'",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn base() -> Vec<(&'static str, &'static str)> {
        vec![
            (SEARCH_SERVICE_ENDPOINT, "https://demo.search.windows.net"),
            (SEARCH_SERVICE_API_KEY, "admin-key"),
        ]
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup_from(&base())).unwrap();

        assert_eq!(settings.endpoint, "https://demo.search.windows.net");
        assert_eq!(settings.suggester_name, "sg");
        assert_eq!(settings.poll_interval, Duration::from_secs(1));
        assert_eq!(settings.timeout, Duration::from_secs(600));
        assert_eq!(settings.index_or("geonames"), "geonames");
        assert!(settings.api_version.is_none());
    }

    #[test]
    fn test_missing_endpoint_names_setting() {
        let err = Settings::from_lookup(lookup_from(&[(SEARCH_SERVICE_API_KEY, "k")]))
            .err()
            .unwrap();

        assert!(matches!(err, AppError::ConfigurationMissing(ref s) if s == SEARCH_SERVICE_ENDPOINT));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_placeholder_is_rejected() {
        let err = Settings::from_lookup(lookup_from(&[
            (SEARCH_SERVICE_ENDPOINT, "https://demo.search.windows.net"),
            (SEARCH_SERVICE_API_KEY, "Put your primary or secondary API key here"),
        ]))
        .err()
        .unwrap();

        assert!(matches!(err, AppError::ConfigurationMissing(ref s) if s == SEARCH_SERVICE_API_KEY));
    }

    #[test]
    fn test_source_settings_checked_on_demand() {
        let mut pairs = base();
        pairs.push((
            AZURE_SQL_CONNECTION_STRING,
            "Put your Azure SQL database connection string here",
        ));
        pairs.push((COSMOS_DB_DATABASE_NAME, "hotel-rooms-db"));
        let settings = Settings::from_lookup(lookup_from(&pairs)).unwrap();

        assert!(matches!(
            settings.require_sql_connection(),
            Err(AppError::ConfigurationMissing(ref s)) if s == AZURE_SQL_CONNECTION_STRING
        ));
        assert!(matches!(
            settings.require_cosmos_connection(),
            Err(AppError::ConfigurationMissing(_))
        ));
        assert_eq!(settings.require_cosmos_database().unwrap(), "hotel-rooms-db");
    }

    #[test]
    fn test_overrides() {
        let mut pairs = base();
        pairs.push((SEARCH_INDEX_NAME, "nycjobs"));
        pairs.push((SEARCH_SUGGESTER_NAME, "jobs-sg"));
        pairs.push((INDEXER_POLL_INTERVAL_SECS, "5"));
        pairs.push((INDEXER_TIMEOUT_SECS, "60"));
        pairs.push((SEARCH_API_VERSION, "2023-11-01"));
        let settings = Settings::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(settings.index_or("geonames"), "nycjobs");
        assert_eq!(settings.suggester_name, "jobs-sg");
        assert_eq!(settings.poll_interval, Duration::from_secs(5));
        assert_eq!(settings.timeout, Duration::from_secs(60));
        assert_eq!(settings.api_version.as_deref(), Some("2023-11-01"));
    }

    #[test]
    fn test_bad_interval_is_rejected() {
        let mut pairs = base();
        pairs.push((INDEXER_POLL_INTERVAL_SECS, "soon"));

        let err = Settings::from_lookup(lookup_from(&pairs)).err().unwrap();

        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(err.to_string().contains(INDEXER_POLL_INTERVAL_SECS));
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(is_placeholder("Put your search service endpoint here"));
        assert!(is_placeholder("  "));
        assert!(!is_placeholder("https://demo.search.windows.net"));
    }
}
