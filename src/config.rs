use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{FactCheckError, Result};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_REASONING_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub google_cse_id: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub reasoning_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub scrape: ScrapeConfig,
    pub pipeline: PipelineSettings,
}

/// Settings for the page fetcher.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Tunables of a single pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// How many search hits to ask for.
    pub max_search_results: usize,
    /// Minimum spacing between the start of two scrapes.
    pub request_delay: Duration,
    /// Upper bound on in-flight scrapes. 1 means strictly sequential.
    pub scrape_concurrency: usize,
    /// Size of the digest handed to the reasoning step.
    pub digest_size: usize,
    /// Body-text characters used as a snippet when a source has no meta description.
    pub snippet_chars: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_search_results: 6,
            request_delay: Duration::from_millis(300),
            scrape_concurrency: 1,
            digest_size: 4,
            snippet_chars: 400,
        }
    }
}

impl Config {
    /// Reads the process environment, loading `.env` first if present.
    pub fn from_env() -> Result<Config> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let scrape_defaults = ScrapeConfig::default();
        let pipeline_defaults = PipelineSettings::default();

        let timeout_secs = get_parsed(
            &lookup,
            "FACTCHECK_FETCH_TIMEOUT_SECS",
            scrape_defaults.timeout.as_secs(),
        )?;
        if timeout_secs == 0 {
            return Err(FactCheckError::Config(
                "FACTCHECK_FETCH_TIMEOUT_SECS must be > 0".to_string(),
            ));
        }
        let reasoning_timeout_secs = get_parsed(
            &lookup,
            "FACTCHECK_REASONING_TIMEOUT_SECS",
            DEFAULT_REASONING_TIMEOUT.as_secs(),
        )?;
        if reasoning_timeout_secs == 0 {
            return Err(FactCheckError::Config(
                "FACTCHECK_REASONING_TIMEOUT_SECS must be > 0".to_string(),
            ));
        }
        let delay_ms = get_parsed(
            &lookup,
            "FACTCHECK_REQUEST_DELAY_MS",
            pipeline_defaults.request_delay.as_millis() as u64,
        )?;
        let max_search_results = get_parsed(
            &lookup,
            "FACTCHECK_MAX_SEARCH",
            pipeline_defaults.max_search_results,
        )?;
        if max_search_results == 0 {
            return Err(FactCheckError::Config(
                "FACTCHECK_MAX_SEARCH must be > 0".to_string(),
            ));
        }
        let scrape_concurrency = get_parsed(
            &lookup,
            "FACTCHECK_SCRAPE_CONCURRENCY",
            pipeline_defaults.scrape_concurrency,
        )?
        .max(1);

        Ok(Config {
            google_api_key: get_env(&lookup, "GOOGLE_API_KEY")?,
            google_cse_id: get_env(&lookup, "GOOGLE_CSE_ID")?,
            gemini_api_key: get_env(&lookup, "GEMINI_API_KEY")?,
            gemini_model: get_env_or_default(&lookup, "GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            reasoning_timeout: Duration::from_secs(reasoning_timeout_secs),
            bind_addr: get_parsed(
                &lookup,
                "FACTCHECK_BIND_ADDR",
                SocketAddr::from(([127, 0, 0, 1], 8000)),
            )?,
            scrape: ScrapeConfig {
                timeout: Duration::from_secs(timeout_secs),
                user_agent: get_env_or_default(&lookup, "FACTCHECK_USER_AGENT", DEFAULT_USER_AGENT),
            },
            pipeline: PipelineSettings {
                max_search_results,
                request_delay: Duration::from_millis(delay_ms),
                scrape_concurrency,
                ..pipeline_defaults
            },
        })
    }
}

fn get_env<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| FactCheckError::Config(format!("Missing required environment variable: {key}")))
}

fn get_env_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn get_parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| FactCheckError::Config(format!("{key} has an invalid value: {raw}"))),
        None => Ok(default),
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

    const REQUIRED: &[(&str, &str)] = &[
        ("GOOGLE_API_KEY", "g-key"),
        ("GOOGLE_CSE_ID", "cse"),
        ("GEMINI_API_KEY", "gem-key"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(REQUIRED)).unwrap();
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.pipeline.max_search_results, 6);
        assert_eq!(config.pipeline.request_delay, Duration::from_millis(300));
        assert_eq!(config.pipeline.scrape_concurrency, 1);
        assert_eq!(config.pipeline.digest_size, 4);
        assert_eq!(config.scrape.timeout, Duration::from_secs(10));
        assert_eq!(config.reasoning_timeout, Duration::from_secs(60));
        assert_eq!(config.scrape.user_agent, "Mozilla/5.0");
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8000");
    }

    #[test]
    fn test_missing_required_key() {
        let err = Config::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "x")])).unwrap_err();
        assert!(err.to_string().contains("GOOGLE_CSE_ID"));
    }

    #[test]
    fn test_blank_required_key_is_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[2] = ("GEMINI_API_KEY", "   ");
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("FACTCHECK_MAX_SEARCH", "3"),
            ("FACTCHECK_REQUEST_DELAY_MS", "0"),
            ("FACTCHECK_SCRAPE_CONCURRENCY", "4"),
            ("FACTCHECK_FETCH_TIMEOUT_SECS", "2"),
            ("FACTCHECK_REASONING_TIMEOUT_SECS", "45"),
            ("GEMINI_MODEL", "gemini-pro"),
            ("FACTCHECK_BIND_ADDR", "0.0.0.0:9000"),
        ]);
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.pipeline.max_search_results, 3);
        assert_eq!(config.pipeline.request_delay, Duration::ZERO);
        assert_eq!(config.pipeline.scrape_concurrency, 4);
        assert_eq!(config.scrape.timeout, Duration::from_secs(2));
        assert_eq!(config.reasoning_timeout, Duration::from_secs(45));
        assert_eq!(config.gemini_model, "gemini-pro");
        assert_eq!(config.bind_addr.port(), 9000);
    }

    #[test]
    fn test_invalid_number() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("FACTCHECK_MAX_SEARCH", "six"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("FACTCHECK_MAX_SEARCH"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("FACTCHECK_FETCH_TIMEOUT_SECS", "0"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_zero_reasoning_timeout_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("FACTCHECK_REASONING_TIMEOUT_SECS", "0"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("FACTCHECK_REASONING_TIMEOUT_SECS"));
    }

    #[test]
    fn test_zero_concurrency_becomes_sequential() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("FACTCHECK_SCRAPE_CONCURRENCY", "0"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.pipeline.scrape_concurrency, 1);
    }
}
