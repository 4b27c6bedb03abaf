//! Persisted settings and effective-settings resolution.
//!
//! [`Config`] is a key-value table in SQLite. [`Settings::resolve`] layers
//! command-line flags, the environment, stored values, and built-in defaults,
//! in that order of precedence.

use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use rusqlite::Connection;
use tracing::info;

use crate::consts::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

/// The settings that can be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    BaseUrl,
    TimeoutSecs,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 2] = [ConfigKey::BaseUrl, ConfigKey::TimeoutSecs];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::BaseUrl => "base_url",
            ConfigKey::TimeoutSecs => "timeout_secs",
        }
    }

    /// Check and normalise a value before it is stored.
    pub fn normalize(self, value: &str) -> Result<String> {
        let value = value.trim();
        match self {
            ConfigKey::BaseUrl => parse_base_url(value),
            ConfigKey::TimeoutSecs => Ok(parse_timeout_secs(value)?.as_secs().to_string()),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        ConfigKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| anyhow!("unknown config key: {s} (expected base_url or timeout_secs)"))
    }
}

/// A base URL must be absolute http(s). Trailing slashes are dropped.
pub fn parse_base_url(value: &str) -> Result<String> {
    let value = value.trim();
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        bail!("base URL must start with http:// or https://: {value}");
    }
    let trimmed = value.trim_end_matches('/');
    if trimmed.ends_with("//") || trimmed.ends_with(':') {
        bail!("base URL has no host: {value}");
    }
    Ok(trimmed.to_string())
}

/// A timeout is a positive whole number of seconds.
pub fn parse_timeout_secs(value: &str) -> Result<Duration> {
    let secs: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("timeout must be a whole number of seconds: {value}"))?;
    if secs == 0 {
        bail!("timeout must be at least 1 second");
    }
    Ok(Duration::from_secs(secs))
}

/// Persistent key-value settings store.
pub struct Config {
    conn: Mutex<Connection>,
}

impl Config {
    /// Open or create the settings table. Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open config database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS settings (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("failed to create settings table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("config connection lock poisoned"))
    }

    pub fn get(&self, key: ConfigKey) -> Result<Option<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        let mut rows = stmt.query([key.as_str()])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Validate and upsert. Returns the value as stored.
    pub fn set(&self, key: ConfigKey, value: &str) -> Result<String> {
        let value = key.normalize(value)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key.as_str(), value.as_str()],
        )?;
        info!(%key, %value, "setting stored");
        Ok(value)
    }

    pub fn remove(&self, key: ConfigKey) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM settings WHERE key = ?1", [key.as_str()])?;
        info!(%key, "setting removed");
        Ok(())
    }

    /// All stored settings, in [`ConfigKey::ALL`] order.
    pub fn entries(&self) -> Result<Vec<(ConfigKey, String)>> {
        let mut entries = Vec::new();
        for key in ConfigKey::ALL {
            if let Some(value) = self.get(key)? {
                entries.push((key, value));
            }
        }
        Ok(entries)
    }
}

/// Where an effective setting came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Flag,
    Env,
    Stored,
    Default,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Flag => "flag",
            Source::Env => "env",
            Source::Stored => "stored",
            Source::Default => "default",
        };
        f.write_str(name)
    }
}

/// Command-line values that take precedence over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

/// The settings a session actually runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub base_url_source: Source,
    pub timeout: Duration,
    pub timeout_source: Source,
}

impl Settings {
    /// Resolve flag → env → stored → default. An empty env value counts as unset.
    pub fn resolve(
        flags: &Overrides,
        env_base_url: Option<String>,
        store: Option<&Config>,
    ) -> Result<Self> {
        let stored = |key: ConfigKey| -> Result<Option<String>> {
            match store {
                Some(config) => config.get(key),
                None => Ok(None),
            }
        };

        let (base_url, base_url_source) = if let Some(url) = &flags.base_url {
            (parse_base_url(url)?, Source::Flag)
        } else if let Some(url) = env_base_url.filter(|u| !u.trim().is_empty()) {
            (
                parse_base_url(&url).context("invalid FEASIBILITY_API_URL")?,
                Source::Env,
            )
        } else if let Some(url) = stored(ConfigKey::BaseUrl)? {
            (parse_base_url(&url)?, Source::Stored)
        } else {
            (DEFAULT_BASE_URL.to_string(), Source::Default)
        };

        let (timeout, timeout_source) = if let Some(timeout) = flags.timeout {
            (timeout, Source::Flag)
        } else if let Some(secs) = stored(ConfigKey::TimeoutSecs)? {
            (
                parse_timeout_secs(&secs).context("invalid stored timeout_secs")?,
                Source::Stored,
            )
        } else {
            (DEFAULT_TIMEOUT, Source::Default)
        };

        Ok(Self {
            base_url,
            base_url_source,
            timeout,
            timeout_source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem_config() -> Config {
        Config::open(":memory:").unwrap()
    }

    #[test]
    fn get_returns_none_for_missing_key() {
        assert!(mem_config().get(ConfigKey::BaseUrl).unwrap().is_none());
    }

    #[test]
    fn set_and_get_normalizes() {
        let config = mem_config();
        let stored = config
            .set(ConfigKey::BaseUrl, " http://127.0.0.1:8000/ ")
            .unwrap();
        assert_eq!(stored, "http://127.0.0.1:8000");
        assert_eq!(
            config.get(ConfigKey::BaseUrl).unwrap().unwrap(),
            "http://127.0.0.1:8000"
        );
    }

    #[test]
    fn set_overwrites_existing() {
        let config = mem_config();
        config.set(ConfigKey::TimeoutSecs, "10").unwrap();
        config.set(ConfigKey::TimeoutSecs, "45").unwrap();
        assert_eq!(config.get(ConfigKey::TimeoutSecs).unwrap().unwrap(), "45");
    }

    #[test]
    fn set_rejects_invalid_values() {
        let config = mem_config();
        assert!(config.set(ConfigKey::BaseUrl, "ftp://x").is_err());
        assert!(config.set(ConfigKey::BaseUrl, "localhost:8000").is_err());
        assert!(config.set(ConfigKey::TimeoutSecs, "0").is_err());
        assert!(config.set(ConfigKey::TimeoutSecs, "soon").is_err());
        assert!(config.entries().unwrap().is_empty());
    }

    #[test]
    fn remove_deletes_key() {
        let config = mem_config();
        config.set(ConfigKey::TimeoutSecs, "5").unwrap();
        config.remove(ConfigKey::TimeoutSecs).unwrap();
        assert!(config.get(ConfigKey::TimeoutSecs).unwrap().is_none());
        config.remove(ConfigKey::TimeoutSecs).unwrap();
    }

    #[test]
    fn entries_in_key_order() {
        let config = mem_config();
        config.set(ConfigKey::TimeoutSecs, "5").unwrap();
        config.set(ConfigKey::BaseUrl, "https://example.com").unwrap();
        let entries = config.entries().unwrap();
        assert_eq!(entries[0].0, ConfigKey::BaseUrl);
        assert_eq!(entries[1], (ConfigKey::TimeoutSecs, "5".to_string()));
    }

    #[test]
    fn key_parses_from_name() {
        assert_eq!("base_url".parse::<ConfigKey>().unwrap(), ConfigKey::BaseUrl);
        assert_eq!(
            "timeout_secs".parse::<ConfigKey>().unwrap(),
            ConfigKey::TimeoutSecs
        );
        assert!("model".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn base_url_requires_host() {
        assert!(parse_base_url("http://").is_err());
        assert!(parse_base_url("https:///").is_err());
        assert_eq!(parse_base_url("https://a.b//").unwrap(), "https://a.b");
    }

    #[test]
    fn resolve_defaults() {
        let settings = Settings::resolve(&Overrides::default(), None, None).unwrap();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.base_url_source, Source::Default);
        assert_eq!(settings.timeout, DEFAULT_TIMEOUT);
        assert_eq!(settings.timeout_source, Source::Default);
    }

    #[test]
    fn resolve_prefers_flag_over_env_and_store() {
        let config = mem_config();
        config.set(ConfigKey::BaseUrl, "https://stored.example").unwrap();
        let flags = Overrides {
            base_url: Some("http://flag.example/".to_string()),
            timeout: Some(Duration::from_secs(3)),
        };
        let settings = Settings::resolve(
            &flags,
            Some("http://env.example".to_string()),
            Some(&config),
        )
        .unwrap();
        assert_eq!(settings.base_url, "http://flag.example");
        assert_eq!(settings.base_url_source, Source::Flag);
        assert_eq!(settings.timeout, Duration::from_secs(3));
        assert_eq!(settings.timeout_source, Source::Flag);
    }

    #[test]
    fn resolve_prefers_env_over_store() {
        let config = mem_config();
        config.set(ConfigKey::BaseUrl, "https://stored.example").unwrap();
        let settings = Settings::resolve(
            &Overrides::default(),
            Some("http://env.example".to_string()),
            Some(&config),
        )
        .unwrap();
        assert_eq!(settings.base_url, "http://env.example");
        assert_eq!(settings.base_url_source, Source::Env);
    }

    #[test]
    fn resolve_ignores_empty_env() {
        let config = mem_config();
        config.set(ConfigKey::BaseUrl, "https://stored.example").unwrap();
        config.set(ConfigKey::TimeoutSecs, "12").unwrap();
        let settings =
            Settings::resolve(&Overrides::default(), Some("  ".to_string()), Some(&config))
                .unwrap();
        assert_eq!(settings.base_url, "https://stored.example");
        assert_eq!(settings.base_url_source, Source::Stored);
        assert_eq!(settings.timeout, Duration::from_secs(12));
        assert_eq!(settings.timeout_source, Source::Stored);
    }

    #[test]
    fn resolve_rejects_bad_env() {
        let result = Settings::resolve(&Overrides::default(), Some("nope".to_string()), None);
        assert!(result.is_err());
    }

    #[test]
    fn persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings-test.db");
        let path_str = path.to_str().unwrap();

        {
            let config = Config::open(path_str).unwrap();
            config.set(ConfigKey::TimeoutSecs, "90").unwrap();
        }

        {
            let config = Config::open(path_str).unwrap();
            assert_eq!(config.get(ConfigKey::TimeoutSecs).unwrap().unwrap(), "90");
        }
    }
}
