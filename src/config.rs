use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration keys enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    BaseUrl,
    Username,
    Password,
    KeysFile,
}

impl ConfigKey {
    /// Environment variable name of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::BaseUrl => "JIRA_BASE_URL",
            ConfigKey::Username => "JIRA_USERNAME",
            ConfigKey::Password => "JIRA_PASSWORD",
            ConfigKey::KeysFile => "KEYS_FILE",
        }
    }

    /// Get all config keys
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::BaseUrl,
            ConfigKey::Username,
            ConfigKey::Password,
            ConfigKey::KeysFile,
        ]
    }

    /// One-line description shown in the usage text.
    pub fn description(&self) -> &'static str {
        match self {
            ConfigKey::BaseUrl => "tracker base URL",
            ConfigKey::Username => "login name",
            ConfigKey::Password => "password",
            ConfigKey::KeysFile => "pending keys, one per line (default: keys.txt)",
        }
    }

    /// Keys without which a run cannot start.
    pub fn required() -> &'static [ConfigKey] {
        &[ConfigKey::BaseUrl, ConfigKey::Username, ConfigKey::Password]
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys file used when `KEYS_FILE` is not set.
pub const DEFAULT_KEYS_FILE: &str = "keys.txt";

/// Every required key that was absent or blank, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing required environment variables: {}", join_keys(.0))]
pub struct MissingConfig(pub Vec<ConfigKey>);

fn join_keys(keys: &[ConfigKey]) -> String {
    keys.iter()
        .map(ConfigKey::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pauses and bounded waits used while driving the tracker's UI.
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    pub navigation_timeout: Duration,
    pub element_timeout: Duration,
    pub field_timeout: Duration,
    pub menu_settle: Duration,
    pub dismiss_settle: Duration,
    pub log_work_settle: Duration,
    pub fill_settle: Duration,
    pub save_settle: Duration,
    pub login_settle: Duration,
    pub post_login_settle: Duration,
    pub close_delay: Duration,
    /// Slow-motion delay after every browser action.
    pub action_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(30),
            element_timeout: Duration::from_secs(30),
            field_timeout: Duration::from_secs(10),
            menu_settle: Duration::from_millis(1500),
            dismiss_settle: Duration::from_millis(500),
            log_work_settle: Duration::from_millis(500),
            fill_settle: Duration::from_millis(300),
            save_settle: Duration::from_secs(1),
            login_settle: Duration::from_secs(5),
            post_login_settle: Duration::from_secs(2),
            close_delay: Duration::from_secs(5),
            action_delay: Duration::from_millis(100),
        }
    }
}

impl Timing {
    /// No pauses and short waits, for scripted sessions that answer instantly.
    pub fn immediate() -> Self {
        Self {
            navigation_timeout: Duration::from_millis(50),
            element_timeout: Duration::from_millis(50),
            field_timeout: Duration::from_millis(50),
            menu_settle: Duration::ZERO,
            dismiss_settle: Duration::ZERO,
            log_work_settle: Duration::ZERO,
            fill_settle: Duration::ZERO,
            save_settle: Duration::ZERO,
            login_settle: Duration::ZERO,
            post_login_settle: Duration::ZERO,
            close_delay: Duration::ZERO,
            action_delay: Duration::ZERO,
        }
    }
}

/// Settings for one run, built once at startup and passed by reference.
#[derive(Clone, PartialEq)]
pub struct Config {
    /// Tracker base URL without a trailing slash.
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub keys_file: PathBuf,
    pub timing: Timing,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("keys_file", &self.keys_file)
            .field("timing", &self.timing)
            .finish()
    }
}

impl Config {
    /// Builds a configuration from a key lookup.
    ///
    /// Blank values count as missing. All missing required keys are collected
    /// before failing so the operator can fix them in one go.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, MissingConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: ConfigKey| lookup(key.as_str()).filter(|v| !v.trim().is_empty());

        let missing: Vec<ConfigKey> = ConfigKey::required()
            .iter()
            .copied()
            .filter(|key| value(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(MissingConfig(missing));
        }

        let base_url = value(ConfigKey::BaseUrl).unwrap_or_default();
        Ok(Config {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            username: value(ConfigKey::Username)
                .unwrap_or_default()
                .trim()
                .to_string(),
            password: value(ConfigKey::Password).unwrap_or_default(),
            keys_file: keys_file_from_lookup(&lookup),
            timing: Timing::default(),
        })
    }

    /// Reads `.env` from the working directory when present, then the process environment.
    pub fn from_env() -> Result<Config, MissingConfig> {
        load_dotenv();
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn with_keys_file(mut self, keys_file: impl Into<PathBuf>) -> Self {
        self.keys_file = keys_file.into();
        self
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }
}

/// Resolves the keys file path alone; needs none of the credentials.
pub fn keys_file_from_lookup<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup(ConfigKey::KeysFile.as_str())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_KEYS_FILE))
}

/// Loads `.env` into the process environment. A missing file is not an error.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Failed to load .env file: {e}"),
    }
}
