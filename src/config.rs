//! Credentials for the Telegram API
//!
//! Loads `API_ID`, `API_HASH` and `PHONE_NUMBER` from a `.env` file. Values
//! already present in the process environment take precedence, the same way
//! `dotenvy::dotenv()` never overrides an existing variable.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Default constants
pub const ENV_FILE: &str = ".env";
pub const SESSION_NAME: &str = "telegram_manager_session";

/// Log filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "telegram_manager=info";

pub const API_ID_KEY: &str = "API_ID";
pub const API_HASH_KEY: &str = "API_HASH";
pub const PHONE_NUMBER_KEY: &str = "PHONE_NUMBER";

/// Keys that must be present and non-empty, in reporting order.
pub const REQUIRED_VARS: [&str; 3] = [API_ID_KEY, API_HASH_KEY, PHONE_NUMBER_KEY];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{} file not found", .0.display())]
    EnvFileNotFound(PathBuf),

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingVars(Vec<&'static str>),

    #[error("API_ID must be an integer, got '{0}'")]
    InvalidApiId(String),
}

impl ConfigError {
    /// Multi-line hint printed before the process exits.
    pub fn remediation(&self) -> String {
        match self {
            ConfigError::EnvFileNotFound(path) => format!(
                r#"Please create a {file} file based on the provided .env.example:
1. Copy .env.example to {file}
2. Fill in your API_ID, API_HASH, and PHONE_NUMBER

Example:
  API_ID=123456
  API_HASH=abcdef1234567890abcdef1234567890
  PHONE_NUMBER=+1234567890"#,
                file = path.display()
            ),
            ConfigError::Parse { .. } => {
                "Every line must look like KEY=value. Check quoting and stray characters.".to_string()
            }
            ConfigError::MissingVars(_) => {
                "Please check your .env file and ensure all required variables are set.".to_string()
            }
            ConfigError::InvalidApiId(_) => {
                "API_ID is the numeric app id shown on https://my.telegram.org/apps.".to_string()
            }
        }
    }
}

/// Telegram application credentials plus the account phone number.
#[derive(Clone)]
pub struct Credentials {
    pub api_id: i32,
    pub api_hash: String,
    pub phone: String,
}

// api_hash stays out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_id", &self.api_id)
            .field("api_hash", &"<redacted>")
            .field("phone", &self.phone)
            .finish()
    }
}

impl Credentials {
    /// Load credentials from an env file, letting the process environment
    /// override the file.
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::EnvFileNotFound(path.to_path_buf()));
        }

        let file_vars = read_env_file(path)?;

        Self::from_lookup(|key| {
            non_empty(std::env::var(key).ok()).or_else(|| non_empty(file_vars.get(key).cloned()))
        })
    }

    /// Build credentials from any key lookup. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_id = non_empty(lookup(API_ID_KEY));
        let api_hash = non_empty(lookup(API_HASH_KEY));
        let phone = non_empty(lookup(PHONE_NUMBER_KEY));

        let (Some(raw_id), Some(api_hash), Some(phone)) = (&raw_id, &api_hash, &phone) else {
            let present = [raw_id.is_some(), api_hash.is_some(), phone.is_some()];
            let missing = REQUIRED_VARS
                .iter()
                .zip(present)
                .filter(|(_, present)| !present)
                .map(|(key, _)| *key)
                .collect();
            return Err(ConfigError::MissingVars(missing));
        };

        let api_id = raw_id
            .parse::<i32>()
            .map_err(|_| ConfigError::InvalidApiId(raw_id.clone()))?;

        Ok(Self {
            api_id,
            api_hash: api_hash.clone(),
            phone: phone.clone(),
        })
    }
}

/// Log filter from `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`].
pub fn log_filter() -> EnvFilter {
    log_filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref())
}

pub fn log_filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let parse_err = |e: dotenvy::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut vars = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(parse_err)? {
        let (key, value) = item.map_err(parse_err)?;
        vars.insert(key, value);
    }
    Ok(vars)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
