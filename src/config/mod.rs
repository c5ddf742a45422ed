//! Startup settings: a flat `settings.json` of string values, overridden by
//! environment variables of the same name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::network::{NetworkCredentials, WifiCredentials};
use crate::overlay::DEFAULT_WRAP_COLUMNS;
use crate::prompt::PROMPT_NAMES;
use crate::storage::DEFAULT_STORAGE_DIR;
use crate::vision::{DEFAULT_ENDPOINT, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TIMEOUT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "promptcam";
const SETTINGS_FILE: &str = "settings.json";

pub const API_KEY: &str = "OPENAI_API_KEY";
pub const WIFI_SSID: &str = "CIRCUITPY_WIFI_SSID";
pub const WIFI_PASSWORD: &str = "CIRCUITPY_WIFI_PASSWORD";
pub const WIFI_SSID_BACKUP: &str = "CIRCUITPY_WIFI_SSID_BACKUP";
pub const WIFI_PASSWORD_BACKUP: &str = "CIRCUITPY_WIFI_PASSWORD_BACKUP";
pub const STORAGE_DIR: &str = "PROMPTCAM_STORAGE_DIR";
pub const ENDPOINT: &str = "PROMPTCAM_ENDPOINT";
pub const MODEL: &str = "PROMPTCAM_MODEL";
pub const MAX_TOKENS: &str = "PROMPTCAM_MAX_TOKENS";
pub const TIMEOUT_SECS: &str = "PROMPTCAM_TIMEOUT_SECS";
pub const WRAP_COLUMNS: &str = "PROMPTCAM_WRAP_COLUMNS";
pub const CAMERA_SOURCE: &str = "PROMPTCAM_CAMERA_SOURCE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required settings: {}", .keys.join(", "))]
    MissingValues { keys: Vec<String> },
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
    #[error("{password_key} is set but {ssid_key} is not")]
    IncompleteCredentials {
        ssid_key: &'static str,
        password_key: &'static str,
    },
    #[error("failed to read settings file: {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file: {path}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Everything the appliance needs at startup.
#[derive(Clone)]
pub struct Settings {
    pub api_key: String,
    /// Instruction text keyed by prompt name.
    pub prompt_texts: HashMap<String, String>,
    pub network: NetworkCredentials,
    pub storage_dir: PathBuf,
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub wrap_columns: usize,
    pub camera_source: Option<PathBuf>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("prompts", &self.prompt_texts.len())
            .field("network", &self.network)
            .field("storage_dir", &self.storage_dir)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("wrap_columns", &self.wrap_columns)
            .field("camera_source", &self.camera_source)
            .finish()
    }
}

impl Settings {
    /// Resolve settings from file values and an environment lookup; the
    /// environment wins. Blank values count as unset.
    pub fn resolve<E>(file_values: &HashMap<String, String>, env: E) -> ConfigResult<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| {
            env(key)
                .or_else(|| file_values.get(key).cloned())
                .filter(|value| !value.trim().is_empty())
        };

        let mut missing = Vec::new();
        let api_key = lookup(API_KEY);
        if api_key.is_none() {
            missing.push(API_KEY.to_string());
        }

        let mut prompt_texts = HashMap::with_capacity(PROMPT_NAMES.len());
        for name in PROMPT_NAMES {
            let key = format!("PROMPT_{name}");
            match lookup(&key) {
                Some(text) => {
                    prompt_texts.insert(name.to_string(), text);
                }
                None => missing.push(key),
            }
        }

        let Some(api_key) = api_key.filter(|_| missing.is_empty()) else {
            return Err(ConfigError::MissingValues { keys: missing });
        };

        let network = NetworkCredentials {
            primary: wifi_credentials(&lookup, WIFI_SSID, WIFI_PASSWORD)?,
            backup: wifi_credentials(&lookup, WIFI_SSID_BACKUP, WIFI_PASSWORD_BACKUP)?,
        };

        let wrap_columns: usize = parse_or(&lookup, WRAP_COLUMNS, DEFAULT_WRAP_COLUMNS)?;
        if wrap_columns == 0 {
            return Err(ConfigError::InvalidValue {
                key: WRAP_COLUMNS.to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let timeout_secs: u64 = parse_or(&lookup, TIMEOUT_SECS, DEFAULT_TIMEOUT.as_secs())?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: TIMEOUT_SECS.to_string(),
                value: "0".to_string(),
                reason: "a bounded, non-zero timeout is required".to_string(),
            });
        }

        Ok(Self {
            api_key,
            prompt_texts,
            network,
            storage_dir: lookup(STORAGE_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR)),
            endpoint: lookup(ENDPOINT).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            model: lookup(MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: parse_or(&lookup, MAX_TOKENS, DEFAULT_MAX_TOKENS)?,
            timeout: Duration::from_secs(timeout_secs),
            wrap_columns,
            camera_source: lookup(CAMERA_SOURCE).map(PathBuf::from),
        })
    }
}

fn wifi_credentials<L>(
    lookup: &L,
    ssid_key: &'static str,
    password_key: &'static str,
) -> ConfigResult<Option<WifiCredentials>>
where
    L: Fn(&str) -> Option<String>,
{
    match (lookup(ssid_key), lookup(password_key)) {
        (Some(ssid), password) => Ok(Some(WifiCredentials {
            ssid,
            password: password.unwrap_or_default(),
        })),
        (None, Some(_)) => Err(ConfigError::IncompleteCredentials {
            ssid_key,
            password_key,
        }),
        (None, None) => Ok(None),
    }
}

fn parse_or<L, T>(lookup: &L, key: &str, default: T) -> ConfigResult<T>
where
    L: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|err: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
            reason: err.to_string(),
        }),
    }
}

/// Load settings from the user's settings file and the process environment.
pub fn load_settings() -> ConfigResult<Settings> {
    let (xdg_config_home, home) = config_env_dirs();
    let file_values = match app_config_path(
        APP_DIR,
        SETTINGS_FILE,
        xdg_config_home.as_deref(),
        home.as_deref(),
    ) {
        Ok(path) => read_settings_file(&path)?,
        Err(ConfigPathError::MissingHomeDirectory) => {
            tracing::debug!("no config directory; using environment only");
            HashMap::new()
        }
    };
    Settings::resolve(&file_values, |key| std::env::var(key).ok())
}

/// Read a flat JSON object. A missing file is empty; a malformed one is an error.
pub fn read_settings_file(path: &Path) -> ConfigResult<HashMap<String, String>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "settings file not found");
        return Ok(HashMap::new());
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: HashMap<String, Value> =
        serde_json::from_str(&contents).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })?;

    let mut values = HashMap::with_capacity(raw.len());
    for (key, value) in raw {
        let text = match value {
            Value::String(text) => text,
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            other => {
                return Err(ConfigError::InvalidValue {
                    key,
                    value: other.to_string(),
                    reason: "expected a string, number or boolean".to_string(),
                })
            }
        };
        values.insert(key, text);
    }
    tracing::debug!(path = %path.display(), count = values.len(), "settings file loaded");
    Ok(values)
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
