//! Configuration for the flashcards CLI and the translation proxy

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{
    DocumentStore, FileStore, MemoryStore, StoreError, WebDavClient, WebDavCredentials,
    WebDavStore,
};

pub const DEFAULT_PROXY_URL: &str = "http://localhost:3001";
pub const DEFAULT_PROXY_PORT: u16 = 3001;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Store setup failed: {0}")]
    Store(#[from] StoreError),

    #[error("Environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("Invalid {key} value: {value}")]
    InvalidEnv { key: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Application data directory (`<data dir>/flashcards`)
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flashcards")
}

/// Default file store root
pub fn default_store_dir() -> PathBuf {
    default_data_dir().join("store")
}

/// `<config dir>/flashcards/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("flashcards").join("config.toml"))
}

/// What to do with a translation suggestion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionPolicy {
    /// Show the suggestion next to the form
    #[default]
    Display,
    /// Also copy it into an empty definition field
    FillDefinition,
    /// Never offer a lookup
    Disabled,
}

/// Where documents are kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    Memory,
    File {
        #[serde(default = "default_store_dir")]
        path: PathBuf,
    },
    Webdav {
        url: String,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File {
            path: default_store_dir(),
        }
    }
}

impl StoreConfig {
    /// Construct the configured backend
    pub fn build(&self) -> Result<Arc<dyn DocumentStore>> {
        let store: Arc<dyn DocumentStore> = match self {
            StoreConfig::Memory => {
                log::warn!("Using in-memory store, nothing will be persisted");
                Arc::new(MemoryStore::new())
            }
            StoreConfig::File { path } => {
                log::debug!("Using file store at {}", path.display());
                Arc::new(FileStore::new(path.clone()))
            }
            StoreConfig::Webdav {
                url,
                username,
                password,
            } => {
                let credentials = username.as_ref().map(|username| WebDavCredentials {
                    username: username.clone(),
                    password: password.clone().unwrap_or_default(),
                });
                log::debug!("Using WebDAV store at {}", url);
                Arc::new(WebDavStore::new(WebDavClient::new(url, credentials)?))
            }
        };
        Ok(store)
    }
}

/// Settings of the `flashcards` binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the translation proxy
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,

    #[serde(default)]
    pub suggestion_policy: SuggestionPolicy,

    #[serde(default)]
    pub store: StoreConfig,
}

fn default_proxy_url() -> String {
    DEFAULT_PROXY_URL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            proxy_url: default_proxy_url(),
            suggestion_policy: SuggestionPolicy::default(),
            store: StoreConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_config_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Settings of the `flashcards-proxy` binary, read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub addr: SocketAddr,
    pub auth_key: String,
    /// Overrides the DeepL endpoint derived from the key
    pub deepl_api_url: Option<String>,
}

impl ProxyConfig {
    /// `PORT`, `BIND_ADDR`, `AUTH_KEY` (required) and `DEEPL_API_URL`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidEnv { key: "PORT", value })?,
            None => {
                log::info!("PORT not set, using default: {}", DEFAULT_PROXY_PORT);
                DEFAULT_PROXY_PORT
            }
        };

        let ip = match lookup("BIND_ADDR") {
            Some(value) => value
                .trim()
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidEnv {
                    key: "BIND_ADDR",
                    value,
                })?,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };

        let auth_key = lookup("AUTH_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingEnv("AUTH_KEY"))?;

        let deepl_api_url = lookup("DEEPL_API_URL").filter(|u| !u.trim().is_empty());

        Ok(Self {
            addr: SocketAddr::new(ip, port),
            auth_key,
            deepl_api_url,
        })
    }
}
