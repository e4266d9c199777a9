//! Global kinfolk configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{KinError, KinResult};

static DEFAULT_DATA_DIR: &str = "~/kinfolk";
static DEFAULT_CACHE_TTL: &str = "7days";
const DEFAULT_PORT: u16 = 4097;
const DEFAULT_MAX_PHOTO_BYTES: u64 = 20 * 1024 * 1024;

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn is_default_data_dir(p: &PathBuf) -> bool {
    *p == default_data_dir()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_photo_bytes() -> u64 {
    DEFAULT_MAX_PHOTO_BYTES
}

fn default_cache_ttl() -> String {
    DEFAULT_CACHE_TTL.to_string()
}

/// Configuration at ~/.config/kinfolk/config.toml
///
/// Every key can be overridden with a `KINFOLK_` environment variable,
/// e.g. `KINFOLK_PORT=8080` or `KINFOLK_DEMO_USERS=demo-1,demo-2`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct KinfolkConfig {
    /// Where member, relationship, event and photo data lives.
    #[serde(default = "default_data_dir", skip_serializing_if = "is_default_data_dir")]
    pub data_dir: PathBuf,

    /// Local event cache. Defaults to the platform cache dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// User ids that always belong to the demo family group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub demo_users: Vec<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_photo_bytes")]
    pub max_photo_bytes: u64,

    /// How long a cached remote snapshot stays usable, in humantime format ("7days", "12h").
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: String,
}

impl Default for KinfolkConfig {
    fn default() -> Self {
        KinfolkConfig {
            data_dir: default_data_dir(),
            cache_dir: None,
            demo_users: Vec::new(),
            port: DEFAULT_PORT,
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
            cache_ttl: default_cache_ttl(),
        }
    }
}

impl KinfolkConfig {
    pub fn config_path() -> KinResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| KinError::Config("Could not determine config directory".into()))?
            .join("kinfolk");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented default file first if none exists.
    pub fn load() -> KinResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> KinResult<Self> {
        let config: KinfolkConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix("KINFOLK")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("demo_users"),
            )
            .build()
            .map_err(|e| KinError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| KinError::Config(e.to_string()))?;

        tracing::debug!(path = %path.display(), "loaded configuration");

        Ok(config)
    }

    pub fn data_path(&self) -> PathBuf {
        expand(&self.data_dir)
    }

    pub fn photos_path(&self) -> PathBuf {
        self.data_path().join("photos")
    }

    pub fn cache_path(&self) -> KinResult<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(expand(dir)),
            None => Ok(dirs::cache_dir()
                .ok_or_else(|| KinError::Config("Could not determine cache directory".into()))?
                .join("kinfolk")),
        }
    }

    pub fn cache_ttl(&self) -> KinResult<Duration> {
        humantime::parse_duration(&self.cache_ttl)
            .map_err(|e| KinError::Config(format!("Invalid cache_ttl '{}': {e}", self.cache_ttl)))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> KinResult<()> {
        let contents = format!(
            "\
# kinfolk configuration

# Where members, relationships, events and photos live:
# data_dir = \"{}\"

# Local event cache (defaults to the platform cache directory):
# cache_dir = \"~/.cache/kinfolk\"

# Users whose data belongs to the demo family group:
# demo_users = [\"demo-user\"]

# HTTP port for kinfolk-server:
# port = {}

# Largest accepted photo upload, in bytes:
# max_photo_bytes = {}

# How long the cached event snapshot stays usable:
# cache_ttl = \"{}\"
",
            DEFAULT_DATA_DIR, DEFAULT_PORT, DEFAULT_MAX_PHOTO_BYTES, DEFAULT_CACHE_TTL
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                KinError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| KinError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
