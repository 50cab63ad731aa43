//! Configuration loading and root folder resolution

use crate::media::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_UPLOAD_ENDPOINT};
use crate::report::DEFAULT_COLLEGE_NAME;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "EVENTREC_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "eventrec.db";

pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 256;

/// Optional settings from `config.toml`
///
/// Every key may be omitted; accessors fall back to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub college_name: Option<String>,
    pub upload_endpoint: Option<String>,
    pub max_upload_bytes: Option<usize>,
    pub event_bus_capacity: Option<usize>,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Load `path` (or the platform config file); missing files yield defaults
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => config_file_path().ok(),
        };

        match candidate {
            Some(p) if p.exists() => {
                info!("Loading configuration from {}", p.display());
                Self::load(&p)
            }
            Some(p) => {
                warn!("Config file {} not found, using defaults", p.display());
                Ok(Self::default())
            }
            None => {
                warn!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn college_name(&self) -> &str {
        self.college_name.as_deref().unwrap_or(DEFAULT_COLLEGE_NAME)
    }

    pub fn upload_endpoint(&self) -> &str {
        self.upload_endpoint.as_deref().unwrap_or(DEFAULT_UPLOAD_ENDPOINT)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn event_bus_capacity(&self) -> usize {
        self.event_bus_capacity
            .filter(|c| *c > 0)
            .unwrap_or(DEFAULT_EVENT_BUS_CAPACITY)
    }
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. `root_folder` in the TOML config
/// 4. OS-dependent default
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &TomlConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Platform config file location
pub fn config_file_path() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("eventrec").join("config.toml"));

    if cfg!(target_os = "linux") {
        // ~/.config/eventrec/config.toml first, then /etc/eventrec/config.toml
        let system_config = PathBuf::from("/etc/eventrec/config.toml");
        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    user_config.ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/eventrec
        dirs::data_local_dir()
            .map(|d| d.join("eventrec"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/eventrec"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("eventrec"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/eventrec"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("eventrec"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\eventrec"))
    } else {
        PathBuf::from("./eventrec_data")
    }
}

/// Layout of files under the resolved root folder
#[derive(Debug, Clone)]
pub struct RootFolder {
    path: PathBuf,
}

impl RootFolder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the folder when missing
    pub fn ensure_exists(&self) -> Result<()> {
        if !self.path.exists() {
            info!("Creating root folder: {}", self.path.display());
        }
        std::fs::create_dir_all(&self.path)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.path.join(DATABASE_FILE)
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.path.join("reports")
    }
}
