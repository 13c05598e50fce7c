//! Process configuration.
//!
//! The tester is configured by environment variables ([`Environment`]) and
//! one TOML file per tested ECU part ([`Parts`]), each holding the part's
//! socket address:
//!
//! ```toml
//! [address]
//! ip = "192.168.1.10"
//! port = 30501
//! ```

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Environment variable {0} is not set")]
    Env(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub const CONFIG_PATH: &str = "CONFIG_PATH";
pub const LOG_NAME: &str = "LOG_NAME";
pub const LOG_PATH: &str = "LOG_PATH";
pub const LOG_LEVEL: &str = "LOG_LEVEL";
pub const LOG_FORMAT: &str = "LOG_FORMAT";
pub const VEHICLE_TYPE: &str = "VEHICLE_TYPE";

fn default_log_name() -> String {
    "someip-tester".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Output format of the log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            other => Err(ConfigError::Invalid(format!(
                "{LOG_FORMAT} must be one of full, compact, pretty; got {other:?}"
            ))),
        }
    }
}

/// Settings taken from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Directory holding the part TOML files.
    pub config_path: PathBuf,
    /// Name attached to every log line.
    pub log_name: String,
    /// Log file; stdout only when unset.
    pub log_path: Option<PathBuf>,
    /// `tracing` filter directive, e.g. `info` or `someip_tester=debug`.
    pub log_level: String,
    pub log_format: LogFormat,
    /// Vehicle whose tester should run.
    pub vehicle_type: String,
}

impl Environment {
    /// Read the environment of the current process.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let config_path = var(CONFIG_PATH)
            .map(PathBuf::from)
            .ok_or(ConfigError::Env(CONFIG_PATH))?;
        let vehicle_type = var(VEHICLE_TYPE).ok_or(ConfigError::Env(VEHICLE_TYPE))?;
        let log_format = match var(LOG_FORMAT) {
            Some(value) => value.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            config_path,
            log_name: var(LOG_NAME).unwrap_or_else(default_log_name),
            log_path: var(LOG_PATH).map(PathBuf::from),
            log_level: var(LOG_LEVEL).unwrap_or_else(default_log_level),
            log_format,
            vehicle_type,
        })
    }
}

/// An ECU part exercised by the tester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    Mdc,
    Tbox,
    Vdc,
}

impl Part {
    pub const ALL: [Part; 3] = [Part::Mdc, Part::Tbox, Part::Vdc];

    /// Name of the TOML file describing this part.
    pub fn file_name(&self) -> &'static str {
        match self {
            Part::Mdc => "mdc.toml",
            Part::Tbox => "tbox.toml",
            Part::Vdc => "vdc.toml",
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Part::Mdc => "mdc",
            Part::Tbox => "tbox",
            Part::Vdc => "vdc",
        };
        f.write_str(name)
    }
}

impl FromStr for Part {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mdc" => Ok(Part::Mdc),
            "tbox" => Ok(Part::Tbox),
            "vdc" => Ok(Part::Vdc),
            other => Err(ConfigError::Invalid(format!("unknown part {other:?}"))),
        }
    }
}

/// The `[address]` table of a part file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub ip: IpAddr,
    pub port: u16,
}

impl From<Address> for SocketAddr {
    fn from(address: Address) -> Self {
        SocketAddr::new(address.ip, address.port)
    }
}

#[derive(Debug, Deserialize)]
struct PartFile {
    address: Address,
}

/// Socket addresses of every tested part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parts {
    pub mdc: SocketAddr,
    pub tbox: SocketAddr,
    pub vdc: SocketAddr,
}

impl Parts {
    /// Load `mdc.toml`, `tbox.toml` and `vdc.toml` from `dir`.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        Ok(Self {
            mdc: Self::load_part(dir, Part::Mdc)?,
            tbox: Self::load_part(dir, Part::Tbox)?,
            vdc: Self::load_part(dir, Part::Vdc)?,
        })
    }

    /// Load the address of a single part from `dir`.
    pub fn load_part(dir: &Path, part: Part) -> Result<SocketAddr, ConfigError> {
        let path = dir.join(part.file_name());
        let content = std::fs::read_to_string(&path)?;
        let file: PartFile = toml::from_str(&content)?;
        if file.address.port == 0 {
            return Err(ConfigError::Invalid(format!(
                "{}: port must not be 0",
                path.display()
            )));
        }
        Ok(file.address.into())
    }

    /// Address of `part`.
    pub fn get(&self, part: Part) -> SocketAddr {
        match part {
            Part::Mdc => self.mdc,
            Part::Tbox => self.tbox,
            Part::Vdc => self.vdc,
        }
    }
}
