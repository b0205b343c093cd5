use std::path::{Path, PathBuf};

use serde_derive::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

use crate::decoder::Decoder;
use crate::error::Error;
use crate::locator::{FsLocator, DEFAULT_MODE, DEFAULT_STEM};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub locator: LocatorConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub log_level: LogLevel,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

/// Installs a global `fmt` subscriber filtered at `log_level`. Returns
/// `false` if a global subscriber was already set.
pub fn init_tracing(log_level: LogLevel) -> bool {
    let log_level: LevelFilter = log_level.into();
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .try_init()
        .is_ok()
}

/// Where the default fallback file lives.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocatorConfig {
    pub dir: PathBuf,
    pub stem: String,
    pub mode: u32,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            stem: DEFAULT_STEM.to_owned(),
            mode: DEFAULT_MODE,
        }
    }
}

impl From<LocatorConfig> for FsLocator {
    fn from(config: LocatorConfig) -> Self {
        FsLocator::new(config.dir)
            .with_stem(config.stem)
            .with_mode(config.mode)
    }
}

/// Attempt to load and parse a config file as a `Config`, in whichever format
/// its extension names.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, Error> {
    Decoder::builder().path(path).build()?.decode()
}
