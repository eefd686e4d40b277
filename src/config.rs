//! Configuration files.
//!
//! A configuration file sets console variables:
//!
//! ```json
//! {
//!     "cvars": {
//!         "bg_swingSpeed": 0.3,
//!         "player_offsetAngleNeck": "0 5 0"
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::modules::cvars::{self, CVarError};
use crate::utils::*;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub cvars: BTreeMap<String, ConfigValue>,
}

/// Console variable value, either a number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Number(f64),
    String(String),
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Number(x) => fmt::Display::fmt(x, f),
            ConfigValue::String(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error reading the config")]
    Io(#[from] io::Error),
    #[error("error parsing the config")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    CVar(#[from] CVarError),
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Config {
    /// Reads the config from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        fs::read_to_string(path)?.parse()
    }

    /// Sets the console variables.
    ///
    /// Variables that can't be set are skipped. Returns the first error.
    #[instrument(skip_all)]
    pub fn apply(&self, marker: MainThreadMarker) -> Result<(), ConfigError> {
        let mut rv = Ok(());

        for (name, value) in &self.cvars {
            let value = value.to_string();
            if let Err(err) = cvars::set(marker, name, &value) {
                warn!("skipping `{name}`: {err}");
                if rv.is_ok() {
                    rv = Err(err.into());
                }
            }
        }

        rv
    }
}

/// Reads a config file and sets its console variables.
pub fn load(marker: MainThreadMarker, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let path = path.as_ref();
    info!("loading config from {}", path.display());
    Config::load(path)?.apply(marker)
}
