use std::fs;
use std::path::{Path, PathBuf};

use fatechain_ops::config::OperationConfig;
use fatechain_step::ExecutorConfig;
use serde::Deserialize;
use tracing::debug;

use crate::error::{CliError, Result};

const DEFAULT_CONFIG_FILE: &str = "fatechain.toml";

/// Contents of `fatechain.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FatechainConfig {
    pub(crate) events: EventOutput,
    pub(crate) executor: ExecutorConfig,
    pub(crate) operations: OperationConfig,
}

/// Where progress events are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum EventOutput {
    /// `event: ...` lines on stdout.
    #[default]
    Console,
    /// The `tracing` log on stderr, at `info`.
    Log,
}

impl FatechainConfig {
    /// Load `explicit`, or `fatechain.toml` in the working directory when it
    /// exists, or fall back to defaults.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = fs::read_to_string(&path).map_err(|source| CliError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| CliError::ConfigParse {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
