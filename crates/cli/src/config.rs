//! Project file (`ec.toml`) loading.
//!
//! ```toml
//! sources = ["catalog", "shared/teams.ec"]
//!
//! [compile]
//! version-policy = "highest-version"
//! max-errors = 50
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ec_core::CompileOptions;
use serde::Deserialize;

pub(crate) const CONFIG_FILE: &str = "ec.toml";

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ProjectConfig {
    pub compile: CompileOptions,
    /// Files or directories, relative to the project file.
    pub sources: Vec<PathBuf>,
}

impl ProjectConfig {
    /// Read `explicit`, or `./ec.toml` when it exists. A missing default
    /// file yields the defaults; a missing explicit one is an error.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let p = PathBuf::from(CONFIG_FILE);
                if !p.is_file() {
                    return Ok(ProjectConfig::default());
                }
                p
            }
        };
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&text, &path)
    }

    pub(crate) fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: ProjectConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(base) = path.parent().filter(|b| !b.as_os_str().is_empty()) {
            config.sources = config
                .sources
                .into_iter()
                .map(|s| if s.is_relative() { base.join(s) } else { s })
                .collect();
        }
        Ok(config)
    }
}
