//! Optional JSON configuration for the native toolchain.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Toolchain overrides; every field falls back to a platform default.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Compiler driver. The `CC` environment variable still wins.
    pub compiler: Option<String>,
    /// Replaces the `-m64`/`-m32` defaults.
    pub word_size_flags: Option<Vec<String>>,
    /// Replaces the platform's shared-library flags.
    pub shared_library_flags: Option<Vec<String>>,
    /// Passed to every compiler invocation before directive flags.
    pub extra_flags: Vec<String>,
    /// Directory holding `cgrovel.h`.
    pub support_dir: Option<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
