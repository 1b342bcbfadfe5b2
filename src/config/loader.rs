//! Configuration File Loading
//!
//! Finds the optional `config.toml` and parses it into a [`FileConfig`].
//! A missing file is normal; evap runs on defaults and the environment.

use super::FileConfig;
use crate::error::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "EVAP_CONFIG";

/// Configuration file loader
pub struct ConfigLoader {
    /// Candidate configuration files, highest priority first
    search_paths: Vec<PathBuf>,
    /// Path of the file that was loaded, if any
    current_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader with the default search paths
    pub fn new() -> Self {
        Self {
            search_paths: Self::get_search_paths(),
            current_path: None,
        }
    }

    /// Create a loader that only considers the given files
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            current_path: None,
        }
    }

    /// Load the first configuration file that exists
    ///
    /// Returns `Ok(None)` when no candidate exists. A candidate that exists
    /// but cannot be read or parsed is an error; later candidates are not
    /// consulted in that case.
    pub fn load(&mut self) -> Result<Option<FileConfig>> {
        let Some(path) = self.search_paths.iter().find(|p| p.is_file()).cloned() else {
            debug!("No configuration file found");
            return Ok(None);
        };

        let config = Self::load_from_file(&path)?;
        debug!("Configuration loaded from: {}", path.display());
        self.current_path = Some(path);
        Ok(Some(config))
    }

    /// Load and parse a specific configuration file
    pub fn load_from_file(path: &Path) -> Result<FileConfig> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get default search paths for configuration files
    fn get_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(explicit) = env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
            paths.push(PathBuf::from(explicit));
        }

        if let Some(xdg_config) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            paths.push(PathBuf::from(xdg_config).join("evap").join("config.toml"));
        }

        if let Some(config_dir) = dirs::config_dir() {
            let candidate = config_dir.join("evap").join("config.toml");
            if !paths.contains(&candidate) {
                paths.push(candidate);
            }
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".evap.toml"));
        }

        paths
    }

    /// Get the path of the loaded configuration file
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// List all search paths
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
