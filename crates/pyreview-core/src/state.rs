//! Private state directory and persisted configuration.
//!
//! ```text
//! <root>/
//!   config.toml
//!   reports/
//!     report_<id>.json
//! ```

use crate::access::{AccessMode, SafeAccessor};
use crate::config::{ConfigError, ReviewConfig};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Config file name within the state directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Reports directory name within the state directory.
pub const REPORTS_DIR_NAME: &str = "reports";

/// Layout of the state directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    /// Creates a handle for `root`. Nothing is created until [`StateDir::ensure`].
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the state directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the config file path.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    /// Returns the reports directory path.
    #[must_use]
    pub fn reports_dir(&self) -> PathBuf {
        self.root.join(REPORTS_DIR_NAME)
    }

    /// Creates the state and reports directories if they are missing.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a directory cannot be created.
    pub fn ensure(&self) -> io::Result<()> {
        fs::create_dir_all(self.reports_dir())
    }

    /// Returns an accessor sandboxed to this directory.
    #[must_use]
    pub fn accessor(&self) -> SafeAccessor {
        SafeAccessor::new(&self.root)
    }
}

/// Loads and persists [`ReviewConfig`] in the state directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    accessor: SafeAccessor,
}

impl ConfigStore {
    /// Creates a store for `state`'s config file.
    #[must_use]
    pub fn new(state: &StateDir) -> Self {
        Self {
            path: state.config_path(),
            accessor: state.accessor(),
        }
    }

    /// Returns the config file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted configuration.
    ///
    /// A missing, unreadable or invalid file is replaced by the default
    /// configuration, which is written back.
    #[must_use]
    pub fn load(&self) -> ReviewConfig {
        if fs::symlink_metadata(&self.path).is_err() {
            info!("No config at {}, writing defaults", self.path.display());
            return self.heal();
        }

        match self.read() {
            Ok(config) => {
                debug!("Loaded config from {}", self.path.display());
                config
            }
            Err(e) => {
                warn!("{}; using default configuration", e);
                self.heal()
            }
        }
    }

    fn read(&self) -> Result<ReviewConfig, ConfigError> {
        let resolved = self.accessor.resolve(&self.path, AccessMode::Read)?;
        let bytes = self
            .accessor
            .read_bytes(&resolved)
            .map_err(|source| ConfigError::Io {
                path: self.path.clone(),
                source,
            })?;
        let content = String::from_utf8(bytes).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        ReviewConfig::parse(&content)
    }

    fn heal(&self) -> ReviewConfig {
        let config = ReviewConfig::default();
        if let Err(e) = self.save(&config) {
            warn!("Failed to persist default config: {}", e);
        }
        config
    }

    /// Writes the whole configuration atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is denied or the write fails.
    pub fn save(&self, config: &ReviewConfig) -> Result<(), ConfigError> {
        let text = config.to_toml()?;
        let resolved = self.accessor.resolve(&self.path, AccessMode::Write)?;
        self.accessor
            .write_atomic(&resolved, text.as_bytes())
            .map_err(|source| ConfigError::Io {
                path: self.path.clone(),
                source,
            })?;
        debug!("Saved config to {}", self.path.display());
        Ok(())
    }

    /// Restores and persists the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the default cannot be written.
    pub fn reset(&self) -> Result<ReviewConfig, ConfigError> {
        let config = ReviewConfig::default();
        self.save(&config)?;
        info!("Reset config at {}", self.path.display());
        Ok(config)
    }
}
