//! Deployment settings shared by a service and its launch modes.
//!
//! A service manifest is a TOML file with a `[deployment]` table:
//!
//! ```toml
//! [deployment]
//! port = 3001
//! workers = 4   # optional
//! ```

pub mod error;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

pub use error::DeployConfigError;

/// Environment variable pointing at the service manifest.
pub const SERVICE_MANIFEST: &str = "SERVICE_MANIFEST";

/// Manifest path used when `SERVICE_MANIFEST` is unset.
pub const DEFAULT_MANIFEST: &str = "service.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeploymentConfig {
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
}

#[derive(Deserialize)]
struct Manifest {
    deployment: DeploymentConfig,
}

impl DeploymentConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, DeployConfigError> {
        let manifest: Manifest = toml::from_str(raw)?;
        manifest.deployment.validated()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DeployConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| DeployConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        debug!(
            manifest = %path.display(),
            port = config.port,
            workers = ?config.workers,
            "deployment config loaded"
        );
        Ok(config)
    }

    /// Load the manifest named by `SERVICE_MANIFEST`, or `service.toml`.
    pub fn discover() -> Result<Self, DeployConfigError> {
        Self::load(manifest_path(std::env::var_os(SERVICE_MANIFEST).map(PathBuf::from)))
    }

    fn validated(self) -> Result<Self, DeployConfigError> {
        if self.port == 0 {
            return Err(DeployConfigError::invalid("port", "must be between 1 and 65535"));
        }
        if self.workers == Some(0) {
            return Err(DeployConfigError::invalid("workers", "must be at least 1 when set"));
        }
        Ok(self)
    }
}

fn manifest_path(from_env: Option<PathBuf>) -> PathBuf {
    from_env.unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST))
}
