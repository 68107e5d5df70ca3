use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployConfigError {
    #[error("failed to read manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid deployment.{field}: {detail}")]
    Invalid { field: &'static str, detail: String },
}

impl DeployConfigError {
    pub fn invalid(field: &'static str, detail: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            detail: detail.into(),
        }
    }
}
