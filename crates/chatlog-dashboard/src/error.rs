use std::path::PathBuf;

use thiserror::Error;

pub type DashboardResult<T> = Result<T, DashboardError>;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("cannot read dashboard config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid dashboard config: {0}")]
    ParseConfig(#[from] toml::de::Error),

    #[error("invalid dashboard config: {0}")]
    InvalidConfig(String),

    #[error("cannot write dashboard to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
