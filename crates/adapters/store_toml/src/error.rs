//! Store-specific error type.

use std::path::PathBuf;

use neohub_domain::error::HubError;

/// Errors originating from the address file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the file failed.
    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not valid TOML.
    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize address file")]
    Serialize(#[from] toml::ser::Error),
}

impl From<StoreError> for HubError {
    fn from(err: StoreError) -> Self {
        Self::Storage(Box::new(err))
    }
}
