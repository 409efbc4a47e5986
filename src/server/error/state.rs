use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while writing the persisted state file.
///
/// Reading never produces an error: unreadable or corrupt state is treated as empty.
#[derive(Error, Debug)]
pub enum StateError {
    /// Creating, writing, syncing or renaming the state file failed.
    #[error("Failed to write state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The state document could not be serialized.
    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}
