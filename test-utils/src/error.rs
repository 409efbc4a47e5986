use thiserror::Error;

/// Errors that can occur while setting up a test context.
#[derive(Error, Debug)]
pub enum TestError {
    /// Creating the temporary directory or writing seeded state failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Seeded state could not be serialized.
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
    /// A context accessor was used for a component the builder did not enable.
    #[error("{0} was not configured for this test context")]
    NotConfigured(&'static str),
}
