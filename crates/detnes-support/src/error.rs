use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] detnes_core::Error),

    #[error("invalid activity at line {line}: {reason}")]
    InvalidActivity { line: usize, reason: String },

    #[error("no preimage stored for digest {0}")]
    MissingPreimage(String),

    #[error("failed to decompress blob: {0}")]
    Decompress(String),
}

impl From<detnes_core::SerializationError> for SupportError {
    fn from(err: detnes_core::SerializationError) -> Self {
        SupportError::Core(err.into())
    }
}
