use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Codec errors
    #[error("Invalid bit string: {0}")]
    InvalidBitString(String),
}

pub type Result<T> = std::result::Result<T, Error>;
