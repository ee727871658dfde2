use std::io;
use std::sync::Arc;

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("io error: {0}")]
    IO(Arc<io::Error>),
    #[error("data corrupt: {0}")]
    Corrupt(String),
    #[error("data size is too much: {0}")]
    Exceed(String),
    #[error("key order not matched")]
    KeyOrder,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("client error: {0}")]
    Client(String),
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error::IO(Arc::new(value))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
