use rusqlite;
use std::env;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MortydexError {
    #[error("SQLite error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    HttpError(Box<ureq::Error>),
    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] env::VarError),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<ureq::Error> for MortydexError {
    fn from(err: ureq::Error) -> Self {
        MortydexError::HttpError(Box::new(err))
    }
}
