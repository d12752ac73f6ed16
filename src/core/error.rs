//! Error types for the Black-Scholes lab

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

pub type LabResult<T> = Result<T, LabError>;

impl LabError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn numerical(msg: impl Into<String>) -> Self {
        Self::Numerical(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<serde_json::Error> for LabError {
    fn from(e: serde_json::Error) -> Self {
        Self::serialization(e.to_string())
    }
}

impl From<csv::Error> for LabError {
    fn from(e: csv::Error) -> Self {
        Self::serialization(e.to_string())
    }
}
