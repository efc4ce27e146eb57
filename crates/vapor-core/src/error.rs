//! Error types for the parameter master

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cant set param of type '{found}' at '{path}'")]
    InvalidValueType { path: String, found: &'static str },

    #[error("backend error: {0}")]
    Backend(String),

    #[error("delivery to '{uri}' failed: {message}")]
    Delivery { uri: String, message: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_value_type(path: impl Into<String>, found: &'static str) -> Self {
        Self::InvalidValueType {
            path: path.into(),
            found,
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    pub fn delivery(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Delivery {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// True for the one validation failure the store defines.
    pub fn is_invalid_value_type(&self) -> bool {
        matches!(self, Self::InvalidValueType { .. })
    }
}
