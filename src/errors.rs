use thiserror::Error;

/// Errors that can occur while building a topology snapshot.
#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("grammar error: {message} (language: {language})")]
    Grammar { language: String, message: String },

    #[error("schema error: {message}")]
    Schema { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results using `TopologyError`.
pub type Result<T> = std::result::Result<T, TopologyError>;
