use thiserror::Error;

#[derive(Debug, Error)]
pub enum RadarError {
    #[error("dom error: {0}")]
    Dom(String),

    #[error("selector error: {0}")]
    Selector(String),

    #[error("scan error: {0}")]
    Scan(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type RadarResult<T> = Result<T, RadarError>;
