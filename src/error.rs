use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum CopydeskError {
    #[error("inference engine is offline and could not be started")]
    EngineUnavailable,

    #[error("failed to read the pending queue: {0}")]
    QueueRead(#[source] ApiError),

    #[error("invalid automation interval: {0} minutes (choose one of 5, 10, 15, 30, 60)")]
    InvalidInterval(u32),

    #[error("a batch run is already in progress")]
    RunInProgress,

    #[error("remote batch run reported failure")]
    RemoteBatchFailed,

    #[error("content API error: {0}")]
    Api(#[from] ApiError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}
