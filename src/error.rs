use std::path::PathBuf;

use thiserror::Error;

pub type FlowResult<T> = Result<T, FlowError>;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed migration table: {0}")]
    Csv(#[from] csv::Error),
    #[error("topology has no object named `{0}`")]
    MissingObject(String),
    #[error("migration table is missing column `{0}`")]
    MissingField(&'static str),
    #[error("geometry references unknown arc {0}")]
    InvalidArc(i64),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to write overlay image: {0}")]
    Image(#[from] image::ImageError),
}

impl FlowError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FlowError::Io {
            path: path.into(),
            source,
        }
    }
}
