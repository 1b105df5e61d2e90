use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("invalid axis: {0}")]
    InvalidAxis(String),

    #[error("cannot parse name {name:?}: expected {expected}")]
    NameParse { name: String, expected: &'static str },

    #[error("malformed checkpoint {input:?}: {reason}")]
    CheckpointParse { input: String, reason: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("driver error: {0}")]
    Driver(String),

    #[error("summary table error: {0}")]
    Table(String),
}

impl SweepError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type SweepResult<T> = Result<T, SweepError>;
