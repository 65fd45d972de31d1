use std::io;

use thiserror::Error;

/// Failures surfaced to callers of the reporting pipeline.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("dataset is missing required column '{0}'")]
    MissingColumn(String),
    #[error("dataset could not be read: {0}")]
    Dataset(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("rendering failed: {0}")]
    Render(String),
    #[error("unknown report '{0}'")]
    UnknownReport(String),
}
