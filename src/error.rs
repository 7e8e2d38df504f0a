use thiserror::Error;

pub type Result<T> = std::result::Result<T, InsightError>;

#[derive(Error, Debug)]
pub enum InsightError {
    /// Input that is not a structured envelope at all
    #[error("malformed input envelope: {0}")]
    MalformedEnvelope(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Text-generation collaborator failed; never escapes the pipeline
    #[error("narrator failed: {0}")]
    Narrator(String),
}

impl From<serde_json::Error> for InsightError {
    fn from(err: serde_json::Error) -> Self {
        InsightError::MalformedEnvelope(err.to_string())
    }
}
