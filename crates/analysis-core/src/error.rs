use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No data: {0}")]
    NoData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalysisError {
    /// True for the "series too short" failure, which some callers recover from.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, AnalysisError::InsufficientData { .. })
    }
}
